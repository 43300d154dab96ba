use std::fmt::{self, Display};

/// Ranges of one interval closer than this are merged.
pub const MERGE_SLACK: usize = 2;

/// A closed span `[start, stop]` of instruction positions.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Range {
    pub start: usize,
    pub stop: usize,
}

impl Range {
    pub fn new(start: usize, stop: usize) -> Self {
        assert!(start <= stop);
        Self { start, stop }
    }

    pub fn point(at: usize) -> Self {
        Self::new(at, at)
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.stop
    }

    pub fn intersects(&self, other: &Range) -> bool {
        self.start <= other.stop && other.start <= self.stop
    }

    /// Whether the two ranges overlap or lie within [`MERGE_SLACK`] of each other.
    pub fn touches(&self, other: &Range) -> bool {
        self.start <= other.stop + MERGE_SLACK && other.start <= self.stop + MERGE_SLACK
    }

    pub fn span(&self, other: &Range) -> Range {
        Range::new(self.start.min(other.start), self.stop.max(other.stop))
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.stop)
    }
}

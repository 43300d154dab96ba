//! Lifetime intervals and the arena that owns them.
//!
//! Every virtual register gets one root interval. Splitting an interval produces a child covering everything from
//! the split position onwards; children always point at the root of their tree and the root lists them in position
//! order, so the segment holding a register at some position is a short walk away.

mod range;


pub use range::Range;

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use lira_common::lir::{Physical, Slot, Virtual};
use log::trace;

use super::frame::Frame;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IntervalId(pub usize);

impl Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UseKind {
    Read,
    Write,

    /// The instruction both reads and writes the register.
    ReadWrite,
}

impl UseKind {
    pub fn reads(&self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub fn writes(&self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }

    fn combine(self, other: UseKind) -> UseKind {
        if self == other {
            self
        } else {
            Self::ReadWrite
        }
    }
}

#[derive(Clone, Debug)]
pub struct Interval {
    pub id: IntervalId,
    pub vreg: Virtual,

    /// Sorted, disjoint and never empty once built.
    pub ranges: Vec<Range>,
    pub uses: BTreeMap<usize, UseKind>,

    pub reg: Option<Physical>,
    pub spill: bool,

    /// Pre-colored by the front end; never reassigned or split.
    pub fixed: bool,

    /// Stack home of the register. Only meaningful on the root, see [`Intervals::slot`].
    pub slot: Option<Slot>,

    pub parent: Option<IntervalId>,
    pub children: Vec<IntervalId>,
}

impl Interval {
    fn new(id: IntervalId, vreg: Virtual) -> Self {
        Self {
            id,
            vreg,
            ranges: Vec::new(),
            uses: BTreeMap::new(),
            reg: None,
            spill: false,
            fixed: false,
            slot: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn start(&self) -> usize {
        self.ranges.first().map(|range| range.start).unwrap_or(0)
    }

    pub fn stop(&self) -> usize {
        self.ranges.last().map(|range| range.stop).unwrap_or(0)
    }

    pub fn covers(&self, pos: usize) -> bool {
        self.ranges.iter().any(|range| range.contains(pos))
    }

    pub fn intersects(&self, other: &Interval) -> bool {
        self.next_intersection(other).is_some()
    }

    /// The first position covered by both intervals.
    pub fn next_intersection(&self, other: &Interval) -> Option<usize> {
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let (a, b) = (&self.ranges[i], &other.ranges[j]);
            if a.intersects(b) {
                return Some(a.start.max(b.start));
            }

            if a.stop < b.stop {
                i += 1;
            } else {
                j += 1;
            }
        }

        None
    }

    /// The first use at or after `pos`.
    pub fn next_use(&self, pos: usize) -> Option<usize> {
        self.uses.range(pos..).next().map(|(at, _)| *at)
    }

    pub fn first_use(&self) -> Option<(usize, UseKind)> {
        self.uses.iter().next().map(|(at, kind)| (*at, *kind))
    }

    /// Spilled without a register: every use goes through memory.
    pub fn is_memory(&self) -> bool {
        self.reg.is_none() && self.spill
    }

    /// Add `[start, stop]`, merging it with every range it touches.
    pub fn add_range(&mut self, start: usize, stop: usize) {
        let mut new = Range::new(start, stop);
        let mut ranges = Vec::with_capacity(self.ranges.len() + 1);
        let mut placed = false;

        for range in self.ranges.drain(..) {
            if new.touches(&range) {
                new = new.span(&range);
            } else if range.stop < new.start {
                ranges.push(range);
            } else {
                if !placed {
                    ranges.push(new);
                    placed = true;
                }
                ranges.push(range);
            }
        }

        if !placed {
            ranges.push(new);
        }

        self.ranges = ranges;
    }

    /// Start the interval at the definition `pos`. A definition nothing reads gets a range of its own.
    pub fn shorten_to(&mut self, pos: usize) {
        match self.ranges.first_mut() {
            Some(first) if first.contains(pos) => first.start = pos,
            _ => self.add_range(pos, pos),
        }
    }

    pub fn add_use(&mut self, pos: usize, kind: UseKind) {
        self.uses
            .entry(pos)
            .and_modify(|existing| *existing = existing.combine(kind))
            .or_insert(kind);
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.vreg)?;
        for range in self.ranges.iter() {
            write!(f, " {range}")?;
        }

        match (self.reg, self.spill) {
            (Some(reg), true) => write!(f, " -> {reg}, spilled"),
            (Some(reg), false) => write!(f, " -> {reg}"),
            (None, true) => write!(f, " -> memory"),
            (None, false) => write!(f, " -> unassigned"),
        }
    }
}

/// The interval arena of one method.
#[derive(Clone, Debug, Default)]
pub struct Intervals {
    arena: Vec<Interval>,
    roots: BTreeMap<usize, IntervalId>,
}

impl Intervals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn get(&self, id: IntervalId) -> &Interval {
        &self.arena[id.0]
    }

    pub fn get_mut(&mut self, id: IntervalId) -> &mut Interval {
        &mut self.arena[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.arena.iter()
    }

    /// Root intervals, by virtual register number.
    pub fn roots(&self) -> impl Iterator<Item = &Interval> {
        self.roots.values().map(|id| self.get(*id))
    }

    pub fn root_of(&self, vreg: usize) -> Option<IntervalId> {
        self.roots.get(&vreg).copied()
    }

    /// Get the root interval of `vreg`, creating it if needed.
    pub fn root_mut(&mut self, vreg: Virtual) -> &mut Interval {
        let id = match self.roots.get(&vreg.id) {
            Some(id) => *id,
            None => {
                let id = IntervalId(self.arena.len());
                self.arena.push(Interval::new(id, vreg));
                self.roots.insert(vreg.id, id);
                id
            }
        };

        self.get_mut(id)
    }

    pub fn root(&self, id: IntervalId) -> IntervalId {
        self.get(id).parent.unwrap_or(id)
    }

    /// Every interval of the split tree of `vreg`, in position order.
    pub fn segments(&self, vreg: usize) -> Vec<IntervalId> {
        match self.root_of(vreg) {
            Some(root) => std::iter::once(root)
                .chain(self.get(root).children.iter().copied())
                .collect(),
            None => Vec::new(),
        }
    }

    /// The segment of `vreg` covering `pos`.
    pub fn segment_at(&self, vreg: usize, pos: usize) -> Option<IntervalId> {
        self.segments(vreg)
            .into_iter()
            .find(|id| self.get(*id).covers(pos))
    }

    pub fn slot(&self, id: IntervalId) -> Option<Slot> {
        self.get(self.root(id)).slot
    }

    /// The stack home of the tree of `id`, handing out a fresh one on first request.
    pub fn ensure_slot(&mut self, id: IntervalId, frame: &mut Frame) -> Slot {
        let root = self.root(id);
        match self.get(root).slot {
            Some(slot) => slot,
            None => {
                let slot = frame.fresh();
                trace!("{} gets {slot}", self.get(root).vreg);
                self.get_mut(root).slot = Some(slot);
                slot
            }
        }
    }

    /// Split `id` at `pos`. The returned child holds every range and use at or after `pos`; `None` if either side
    /// would be empty.
    pub fn split(&mut self, id: IntervalId, pos: usize) -> Option<IntervalId> {
        let interval = self.get(id);
        assert!(!interval.fixed);

        if pos <= interval.start() || pos > interval.stop() {
            return None;
        }

        let mut keep = Vec::new();
        let mut moved = Vec::new();
        for range in interval.ranges.iter() {
            if range.stop < pos {
                keep.push(*range);
            } else if range.start >= pos {
                moved.push(*range);
            } else {
                keep.push(Range::new(range.start, pos - 1));
                moved.push(Range::new(pos, range.stop));
            }
        }

        let uses = interval.uses.clone();
        let (keep_uses, moved_uses): (BTreeMap<_, _>, BTreeMap<_, _>) =
            uses.into_iter().partition(|(at, _)| *at < pos);

        let root = self.root(id);
        let child_id = IntervalId(self.arena.len());
        let mut child = Interval::new(child_id, interval.vreg);
        child.ranges = moved;
        child.uses = moved_uses;
        child.parent = Some(root);

        let interval = self.get_mut(id);
        interval.ranges = keep;
        interval.uses = keep_uses;

        trace!("split {} at {pos} into {child_id}", interval.vreg);

        let start = child.start();
        self.arena.push(child);

        let position = {
            let children = &self.get(root).children;
            children.partition_point(|other| self.get(*other).start() < start)
        };
        self.get_mut(root).children.insert(position, child_id);

        Some(child_id)
    }
}

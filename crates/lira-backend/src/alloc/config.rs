use std::fmt::{self, Display};

use lira_common::lir::MAX_ALLOCATABLE;
use log::warn;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Strategy {
    /// One register per virtual register for the whole method, evicting first-in first-out.
    Naive,

    #[default]
    Linear,

    /// Chaitin-style coloring of the interference graph.
    Graph,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::Linear => "linear",
            Self::Graph => "graph",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    pub strategy: Strategy,

    /// Size of the allocatable pool, always within `1..=MAX_ALLOCATABLE`.
    pub registers: usize,
}

impl Config {
    pub fn new(strategy: Strategy, registers: usize) -> Self {
        let clamped = registers.clamp(1, MAX_ALLOCATABLE);
        if clamped != registers {
            warn!("{registers} allocatable registers requested, using {clamped}");
        }

        Self {
            strategy,
            registers: clamped,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Strategy::default(), MAX_ALLOCATABLE)
    }
}

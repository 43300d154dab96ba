//! Spill code planned by the allocators, applied later by the rewriter.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use lira_common::lir::{BlockId, Physical, Slot};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Place {
    /// At the top of a block.
    BlockStart(BlockId),

    Before(usize),
    After(usize),

    /// At the bottom of a block, before its terminator if it has one.
    BlockEnd(BlockId),

    /// On a fresh block inserted on the edge.
    Edge(BlockId, BlockId),
}

/// Stores order before loads at the same place.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Move {
    Store { from: Physical, slot: Slot },
    Load { into: Physical, slot: Slot },
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store { from, slot } => write!(f, "store {from}, {slot}"),
            Self::Load { into, slot } => write!(f, "{into} = load {slot}"),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Edits {
    moves: BTreeSet<(Place, Move)>,
}

impl Edits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan a move. Returns `false` if it was already planned.
    pub fn add(&mut self, place: Place, mov: Move) -> bool {
        self.moves.insert((place, mov))
    }

    pub fn at(&self, place: Place) -> impl Iterator<Item = Move> + '_ {
        self.moves
            .range((place, Move::MIN)..)
            .take_while(move |(at, _)| *at == place)
            .map(|(_, mov)| *mov)
    }

    /// Every edge that needs a block of its own.
    pub fn edges(&self) -> BTreeSet<(BlockId, BlockId)> {
        self.moves
            .iter()
            .filter_map(|(place, _)| match place {
                Place::Edge(from, to) => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Place, Move)> {
        self.moves.iter()
    }
}

impl Move {
    const MIN: Move = Move::Store {
        from: Physical(0),
        slot: Slot::Frame(0),
    };
}

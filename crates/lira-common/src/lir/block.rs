use std::fmt::{self, Display};

use super::Instruction;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BlockId(pub usize);

impl Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Block {
    pub id: BlockId,
    pub insts: Vec<Instruction>,
    pub preds: Vec<BlockId>,
    pub succs: Vec<BlockId>,
}

impl Block {
    /// Position of the first instruction. Blocks are never empty.
    pub fn first_id(&self) -> usize {
        self.insts.first().map(|inst| inst.id).unwrap_or(0)
    }

    /// Position of the last instruction.
    pub fn last_id(&self) -> usize {
        self.insts.last().map(|inst| inst.id).unwrap_or(0)
    }

    pub fn terminator(&self) -> Option<&Instruction> {
        self.insts.last().filter(|inst| inst.is_terminator())
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.first_id() <= pos && pos <= self.last_id()
    }
}

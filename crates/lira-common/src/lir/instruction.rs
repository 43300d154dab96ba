use std::fmt::{self, Display};

use super::{BlockId, Register, Virtual};

/// A memory location holding a spilled value.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Slot {
    /// Frame-pointer relative; incoming parameters passed on the stack.
    Frame(usize),

    /// Stack-pointer relative; spill slots handed out by the allocator.
    Stack(usize),
}

impl Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(offset) => write!(f, "[fp+{offset}]"),
            Self::Stack(offset) => write!(f, "[sp+{offset}]"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

impl BinOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Shl => "shl",
            Self::Shr => "shr",
        }
    }

    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Some(match name {
            "add" => Self::Add,
            "sub" => Self::Sub,
            "mul" => Self::Mul,
            "div" => Self::Div,
            "and" => Self::And,
            "or" => Self::Or,
            "xor" => Self::Xor,
            "shl" => Self::Shl,
            "shr" => Self::Shr,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Condition {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Condition {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::NotEqual => "ne",
            Self::Less => "lt",
            Self::LessEqual => "le",
            Self::Greater => "gt",
            Self::GreaterEqual => "ge",
        }
    }

    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Some(match name {
            "eq" => Self::Equal,
            "ne" => Self::NotEqual,
            "lt" => Self::Less,
            "le" => Self::LessEqual,
            "gt" => Self::Greater,
            "ge" => Self::GreaterEqual,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Opcode {
    Const(i64),
    Move,
    Binary(BinOp),
    Compare(Condition),

    /// Read parameter `n` of the method.
    Local(usize),
    Call(String),

    Jump(BlockId),
    Branch(Condition, BlockId, BlockId),
    Return,

    /// Reload from a slot. Only inserted by the allocator.
    Load(Slot),

    /// Spill to a slot. Only inserted by the allocator.
    Store(Slot),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instruction {
    pub id: usize,
    pub opcode: Opcode,
    pub reads: Vec<Register>,
    pub write: Option<Register>,
}

impl Instruction {
    pub fn new(id: usize, opcode: Opcode) -> Self {
        Self {
            id,
            opcode,
            reads: Vec::new(),
            write: None,
        }
    }

    pub fn reading(self, reads: impl IntoIterator<Item = Register>) -> Self {
        Self {
            reads: reads.into_iter().collect(),
            ..self
        }
    }

    pub fn writing(self, write: impl Into<Register>) -> Self {
        Self {
            write: Some(write.into()),
            ..self
        }
    }

    pub fn load(id: usize, slot: Slot, into: impl Into<Register>) -> Self {
        Self::new(id, Opcode::Load(slot)).writing(into)
    }

    pub fn store(id: usize, slot: Slot, from: impl Into<Register>) -> Self {
        Self::new(id, Opcode::Store(slot)).reading([from.into()])
    }

    pub fn is_terminator(&self) -> bool {
        matches!(
            self.opcode,
            Opcode::Jump(_) | Opcode::Branch(..) | Opcode::Return
        )
    }

    pub fn is_spill_code(&self) -> bool {
        matches!(self.opcode, Opcode::Load(_) | Opcode::Store(_))
    }

    /// Blocks this instruction may transfer control to.
    pub fn targets(&self) -> Vec<BlockId> {
        match &self.opcode {
            Opcode::Jump(to) => vec![*to],
            Opcode::Branch(_, then, elze) => vec![*then, *elze],
            _ => vec![],
        }
    }

    /// Redirect every jump to `from` so that it goes to `to` instead.
    pub fn retarget(&mut self, from: BlockId, to: BlockId) {
        let swap = |id: &mut BlockId| {
            if *id == from {
                *id = to;
            }
        };

        match &mut self.opcode {
            Opcode::Jump(target) => swap(target),
            Opcode::Branch(_, then, elze) => {
                swap(then);
                swap(elze);
            }
            _ => {}
        }
    }

    pub fn virtual_reads(&self) -> impl Iterator<Item = Virtual> + '_ {
        self.reads.iter().filter_map(Register::as_virtual)
    }

    pub fn virtual_write(&self) -> Option<Virtual> {
        self.write.as_ref().and_then(Register::as_virtual)
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(write) = &self.write {
            write!(f, "{write} = ")?;
        }

        let operands = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            for (i, read) in self.reads.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, " {read}")?;
            }
            Ok(())
        };

        match &self.opcode {
            Opcode::Const(value) => write!(f, "const {value}"),
            Opcode::Move => {
                write!(f, "move")?;
                operands(f)
            }
            Opcode::Binary(op) => {
                write!(f, "{}", op.mnemonic())?;
                operands(f)
            }
            Opcode::Compare(cond) => {
                write!(f, "cmp {}", cond.mnemonic())?;
                operands(f)
            }
            Opcode::Local(ordinal) => write!(f, "local {ordinal}"),
            Opcode::Call(name) => write!(f, "call {name}"),
            Opcode::Jump(to) => write!(f, "jump {to}"),
            Opcode::Branch(cond, then, elze) => {
                write!(f, "branch {}", cond.mnemonic())?;
                operands(f)?;
                write!(f, " -> {then}, {elze}")
            }
            Opcode::Return => write!(f, "ret"),
            Opcode::Load(slot) => write!(f, "load {slot}"),
            Opcode::Store(slot) => {
                write!(f, "store")?;
                operands(f)?;
                write!(f, ", {slot}")
            }
        }
    }
}

use std::fmt::{self, Display};

use super::physical::REGISTER_FILE;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ValueKind {
    #[default]
    Int,
    Ref,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Ref => write!(f, "ref"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Virtual {
    pub id: usize,
    pub kind: ValueKind,
}

impl Virtual {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            kind: ValueKind::Int,
        }
    }

    pub fn with_kind(self, kind: ValueKind) -> Self {
        Self { kind, ..self }
    }
}

impl Display for Virtual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.id)
    }
}

/// One of the machine registers of [`REGISTER_FILE`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Physical(pub usize);

impl Physical {
    pub fn name(&self) -> &'static str {
        REGISTER_FILE
            .get(self.0)
            .map(|info| info.name)
            .unwrap_or("<invalid>")
    }
}

impl Display for Physical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Register {
    Virtual(Virtual),
    Physical(Physical),
}

impl Register {
    pub fn as_virtual(&self) -> Option<Virtual> {
        match self {
            Self::Virtual(reg) => Some(*reg),
            Self::Physical(_) => None,
        }
    }

    pub fn as_physical(&self) -> Option<Physical> {
        match self {
            Self::Physical(reg) => Some(*reg),
            Self::Virtual(_) => None,
        }
    }
}

impl From<Virtual> for Register {
    fn from(reg: Virtual) -> Self {
        Self::Virtual(reg)
    }
}

impl From<Physical> for Register {
    fn from(reg: Physical) -> Self {
        Self::Physical(reg)
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Virtual(reg) => write!(f, "{reg}"),
            Self::Physical(reg) => write!(f, "{reg}"),
        }
    }
}

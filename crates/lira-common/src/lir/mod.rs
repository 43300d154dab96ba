pub use block::{Block, BlockId};
pub use instruction::{BinOp, Condition, Instruction, Opcode, Slot};
pub use method::{BuildError, Method, MethodBuilder};
pub use physical::{RegisterInfo, Role, ARGUMENT_REGISTERS, MAX_ALLOCATABLE, REGISTER_FILE, WORD};
pub use pretty::Prettier;
pub use register::{Physical, Register, ValueKind, Virtual};

mod block;
mod instruction;
mod method;
mod physical;
mod pretty;
mod register;

#[cfg(test)]
mod tests;

pub mod alloc;
pub mod emit;

pub use alloc::{allocate, AllocError, Allocation, Config, Strategy};
pub use emit::emit;

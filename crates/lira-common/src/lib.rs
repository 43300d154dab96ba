pub mod bitset;
pub mod lir;
pub mod names;

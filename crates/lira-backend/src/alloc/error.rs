use lira_common::lir::{Physical, Virtual};
use thiserror::Error;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AllocError {
    #[error("liveness of `{method}` did not settle after {rounds} rounds")]
    LivenessDiverged { method: String, rounds: usize },

    #[error("allocation stalled on {vreg} at position {pos}")]
    NoProgress { vreg: Virtual, pos: usize },

    #[error("no register or spill candidate for {vreg} at position {pos}")]
    NoRegister { vreg: Virtual, pos: usize },

    #[error("{first} and {second} both occupy {reg} at position {pos}")]
    Collision {
        first: Virtual,
        second: Virtual,
        reg: Physical,
        pos: usize,
    },

    #[error("the use of {vreg} at position {pos} is not covered by any interval")]
    Uncovered { vreg: Virtual, pos: usize },
}

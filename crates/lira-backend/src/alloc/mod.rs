mod apply;
mod build;
mod check;
mod config;
mod edits;
mod error;
mod frame;
mod graph;
mod interval;
mod linear;
mod liveness;
mod naive;
mod resolve;

#[cfg(test)]
mod tests;

pub use apply::Operand;
pub use build::build_intervals;
pub use config::{Config, Strategy};
pub use edits::{Edits, Move, Place};
pub use error::AllocError;
pub use interval::{Interval, IntervalId, Intervals, Range, UseKind};
pub use liveness::{liveness, BlockLiveness, Liveness};

use std::collections::{BTreeSet, HashSet};

use lira_common::lir::{Method, Physical, Virtual, WORD};
use log::info;

use apply::apply;
use check::check;
use frame::Frame;
use graph::color;
use linear::linear_scan;
use naive::naive;
use resolve::resolve;

#[derive(Debug)]
pub struct Allocation {
    /// The method with physical registers only and spill code in place.
    pub method: Method,
    pub intervals: Intervals,

    /// Allocatable registers handed to some interval, which the prologue saves.
    pub used: BTreeSet<Physical>,
    pub spill_area: usize,
    pub frame_size: usize,
}

impl Allocation {
    /// Virtual registers that live in memory for at least part of the method.
    pub fn spilled(&self) -> BTreeSet<usize> {
        self.intervals
            .iter()
            .filter(|interval| interval.spill)
            .map(|interval| interval.vreg.id)
            .collect()
    }
}

pub fn allocate(method: &Method, config: &Config) -> Result<Allocation, AllocError> {
    info!(
        "allocating `{}` with {} and {} registers",
        method.name, config.strategy, config.registers
    );

    let liveness = liveness(method)?;
    let mut intervals = build_intervals(method, &liveness);
    let registers: Vec<Physical> = Physical::allocatable(config.registers).collect();

    let mut frame = Frame::new();
    let mut edits = Edits::new();
    let mut routed = HashSet::new();

    match config.strategy {
        Strategy::Naive => {
            routed = naive(method, &mut intervals, &registers, &mut frame, &mut edits)?;
        }

        Strategy::Linear => {
            linear_scan(&mut intervals, &registers, &mut frame)?;
            resolve(method, &liveness, &mut intervals, &mut frame, &mut edits);
        }

        Strategy::Graph => color(&mut intervals, &registers, &mut frame),
    }

    check(method, &intervals, config.strategy == Strategy::Naive)?;

    let rewritten = apply(method, &edits, |vreg, pos| {
        locate(&intervals, &routed, vreg, pos)
    })?;

    let used: BTreeSet<Physical> = intervals
        .iter()
        .filter(|interval| !interval.fixed)
        .filter_map(|interval| interval.reg)
        .collect();

    let spill_area = frame.size();
    let frame_size = WORD * used.len() + spill_area;

    info!(
        "allocated `{}`: {} registers used, {} bytes of frame",
        method.name,
        used.len(),
        frame_size
    );

    Ok(Allocation {
        method: rewritten,
        intervals,
        used,
        spill_area,
        frame_size,
    })
}

fn locate(
    intervals: &Intervals,
    routed: &HashSet<(usize, usize)>,
    vreg: Virtual,
    pos: usize,
) -> Result<Operand, AllocError> {
    let id = intervals
        .segment_at(vreg.id, pos)
        .ok_or(AllocError::Uncovered { vreg, pos })?;

    let memory = || {
        intervals
            .slot(id)
            .map(Operand::Memory)
            .ok_or(AllocError::NoRegister { vreg, pos })
    };

    if routed.contains(&(pos, vreg.id)) {
        return memory();
    }

    match intervals.get(id).reg {
        Some(reg) => Ok(Operand::Register(reg)),
        None => memory(),
    }
}

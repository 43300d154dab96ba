//! A consistency check run after every allocation: no two live values share a register, and every use has a home.

use std::collections::BTreeMap;

use lira_common::lir::{Method, Physical};
use log::trace;

use super::interval::{IntervalId, Intervals};
use super::AllocError;

/// With `shared_spills`, spilled intervals may share a register with each other, since their values live in memory
/// between uses.
pub fn check(method: &Method, intervals: &Intervals, shared_spills: bool) -> Result<(), AllocError> {
    check_coverage(method, intervals)?;
    check_collisions(intervals, shared_spills)?;

    trace!("`{}` passed the consistency check", method.name);
    Ok(())
}

fn check_coverage(method: &Method, intervals: &Intervals) -> Result<(), AllocError> {
    for (_, inst) in method.instructions() {
        let pos = inst.id;
        for vreg in inst.virtual_reads().chain(inst.virtual_write()) {
            let id = intervals
                .segment_at(vreg.id, pos)
                .ok_or(AllocError::Uncovered { vreg, pos })?;

            let interval = intervals.get(id);
            if !interval.uses.contains_key(&pos) {
                return Err(AllocError::Uncovered { vreg, pos });
            }

            if interval.reg.is_none() && intervals.slot(id).is_none() {
                return Err(AllocError::NoRegister { vreg, pos });
            }
        }
    }

    Ok(())
}

fn check_collisions(intervals: &Intervals, shared_spills: bool) -> Result<(), AllocError> {
    let mut holders: BTreeMap<Physical, Vec<IntervalId>> = BTreeMap::new();
    for interval in intervals.iter() {
        if let Some(reg) = interval.reg {
            holders.entry(reg).or_default().push(interval.id);
        }
    }

    for (reg, ids) in holders {
        for (index, a) in ids.iter().enumerate() {
            for b in ids[index + 1..].iter() {
                let (a, b) = (intervals.get(*a), intervals.get(*b));
                if a.vreg.id == b.vreg.id || (shared_spills && a.spill && b.spill) {
                    continue;
                }

                if let Some(pos) = a.next_intersection(b) {
                    return Err(AllocError::Collision {
                        first: a.vreg,
                        second: b.vreg,
                        reg,
                        pos,
                    });
                }
            }
        }
    }

    Ok(())
}

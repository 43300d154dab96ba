//! The simplest allocator that works: every virtual register keeps one register for the whole method. When the pool
//! runs dry the oldest holder shares its register with the newcomer, and both go through their stack slots around
//! every instruction touching them.

use std::collections::{HashSet, VecDeque};

use lira_common::lir::{Method, Physical};
use log::debug;

use super::edits::{Edits, Move, Place};
use super::frame::Frame;
use super::interval::{IntervalId, Intervals, Range};
use super::AllocError;

/// Allocate and plan spill code. Returns the operands, as `(position, vreg)`, that must go through a scratch
/// register because they share a register with another operand of the same instruction.
pub fn naive(
    method: &Method,
    intervals: &mut Intervals,
    registers: &[Physical],
    frame: &mut Frame,
    edits: &mut Edits,
) -> Result<HashSet<(usize, usize)>, AllocError> {
    let whole = Range::new(method.first_id(), method.last_id());
    let roots: Vec<IntervalId> = intervals
        .roots()
        .filter(|interval| !interval.fixed)
        .map(|interval| interval.id)
        .collect();

    let mut free = registers.iter().copied();
    let mut holders: VecDeque<IntervalId> = VecDeque::new();

    for id in roots {
        let vreg = intervals.get(id).vreg;
        intervals.get_mut(id).ranges = vec![whole];

        let reg = match free.next() {
            Some(reg) => reg,
            None => {
                let evicted = holders.pop_front().ok_or(AllocError::NoRegister {
                    vreg,
                    pos: whole.start,
                })?;

                let evictee = intervals.get_mut(evicted);
                evictee.spill = true;
                let reg = evictee.reg.ok_or(AllocError::NoRegister {
                    vreg,
                    pos: whole.start,
                })?;

                debug!("{vreg} shares {reg} with {}", evictee.vreg);
                intervals.ensure_slot(evicted, frame);

                intervals.get_mut(id).spill = true;
                intervals.ensure_slot(id, frame);
                reg
            }
        };

        debug!("{vreg} gets {reg}");
        intervals.get_mut(id).reg = Some(reg);
        holders.push_back(id);
    }

    Ok(plan(method, intervals, edits))
}

fn plan(method: &Method, intervals: &Intervals, edits: &mut Edits) -> HashSet<(usize, usize)> {
    let mut routed = HashSet::new();

    let spilled = |vreg: usize| {
        intervals
            .root_of(vreg)
            .map(|id| intervals.get(id))
            .filter(|interval| interval.spill && !interval.fixed)
            .and_then(|interval| Some((interval.reg?, intervals.slot(interval.id)?)))
    };

    for (_, inst) in method.instructions() {
        let pos = inst.id;
        let reads: Vec<_> = inst.virtual_reads().collect();

        if let [first, second] = reads.as_slice() {
            let reg = |vreg: usize| intervals.root_of(vreg).and_then(|id| intervals.get(id).reg);
            if first.id != second.id && reg(first.id) == reg(second.id) {
                debug!("{second} goes through scratch at {pos}");
                routed.insert((pos, second.id));
            }
        }

        for vreg in reads.iter() {
            if routed.contains(&(pos, vreg.id)) {
                continue;
            }

            if let Some((into, slot)) = spilled(vreg.id) {
                edits.add(Place::Before(pos), Move::Load { into, slot });
            }
        }

        if let Some(vreg) = inst.virtual_write() {
            if routed.contains(&(pos, vreg.id)) {
                continue;
            }

            if let Some((from, slot)) = spilled(vreg.id) {
                edits.add(Place::After(pos), Move::Store { from, slot });
            }
        }
    }

    routed
}

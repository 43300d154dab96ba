use std::collections::HashMap;

use lira_common::lir::{Method, Opcode, Slot, ARGUMENT_REGISTERS, WORD};
use log::debug;

use super::interval::{Intervals, UseKind};
use super::liveness::Liveness;

/// Offset from the frame pointer of the first parameter passed on the stack, past the saved frame pointer and the
/// return address.
const PARAMETER_BASE: usize = 2 * WORD;

/// Build the root interval of every virtual register, walking blocks and instructions backwards.
pub fn build_intervals(method: &Method, liveness: &Liveness) -> Intervals {
    let mut intervals = Intervals::new();
    let virtuals = method.virtuals();

    // Registers whose every definition is a stack-passed parameter live in the caller's frame already.
    let mut homes: HashMap<usize, Option<Slot>> = HashMap::new();

    for block in method.blocks.iter().rev() {
        let (from, to) = (block.first_id(), block.last_id());

        for vreg in liveness.live_out(&block.id).iter() {
            intervals.root_mut(virtuals[&vreg]).add_range(from, to);
        }

        for inst in block.insts.iter().rev() {
            if let Some(vreg) = inst.virtual_write() {
                let interval = intervals.root_mut(vreg);
                interval.shorten_to(inst.id);
                interval.add_use(inst.id, UseKind::Write);

                let home = match inst.opcode {
                    Opcode::Local(ordinal) if ordinal >= ARGUMENT_REGISTERS => Some(Slot::Frame(
                        PARAMETER_BASE + WORD * (ordinal - ARGUMENT_REGISTERS),
                    )),
                    _ => None,
                };

                homes
                    .entry(vreg.id)
                    .and_modify(|existing| {
                        if *existing != home {
                            *existing = None;
                        }
                    })
                    .or_insert(home);
            }

            for vreg in inst.virtual_reads() {
                let interval = intervals.root_mut(vreg);
                interval.add_range(from, inst.id);
                interval.add_use(inst.id, UseKind::Read);
            }
        }
    }

    for (vreg, home) in homes {
        if let (Some(home), Some(id)) = (home, intervals.root_of(vreg)) {
            intervals.get_mut(id).slot = Some(home);
        }
    }

    for (vreg, reg) in method.fixed.iter() {
        if let Some(id) = intervals.root_of(*vreg) {
            let interval = intervals.get_mut(id);
            interval.fixed = true;
            interval.reg = Some(*reg);
        }
    }

    debug!(
        "built {} intervals for `{}`",
        intervals.len(),
        method.name
    );

    intervals
}

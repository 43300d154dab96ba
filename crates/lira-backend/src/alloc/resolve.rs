//! Spill code for split intervals: stores behind definitions, reloads at split points and moves across control-flow
//! edges whose ends disagree on where a value lives.
//!
//! A value always travels through its stack slot. Segments that precede another segment of the same register are
//! spilled, so their slot is kept current by a store behind every write; the last segment stores on the edges that
//! lead back into an earlier segment.

use lira_common::lir::{BlockId, Method};
use log::{debug, trace};

use super::edits::{Edits, Move, Place};
use super::frame::Frame;
use super::interval::{Intervals, UseKind};
use super::liveness::Liveness;

pub fn resolve(
    method: &Method,
    liveness: &Liveness,
    intervals: &mut Intervals,
    frame: &mut Frame,
    edits: &mut Edits,
) {
    let before = edits.len();

    store_definitions(intervals, edits);
    reload_splits(method, intervals, edits);
    resolve_edges(method, liveness, intervals, frame, edits);

    debug!(
        "resolution of `{}` planned {} moves",
        method.name,
        edits.len() - before
    );
}

fn store_definitions(intervals: &Intervals, edits: &mut Edits) {
    for interval in intervals.iter() {
        let (reg, slot) = match (interval.reg, intervals.slot(interval.id)) {
            (Some(reg), Some(slot)) if interval.spill && !interval.fixed => (reg, slot),
            _ => continue,
        };

        for (at, kind) in interval.uses.iter() {
            if kind.writes() {
                edits.add(Place::After(*at), Move::Store { from: reg, slot });
            }
        }
    }
}

/// Reload segments that start in the middle of a block. Segments starting at a block boundary are taken care of by
/// the edges into the block.
fn reload_splits(method: &Method, intervals: &Intervals, edits: &mut Edits) {
    for root in intervals.roots() {
        for child in root.children.iter() {
            let interval = intervals.get(*child);
            let (into, slot) = match (interval.reg, intervals.slot(*child)) {
                (Some(reg), Some(slot)) => (reg, slot),
                _ => continue,
            };

            let start = interval.start();
            let block = match method.block_at(start) {
                Some(id) => method.get(&id),
                None => continue,
            };

            if block.first_id() == start {
                continue;
            }

            let place = match interval.first_use() {
                Some((at, UseKind::Write)) if block.contains(at) => None,
                Some((at, _)) if block.contains(at) => Some(Place::Before(at)),
                _ => Some(Place::Before(start)),
            };

            if let Some(place) = place {
                trace!("reload {} into {into} at {place:?}", interval.vreg);
                edits.add(place, Move::Load { into, slot });
            }
        }
    }
}

fn resolve_edges(
    method: &Method,
    liveness: &Liveness,
    intervals: &mut Intervals,
    frame: &mut Frame,
    edits: &mut Edits,
) {
    for pred in method.blocks.iter() {
        for succ in pred.succs.iter() {
            let succ = method.get(succ);

            for vreg in liveness.live_in(&succ.id).iter() {
                let from = intervals.segment_at(vreg, pred.last_id());
                let to = intervals.segment_at(vreg, succ.first_id());

                let (from, to) = match (from, to) {
                    (Some(from), Some(to)) if from != to => (from, to),
                    _ => continue,
                };

                let slot = intervals.ensure_slot(from, frame);
                let (source, target) = (intervals.get(from), intervals.get(to));

                if let (Some(reg), false) = (source.reg, source.spill) {
                    edits.add(Place::BlockEnd(pred.id), Move::Store { from: reg, slot });
                }

                let into = match target.reg {
                    Some(reg) => reg,
                    None => continue,
                };

                let written = target
                    .next_use(succ.first_id())
                    .filter(|at| succ.contains(*at))
                    .and_then(|at| target.uses.get(&at))
                    .map(|kind| *kind == UseKind::Write)
                    .unwrap_or(false);

                if written {
                    continue;
                }

                let place = place_on_edge(method, pred.id, succ.id);
                trace!("{} moves from {from} to {to} at {place:?}", source.vreg);
                edits.add(place, Move::Load { into, slot });
            }
        }
    }
}

/// Where code that must run only when control passes along `pred -> succ` goes.
fn place_on_edge(method: &Method, pred: BlockId, succ: BlockId) -> Place {
    let (from, to) = (method.get(&pred), method.get(&succ));

    if to.preds.len() == 1 && succ != method.entry() {
        Place::BlockStart(succ)
    } else if from.succs.len() == 1
        && from
            .terminator()
            .map(|term| term.reads.is_empty())
            .unwrap_or(true)
    {
        Place::BlockEnd(pred)
    } else {
        Place::Edge(pred, succ)
    }
}

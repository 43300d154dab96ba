//! Chaitin-style graph coloring with optimistic selection.

mod interfere;

pub use interfere::{interference, Interference};

use std::collections::{BTreeSet, HashMap};

use lira_common::lir::Physical;
use log::{debug, trace};

use super::frame::Frame;
use super::interval::{IntervalId, Intervals};

pub fn color(intervals: &mut Intervals, registers: &[Physical], frame: &mut Frame) {
    let interference = interference(intervals);
    let stack = simplify(intervals, &interference, registers.len());

    for id in stack.into_iter().rev() {
        let taken: BTreeSet<Physical> = interference
            .neighbors(&id)
            .filter_map(|other| intervals.get(*other).reg)
            .collect();

        let interval = intervals.get_mut(id);
        match registers.iter().find(|reg| !taken.contains(*reg)) {
            Some(reg) => {
                trace!("{} is colored {reg}", interval.vreg);
                interval.reg = Some(*reg);
            }

            None => {
                debug!("{} could not be colored", interval.vreg);
                interval.spill = true;
                intervals.ensure_slot(id, frame);
            }
        }
    }
}

/// Remove nodes of insignificant degree one at a time, and the cheapest one to spill whenever every node left is
/// significant. The removal order, reversed, is the coloring order.
fn simplify(intervals: &Intervals, interference: &Interference, k: usize) -> Vec<IntervalId> {
    let mut left: BTreeSet<IntervalId> = interference.graph.keys().copied().collect();
    let mut degree: HashMap<IntervalId, usize> = left
        .iter()
        .map(|id| (*id, interference.degree(id)))
        .collect();

    let mut stack = Vec::with_capacity(left.len());

    while !left.is_empty() {
        let pick = left
            .iter()
            .copied()
            .find(|id| degree[id] < k)
            .or_else(|| cheapest(intervals, &left, &degree));

        let pick = match pick {
            Some(pick) => pick,
            None => break,
        };

        if degree[&pick] >= k {
            debug!("{} may have to be spilled", intervals.get(pick).vreg);
        }

        left.remove(&pick);
        for other in interference.neighbors(&pick) {
            if left.contains(other) {
                if let Some(count) = degree.get_mut(other) {
                    *count -= 1;
                }
            }
        }

        stack.push(pick);
    }

    stack
}

/// The node with the fewest uses per neighbor.
fn cheapest(
    intervals: &Intervals,
    left: &BTreeSet<IntervalId>,
    degree: &HashMap<IntervalId, usize>,
) -> Option<IntervalId> {
    let cost = |id: &IntervalId| (intervals.get(*id).uses.len(), degree[id].max(1));

    left.iter().copied().reduce(|best, id| {
        let (best_uses, best_degree) = cost(&best);
        let (uses, degree) = cost(&id);

        if uses * best_degree < best_uses * degree {
            id
        } else {
            best
        }
    })
}

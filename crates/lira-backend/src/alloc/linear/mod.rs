//! Linear-scan allocation over lifetime intervals with splitting, after Wimmer and Mössenböck.

mod blocked;
mod free;

use std::collections::BTreeSet;

use lira_common::lir::Physical;
use log::{debug, trace};

use super::frame::Frame;
use super::interval::{IntervalId, Intervals};
use super::AllocError;

pub fn linear_scan(
    intervals: &mut Intervals,
    registers: &[Physical],
    frame: &mut Frame,
) -> Result<(), AllocError> {
    let scan = Scan::new(intervals, registers, frame);
    scan.run()
}

struct Scan<'a> {
    intervals: &'a mut Intervals,
    registers: &'a [Physical],
    frame: &'a mut Frame,

    unhandled: BTreeSet<(usize, IntervalId)>,
    active: Vec<IntervalId>,
    inactive: Vec<IntervalId>,

    /// Every interval ever given a register, per register.
    assigned: Vec<Vec<IntervalId>>,
}

impl<'a> Scan<'a> {
    pub fn new(intervals: &'a mut Intervals, registers: &'a [Physical], frame: &'a mut Frame) -> Self {
        let unhandled = intervals
            .iter()
            .filter(|interval| !interval.fixed && !interval.ranges.is_empty())
            .map(|interval| (interval.start(), interval.id))
            .collect();

        Self {
            intervals,
            registers,
            frame,
            unhandled,
            active: Vec::new(),
            inactive: Vec::new(),
            assigned: vec![Vec::new(); registers.len()],
        }
    }

    pub fn run(mut self) -> Result<(), AllocError> {
        let positions = self.intervals.iter().map(|i| i.stop() + 1).max().unwrap_or(0);
        let limit = 4 * (self.intervals.len() + 1) * (positions + 1);
        let mut steps = 0;

        while let Some((pos, current)) = self.unhandled.pop_first() {
            steps += 1;
            if steps > limit {
                return Err(AllocError::NoProgress {
                    vreg: self.intervals.get(current).vreg,
                    pos,
                });
            }

            trace!("at {pos}: {}", self.intervals.get(current));

            self.advance(pos);

            if !self.try_allocate_free(current, pos) {
                self.allocate_blocked(current, pos);
            }

            if let Some(reg) = self.intervals.get(current).reg {
                self.active.push(current);
                if let Some(index) = self.index_of(reg) {
                    self.assigned[index].push(current);
                }
            }
        }

        self.spill_early_segments();

        for (reg, held) in self.registers.iter().zip(self.assigned.iter()) {
            trace!("{reg} was assigned {} times", held.len());
        }

        debug!("linear scan finished after {steps} steps");
        Ok(())
    }

    /// Retire intervals that ended before `pos` and move the rest between active and inactive.
    fn advance(&mut self, pos: usize) {
        let intervals = &*self.intervals;
        let mut active = Vec::with_capacity(self.active.len());
        let mut inactive = Vec::with_capacity(self.inactive.len());

        for id in self.active.drain(..).chain(self.inactive.drain(..)) {
            let interval = intervals.get(id);
            if interval.stop() < pos {
                continue;
            } else if interval.covers(pos) {
                active.push(id);
            } else {
                inactive.push(id);
            }
        }

        self.active = active;
        self.inactive = inactive;
    }

    /// A tail split off a segment that already had a successor can end up with a register of its own. Resolution only
    /// stores from spilled segments, so every segment but the last of its register has to be spilled.
    fn spill_early_segments(&mut self) {
        let vregs: Vec<usize> = self
            .intervals
            .roots()
            .filter(|root| !root.fixed)
            .map(|root| root.vreg.id)
            .collect();

        for vreg in vregs {
            let segments = self.intervals.segments(vreg);
            let early = match segments.split_last() {
                Some((_, early)) => early,
                None => continue,
            };

            for id in early.iter().copied() {
                if self.intervals.get(id).spill {
                    continue;
                }

                trace!("{} is followed by another segment, spilling it", self.intervals.get(id));
                self.intervals.get_mut(id).spill = true;
                self.intervals.ensure_slot(id, self.frame);
            }
        }
    }

    fn enqueue(&mut self, id: IntervalId) {
        let start = self.intervals.get(id).start();
        self.unhandled.insert((start, id));
    }

    fn index_of(&self, reg: Physical) -> Option<usize> {
        self.registers.iter().position(|other| *other == reg)
    }

    /// The register with the greatest score, preferring the lowest index on ties.
    fn best(&self, scores: &[usize]) -> Option<(Physical, usize)> {
        let mut best: Option<(Physical, usize)> = None;
        for (reg, score) in self.registers.iter().zip(scores.iter()) {
            match best {
                Some((_, other)) if other >= *score => {}
                _ => best = Some((*reg, *score)),
            }
        }

        best
    }
}

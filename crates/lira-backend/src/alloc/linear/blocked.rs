use log::debug;

use super::Scan;
use crate::alloc::interval::IntervalId;

impl Scan<'_> {
    /// Every register is taken at `pos`. Either spill `current` until its next use, or take the register whose
    /// holders are needed furthest away and spill them instead.
    pub fn allocate_blocked(&mut self, current: IntervalId, pos: usize) {
        let mut next_use = vec![usize::MAX; self.registers.len()];
        let interval = self.intervals.get(current);

        for id in self.active.iter() {
            let other = self.intervals.get(*id);
            if let Some(index) = other.reg.and_then(|reg| self.index_of(reg)) {
                let at = other.next_use(pos).unwrap_or(usize::MAX);
                next_use[index] = next_use[index].min(at);
            }
        }

        for id in self.inactive.iter() {
            let other = self.intervals.get(*id);
            if !other.intersects(interval) {
                continue;
            }

            if let Some(index) = other.reg.and_then(|reg| self.index_of(reg)) {
                let at = other.next_use(pos).unwrap_or(usize::MAX);
                next_use[index] = next_use[index].min(at);
            }
        }

        let first = match interval.next_use(pos) {
            Some(first) => first,
            None => {
                debug!("{} is never used, keeping it in memory", interval.vreg);
                self.to_memory(current);
                return;
            }
        };

        let (reg, furthest) = match self.best(&next_use) {
            Some(best) => best,
            None => {
                self.to_memory(current);
                return;
            }
        };

        if furthest <= first {
            // Everything else is needed sooner: keep `current` in memory up to its next use.
            debug!("{} waits in memory until {first}", interval.vreg);

            let at = if first > pos { first } else { first + 1 };
            let tail = self.intervals.split(current, at);
            self.to_memory(current);

            if let Some(tail) = tail {
                self.enqueue(tail);
            }

            return;
        }

        debug!("{} takes {reg} at {pos}", interval.vreg);
        self.intervals.get_mut(current).reg = Some(reg);

        let holders: Vec<IntervalId> = self
            .active
            .iter()
            .chain(self.inactive.iter())
            .copied()
            .filter(|id| {
                let other = self.intervals.get(*id);
                other.reg == Some(reg) && other.intersects(self.intervals.get(current))
            })
            .collect();

        for holder in holders {
            self.active.retain(|id| *id != holder);
            self.inactive.retain(|id| *id != holder);

            if self.intervals.get(holder).start() >= pos {
                debug!("{} gives up {reg}", self.intervals.get(holder).vreg);
                self.intervals.get_mut(holder).reg = None;
                self.enqueue(holder);
                continue;
            }

            let tail = self.intervals.split(holder, pos);
            self.intervals.get_mut(holder).spill = true;
            self.intervals.ensure_slot(holder, self.frame);

            debug!(
                "{} keeps {reg} until {pos} and is spilled",
                self.intervals.get(holder).vreg
            );

            if let Some(tail) = tail {
                self.enqueue(tail);
            }
        }
    }

    fn to_memory(&mut self, id: IntervalId) {
        let interval = self.intervals.get_mut(id);
        interval.reg = None;
        interval.spill = true;
        self.intervals.ensure_slot(id, self.frame);
    }
}

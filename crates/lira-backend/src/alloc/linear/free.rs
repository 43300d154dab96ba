use log::debug;

use super::Scan;
use crate::alloc::interval::IntervalId;

impl Scan<'_> {
    /// Give `current` a register that is free for at least a prefix of it. Returns `false` if every register is
    /// taken at `pos`.
    pub fn try_allocate_free(&mut self, current: IntervalId, pos: usize) -> bool {
        let mut free_until = vec![usize::MAX; self.registers.len()];

        for id in self.active.iter() {
            if let Some(index) = self.intervals.get(*id).reg.and_then(|reg| self.index_of(reg)) {
                free_until[index] = 0;
            }
        }

        let interval = self.intervals.get(current);
        for id in self.inactive.iter() {
            let other = self.intervals.get(*id);
            let index = match other.reg.and_then(|reg| self.index_of(reg)) {
                Some(index) => index,
                None => continue,
            };

            if let Some(at) = other.next_intersection(interval) {
                free_until[index] = free_until[index].min(at);
            }
        }

        let (reg, until) = match self.best(&free_until) {
            Some(best) => best,
            None => return false,
        };

        if until <= pos {
            return false;
        }

        if until > interval.stop() {
            debug!("{} gets {reg}", interval.vreg);
            self.intervals.get_mut(current).reg = Some(reg);
            return true;
        }

        // Free for a prefix only: keep the register up to `until` and go around again for the rest.
        debug!(
            "{} gets {reg} until {until}",
            self.intervals.get(current).vreg
        );

        let tail = self.intervals.split(current, until);
        let interval = self.intervals.get_mut(current);
        interval.reg = Some(reg);
        interval.spill = true;
        self.intervals.ensure_slot(current, self.frame);

        if let Some(tail) = tail {
            self.enqueue(tail);
        }

        true
    }
}

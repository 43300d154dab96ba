use lira_common::lir::{Slot, WORD};

/// Hands out the spill slots of one method.
#[derive(Debug, Default)]
pub struct Frame {
    next: usize,
}

impl Frame {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn fresh(&mut self) -> Slot {
        let slot = Slot::Stack(self.next);
        self.next += WORD;
        slot
    }

    /// Bytes of spill area handed out so far.
    pub fn size(&self) -> usize {
        self.next
    }
}

//! Global liveness of virtual registers, as per-block bit-sets.

use lira_common::bitset::BitSet;
use lira_common::lir::{BlockId, Method};
use log::{debug, trace, warn};

use super::AllocError;

#[derive(Clone, Debug, Default)]
pub struct BlockLiveness {
    /// Read before any write in the block.
    pub live_use: BitSet,

    /// Written in the block.
    pub live_def: BitSet,

    pub live_in: BitSet,
    pub live_out: BitSet,
}

#[derive(Clone, Debug)]
pub struct Liveness {
    blocks: Vec<BlockLiveness>,

    /// Rounds the fixed point took.
    pub rounds: usize,
}

impl Liveness {
    pub fn get(&self, id: &BlockId) -> &BlockLiveness {
        &self.blocks[id.0]
    }

    pub fn live_in(&self, id: &BlockId) -> &BitSet {
        &self.get(id).live_in
    }

    pub fn live_out(&self, id: &BlockId) -> &BitSet {
        &self.get(id).live_out
    }
}

pub fn liveness(method: &Method) -> Result<Liveness, AllocError> {
    let vregs = method.virtual_count();
    let mut blocks: Vec<BlockLiveness> = method
        .blocks
        .iter()
        .map(|block| {
            let mut local = BlockLiveness {
                live_use: BitSet::with_capacity(vregs),
                live_def: BitSet::with_capacity(vregs),
                live_in: BitSet::with_capacity(vregs),
                live_out: BitSet::with_capacity(vregs),
            };

            for inst in block.insts.iter() {
                for reg in inst.virtual_reads() {
                    if !local.live_def.contains(reg.id) {
                        local.live_use.insert(reg.id);
                    }
                }

                if let Some(reg) = inst.virtual_write() {
                    local.live_def.insert(reg.id);
                }
            }

            local
        })
        .collect();

    let limit = method.blocks.len() * (vregs + 1) + 2;
    let mut rounds = 0;

    loop {
        rounds += 1;
        if rounds > limit {
            return Err(AllocError::LivenessDiverged {
                method: method.name.clone(),
                rounds: limit,
            });
        }

        let mut changed = false;

        for block in method.blocks.iter().rev() {
            let mut live_out = BitSet::with_capacity(vregs);
            for succ in block.succs.iter() {
                live_out.union_with(&blocks[succ.0].live_in);
            }

            let mut live_in = live_out.clone();
            live_in.difference_with(&blocks[block.id.0].live_def);
            live_in.union_with(&blocks[block.id.0].live_use);

            let this = &mut blocks[block.id.0];
            if !live_out.same_as(&this.live_out) || !live_in.same_as(&this.live_in) {
                changed = true;
                this.live_out = live_out;
                this.live_in = live_in;
            }
        }

        trace!("liveness round {rounds}, changed: {changed}");

        if !changed {
            break;
        }
    }

    for vreg in blocks[method.entry().0].live_in.iter() {
        if !method.fixed.contains_key(&vreg) {
            warn!("v{vreg} may be read before it is written in `{}`", method.name);
        }
    }

    debug!("liveness of `{}` settled in {rounds} rounds", method.name);

    Ok(Liveness { blocks, rounds })
}

use lira_common::lir::{Instruction, Method, Physical, Register, Slot, Virtual};
use log::trace;

use super::edits::{Edits, Move, Place};
use super::AllocError;

/// Where a virtual register lives at one instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operand {
    Register(Physical),

    /// Only in memory; the instruction goes through a scratch register.
    Memory(Slot),
}

/// Insert the planned spill code and replace every virtual operand by its location.
pub fn apply(
    method: &Method,
    edits: &Edits,
    locate: impl Fn(Virtual, usize) -> Result<Operand, AllocError>,
) -> Result<Method, AllocError> {
    let mut method = method.clone();

    for block in method.blocks.iter_mut() {
        let old = std::mem::take(&mut block.insts);
        let mut insts = Vec::with_capacity(old.len() * 2);
        let (first, last) = match (old.first(), old.last()) {
            (Some(first), Some(last)) => (first.id, last.id),
            _ => continue,
        };

        moves(&mut insts, edits.at(Place::BlockStart(block.id)), first);

        for inst in old {
            let pos = inst.id;
            moves(&mut insts, edits.at(Place::Before(pos)), pos);

            let (inst, before, after) = rewrite(inst, &locate)?;
            insts.extend(before);

            if inst.is_terminator() {
                moves(&mut insts, edits.at(Place::BlockEnd(block.id)), pos);
                insts.push(inst);
                continue;
            }

            insts.push(inst);
            insts.extend(after);
            moves(&mut insts, edits.at(Place::After(pos)), pos);

            if pos == last {
                moves(&mut insts, edits.at(Place::BlockEnd(block.id)), pos);
            }
        }

        block.insts = insts;
    }

    for (from, to) in edits.edges() {
        let anchor = method.get(&from).last_id();
        let mut insts = Vec::new();
        moves(&mut insts, edits.at(Place::Edge(from, to)), anchor);

        let id = method.split_edge(from, to, insts);
        trace!("split edge {from} -> {to} with {id}");
    }

    Ok(method)
}

fn moves(insts: &mut Vec<Instruction>, moves: impl Iterator<Item = Move>, anchor: usize) {
    insts.extend(moves.map(|mov| match mov {
        Move::Store { from, slot } => Instruction::store(anchor, slot, from),
        Move::Load { into, slot } => Instruction::load(anchor, slot, into),
    }));
}

/// Rewrite the operands of one instruction, returning the reloads to put before it and the stores to put after it.
fn rewrite(
    mut inst: Instruction,
    locate: &impl Fn(Virtual, usize) -> Result<Operand, AllocError>,
) -> Result<(Instruction, Vec<Instruction>, Vec<Instruction>), AllocError> {
    let pos = inst.id;
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut scratch: Vec<(Virtual, Physical)> = Vec::new();

    for (index, read) in inst.reads.iter_mut().enumerate() {
        let vreg = match read.as_virtual() {
            Some(vreg) => vreg,
            None => continue,
        };

        let reg = match locate(vreg, pos)? {
            Operand::Register(reg) => reg,
            Operand::Memory(slot) => match scratch.iter().find(|(other, _)| *other == vreg) {
                Some((_, reg)) => *reg,
                None => {
                    let reg = Physical::SCRATCH[index.min(1)];
                    before.push(Instruction::load(pos, slot, reg));
                    scratch.push((vreg, reg));
                    reg
                }
            },
        };

        *read = Register::Physical(reg);
    }

    if let Some(vreg) = inst.virtual_write() {
        let reg = match locate(vreg, pos)? {
            Operand::Register(reg) => reg,
            Operand::Memory(slot) => {
                let reg = Physical::SCRATCH[0];
                after.push(Instruction::store(pos, slot, reg));
                reg
            }
        };

        inst.write = Some(Register::Physical(reg));
    }

    Ok((inst, before, after))
}

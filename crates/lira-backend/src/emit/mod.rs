//! Assembly text for allocated methods.

#[cfg(test)]
mod tests;

use lira_common::lir::{Block, BlockId, Instruction, Opcode, Physical, Register, ARGUMENT_REGISTERS, WORD};
use log::trace;

use crate::alloc::Allocation;

/// Offset from the frame pointer of the first stack-passed parameter.
const PARAMETER_BASE: usize = 2 * WORD;

pub fn emit(allocation: &Allocation) -> String {
    let mut emitter = Emitter::new(allocation);
    emitter.emit_method();
    emitter.build()
}

struct Emitter<'a> {
    allocation: &'a Allocation,
    res: String,
}

impl<'a> Emitter<'a> {
    pub fn new(allocation: &'a Allocation) -> Self {
        Self {
            allocation,
            res: String::new(),
        }
    }

    pub fn build(self) -> String {
        self.res
    }

    pub fn emit_method(&mut self) {
        let allocation = self.allocation;
        let method = &allocation.method;
        trace!("emitting `{}`", method.name);

        self.res.push_str(&format!("{}:\n", method.name));
        self.line("push fp");
        self.line("mov fp, sp");

        for reg in allocation.used.iter() {
            self.line(&format!("push {reg}"));
        }

        if allocation.spill_area > 0 {
            self.line(&format!("sub sp, {}", allocation.spill_area));
        }

        for block in method.blocks.iter() {
            self.emit_block(block);
        }
    }

    fn emit_block(&mut self, block: &Block) {
        self.res.push_str(&format!("{}:\n", self.label(&block.id)));

        for inst in block.insts.iter() {
            self.emit_instruction(inst);
        }

        // Falling off the last block returns.
        if block.terminator().is_none() && block.succs.is_empty() {
            self.epilogue();
            self.line("ret");
        }
    }

    fn emit_instruction(&mut self, inst: &Instruction) {
        let write = inst.write.map(|reg| reg.to_string()).unwrap_or_default();
        let reads: Vec<String> = inst.reads.iter().map(Register::to_string).collect();

        let line = match &inst.opcode {
            Opcode::Const(value) => format!("mov {write}, {value}"),
            Opcode::Move => format!("mov {write}, {}", reads.join(", ")),
            Opcode::Binary(op) => format!("{} {write}, {}", op.mnemonic(), reads.join(", ")),
            Opcode::Compare(cond) => {
                format!("set{} {write}, {}", cond.mnemonic(), reads.join(", "))
            }

            Opcode::Local(ordinal) => match Physical::argument(*ordinal) {
                Some(reg) => format!("mov {write}, {reg}"),
                None => format!(
                    "load {write}, [fp+{}]",
                    PARAMETER_BASE + WORD * (ordinal - ARGUMENT_REGISTERS)
                ),
            },

            Opcode::Call(name) => format!("call {name}"),
            Opcode::Jump(to) => format!("jmp {}", self.label(to)),

            Opcode::Branch(cond, then, elze) => {
                self.line(&format!(
                    "b{} {}, {}",
                    cond.mnemonic(),
                    reads.join(", "),
                    self.label(then)
                ));
                format!("jmp {}", self.label(elze))
            }

            Opcode::Return => {
                self.epilogue();
                "ret".into()
            }

            Opcode::Load(slot) => format!("load {write}, {slot}"),
            Opcode::Store(slot) => format!("store {}, {slot}", reads.join(", ")),
        };

        self.line(&line);
    }

    fn epilogue(&mut self) {
        let allocation = self.allocation;
        if allocation.spill_area > 0 {
            self.line(&format!("add sp, {}", allocation.spill_area));
        }

        for reg in allocation.used.iter().rev() {
            self.line(&format!("pop {reg}"));
        }

        self.line("pop fp");
    }

    fn line(&mut self, line: &str) {
        self.res.push_str(&format!("    {line}\n"));
    }

    fn label(&self, id: &BlockId) -> String {
        let method = &self.allocation.method;
        format!(".{}.{}", method.name, method.names.label_or_id(id))
    }
}

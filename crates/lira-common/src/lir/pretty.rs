use pretty::{Arena, DocAllocator, DocBuilder};

use super::{Block, BlockId, Instruction, Method, Opcode};

/// Renders methods back into the textual LIR format.
pub struct Prettier<'a> {
    method: &'a Method,
    allocator: Arena<'a>,
    width: usize,
}

impl<'a> Prettier<'a> {
    pub fn new(method: &'a Method) -> Self {
        Self {
            method,
            allocator: Arena::new(),
            width: 80,
        }
    }

    pub fn with_width(self, width: usize) -> Self {
        Self { width, ..self }
    }

    #[must_use]
    pub fn pretty_method(&'a self) -> String {
        let doc = self.doc_method();
        let mut res = Vec::new();
        doc.render(self.width, &mut res).unwrap();
        String::from_utf8(res).unwrap()
    }

    #[must_use]
    pub fn pretty_instruction(&'a self, inst: &Instruction) -> String {
        let doc = self.doc_instruction(inst);
        let mut res = Vec::new();
        doc.render(self.width, &mut res).unwrap();
        String::from_utf8(res).unwrap()
    }

    fn doc_method(&'a self) -> DocBuilder<'a, Arena<'a>> {
        let fixed = self.method.fixed.iter().map(|(vreg, reg)| {
            self.allocator
                .hardline()
                .append(self.allocator.text(format!("fixed v{vreg} = {reg}")))
        });

        let header = self
            .allocator
            .text(format!("method {} {{", self.method.name))
            .append(self.allocator.concat(fixed).nest(2));

        let blocks = self
            .allocator
            .concat(self.method.blocks.iter().map(|block| self.doc_block(block)));

        header
            .append(blocks)
            .append(self.allocator.hardline())
            .append(self.allocator.text("}"))
    }

    fn doc_block(&'a self, block: &Block) -> DocBuilder<'a, Arena<'a>> {
        let insts = self.allocator.concat(block.insts.iter().map(|inst| {
            self.allocator
                .hardline()
                .append(self.doc_instruction(inst))
        }));

        self.allocator
            .hardline()
            .append(self.allocator.text(format!("{}:", self.label(&block.id))))
            .append(insts.nest(2))
    }

    fn doc_instruction(&'a self, inst: &Instruction) -> DocBuilder<'a, Arena<'a>> {
        match &inst.opcode {
            Opcode::Jump(to) => self.allocator.text(format!("jump {}", self.label(to))),
            Opcode::Branch(cond, then, elze) => {
                let operands = inst
                    .reads
                    .iter()
                    .map(|reg| reg.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");

                self.allocator.text(format!(
                    "branch {} {operands} -> {}, {}",
                    cond.mnemonic(),
                    self.label(then),
                    self.label(elze)
                ))
            }
            _ => self.allocator.text(inst.to_string()),
        }
    }

    fn label(&self, id: &BlockId) -> String {
        self.method.names.label_or_id(id)
    }
}

use std::collections::{BTreeMap, HashMap};

use log::trace;
use thiserror::Error;

use super::physical::Role;
use super::{Block, BlockId, Instruction, Opcode, Physical, Register, ValueKind, Virtual};
use crate::names::Names;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum BuildError {
    #[error("method `{0}` has no blocks")]
    NoBlocks(String),

    #[error("block `{0}` has no instructions")]
    EmptyBlock(String),

    #[error("block `{0}` is referenced but never defined")]
    UndefinedLabel(String),

    #[error("block `{0}` is defined more than once")]
    DuplicateLabel(String),

    #[error("instruction {id} does not follow instruction {previous}")]
    NonAscending { id: usize, previous: usize },

    #[error("instruction {id} reads {count} registers, at most 2 are supported")]
    TooManyReads { id: usize, count: usize },

    #[error("instruction {0} transfers control but is not the last of its block")]
    MisplacedTerminator(usize),

    #[error("{vreg} cannot be pre-colored to {reg}, which is not an argument register")]
    InvalidPrecolor { vreg: Virtual, reg: Physical },

    #[error("v{0} is used both as `int` and as `ref`")]
    ConflictingKinds(usize),
}

/// A method: a control-flow graph of basic blocks, in program order.
///
/// `blocks[i].id == BlockId(i)` and the first block is the entry. Instruction ids ascend strictly across the whole
/// method and form the coordinate space of liveness and lifetime intervals.
#[derive(Clone, Debug)]
pub struct Method {
    pub name: String,
    pub blocks: Vec<Block>,

    /// Virtual registers pre-colored by the front end.
    pub fixed: BTreeMap<usize, Physical>,
    pub names: Names,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        names: Names,
        blocks: Vec<Vec<Instruction>>,
        fixed: BTreeMap<usize, Physical>,
    ) -> Result<Self, BuildError> {
        let name = name.into();
        if blocks.is_empty() {
            return Err(BuildError::NoBlocks(name));
        }

        let mut previous: Option<usize> = None;
        let mut kinds: HashMap<usize, ValueKind> = HashMap::new();

        for (index, insts) in blocks.iter().enumerate() {
            if insts.is_empty() {
                return Err(BuildError::EmptyBlock(names.label_or_id(&BlockId(index))));
            }

            for (at, inst) in insts.iter().enumerate() {
                if let Some(previous) = previous {
                    if inst.id <= previous {
                        return Err(BuildError::NonAscending {
                            id: inst.id,
                            previous,
                        });
                    }
                }
                previous = Some(inst.id);

                if inst.reads.len() > 2 {
                    return Err(BuildError::TooManyReads {
                        id: inst.id,
                        count: inst.reads.len(),
                    });
                }

                if inst.is_terminator() && at + 1 != insts.len() {
                    return Err(BuildError::MisplacedTerminator(inst.id));
                }

                for target in inst.targets() {
                    if target.0 >= blocks.len() {
                        return Err(BuildError::UndefinedLabel(names.label_or_id(&target)));
                    }
                }

                for reg in inst.virtual_reads().chain(inst.virtual_write()) {
                    match kinds.insert(reg.id, reg.kind) {
                        Some(kind) if kind != reg.kind => {
                            return Err(BuildError::ConflictingKinds(reg.id))
                        }
                        _ => {}
                    }
                }
            }
        }

        for (vreg, reg) in fixed.iter() {
            if reg.role() != Some(Role::Argument) {
                return Err(BuildError::InvalidPrecolor {
                    vreg: Virtual::new(*vreg),
                    reg: *reg,
                });
            }
        }

        let mut blocks: Vec<Block> = blocks
            .into_iter()
            .enumerate()
            .map(|(index, insts)| Block {
                id: BlockId(index),
                insts,
                preds: Vec::new(),
                succs: Vec::new(),
            })
            .collect();

        let count = blocks.len();
        for index in 0..count {
            let block = &mut blocks[index];
            let mut succs = match block.terminator() {
                Some(term) => term.targets(),
                None if index + 1 < count => vec![BlockId(index + 1)],
                None => vec![],
            };
            succs.dedup();
            block.succs = succs;
        }

        for index in 0..count {
            for succ in blocks[index].succs.clone() {
                blocks[succ.0].preds.push(BlockId(index));
            }
        }

        trace!("built method `{name}` with {count} blocks");

        Ok(Self {
            name,
            blocks,
            fixed,
            names,
        })
    }

    pub fn entry(&self) -> BlockId {
        BlockId(0)
    }

    pub fn get(&self, id: &BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub fn get_mut(&mut self, id: &BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    pub fn first_id(&self) -> usize {
        self.blocks.first().map(Block::first_id).unwrap_or(0)
    }

    pub fn last_id(&self) -> usize {
        self.blocks.last().map(Block::last_id).unwrap_or(0)
    }

    pub fn instructions(&self) -> impl Iterator<Item = (BlockId, &Instruction)> {
        self.blocks
            .iter()
            .flat_map(|block| block.insts.iter().map(move |inst| (block.id, inst)))
    }

    /// One past the highest virtual register number in use.
    pub fn virtual_count(&self) -> usize {
        self.virtuals()
            .keys()
            .next_back()
            .map(|id| id + 1)
            .unwrap_or(0)
    }

    /// Every virtual register mentioned in the method, by number.
    pub fn virtuals(&self) -> BTreeMap<usize, Virtual> {
        let mut res = BTreeMap::new();
        for (_, inst) in self.instructions() {
            for reg in inst.virtual_reads().chain(inst.virtual_write()) {
                res.insert(reg.id, reg);
            }
        }

        for id in self.fixed.keys() {
            res.entry(*id).or_insert_with(|| Virtual::new(*id));
        }

        res
    }

    /// The block whose instructions span `pos`.
    pub fn block_at(&self, pos: usize) -> Option<BlockId> {
        let index = self
            .blocks
            .partition_point(|block| block.last_id() < pos);
        self.blocks
            .get(index)
            .filter(|block| block.first_id() <= pos)
            .map(|block| block.id)
    }

    /// Insert a fresh block on the edge `from -> to`, which must be reached through a jump or branch. The new block
    /// holds `insts` followed by a jump to `to`.
    pub fn split_edge(&mut self, from: BlockId, to: BlockId, insts: Vec<Instruction>) -> BlockId {
        let id = BlockId(self.blocks.len());
        let anchor = self.get(&from).last_id();

        if let Some(term) = self.get_mut(&from).insts.last_mut() {
            term.retarget(to, id);
        }

        for succ in self.get_mut(&from).succs.iter_mut() {
            if *succ == to {
                *succ = id;
            }
        }

        for pred in self.get_mut(&to).preds.iter_mut() {
            if *pred == from {
                *pred = id;
            }
        }

        let mut insts = insts;
        insts.push(Instruction::new(anchor, Opcode::Jump(to)));

        self.blocks.push(Block {
            id,
            insts,
            preds: vec![from],
            succs: vec![to],
        });

        id
    }
}

/// Incrementally assemble a [`Method`], numbering instructions as they are added.
#[derive(Debug)]
pub struct MethodBuilder {
    name: String,
    names: Names,
    order: Vec<BlockId>,
    blocks: HashMap<BlockId, Vec<Instruction>>,
    fixed: BTreeMap<usize, Physical>,
    current: Option<BlockId>,
    next_block: usize,
    next_id: usize,
    error: Option<BuildError>,
}

impl MethodBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            names: Names::new(),
            order: Vec::new(),
            blocks: HashMap::new(),
            fixed: BTreeMap::new(),
            current: None,
            next_block: 0,
            next_id: 0,
            error: None,
        }
    }

    /// Refer to the block called `label`, which may be defined later.
    pub fn label(&mut self, label: &str) -> BlockId {
        let fresh = BlockId(self.next_block);
        let id = self.names.intern(label, fresh);
        if id == fresh {
            self.next_block += 1;
        }
        id
    }

    /// Start emitting into the block called `label`.
    pub fn start(&mut self, label: &str) -> BlockId {
        let id = self.label(label);
        if self.blocks.insert(id, Vec::new()).is_some() && self.error.is_none() {
            self.error = Some(BuildError::DuplicateLabel(label.to_string()));
        }

        self.order.push(id);
        self.current = Some(id);
        id
    }

    /// Append an instruction to the current block and return its id.
    pub fn push(
        &mut self,
        opcode: Opcode,
        reads: impl IntoIterator<Item = Register>,
        write: Option<Register>,
    ) -> usize {
        let current = match self.current {
            Some(current) => current,
            None => self.start("entry"),
        };

        let id = self.next_id;
        self.next_id += 1;

        let mut inst = Instruction::new(id, opcode).reading(reads);
        inst.write = write;
        self.blocks.entry(current).or_default().push(inst);

        id
    }

    pub fn fix(&mut self, vreg: usize, reg: Physical) {
        self.fixed.insert(vreg, reg);
    }

    pub fn build(self) -> Result<Method, BuildError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        for id in 0..self.next_block {
            let id = BlockId(id);
            if !self.blocks.contains_key(&id) {
                return Err(BuildError::UndefinedLabel(self.names.label_or_id(&id)));
            }
        }

        // Renumber the blocks into program order.
        let renumber: HashMap<BlockId, BlockId> = self
            .order
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, BlockId(index)))
            .collect();

        let mut names = Names::new();
        let mut blocks = Vec::with_capacity(self.order.len());
        let mut source = self.blocks;

        for id in self.order.iter() {
            if let Some(label) = self.names.label(id) {
                names.add(label, renumber[id]);
            }

            let mut insts = source.remove(id).unwrap_or_default();
            for inst in insts.iter_mut() {
                match &mut inst.opcode {
                    Opcode::Jump(to) => *to = renumber[&*to],
                    Opcode::Branch(_, then, elze) => {
                        *then = renumber[&*then];
                        *elze = renumber[&*elze];
                    }
                    _ => {}
                }
            }

            blocks.push(insts);
        }

        Method::new(self.name, names, blocks, self.fixed)
    }
}

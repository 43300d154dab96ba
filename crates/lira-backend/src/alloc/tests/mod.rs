mod graph;
mod liveness;
mod naive;

use std::collections::HashMap;

use lira_common::lir::{BinOp, Condition, Method, Opcode, Physical, Prettier, Register, Slot};

use super::{allocate, Allocation, Config, Strategy};

pub fn parse(src: &str) -> Method {
    lira_frontend::parse(src).unwrap().remove(0)
}

pub fn run(src: &str, strategy: Strategy, registers: usize) -> Allocation {
    allocate(&parse(src), &Config::new(strategy, registers)).unwrap()
}

pub fn pretty(method: &Method) -> String {
    let prettier = Prettier::new(method);
    prettier.pretty_method()
}

pub fn count(method: &Method, pred: impl Fn(&Opcode) -> bool) -> usize {
    method
        .instructions()
        .filter(|(_, inst)| pred(&inst.opcode))
        .count()
}

pub fn loads(method: &Method) -> usize {
    count(method, |opcode| matches!(opcode, Opcode::Load(_)))
}

pub fn stores(method: &Method) -> usize {
    count(method, |opcode| matches!(opcode, Opcode::Store(_)))
}

/// Run a method on the given arguments and return the argument registers at the `ret`. Virtual registers pre-colored
/// to an argument register start out with that argument.
pub fn interpret(method: &Method, args: &[i64]) -> [i64; 6] {
    let mut regs: HashMap<Register, i64> = HashMap::new();
    let mut memory: HashMap<Slot, i64> = HashMap::new();

    for (ordinal, value) in args.iter().enumerate().take(6) {
        regs.insert(Register::Physical(Physical(ordinal)), *value);
    }

    let virtuals = method.virtuals();
    for (vreg, reg) in method.fixed.iter() {
        let value = args.get(reg.0).copied().unwrap_or(0);
        if let Some(virt) = virtuals.get(vreg) {
            regs.insert(Register::Virtual(*virt), value);
        }
    }

    let result = |regs: &HashMap<Register, i64>| {
        let mut res = [0; 6];
        for (ordinal, value) in res.iter_mut().enumerate() {
            *value = regs
                .get(&Register::Physical(Physical(ordinal)))
                .copied()
                .unwrap_or(0);
        }
        res
    };

    let mut block = method.entry();
    let mut steps = 0;

    loop {
        let mut next = None;

        for inst in method.get(&block).insts.iter() {
            steps += 1;
            assert!(steps < 100_000, "`{}` does not terminate", method.name);

            let read = |index: usize| {
                inst.reads
                    .get(index)
                    .and_then(|reg| regs.get(reg))
                    .copied()
                    .unwrap_or(0)
            };

            let value = match &inst.opcode {
                Opcode::Const(value) => Some(*value),
                Opcode::Move => Some(read(0)),
                Opcode::Binary(op) => Some(binary(*op, read(0), read(1))),
                Opcode::Compare(cond) => Some(compare(*cond, read(0), read(1)) as i64),
                Opcode::Local(ordinal) => Some(args.get(*ordinal).copied().unwrap_or(0)),
                Opcode::Call(_) => None,
                Opcode::Load(slot) => Some(memory.get(slot).copied().unwrap_or(0)),

                Opcode::Store(slot) => {
                    memory.insert(*slot, read(0));
                    None
                }

                Opcode::Jump(to) => {
                    next = Some(*to);
                    None
                }

                Opcode::Branch(cond, then, elze) => {
                    next = Some(if compare(*cond, read(0), read(1)) {
                        *then
                    } else {
                        *elze
                    });
                    None
                }

                Opcode::Return => return result(&regs),
            };

            if let (Some(value), Some(write)) = (value, inst.write) {
                regs.insert(write, value);
            }
        }

        block = match next.or_else(|| method.get(&block).succs.first().copied()) {
            Some(next) => next,
            None => return result(&regs),
        };
    }
}

fn binary(op: BinOp, a: i64, b: i64) -> i64 {
    match op {
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Mul => a.wrapping_mul(b),
        BinOp::Div if b == 0 => 0,
        BinOp::Div => a.wrapping_div(b),
        BinOp::And => a & b,
        BinOp::Or => a | b,
        BinOp::Xor => a ^ b,
        BinOp::Shl => a.wrapping_shl(b as u32),
        BinOp::Shr => a.wrapping_shr(b as u32),
    }
}

fn compare(cond: Condition, a: i64, b: i64) -> bool {
    match cond {
        Condition::Equal => a == b,
        Condition::NotEqual => a != b,
        Condition::Less => a < b,
        Condition::LessEqual => a <= b,
        Condition::Greater => a > b,
        Condition::GreaterEqual => a >= b,
    }
}

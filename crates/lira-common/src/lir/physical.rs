//! The physical register file of the target machine.

use std::collections::HashMap;

use lazy_static::lazy_static;

use super::Physical;

/// Number of arguments passed in registers. Parameters past this ordinal live in the caller's frame.
pub const ARGUMENT_REGISTERS: usize = 6;

/// Upper bound of the allocatable pool.
pub const MAX_ALLOCATABLE: usize = 18;

/// Size in bytes of a register and of a stack slot.
pub const WORD: usize = 8;

const FIRST_ALLOCATABLE: usize = ARGUMENT_REGISTERS;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Argument,
    Allocatable,
    Scratch,
    FramePointer,
    StackPointer,
}

#[derive(Clone, Copy, Debug)]
pub struct RegisterInfo {
    pub name: &'static str,
    pub role: Role,
}

const fn info(name: &'static str, role: Role) -> RegisterInfo {
    RegisterInfo { name, role }
}

#[rustfmt::skip]
pub const REGISTER_FILE: [RegisterInfo; 28] = [
    info("a0", Role::Argument), info("a1", Role::Argument), info("a2", Role::Argument),
    info("a3", Role::Argument), info("a4", Role::Argument), info("a5", Role::Argument),

    info("t0", Role::Allocatable), info("t1", Role::Allocatable), info("t2", Role::Allocatable),
    info("t3", Role::Allocatable), info("t4", Role::Allocatable), info("t5", Role::Allocatable),
    info("t6", Role::Allocatable), info("t7", Role::Allocatable), info("t8", Role::Allocatable),
    info("t9", Role::Allocatable), info("t10", Role::Allocatable), info("t11", Role::Allocatable),
    info("t12", Role::Allocatable), info("t13", Role::Allocatable), info("t14", Role::Allocatable),
    info("t15", Role::Allocatable), info("t16", Role::Allocatable), info("t17", Role::Allocatable),

    info("x0", Role::Scratch), info("x1", Role::Scratch),

    info("fp", Role::FramePointer),
    info("sp", Role::StackPointer),
];

lazy_static! {
    static ref BY_NAME: HashMap<&'static str, Physical> = REGISTER_FILE
        .iter()
        .enumerate()
        .map(|(id, info)| (info.name, Physical(id)))
        .collect();
}

impl Physical {
    pub const SCRATCH: [Physical; 2] = [Physical(24), Physical(25)];
    pub const FP: Physical = Physical(26);
    pub const SP: Physical = Physical(27);

    pub fn by_name(name: &str) -> Option<Physical> {
        BY_NAME.get(name).copied()
    }

    /// The register carrying argument `ordinal`, if it is passed in a register.
    pub fn argument(ordinal: usize) -> Option<Physical> {
        (ordinal < ARGUMENT_REGISTERS).then_some(Physical(ordinal))
    }

    /// The first `count` allocatable registers, in order.
    pub fn allocatable(count: usize) -> impl Iterator<Item = Physical> {
        let count = count.min(MAX_ALLOCATABLE);
        (FIRST_ALLOCATABLE..FIRST_ALLOCATABLE + count).map(Physical)
    }

    pub fn role(&self) -> Option<Role> {
        REGISTER_FILE.get(self.0).map(|info| info.role)
    }

    pub fn is_allocatable(&self) -> bool {
        self.role() == Some(Role::Allocatable)
    }

    pub fn is_reserved(&self) -> bool {
        !self.is_allocatable()
    }
}

use std::collections::BTreeSet;

use lira_common::lir::Physical;

use super::programs::{ALL, REVERSED};
use super::{loads, pretty, run, stores};
use crate::alloc::{Allocation, Range, Strategy};

fn reg_of(allocation: &Allocation, vreg: usize) -> Option<Physical> {
    let root = allocation.intervals.root_of(vreg)?;
    allocation.intervals.get(root).reg
}

#[test]
fn sharing_registers_go_through_memory() {
    let allocation = run(REVERSED, Strategy::Naive, 1);

    let expected = "method reversed {
entry:
  t0 = const 1
  store t0, [sp+0]
  t0 = const 2
  store t0, [sp+8]
  t0 = const 3
  store t0, [sp+16]
  t0 = load [sp+16]
  a0 = move t0
  t0 = load [sp+8]
  a1 = move t0
  t0 = load [sp+0]
  a2 = move t0
  ret
}";

    assert_eq!(expected, pretty(&allocation.method));
    assert_eq!(3, allocation.spilled().len());
}

#[test]
fn eviction_is_first_in_first_out() {
    let src = "
method fifo {
  v0 = const 1
  v1 = const 2
  v2 = const 3
  v3 = const 4
  v4 = add v0, v1
  v5 = add v2, v3
  v6 = add v4, v5
  a0 = move v6
  ret
}";

    let allocation = run(src, Strategy::Naive, 2);
    let t0 = Physical::by_name("t0");
    let t1 = Physical::by_name("t1");

    for vreg in [0, 2, 4, 6] {
        assert_eq!(t0, reg_of(&allocation, vreg), "v{vreg}");
    }

    for vreg in [1, 3, 5] {
        assert_eq!(t1, reg_of(&allocation, vreg), "v{vreg}");
    }

    assert_eq!((0..7).collect::<BTreeSet<_>>(), allocation.spilled());
}

#[test]
fn colliding_operands_use_the_second_scratch_register() {
    let src = "
method clash {
  v0 = const 1
  v1 = const 2
  v2 = add v0, v1
  a0 = move v2
  ret
}";

    let allocation = run(src, Strategy::Naive, 1);

    let expected = "method clash {
entry:
  t0 = const 1
  store t0, [sp+0]
  t0 = const 2
  store t0, [sp+8]
  t0 = load [sp+0]
  x1 = load [sp+8]
  t0 = add t0, x1
  store t0, [sp+16]
  t0 = load [sp+16]
  a0 = move t0
  ret
}";

    assert_eq!(expected, pretty(&allocation.method));
}

#[test]
fn enough_registers_means_no_spills() {
    for src in ALL {
        let allocation = run(src, Strategy::Naive, 18);
        assert!(allocation.spilled().is_empty());
        assert_eq!(0, loads(&allocation.method) + stores(&allocation.method));
    }
}

#[test]
fn every_register_lives_for_the_whole_method() {
    let allocation = run(REVERSED, Strategy::Naive, 4);
    let whole = Range::new(0, 6);

    for root in allocation.intervals.roots() {
        assert_eq!(vec![whole], root.ranges);
    }

    let distinct: BTreeSet<_> = (0..3).filter_map(|vreg| reg_of(&allocation, vreg)).collect();
    assert_eq!(3, distinct.len());
}

use std::collections::BTreeSet;

use lira_common::lir::Physical;

use super::programs::{ALL, DIAMOND, REVERSED};
use super::{loads, parse, pretty, run, stores};
use crate::alloc::graph::interference;
use crate::alloc::{build_intervals, liveness, IntervalId, Strategy};

#[test]
fn overlapping_lifetimes_interfere() {
    let method = parse(REVERSED);
    let live = liveness(&method).unwrap();
    let intervals = build_intervals(&method, &live);
    let graph = interference(&intervals);

    for id in [0, 1, 2].map(IntervalId) {
        assert_eq!(2, graph.degree(&id));
    }

    let method = parse(
        "
method apart {
  v0 = const 1
  a0 = move v0
  v1 = const 2
  a1 = move v1
  ret
}",
    );
    let live = liveness(&method).unwrap();
    let intervals = build_intervals(&method, &live);
    let graph = interference(&intervals);

    assert_eq!(0, graph.degree(&IntervalId(0)));
    assert_eq!(0, graph.degree(&IntervalId(1)));
}

#[test]
fn uncolorable_nodes_live_in_memory() {
    let allocation = run(REVERSED, Strategy::Graph, 1);

    let expected = "method reversed {
entry:
  x0 = const 1
  store x0, [sp+8]
  x0 = const 2
  store x0, [sp+0]
  t0 = const 3
  a0 = move t0
  x0 = load [sp+0]
  a1 = move x0
  x0 = load [sp+8]
  a2 = move x0
  ret
}";

    assert_eq!(expected, pretty(&allocation.method));
    assert_eq!(BTreeSet::from([0, 1]), allocation.spilled());
    assert_eq!(16, allocation.spill_area);
}

#[test]
fn neighbors_get_different_colors() {
    for src in ALL {
        let allocation = run(src, Strategy::Graph, 18);
        let method = parse(src);
        let live = liveness(&method).unwrap();
        let intervals = build_intervals(&method, &live);
        let graph = interference(&intervals);

        for (id, neighbors) in graph.graph.iter() {
            let reg = allocation.intervals.get(*id).reg;
            assert!(reg.is_some());
            for other in neighbors.iter() {
                assert_ne!(reg, allocation.intervals.get(*other).reg);
            }
        }

        assert_eq!(0, loads(&allocation.method) + stores(&allocation.method));
    }
}

#[test]
fn colors_come_from_the_pool() {
    let allocation = run(DIAMOND, Strategy::Graph, 2);
    let pool: Vec<Physical> = Physical::allocatable(2).collect();

    for interval in allocation.intervals.iter().filter(|i| !i.fixed) {
        if let Some(reg) = interval.reg {
            assert!(pool.contains(&reg));
        } else {
            assert!(interval.spill);
        }
    }
}

use lira_common::lir::{Method, Slot};

use super::parse;
use super::programs::{ALL, PARAMETERS, SUM};
use crate::alloc::{build_intervals, liveness, Interval, Intervals, Liveness, Range, UseKind};

fn root(intervals: &Intervals, vreg: usize) -> &Interval {
    intervals.get(intervals.root_of(vreg).unwrap())
}

/// Every read not preceded by a write in its block is live on entry, and whatever a successor needs is live on exit.
fn assert_sound(method: &Method, liveness: &Liveness) {
    for block in method.blocks.iter() {
        let mut written = Vec::new();
        for inst in block.insts.iter() {
            for reg in inst.virtual_reads() {
                if !written.contains(&reg.id) {
                    assert!(
                        liveness.live_in(&block.id).contains(reg.id),
                        "{reg} is read in {} but not live in",
                        block.id
                    );
                }
            }

            written.extend(inst.virtual_write().map(|reg| reg.id));
        }

        for succ in block.succs.iter() {
            for vreg in liveness.live_in(succ).iter() {
                assert!(liveness.live_out(&block.id).contains(vreg));
            }
        }
    }
}

#[test]
fn loop_liveness() {
    let method = parse(SUM);
    let live = liveness(&method).unwrap();

    let [entry, head, done] = [0, 1, 2].map(|index| method.blocks[index].id);

    let live_in = |id| live.live_in(&id).iter().collect::<Vec<_>>();
    let live_out = |id| live.live_out(&id).iter().collect::<Vec<_>>();

    assert_eq!(vec![0], live_in(entry));
    assert_eq!(vec![0, 1, 2], live_out(entry));
    assert_eq!(vec![0, 1, 2], live_in(head));
    assert_eq!(vec![0, 1, 2], live_out(head));
    assert_eq!(vec![1], live_in(done));
    assert!(live_out(done).is_empty());

    assert_eq!(
        vec![1, 2],
        live.get(&entry).live_def.iter().collect::<Vec<_>>()
    );
    assert_eq!(
        vec![0, 1, 2],
        live.get(&head).live_use.iter().collect::<Vec<_>>()
    );
}

#[test]
fn liveness_is_sound() {
    for src in ALL {
        let method = parse(src);
        let live = liveness(&method).unwrap();
        assert_sound(&method, &live);
    }
}

#[test]
fn loop_intervals() {
    let method = parse(SUM);
    let live = liveness(&method).unwrap();
    let intervals = build_intervals(&method, &live);

    let n = root(&intervals, 0);
    assert!(n.fixed);
    assert_eq!(Some(method.fixed[&0]), n.reg);
    assert_eq!(vec![Range::new(0, 5)], n.ranges);
    assert_eq!(
        vec![(3, UseKind::Read), (4, UseKind::ReadWrite), (5, UseKind::Read)],
        n.uses.iter().map(|(at, kind)| (*at, *kind)).collect::<Vec<_>>()
    );

    let sum = root(&intervals, 1);
    assert!(!sum.fixed);
    assert_eq!(vec![Range::new(0, 6)], sum.ranges);
    assert_eq!(
        vec![(0, UseKind::Write), (3, UseKind::ReadWrite), (6, UseKind::Read)],
        sum.uses.iter().map(|(at, kind)| (*at, *kind)).collect::<Vec<_>>()
    );

    let one = root(&intervals, 2);
    assert_eq!(vec![Range::new(1, 5)], one.ranges);
}

#[test]
fn intervals_cover_their_uses() {
    for src in ALL {
        let method = parse(src);
        let live = liveness(&method).unwrap();
        let intervals = build_intervals(&method, &live);

        for (_, inst) in method.instructions() {
            for vreg in inst.virtual_reads().chain(inst.virtual_write()) {
                let interval = root(&intervals, vreg.id);
                assert!(interval.covers(inst.id), "{vreg} at {}", inst.id);
                assert!(interval.uses.contains_key(&inst.id));
            }
        }
    }
}

#[test]
fn stack_parameters_keep_their_home() {
    let method = parse(PARAMETERS);
    let live = liveness(&method).unwrap();
    let intervals = build_intervals(&method, &live);

    let six = root(&intervals, 1);
    let seven = root(&intervals, 2);
    assert_eq!(
        Some(Slot::Frame(16)),
        intervals.slot(six.id)
    );
    assert_eq!(
        Some(Slot::Frame(24)),
        intervals.slot(seven.id)
    );
    assert_eq!(None, intervals.slot(root(&intervals, 0).id));
}

use std::collections::{BTreeSet, HashMap};

use crate::alloc::interval::{IntervalId, Intervals};

/// Which intervals are live at the same time.
#[derive(Debug, Default)]
pub struct Interference {
    pub graph: HashMap<IntervalId, im::HashSet<IntervalId>>,
}

impl Interference {
    pub fn neighbors(&self, id: &IntervalId) -> impl Iterator<Item = &IntervalId> {
        self.graph.get(id).into_iter().flat_map(|set| set.iter())
    }

    pub fn degree(&self, id: &IntervalId) -> usize {
        self.graph.get(id).map(|set| set.len()).unwrap_or(0)
    }
}

/// Two intervals overlap exactly when one of them is live where a range of the other starts, so looking at range
/// starts is enough.
pub fn interference(intervals: &Intervals) -> Interference {
    let nodes: Vec<_> = intervals
        .iter()
        .filter(|interval| !interval.fixed && !interval.ranges.is_empty())
        .collect();

    let starts: BTreeSet<usize> = nodes
        .iter()
        .flat_map(|interval| interval.ranges.iter().map(|range| range.start))
        .collect();

    let mut graph: HashMap<IntervalId, im::HashSet<IntervalId>> = nodes
        .iter()
        .map(|interval| (interval.id, im::HashSet::new()))
        .collect();

    for at in starts {
        let live: im::HashSet<IntervalId> = nodes
            .iter()
            .filter(|interval| interval.covers(at))
            .map(|interval| interval.id)
            .collect();

        for id in live.iter() {
            let interfere = live.without(id);
            graph.entry(*id).or_default().extend(interfere);
        }
    }

    Interference { graph }
}

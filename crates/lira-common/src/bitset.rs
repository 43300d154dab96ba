//! A dense, growable bit-set indexed by `usize`, used for the per-block liveness sets.

use std::fmt;

const BITS: usize = u64::BITS as usize;

#[derive(Clone, Default, Eq, PartialEq)]
pub struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: vec![0; (bits + BITS - 1) / BITS],
        }
    }

    /// Set `bit`. Returns `true` if it was not set before.
    pub fn insert(&mut self, bit: usize) -> bool {
        let (word, mask) = Self::locate(bit);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }

        let fresh = self.words[word] & mask == 0;
        self.words[word] |= mask;
        fresh
    }

    /// Clear `bit`. Returns `true` if it was set before.
    pub fn remove(&mut self, bit: usize) -> bool {
        let (word, mask) = Self::locate(bit);
        match self.words.get_mut(word) {
            Some(w) => {
                let present = *w & mask != 0;
                *w &= !mask;
                present
            }
            None => false,
        }
    }

    pub fn contains(&self, bit: usize) -> bool {
        let (word, mask) = Self::locate(bit);
        self.words.get(word).map(|w| w & mask != 0).unwrap_or(false)
    }

    /// `self |= other`. Returns `true` if any bit changed.
    pub fn union_with(&mut self, other: &BitSet) -> bool {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }

        let mut changed = false;
        for (ours, theirs) in self.words.iter_mut().zip(other.words.iter()) {
            let next = *ours | *theirs;
            changed |= next != *ours;
            *ours = next;
        }

        changed
    }

    /// `self &= !other`.
    pub fn difference_with(&mut self, other: &BitSet) {
        for (ours, theirs) in self.words.iter_mut().zip(other.words.iter()) {
            *ours &= !*theirs;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(index, word)| {
            let word = *word;
            (0..BITS)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| index * BITS + bit)
        })
    }

    /// Set equality ignoring trailing zero words.
    pub fn same_as(&self, other: &BitSet) -> bool {
        let len = self.words.len().max(other.words.len());
        (0..len).all(|i| {
            self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0)
        })
    }

    fn locate(bit: usize) -> (usize, u64) {
        (bit / BITS, 1 << (bit % BITS))
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut set = BitSet::new();
        for bit in iter {
            set.insert(bit);
        }
        set
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::BitSet;

    #[test]
    fn insert_and_remove() {
        let mut set = BitSet::with_capacity(10);
        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert!(set.insert(130));
        assert!(set.contains(3));
        assert!(set.contains(130));
        assert!(!set.contains(4));

        assert!(set.remove(3));
        assert!(!set.remove(3));
        assert_eq!(vec![130], set.iter().collect::<Vec<_>>());
    }

    #[test]
    fn union_reports_change() {
        let mut a: BitSet = [1, 2].into_iter().collect();
        let b: BitSet = [2, 70].into_iter().collect();

        assert!(a.union_with(&b));
        assert!(!a.union_with(&b));
        assert_eq!(vec![1, 2, 70], a.iter().collect::<Vec<_>>());
    }

    #[test]
    fn difference_and_equality() {
        let mut a: BitSet = [1, 2, 65].into_iter().collect();
        let b: BitSet = [2, 65].into_iter().collect();
        a.difference_with(&b);

        let expected: BitSet = [1].into_iter().collect();
        assert!(a.same_as(&expected));
        assert_eq!(1, a.len());
    }
}

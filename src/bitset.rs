//! Fixed-capacity bitset over group numbers.
//!
//! The word count is fixed at construction to `ceil(len / 64)` and bits at or
//! above `len` are never set, so `intersects` and `count_ones` never see
//! stray high bits.

const WORD_BITS: usize = u64::BITS as usize;

/// A set of group numbers in `0..len`, stored as little-endian `u64` words.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupSet {
    words: Box<[u64]>,
    len: usize,
}

impl GroupSet {
    /// Creates an empty set able to hold groups `0..len`.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(WORD_BITS)].into_boxed_slice(),
            len,
        }
    }

    /// Creates a set with groups `0..count` already present.
    pub fn with_prefix(len: usize, count: usize) -> Self {
        assert!(count <= len, "prefix of {count} exceeds capacity {len}");
        let mut set = Self::new(len);
        let full_words = count / WORD_BITS;
        for word in &mut set.words[..full_words] {
            *word = u64::MAX;
        }
        let rest = count % WORD_BITS;
        if rest != 0 {
            set.words[full_words] = (1u64 << rest) - 1;
        }
        set
    }

    /// Number of groups this set can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.len
    }

    /// Number of `u64` words backing the set.
    #[inline]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Adds a group, returning `true` if it was not already present.
    #[inline]
    pub fn insert(&mut self, group: usize) -> bool {
        assert!(group < self.len, "group {group} out of range {}", self.len);
        let (word, mask) = location(group);
        let was_set = self.words[word] & mask != 0;
        self.words[word] |= mask;
        !was_set
    }

    #[inline]
    pub fn contains(&self, group: usize) -> bool {
        group < self.len && {
            let (word, mask) = location(group);
            self.words[word] & mask != 0
        }
    }

    /// Returns `true` if the two sets share at least one group.
    #[inline(always)]
    pub fn intersects(&self, other: &GroupSet) -> bool {
        debug_assert_eq!(self.len, other.len);
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    /// Adds every group of `other` to this set.
    #[inline(always)]
    pub fn union_with(&mut self, other: &GroupSet) {
        debug_assert_eq!(self.len, other.len);
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a |= b;
        }
    }

    /// Removes every group of `other` from this set.
    #[inline(always)]
    pub fn difference_with(&mut self, other: &GroupSet) {
        debug_assert_eq!(self.len, other.len);
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a &= !b;
        }
    }

    #[inline]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns `true` if every group in `0..capacity` is present.
    pub fn is_full(&self) -> bool {
        self.count_ones() == self.len
    }

    /// Iterates the groups present, in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_index, &word)| {
                let mut remaining = word;
                std::iter::from_fn(move || {
                    if remaining == 0 {
                        return None;
                    }
                    let bit = remaining.trailing_zeros() as usize;
                    // clear the lowest set bit
                    remaining &= remaining - 1;
                    Some(word_index * WORD_BITS + bit)
                })
            })
    }
}

#[inline(always)]
fn location(group: usize) -> (usize, u64) {
    (group / WORD_BITS, 1u64 << (group % WORD_BITS))
}

//! Per-index chain coverage bitsets.
//!
//! The chain started at index `i` visits `next(i)`, `next²(i)`, ...,
//! `next^(n-2)(i)`. Its coverage is the set of groups (`index / n`) those
//! visits land in. Each table entry is built once and never mutated.

use log::{debug, warn};

use crate::bitset::GroupSet;
use crate::rotation::RotationMap;
use crate::PermIndex;

/// Immutable table of chain coverage bitsets, one per permutation index.
pub struct ChainCoverageTable {
    bits: Vec<GroupSet>,
    group_count: usize,
    chain_length: usize,
    collisions: Vec<PermIndex>,
}

impl ChainCoverageTable {
    /// Walks `n - 2` rotation steps from every index and records the groups
    /// visited.
    ///
    /// The rotation map must already be verified as a bijection, which
    /// [`RotationMap`] guarantees at construction.
    pub fn build(rotation: &RotationMap) -> Self {
        let symbols = rotation.symbols();
        let group_count = rotation.len() / symbols;
        let chain_length = symbols - 2;
        let mut collisions = Vec::new();

        let bits = (0..rotation.len())
            .map(|start| {
                let mut groups = GroupSet::new(group_count);
                for value in rotation.walk(start).take(chain_length) {
                    if !groups.insert(value / symbols) {
                        // two steps of one chain fell into the same group
                        collisions.push(start);
                    }
                }
                groups
            })
            .collect();

        collisions.dedup();
        if collisions.is_empty() {
            debug!(
                "Built {} chain bitsets over {group_count} groups, each with {chain_length} groups",
                rotation.len()
            );
        } else {
            warn!(
                "{} chains cover fewer than {chain_length} distinct groups",
                collisions.len()
            );
        }

        Self {
            bits,
            group_count,
            chain_length,
            collisions,
        }
    }

    /// Coverage of the chain starting at `index`.
    #[inline(always)]
    pub fn bits(&self, index: PermIndex) -> &GroupSet {
        &self.bits[index]
    }

    #[inline]
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Rotation steps per chain, n - 2.
    #[inline]
    pub fn chain_length(&self) -> usize {
        self.chain_length
    }

    /// Chain starts whose steps revisit a group, in increasing order.
    pub fn collisions(&self) -> &[PermIndex] {
        &self.collisions
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::PermutationUniverse;

    fn build(n: usize) -> (RotationMap, ChainCoverageTable) {
        let rotation = RotationMap::build(&PermutationUniverse::new(n)).unwrap();
        let table = ChainCoverageTable::build(&rotation);
        (rotation, table)
    }

    #[test_log::test]
    fn test_every_chain_covers_n_minus_two_groups() {
        for n in 4..=7 {
            let (_, table) = build(n);
            assert!(table.collisions().is_empty(), "collisions for n={n}");
            for index in 0..table.len() {
                assert_eq!(table.bits(index).count_ones(), n - 2, "n={n} index={index}");
            }
        }
    }

    #[test]
    fn test_bits_match_direct_simulation() {
        let (rotation, table) = build(6);
        assert_eq!(table.group_count(), 120);
        for start in 0..720 {
            let mut expected = Vec::new();
            let mut value = start;
            for _ in 0..4 {
                value = rotation.next(value);
                expected.push(value / 6);
            }
            expected.sort_unstable();
            let actual: Vec<_> = table.bits(start).iter().collect();
            assert_eq!(actual, expected, "start {start}");
        }
    }

    #[test]
    fn test_bitsets_are_exactly_sized() {
        let (_, table) = build(6);
        // 120 groups fit in two words, the top 8 bits of the second stay clear
        let high_mask = !((1u64 << 56) - 1);
        for index in 0..table.len() {
            let words = table.bits(index).words();
            assert_eq!(words.len(), 2);
            assert_eq!(words[1] & high_mask, 0);
        }
    }

    #[test]
    fn test_collisions_are_reported() {
        // n = 4 with each index mapped to its in-group neighbour: both steps
        // of a chain then stay inside one group
        let images: Vec<_> = (0..24).map(|i| crate::rotation::cycle_shift(i, 1, 4)).collect();
        let rotation = RotationMap::from_images(4, images).unwrap();
        let table = ChainCoverageTable::build(&rotation);
        assert_eq!(table.collisions().len(), 24);
        assert_eq!(table.bits(5).iter().collect::<Vec<_>>(), vec![1]);
    }
}

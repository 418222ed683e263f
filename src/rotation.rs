//! The rotation operator: a bijection over permutation indices.
//!
//! `next(i)` rotates every symbol of permutation `i` except the last one
//! position to the left. The map is derived by simulating that rotation on
//! each permutation and is checked to be a bijection before anything is
//! built on top of it.

use log::debug;

use crate::error::TableError;
use crate::universe::PermutationUniverse;
use crate::PermIndex;

/// The successor table `next[i]` together with the alphabet size.
#[derive(Clone, Debug)]
pub struct RotationMap {
    symbols: usize,
    next: Vec<PermIndex>,
}

impl RotationMap {
    /// Simulates the rotation on every permutation of `universe`.
    pub fn build(universe: &PermutationUniverse) -> Result<Self, TableError> {
        let symbols = universe.symbols();
        let mut scratch = vec![0; symbols];

        let images = (0..universe.len())
            .map(|index| {
                scratch.copy_from_slice(universe.get(index));
                scratch[..symbols - 1].rotate_left(1);
                universe
                    .index_of(&scratch)
                    .ok_or(TableError::RotationMissing { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_images(symbols, images)
    }

    /// Wraps a precomputed successor table after checking it is a bijection
    /// of `0..images.len()`.
    pub fn from_images(symbols: usize, images: Vec<PermIndex>) -> Result<Self, TableError> {
        let mut preimage: Vec<Option<PermIndex>> = vec![None; images.len()];

        // an injective map of a finite set into itself is also surjective
        for (index, &image) in images.iter().enumerate() {
            let slot = preimage
                .get_mut(image)
                .ok_or(TableError::RotationMissing { index })?;
            if let Some(first) = *slot {
                return Err(TableError::RotationCollision {
                    image,
                    first,
                    second: index,
                });
            }
            *slot = Some(index);
        }

        debug!(
            "Rotation map over {} permutations verified as a bijection",
            images.len()
        );
        Ok(Self {
            symbols,
            next: images,
        })
    }

    #[inline(always)]
    pub fn next(&self, index: PermIndex) -> PermIndex {
        self.next[index]
    }

    /// Successive images `next(start)`, `next(next(start))`, ... without end.
    pub fn walk(&self, start: PermIndex) -> impl Iterator<Item = PermIndex> + '_ {
        std::iter::successors(Some(self.next[start]), move |&value| Some(self.next[value]))
    }

    #[inline]
    pub fn as_slice(&self) -> &[PermIndex] {
        &self.next
    }

    #[inline]
    pub fn symbols(&self) -> usize {
        self.symbols
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.next.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    /// Decomposes the map into its cycles, each listed from its smallest index.
    pub fn orbits(&self) -> Vec<Vec<PermIndex>> {
        let mut visited = vec![false; self.next.len()];
        let mut orbits = Vec::new();

        for start in 0..self.next.len() {
            if visited[start] {
                continue;
            }
            let mut orbit = Vec::new();
            let mut value = start;
            while !visited[value] {
                visited[value] = true;
                orbit.push(value);
                value = self.next[value];
            }
            orbits.push(orbit);
        }

        orbits
    }
}

/// Moves `value` by `shift` steps within its aligned block of `period`
/// consecutive indices, wrapping at the block end.
///
/// With `period = n` this steps between the cyclic rotations of one
/// permutation.
#[inline(always)]
pub fn cycle_shift(value: PermIndex, shift: usize, period: usize) -> PermIndex {
    let residue = value % period;
    value - residue + (residue + shift) % period
}

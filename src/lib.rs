//! Chain-cover search for superpermutation construction.
//!
//! Every permutation of an n-symbol alphabet gets an index. A rotation
//! operator over those indices splits them into short orbits, and each
//! index starts a "chain" covering n - 2 rotation classes. The search looks
//! for sets of chain starts whose coverages are disjoint and together span
//! every class not already covered by a fixed starting chain.

pub mod bitset;
pub mod coverage;
pub mod error;
pub mod expand;
pub mod rotation;
pub mod search;
pub mod universe;

use log::debug;

use coverage::ChainCoverageTable;
use error::TableError;
use rotation::RotationMap;
use universe::{PermutationUniverse, MAX_SYMBOLS};

/// Index of a permutation in enumeration order.
pub type PermIndex = usize;

/// Smallest alphabet the chain arithmetic (n - 2, n - 3) supports.
pub const MIN_SYMBOLS: usize = 4;

/// The build-once tables every search over one alphabet size shares.
pub struct Tables {
    pub universe: PermutationUniverse,
    pub rotation: RotationMap,
    pub coverage: ChainCoverageTable,
}

impl Tables {
    /// Builds the universe, verifies the rotation map, and precomputes chain
    /// coverage for an alphabet of `symbols` symbols.
    pub fn new(symbols: usize) -> Result<Self, TableError> {
        if symbols < MIN_SYMBOLS {
            return Err(TableError::AlphabetTooSmall {
                symbols,
                min: MIN_SYMBOLS,
            });
        }
        if symbols > MAX_SYMBOLS {
            return Err(TableError::AlphabetTooLarge {
                symbols,
                max: MAX_SYMBOLS,
            });
        }

        let universe = PermutationUniverse::new(symbols);
        debug!("Enumerated {} permutations of {symbols} symbols", universe.len());
        let rotation = RotationMap::build(&universe)?;
        let coverage = ChainCoverageTable::build(&rotation);

        Ok(Self {
            universe,
            rotation,
            coverage,
        })
    }

    #[inline]
    pub fn symbols(&self) -> usize {
        self.universe.symbols()
    }

    /// Number of permutations, n!.
    #[inline]
    pub fn total(&self) -> usize {
        self.universe.len()
    }

    /// Number of chain starts in a complete solution,
    /// `n! / (n * (n - 2)) - (n - 1)`.
    #[inline]
    pub fn max_insert(&self) -> usize {
        let n = self.symbols();
        self.total() / n / (n - 2) - (n - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_small_and_large_alphabets() {
        for symbols in 0..MIN_SYMBOLS {
            assert!(matches!(
                Tables::new(symbols),
                Err(TableError::AlphabetTooSmall { .. })
            ));
        }
        assert_eq!(
            Tables::new(9).err(),
            Some(TableError::AlphabetTooLarge { symbols: 9, max: 8 })
        );
    }

    #[test]
    fn test_derived_sizes() {
        let expected = [(4, 24, 0), (5, 120, 4), (6, 720, 25), (7, 5040, 138)];
        for (symbols, total, max_insert) in expected {
            let tables = Tables::new(symbols).unwrap();
            assert_eq!(tables.total(), total);
            assert_eq!(tables.max_insert(), max_insert, "n={symbols}");
            assert_eq!(tables.coverage.group_count(), total / symbols);
        }
    }
}

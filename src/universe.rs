//! Enumeration of every permutation of an n-symbol alphabet.
//!
//! Permutations are generated by a rotate-and-reinsert walk driven by a
//! mixed-radix counter. The walk lists the n cyclic rotations of each
//! arrangement back to back, so indices `g * n .. g * n + n` always form one
//! rotation class ("group").

use rustc_hash::FxHashMap;

use crate::PermIndex;

/// A symbol of the alphabet, `0..n`.
pub type Symbol = u8;

/// Largest alphabet the crate will build tables for.
///
/// The dense coverage table holds `n! * ceil((n! / n) / 64)` words, which is
/// about 25 MB at n = 8 and roughly 1.8 GB at n = 9.
pub const MAX_SYMBOLS: usize = 8;

/// All permutations of `0..n` in enumeration order, with reverse lookup.
pub struct PermutationUniverse {
    symbols: usize,
    /// Flattened permutations, `symbols` entries per index.
    table: Vec<Symbol>,
    lookup: FxHashMap<Box<[Symbol]>, PermIndex>,
}

impl PermutationUniverse {
    /// Enumerates all `symbols!` permutations.
    ///
    /// # Panics
    ///
    /// Panics if `symbols` is zero or exceeds [`MAX_SYMBOLS`].
    pub fn new(symbols: usize) -> Self {
        assert!(
            (1..=MAX_SYMBOLS).contains(&symbols),
            "alphabet size must be in 1..={MAX_SYMBOLS}"
        );
        let total = factorial(symbols);
        let mut table = Vec::with_capacity(total * symbols);
        let mut lookup = FxHashMap::default();
        lookup.reserve(total);

        let mut current: Vec<Symbol> = (0..symbols as Symbol).collect();
        // counter[k] counts down the remaining rotations at position k
        let mut counter: Vec<usize> = (1..=symbols).collect();

        for index in 0..total {
            table.extend_from_slice(&current);
            let previous = lookup.insert(current.clone().into_boxed_slice(), index);
            debug_assert!(previous.is_none(), "enumeration repeated a permutation");

            if index + 1 == total {
                break;
            }

            current.rotate_left(1);
            let mut position = symbols - 1;
            loop {
                counter[position] -= 1;
                if counter[position] != 0 {
                    break;
                }
                counter[position] = position + 1;
                // carry: move the leading symbol behind the first `position - 1`
                current[..position].rotate_left(1);
                position -= 1;
                if position < 1 {
                    break;
                }
            }
        }

        Self {
            symbols,
            table,
            lookup,
        }
    }

    /// Alphabet size n.
    #[inline]
    pub fn symbols(&self) -> usize {
        self.symbols
    }

    /// Number of permutations, n!.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len() / self.symbols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of rotation classes, n! / n.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.len() / self.symbols
    }

    /// The permutation at `index`.
    #[inline]
    pub fn get(&self, index: PermIndex) -> &[Symbol] {
        &self.table[index * self.symbols..(index + 1) * self.symbols]
    }

    /// Reverse lookup of a permutation's index.
    #[inline]
    pub fn index_of(&self, permutation: &[Symbol]) -> Option<PermIndex> {
        self.lookup.get(permutation).copied()
    }

    /// Iterates all permutations in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[Symbol]> + '_ {
        self.table.chunks_exact(self.symbols)
    }
}

/// Renders symbols as capital letters, `0` as `A`.
pub fn render(symbols: &[Symbol]) -> String {
    symbols.iter().map(|&s| char::from(b'A' + s)).collect()
}

/// n! for the small alphabets this crate handles.
pub const fn factorial(n: usize) -> usize {
    let mut result = 1;
    let mut k = 2;
    while k <= n {
        result *= k;
        k += 1;
    }
    result
}

//! Expansion of a chain cover into a symbol string.
//!
//! The string starts as the greedy overlap of the first `n(n-1)(n-2)`
//! permutations, which together walk the fixed starting chain. Each chain
//! start of a solution then splices in one detour: with `x` the start
//! rotated right by one, every occurrence of `x` followed by `x[0]` becomes
//! the n arrangements of `x[1..]` with `x[0]` inserted at each position in
//! turn. A sound solution yields a string containing every permutation.

use rustc_hash::FxHashSet;

use crate::error::ExpandError;
use crate::universe::{PermutationUniverse, Symbol};
use crate::PermIndex;

/// Greedy overlap of the permutations `0 .. n(n-1)(n-2)`.
pub fn greedy_prefix(universe: &PermutationUniverse) -> Vec<Symbol> {
    let n = universe.symbols();
    let mut string = universe.get(0).to_vec();

    for index in 0..n * (n - 1) * (n - 2) {
        let permutation = universe.get(index);
        // overlap as much as the last occurrence of the leading symbol allows
        if let Some(overlap) = string.iter().rposition(|&s| s == permutation[0]) {
            string.truncate(overlap);
        }
        string.extend_from_slice(permutation);
    }

    string
}

/// Builds the symbol string for a solution's chain starts.
pub fn materialize(
    universe: &PermutationUniverse,
    solution: &[PermIndex],
) -> Result<Vec<Symbol>, ExpandError> {
    let n = universe.symbols();
    let mut string = greedy_prefix(universe);
    let mut pattern = Vec::with_capacity(n + 1);
    let mut detour = Vec::with_capacity(n * n);

    for &index in solution {
        if index >= universe.len() {
            return Err(ExpandError::IndexOutOfRange {
                index,
                total: universe.len(),
            });
        }
        let mut shifted = universe.get(index).to_vec();
        shifted.rotate_right(1);

        pattern.clear();
        pattern.extend_from_slice(&shifted);
        pattern.push(shifted[0]);

        detour.clear();
        for slot in 0..n {
            detour.extend_from_slice(&shifted[1..=slot]);
            detour.push(shifted[0]);
            detour.extend_from_slice(&shifted[slot + 1..]);
        }

        string = replace_all(&string, &pattern, &detour);
    }

    Ok(string)
}

/// Indices of the permutations that do not occur as a contiguous substring.
pub fn missing_permutations(universe: &PermutationUniverse, string: &[Symbol]) -> Vec<PermIndex> {
    let present: FxHashSet<&[Symbol]> = string.windows(universe.symbols()).collect();
    (0..universe.len())
        .filter(|&index| !present.contains(universe.get(index)))
        .collect()
}

/// Parses chain starts separated by whitespace or commas.
pub fn parse_solution(text: &str) -> Result<Vec<PermIndex>, ExpandError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse()
                .map_err(|_| ExpandError::Parse(entry.to_string()))
        })
        .collect()
}

/// Replaces every non-overlapping occurrence of `from`, scanning left to
/// right.
fn replace_all(haystack: &[Symbol], from: &[Symbol], to: &[Symbol]) -> Vec<Symbol> {
    let mut output = Vec::with_capacity(haystack.len() + to.len());
    let mut position = 0;

    while position < haystack.len() {
        if haystack[position..].starts_with(from) {
            output.extend_from_slice(to);
            position += from.len();
        } else {
            output.push(haystack[position]);
            position += 1;
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::render;

    #[test]
    fn test_four_symbols_give_minimal_superpermutation() {
        let universe = PermutationUniverse::new(4);
        let string = materialize(&universe, &[]).unwrap();
        assert_eq!(string.len(), 33);
        assert!(missing_permutations(&universe, &string).is_empty());
        insta::assert_snapshot!(render(&string), @"ABCDABCADBCABDCABACDBACBDACBADCBA");
    }

    #[test]
    fn test_greedy_prefix_covers_seed_range() {
        for (n, length) in [(5, 77), (6, 147)] {
            let universe = PermutationUniverse::new(n);
            let prefix = greedy_prefix(&universe);
            assert_eq!(prefix.len(), length);
            let missing = missing_permutations(&universe, &prefix);
            let covered = n * (n - 1) * (n - 2);
            assert!(missing.iter().copied().eq(covered..universe.len()), "n={n}");
        }
    }

    #[test]
    fn test_five_symbol_covers_expand_to_153() {
        let universe = PermutationUniverse::new(5);
        let solutions = [
            [2, 38, 80, 115],
            [2, 58, 64, 116],
            [18, 22, 96, 104],
            [18, 42, 75, 100],
            [22, 58, 60, 95],
            [38, 42, 76, 84],
        ];
        for solution in solutions {
            let string = materialize(&universe, &solution).unwrap();
            assert_eq!(string.len(), 153, "{solution:?}");
            assert!(missing_permutations(&universe, &string).is_empty(), "{solution:?}");
        }

        let first = materialize(&universe, &solutions[0]).unwrap();
        insta::assert_snapshot!(
            render(&first),
            @"ABCDEACBDAECBDACEBDACBEDACBDEACDBEACDEBACDEABCDAEBCDABECDABCEDABCADEBCADBECADBCEADBCAEDBACEDBAECDBAEDCBADECBADCEBADCBEADCBAEDBCABDECABDCEABDCAEBDCABEDCAB"
        );
    }

    #[test]
    fn test_six_symbol_covers_expand_to_872() {
        let universe = PermutationUniverse::new(6);
        let covers = [
            "118 595 597 591 568 354 716 334 338 445 210 580 372 481 553 364 370 240 631 248 180 156 132 609 188",
            "118 595 592 474 523 571 679 616 438 529 390 481 577 204 366 195 216 168 164 620 260 257 306 314 304",
        ];
        for cover in covers {
            let solution = parse_solution(cover).unwrap();
            assert_eq!(solution.len(), 25);
            let string = materialize(&universe, &solution).unwrap();
            assert_eq!(string.len(), 872);
            assert_eq!(missing_permutations(&universe, &string), Vec::<PermIndex>::new());
        }
    }

    #[test]
    fn test_incomplete_cover_leaves_permutations_missing() {
        let universe = PermutationUniverse::new(5);
        let string = materialize(&universe, &[2, 38, 80]).unwrap();
        assert!(!missing_permutations(&universe, &string).is_empty());
    }

    #[test]
    fn test_rejects_bad_indices() {
        let universe = PermutationUniverse::new(5);
        assert_eq!(
            materialize(&universe, &[2, 120]),
            Err(ExpandError::IndexOutOfRange {
                index: 120,
                total: 120
            })
        );
        assert_eq!(parse_solution("2, 38 80"), Ok(vec![2, 38, 80]));
        assert_eq!(parse_solution("2 3x"), Err(ExpandError::Parse("3x".to_string())));
    }

    #[test]
    fn test_replace_all_is_non_overlapping() {
        assert_eq!(replace_all(&[0, 0, 0], &[0, 0], &[1]), vec![1, 0]);
        assert_eq!(replace_all(&[2, 0, 1, 0, 1], &[0, 1], &[3, 3]), vec![2, 3, 3, 3, 3]);
        assert_eq!(replace_all(&[], &[0], &[1]), Vec::<Symbol>::new());
    }
}

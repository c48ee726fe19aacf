//! Enumerates reflector wirings reachable by swapping wires between pairs of
//! an existing reflector's 13 pairs — the tampered-reflector search case.
//!
//! Grounded directly in `permutate_reflector_by_wire_swap`: a reflector is
//! 13 disjoint letter pairs; a "wire swap" regroups two pairs `{a,b}`,
//! `{c,d}` into one of the two other groupings `{a,c},{b,d}` or
//! `{a,d},{b,c}`. This module only implements the *n* = 2 case the search
//! driver actually needs (four pairs touched, the rest of the reflector
//! untouched).

use std::collections::HashSet;

use itertools::Itertools;

use crate::alphabet;
use crate::rotor::parse_raw_wiring;

/// An unordered letter pair, stored with the lower letter first so it
/// compares and hashes independent of discovery order.
type Pair = (char, char);

fn canonical_pair(a: char, b: char) -> Pair {
    if a <= b { (a, b) } else { (b, a) }
}

/// Converts a 26-letter wiring string to its 13 unique unordered pairs.
fn wiring_to_pairs(wiring: &str) -> Vec<Pair> {
    let raw = parse_raw_wiring(wiring).expect("valid reflector wiring");
    let mut excluded = [false; 26];
    let mut pairs = Vec::with_capacity(13);
    for i in 0u8..26 {
        if excluded[i as usize] {
            continue;
        }
        let j = raw[i as usize];
        excluded[i as usize] = true;
        excluded[j as usize] = true;
        pairs.push(canonical_pair(alphabet::letter_of(i), alphabet::letter_of(j)));
    }
    pairs
}

/// Converts 13 disjoint pairs back to a 26-letter wiring string.
fn pairs_to_wiring(pairs: &[Pair]) -> String {
    let mut table: [u8; 26] = std::array::from_fn(|i| i as u8);
    for &(a, b) in pairs {
        let ia = alphabet::index_of(a).expect("letter") as usize;
        let ib = alphabet::index_of(b).expect("letter") as usize;
        table[ia] = ib as u8;
        table[ib] = ia as u8;
    }
    table.iter().map(|&i| alphabet::letter_of(i)).collect()
}

/// The two new (non-identity) ways to regroup two pairs' wires: given
/// `(a,b)` and `(c,d)`, returns `[(a,c),(b,d)]` and `[(a,d),(c,b)]` — the
/// third grouping, `(a,b),(c,d)`, is the original and is not produced.
fn swap_tuples(t1: Pair, t2: Pair) -> [[Pair; 2]; 2] {
    [
        [canonical_pair(t1.0, t2.0), canonical_pair(t1.1, t2.1)],
        [canonical_pair(t1.0, t2.1), canonical_pair(t1.1, t2.0)],
    ]
}

/// Every distinct reflector wiring reachable from `wiring` by swapping
/// wires between exactly two disjoint couples of pairs (spec §4.5's n = 2
/// case): for each of the `C(13,4)` = 715 four-pair subsets, each of the 3
/// ways to split it into two couples, and each of the 2×2 = 4 new
/// regroupings per split, emits a new 26-letter wiring. Deduplicated by
/// wiring string, matching the 4,290-wiring count spec §8 expects.
pub fn permute_by_two_wire_swaps(wiring: &str) -> Vec<String> {
    let pairs = wiring_to_pairs(wiring);
    let mut out = HashSet::new();

    for subset in pairs.iter().copied().combinations(4) {
        let subset_set: HashSet<Pair> = subset.iter().copied().collect();

        // Of the 6 ways to split 4 pairs into two couples, the couple and
        // its complement are the same split counted twice; take the first
        // half (3 of the 6) to get each split once.
        let splits: Vec<(Pair, Pair)> = subset.iter().copied().tuple_combinations().collect();
        for &(s0, s1) in splits.iter().take(splits.len() / 2) {
            let remaining: Vec<Pair> = subset_set
                .iter()
                .copied()
                .filter(|p| *p != s0 && *p != s1)
                .collect();
            let (r0, r1) = (remaining[0], remaining[1]);

            let s_swaps = swap_tuples(s0, s1);
            let r_swaps = swap_tuples(r0, r1);

            let untouched: Vec<Pair> = pairs
                .iter()
                .copied()
                .filter(|p| !subset_set.contains(p))
                .collect();

            for s in &s_swaps {
                for r in &r_swaps {
                    let mut new_pairs = untouched.clone();
                    new_pairs.extend_from_slice(s);
                    new_pairs.extend_from_slice(r);
                    out.insert(pairs_to_wiring(&new_pairs));
                }
            }
        }
    }

    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotor::ReflectorKind;

    fn is_involution_with_no_fixed_points(wiring: &str) -> bool {
        let raw = parse_raw_wiring(wiring).unwrap();
        (0u8..26).all(|i| raw[i as usize] != i && raw[raw[i as usize] as usize] == i)
    }

    #[test]
    fn produces_4290_distinct_wirings() {
        let result = permute_by_two_wire_swaps(ReflectorKind::B.wiring().iter().map(|&i| alphabet::letter_of(i)).collect::<String>().as_str());
        assert_eq!(result.len(), 4290);
    }

    #[test]
    fn every_result_is_a_valid_reflector() {
        let source: String = ReflectorKind::B
            .wiring()
            .iter()
            .map(|&i| alphabet::letter_of(i))
            .collect();
        for wiring in permute_by_two_wire_swaps(&source) {
            assert!(is_involution_with_no_fixed_points(&wiring));
        }
    }

    #[test]
    fn pairs_round_trip_through_wiring_string() {
        let source: String = ReflectorKind::A
            .wiring()
            .iter()
            .map(|&i| alphabet::letter_of(i))
            .collect();
        let pairs = wiring_to_pairs(&source);
        assert_eq!(pairs.len(), 13);
        assert_eq!(pairs_to_wiring(&pairs), source);
    }
}

//! Seed math for single elimination brackets.
//!
//! All functions in this module are pure. They describe the shape of a
//! bracket: how many matches it has, how the round-1 pairings are laid out
//! and where the winner of a match advances to. The generator, the state
//! machine and the reopen cascade all share the mapping defined here.

/// Returns the bracket size required to fit `entrants`.
///
/// The bracket size is the smallest power of two that is greater than or
/// equal to `entrants`. Returns 0 when `entrants` is 0.
#[inline]
pub fn bracket_size(entrants: u64) -> u64 {
    if entrants == 0 {
        0
    } else {
        entrants.next_power_of_two()
    }
}

/// Returns the number of rounds in a bracket of `size`.
///
/// `size` must be a power of two. Returns 0 when `size` is 0 or 1.
#[inline]
pub fn total_rounds(size: u64) -> u64 {
    debug_assert!(size == 0 || size.is_power_of_two());

    if size <= 1 {
        0
    } else {
        size.trailing_zeros() as u64
    }
}

/// Returns the number of matches played in `round` of a bracket of `size`.
///
/// Rounds are 1-indexed: round 1 has `size / 2` matches and every following
/// round halves that, down to a single match in the final round. Returns 0
/// for a round outside of the bracket or a `size` below 2.
#[inline]
pub fn matches_in_round(size: u64, round: u64) -> u64 {
    if size < 2 || round == 0 || round > total_rounds(size) {
        return 0;
    }

    size >> round
}

/// Returns the ordered round-1 seed pairings for a bracket of `size`.
///
/// The base case for a bracket of size 2 is `[(1, 2)]`. Every doubling of
/// the bracket expands each pair `(a, b)` into `(a, size + 1 - a)` and
/// `(b, size + 1 - b)`, keeping the order. Two invariants follow:
/// every pair sums to `size + 1`, and seeds 1 and 2 cannot meet before the
/// final. The index of a pair in the returned `Vec` defines the round-1
/// match position; there is no other tie-break.
///
/// Returns an empty `Vec` when `size` is below 2 or not a power of two.
pub fn seed_pairings(size: u64) -> Vec<(u64, u64)> {
    if size < 2 || !size.is_power_of_two() {
        return Vec::new();
    }

    let mut pairings = vec![(1, 2)];

    let mut current = 2;
    while current < size {
        current *= 2;

        let mut next = Vec::with_capacity(pairings.len() * 2);
        for (a, b) in pairings {
            next.push((a, current + 1 - a));
            next.push((b, current + 1 - b));
        }

        pairings = next;
    }

    pairings
}

/// Returns the position (1-indexed, within the following round) of the match
/// fed by the match at `position`.
#[inline]
pub fn next_match_position(position: u64) -> u64 {
    (position + 1) / 2
}

/// Returns the slot index the winner of the match at `position` advances
/// into: slot 0 for odd positions, slot 1 for even positions.
#[inline]
pub fn next_match_slot(position: u64) -> usize {
    if position % 2 == 1 {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_size() {
        assert_eq!(bracket_size(0), 0);
        assert_eq!(bracket_size(1), 1);
        assert_eq!(bracket_size(2), 2);
        assert_eq!(bracket_size(3), 4);
        assert_eq!(bracket_size(5), 8);
        assert_eq!(bracket_size(8), 8);
        assert_eq!(bracket_size(9), 16);

        // The bracket is the tightest fitting power of two.
        for n in 2..512 {
            let size = bracket_size(n);
            assert!(size.is_power_of_two());
            assert!(size / 2 < n && n <= size);
        }
    }

    #[test]
    fn test_total_rounds() {
        assert_eq!(total_rounds(0), 0);
        assert_eq!(total_rounds(1), 0);
        assert_eq!(total_rounds(2), 1);
        assert_eq!(total_rounds(8), 3);
        assert_eq!(total_rounds(64), 6);
    }

    #[test]
    fn test_matches_in_round() {
        assert_eq!(matches_in_round(8, 1), 4);
        assert_eq!(matches_in_round(8, 2), 2);
        assert_eq!(matches_in_round(8, 3), 1);

        assert_eq!(matches_in_round(8, 0), 0);
        assert_eq!(matches_in_round(8, 4), 0);
        assert_eq!(matches_in_round(1, 1), 0);
        assert_eq!(matches_in_round(0, 1), 0);
    }

    #[test]
    fn test_seed_pairings() {
        assert_eq!(seed_pairings(0), vec![]);
        assert_eq!(seed_pairings(1), vec![]);
        assert_eq!(seed_pairings(6), vec![]);

        assert_eq!(seed_pairings(2), vec![(1, 2)]);
        assert_eq!(seed_pairings(4), vec![(1, 4), (2, 3)]);
        assert_eq!(seed_pairings(8), vec![(1, 8), (4, 5), (2, 7), (3, 6)]);
    }

    #[test]
    fn test_seed_pairings_invariants() {
        for size in [2u64, 4, 8, 16, 32, 64] {
            let pairings = seed_pairings(size);
            assert_eq!(pairings.len() as u64, size / 2);

            let mut seen = std::collections::HashSet::new();
            for (a, b) in &pairings {
                assert_eq!(a + b, size + 1);
                assert!(seen.insert(*a));
                assert!(seen.insert(*b));
            }

            // Seeds 1 and 2 sit in opposite halves and can only meet in the
            // final.
            if size > 2 {
                let first = pairings.iter().position(|&(a, _)| a == 1).unwrap() as u64;
                let second = pairings.iter().position(|&(a, _)| a == 2).unwrap() as u64;
                assert!(first < pairings.len() as u64 / 2);
                assert!(second >= pairings.len() as u64 / 2);
            }
        }
    }

    #[test]
    fn test_advancement_mapping() {
        assert_eq!(next_match_position(1), 1);
        assert_eq!(next_match_position(2), 1);
        assert_eq!(next_match_position(3), 2);
        assert_eq!(next_match_position(4), 2);

        assert_eq!(next_match_slot(1), 0);
        assert_eq!(next_match_slot(2), 1);
        assert_eq!(next_match_slot(3), 0);
    }
}

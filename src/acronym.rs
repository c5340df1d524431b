//! Acronym matching: the query is attempted against the candidate's word-initial letters in
//! order (`"bms"` on `"Bristol-Myers Squibb"`). Shared by the edit-distance phase cascade
//! (where it's the last-resort phase 5) and the Smith-Waterman fallback (tried when the main
//! alignment score misses `min_score`).

use crate::byte_class::{BoundaryClass, is_alpha};

/// Whether `query_lower` is even eligible to be tried as an acronym: non-empty, no longer than
/// `max_len`, and letters only. Short, letters-only is the shape an acronym query actually has;
/// anything else (digits, punctuation, long phrases) isn't a plausible set of initials.
pub fn is_acronym_query(query_lower: &[u8], max_len: usize) -> bool {
    !query_lower.is_empty() && query_lower.len() <= max_len && query_lower.iter().all(|&b| is_alpha(b))
}

/// Collects the positions (and lowercased bytes) of every word-initial byte in the candidate:
/// position 0, or any position whose boundary class is whitespace, delimiter, or camel. `out`
/// and `out_bytes` are cleared and refilled; they're scratch buffers owned by the caller's
/// [`crate::buffer::ScoringBuffer`], reused across candidates.
pub fn find_word_initials(
    candidate_lower: &[u8],
    boundary_class: &[BoundaryClass],
    out: &mut Vec<usize>,
    out_bytes: &mut Vec<u8>,
) {
    out.clear();
    out_bytes.clear();
    for (i, &b) in candidate_lower.iter().enumerate() {
        if boundary_class[i].is_boundary() {
            out.push(i);
            out_bytes.push(b);
        }
    }
}

/// Aligns `query_lower` against the sequence of initial letters, allowing at most
/// `max_misses` single-edit defects (default budget is `max_edit_distance >= 1 ? 1 : 0`, see
/// [`crate::EdConfig::max_edit_distance`]). Returns the number of defects used on success:
/// `0` for an exact initials match, `1` for one missing, one extra, or one substituted
/// initial.
///
/// This treats the initials sequence itself as a tiny string and runs ordinary edit distance
/// against it with a budget of at most one: there's no DP table involved, just three direct
/// single-edit checks, since the budget never exceeds 1.
pub fn acronym_align(query_lower: &[u8], initials: &[u8], max_misses: u32) -> Option<u32> {
    if query_lower == initials {
        return Some(0);
    }
    if max_misses == 0 {
        return None;
    }

    // One extra initial: an insertion into `initials` relative to `query_lower`.
    if initials.len() == query_lower.len() + 1 {
        for k in 0..initials.len() {
            if initials[..k] == query_lower[..k] && initials[k + 1..] == query_lower[k..] {
                return Some(1);
            }
        }
    }

    // One missing initial: a deletion from `initials`, i.e. an extra unmatched query letter.
    if query_lower.len() == initials.len() + 1 {
        for k in 0..query_lower.len() {
            if query_lower[..k] == initials[..k] && query_lower[k + 1..] == initials[k..] {
                return Some(1);
            }
        }
    }

    // One substituted initial.
    if query_lower.len() == initials.len() {
        let mismatches = query_lower
            .iter()
            .zip(initials.iter())
            .filter(|(a, b)| a != b)
            .count();
        if mismatches == 1 {
            return Some(1);
        }
    }

    None
}

/// Scores an acronym alignment in `[0, 1]`: `density` rewards queries that consume most of the
/// candidate's initials (fewer intervening unconsumed words), and each defect used costs a
/// flat fraction of the score. Returns `None` if no alignment within `max_misses` exists, or if
/// the candidate has no initials at all.
pub fn acronym_score(query_lower: &[u8], initials: &[u8], max_misses: u32) -> Option<(f64, u32)> {
    if initials.is_empty() {
        return None;
    }
    let misses = acronym_align(query_lower, initials, max_misses)?;
    let density = query_lower.len() as f64 / initials.len() as f64;
    let score = (density * (1.0 - 0.25 * misses as f64)).clamp(0.0, 1.0);
    Some((score, misses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_class::fill_boundary_classes;

    fn initials_of(candidate: &str) -> (Vec<usize>, Vec<u8>) {
        let raw = candidate.as_bytes();
        let lower: Vec<u8> = raw.iter().copied().map(crate::byte_class::to_lower).collect();
        let mut bc = Vec::new();
        fill_boundary_classes(raw, &mut bc);
        let mut positions = Vec::new();
        let mut bytes = Vec::new();
        find_word_initials(&lower, &bc, &mut positions, &mut bytes);
        (positions, bytes)
    }

    #[test]
    fn test_is_acronym_query() {
        assert!(is_acronym_query(b"bms", 8));
        assert!(!is_acronym_query(b"", 8));
        assert!(!is_acronym_query(b"toolongforacronym", 8));
        assert!(!is_acronym_query(b"b2s", 8));
    }

    #[test]
    fn test_find_word_initials_basic() {
        let (_, bytes) = initials_of("Bristol-Myers Squibb");
        assert_eq!(bytes, b"bms");
    }

    #[test]
    fn test_find_word_initials_camel() {
        // get / User / By / Id
        let (_, bytes) = initials_of("getUserById");
        assert_eq!(bytes, b"gubi");
    }

    #[test]
    fn test_acronym_align_exact() {
        assert_eq!(acronym_align(b"bms", b"bms", 0), Some(0));
        assert_eq!(acronym_align(b"bms", b"bmx", 0), None);
    }

    #[test]
    fn test_acronym_align_one_missing_initial() {
        // query has a letter the initials don't (candidate is missing a word).
        assert_eq!(acronym_align(b"bms", b"bs", 1), Some(1));
        assert_eq!(acronym_align(b"bms", b"bs", 0), None);
    }

    #[test]
    fn test_acronym_align_one_extra_initial() {
        assert_eq!(acronym_align(b"bs", b"bms", 1), Some(1));
    }

    #[test]
    fn test_acronym_align_one_substitution() {
        assert_eq!(acronym_align(b"bms", b"bks", 1), Some(1));
    }

    #[test]
    fn test_acronym_score_density() {
        let (score_exact, misses_exact) = acronym_score(b"bms", b"bms", 0).unwrap();
        assert_eq!(misses_exact, 0);
        assert!((score_exact - 1.0).abs() < 1e-9);

        let (score_partial, misses_partial) = acronym_score(b"bs", b"bms", 1).unwrap();
        assert_eq!(misses_partial, 1);
        assert!(score_partial < score_exact);
    }

    #[test]
    fn test_acronym_score_no_initials() {
        assert!(acronym_score(b"a", b"", 1).is_none());
    }
}

//! Three independent, cheapest-first rejection tests that run before either scorer touches its
//! DP tables. Each is O(1) or O(n) and each is sound: none of them may reject a candidate that
//! a phase matcher would otherwise accept. Run via [`crate::dispatcher`], not usually called
//! directly.

use crate::AlgorithmConfig;
use crate::byte_class::class_bit_index;
use crate::query::{PreparedQuery, TrigramMultiset};

/// The maximum number of edits a candidate could need and still be admitted, for the given
/// query length and algorithm. In edit-distance mode this is `max_edit_distance` (or the long-
/// query variant). Smith-Waterman has no edit cap of its own: a perfectly placed match can
/// tolerate arbitrarily many surrounding typos as long as the normalized score clears
/// `min_score`, so it's treated as unbounded (the query's own length, which can never be
/// exceeded meaningfully by a useful edit count).
pub fn max_permitted_edits(query_len: usize, algorithm: &AlgorithmConfig) -> u32 {
    match algorithm {
        AlgorithmConfig::EditDistance(cfg) => {
            if query_len >= cfg.long_query_threshold {
                cfg.long_query_max_edit_distance
            } else {
                cfg.max_edit_distance
            }
        }
        AlgorithmConfig::SmithWaterman(_) => query_len as u32,
    }
}

/// Length prefilter: rejects candidates too short to possibly contain the query within
/// `max_edits` edits, and, in edit-distance mode only, candidates so long that the length
/// penalty alone would push even a theoretically perfect match below `min_score`.
///
/// The long-candidate half of this check only applies to edit-distance mode: Smith-Waterman's
/// normalized score isn't structurally penalized by unrelated trailing bytes in the candidate,
/// so no finite candidate length can be ruled out up front.
pub fn length_prefilter_pass(
    query_len: usize,
    candidate_len: usize,
    max_edits: u32,
    min_score: f64,
    algorithm: &AlgorithmConfig,
) -> bool {
    if candidate_len + max_edits as usize < query_len {
        return false;
    }

    if let AlgorithmConfig::EditDistance(cfg) = algorithm {
        if candidate_len > query_len && cfg.length_penalty > 0.0 {
            let max_base = cfg
                .prefix_weight
                .max(cfg.substring_weight)
                .max(cfg.acronym_weight);
            let headroom =
                max_base + cfg.word_boundary_bonus + cfg.consecutive_bonus + cfg.first_match_bonus;
            let extra = (candidate_len - query_len) as f64;
            if headroom - cfg.length_penalty * extra < min_score {
                return false;
            }
        }
    }

    true
}

/// Computes the 37-bit character-class mask of a (already-lowercased) candidate.
pub fn candidate_bitmask(candidate_lower: &[u8]) -> u64 {
    let mut mask = 0u64;
    for &b in candidate_lower {
        mask |= 1u64 << class_bit_index(b);
    }
    mask
}

/// Bitmask prefilter: each character class present in the query but absent from the candidate
/// costs at least one edit, so if more classes are missing than `max_edits` allows, no
/// alignment within budget is possible.
pub fn bitmask_prefilter_pass(query_mask: u64, candidate_mask: u64, max_edits: u32) -> bool {
    let missing = query_mask & !candidate_mask;
    missing.count_ones() <= max_edits
}

/// Trigram prefilter: skipped (always passes) for queries shorter than 3 bytes, since a
/// trigram multiset carries no information about them. Rebuilds the candidate's trigram
/// multiset into `scratch` (cleared first, capacity reused across calls) and rejects if too
/// few trigrams survive the allowed edit budget to have come from the query.
pub fn trigram_prefilter_pass(
    query: &PreparedQuery,
    candidate_lower: &[u8],
    max_edits: u32,
    scratch: &mut TrigramMultiset,
) -> bool {
    if query.len() < 3 {
        return true;
    }

    scratch.clear();
    if candidate_lower.len() >= 3 {
        for window in candidate_lower.windows(3) {
            let key = [window[0], window[1], window[2]];
            *scratch.entry(key).or_insert(0) += 1;
        }
    }

    let mut intersection: u32 = 0;
    for (key, &q_count) in query.trigrams.iter() {
        let c_count = scratch.get(key).copied().unwrap_or(0);
        intersection += q_count.min(c_count);
    }

    let threshold = (query.len() as i64 - 2 - (max_edits as i64) * 3).max(0) as u32;
    intersection >= threshold
}

//! Smith-Waterman local-alignment scorer: a single dynamic-programming pass over the whole
//! candidate, with FZY/FZF-style position bonuses (word boundaries, consecutive runs,
//! capitalization) instead of DNA-alignment substitution matrices. Good for matching queries
//! against identifiers and paths, where a match lands matters more than how many edits it
//! took to get there.

use crate::acronym::{acronym_score, find_word_initials, is_acronym_query};
use crate::buffer::ScoringBuffer;
use crate::byte_class::BoundaryClass;
use crate::query::PreparedQuery;
use crate::{MatchKind, ScoredMatch, SwConfig};

/// Acronym queries longer than this are never attempted as fallback matches. Edit-distance mode
/// exposes this as `EdConfig::acronym_max_len`; Smith-Waterman has no analogous config field, so
/// the same default is hardcoded here.
const ACRONYM_MAX_LEN: usize = 8;
/// Edit budget for the acronym fallback's one-off mismatch tolerance, matching the edit-distance
/// cascade's default behavior when `max_edit_distance >= 1`.
const ACRONYM_MAX_MISSES: u32 = 1;

/// The headroom factor in `max_possible(n) = n * score_match * k` that keeps an exact,
/// boundary-aligned prefix match just under 1.0 rather than clamped flat against it. Any value
/// in `[2, 4]` is reasonable per the calibration this crate uses; `3` is the pinned choice.
const NORMALIZATION_K: f64 = 3.0;

#[inline]
fn boundary_bonus(class: BoundaryClass, cfg: &SwConfig) -> i32 {
    match class {
        BoundaryClass::None => 0,
        BoundaryClass::Head => cfg.bonus_boundary,
        BoundaryClass::Whitespace => cfg.bonus_boundary_whitespace,
        BoundaryClass::Delimiter => cfg.bonus_boundary_delimiter,
        BoundaryClass::Camel => cfg.bonus_camel_case,
    }
}

fn max_possible(query_len: usize, cfg: &SwConfig) -> f64 {
    query_len as f64 * cfg.score_match as f64 * NORMALIZATION_K
}

/// Runs the single-pass local-alignment DP for one query (or atom) against one already-
/// lowercased, already-classified candidate living in `buffer.lower_candidate[..candidate_len]` /
/// `buffer.boundary_class[..candidate_len]`. Returns the raw (un-normalized) best alignment
/// score, or `None` if it's `<= 0`.
fn align_raw(
    query_lower: &[u8],
    candidate_len: usize,
    cfg: &SwConfig,
    buffer: &mut ScoringBuffer,
) -> Option<i32> {
    let qlen = query_lower.len();
    let clen = candidate_len;
    if qlen == 0 || clen == 0 {
        return None;
    }

    buffer.ensure_capacity(qlen, clen);

    buffer.sw_row_prev[..=clen].fill(0);
    buffer.sw_row_curr[..=clen].fill(0);
    buffer.sw_d_prev[..=clen].fill(0);
    buffer.sw_d_curr[..=clen].fill(0);
    buffer.sw_matched_prev[..=clen].fill(false);
    buffer.sw_matched_curr[..=clen].fill(false);

    let mut all_time_max = 0i32;

    for i in 1..=qlen {
        let qb = query_lower[i - 1];
        buffer.sw_matched_curr[0] = false;

        for j in 1..=clen {
            let is_match = qb == buffer.lower_candidate[j - 1];

            let match_term = if is_match {
                let base = cfg.score_match
                    + boundary_bonus(buffer.boundary_class[j - 1], cfg)
                    + if buffer.sw_matched_prev[j - 1] { cfg.bonus_consecutive } else { 0 };
                if i == 1 { base * cfg.bonus_first_char_multiplier } else { base }
            } else {
                0
            };

            let diag = buffer.sw_row_prev[j - 1] + match_term;
            let vert = buffer.sw_d_prev[j] - cfg.penalty_gap_extend;
            let horiz = buffer.sw_row_curr[j - 1] - cfg.penalty_gap_start;

            buffer.sw_d_curr[j] = (buffer.sw_row_prev[j] - cfg.penalty_gap_start)
                .max(buffer.sw_d_prev[j] - cfg.penalty_gap_extend);

            let best = 0.max(diag).max(vert).max(horiz);
            buffer.sw_row_curr[j] = best;
            buffer.sw_matched_curr[j] = is_match && best == diag;

            all_time_max = all_time_max.max(best);
        }

        std::mem::swap(&mut buffer.sw_row_prev, &mut buffer.sw_row_curr);
        std::mem::swap(&mut buffer.sw_d_prev, &mut buffer.sw_d_curr);
        std::mem::swap(&mut buffer.sw_matched_prev, &mut buffer.sw_matched_curr);
    }

    if all_time_max <= 0 {
        None
    } else {
        Some(all_time_max)
    }
}

/// Scores one query (already split into atoms if applicable) against one candidate, combining
/// the main local-alignment pass with the acronym fallback, per the crate's matching semantics.
pub fn score(
    query: &PreparedQuery,
    candidate_len: usize,
    cfg: &SwConfig,
    min_score: f64,
    buffer: &mut ScoringBuffer,
) -> Option<ScoredMatch> {
    if query.is_empty() || candidate_len == 0 {
        return None;
    }

    let primary = match &query.atoms {
        Some(atoms) if !atoms.is_empty() => score_atoms(atoms, candidate_len, cfg, buffer),
        _ => {
            let raw = align_raw(&query.lower, candidate_len, cfg, buffer)?;
            let normalized = (raw as f64 / max_possible(query.lower.len(), cfg)).clamp(0.0, 1.0);
            Some(normalized)
        }
    };

    if let Some(score_value) = primary {
        if score_value >= min_score {
            return Some(ScoredMatch {
                score: score_value,
                kind: MatchKind::Alignment,
            });
        }
    }

    // Fallback: try the acronym matcher and keep it if it clears `min_score`, even when it
    // beats a primary score that didn't.
    if is_acronym_query(&query.lower, ACRONYM_MAX_LEN) {
        find_word_initials(
            &buffer.lower_candidate[..candidate_len],
            &buffer.boundary_class[..candidate_len],
            &mut buffer.acronym_initials,
            &mut buffer.acronym_initial_bytes,
        );
        if let Some((acronym_value, _misses)) =
            acronym_score(&query.lower, &buffer.acronym_initial_bytes, ACRONYM_MAX_MISSES)
        {
            let better = primary.map(|p| acronym_value > p).unwrap_or(true);
            if better && acronym_value >= min_score {
                return Some(ScoredMatch {
                    score: acronym_value,
                    kind: MatchKind::Acronym,
                });
            }
        }
    }

    None
}

/// Sums per-atom raw scores and per-atom maxima, then normalizes once at the end, rather than
/// averaging independently normalized per-atom scores. Rejects the whole match if any atom
/// fails to align at all (raw score of zero): a query split into words is only a good match if
/// every word found a home somewhere in the candidate.
fn score_atoms(
    atoms: &[PreparedQuery],
    candidate_len: usize,
    cfg: &SwConfig,
    buffer: &mut ScoringBuffer,
) -> Option<f64> {
    let mut raw_sum = 0.0;
    let mut max_sum = 0.0;
    for atom in atoms {
        let raw = align_raw(&atom.lower, candidate_len, cfg, buffer)?;
        raw_sum += raw as f64;
        max_sum += max_possible(atom.lower.len(), cfg);
    }
    if max_sum <= 0.0 {
        return None;
    }
    Some((raw_sum / max_sum).clamp(0.0, 1.0))
}

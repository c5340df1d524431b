//! Edit-distance mode: a five-phase cascade (exact -> prefix -> substring -> Damerau-
//! Levenshtein subsequence fit -> acronym). Exact wins outright. Prefix, substring, and
//! subsequence-fit are otherwise all comparable raw scores: all three are computed and the
//! highest-scoring one is kept (the "best-of" rule), explicitly, rather than assuming prefix
//! wins just because it comes first. Acronym is the last resort, tried whenever nothing above
//! clears `min_score`.

use crate::acronym::{acronym_score, find_word_initials, is_acronym_query};
use crate::buffer::{EdOp, ScoringBuffer};
use crate::byte_class::BoundaryClass;
use crate::query::PreparedQuery;
use crate::{EdConfig, GapPenalty, MatchKind, ScoredMatch};

/// A phase's match expressed as candidate byte positions consumed by the query, so the bonus
/// scorer can apply word-boundary, consecutive-match, gap and first-match bonuses uniformly
/// regardless of which phase produced it.
struct Alignment<'a> {
    start: usize,
    /// Ascending candidate byte positions that were aligned against a query byte (matches and
    /// substitutions both count; inserted/skipped candidate bytes do not).
    matched_positions: &'a [usize],
    total_gap_bytes: u32,
    gap_count: u32,
}

fn bonus_score(
    base_raw: f64,
    alignment: &Alignment,
    boundary_class: &[BoundaryClass],
    query_len: usize,
    candidate_len: usize,
    cfg: &EdConfig,
) -> f64 {
    let mut score = base_raw;

    for &pos in alignment.matched_positions {
        if boundary_class[pos].is_boundary() {
            score += cfg.word_boundary_bonus;
        }
    }
    for pair in alignment.matched_positions.windows(2) {
        if pair[1] == pair[0] + 1 {
            score += cfg.consecutive_bonus;
        }
    }

    match &cfg.gap_penalty {
        GapPenalty::Linear { per } => score -= per * alignment.total_gap_bytes as f64,
        GapPenalty::Affine { open, extend } => {
            let gaps = alignment.gap_count as f64;
            let total = alignment.total_gap_bytes as f64;
            score -= open * gaps + extend * (total - gaps).max(0.0);
        }
    }

    if alignment.start < cfg.first_match_bonus_range {
        score +=
            cfg.first_match_bonus * (1.0 - alignment.start as f64 / cfg.first_match_bonus_range as f64);
    }

    if candidate_len > query_len {
        score -= cfg.length_penalty * (candidate_len - query_len) as f64;
    }

    score.clamp(0.0, 1.0)
}

/// How much a match's base score shrinks as the candidate grows past the query: `sqrt(q/c)`.
/// Only prefix and substring use this: the subsequence-fit phase's raw score is already a
/// function of edit distance relative to query length and doesn't need it.
fn length_factor(query_len: usize, candidate_len: usize) -> f64 {
    if candidate_len == 0 {
        return 1.0;
    }
    (query_len as f64 / candidate_len as f64).sqrt()
}

fn fill_contiguous(buf: &mut Vec<usize>, start: usize, len: usize) {
    buf.clear();
    buf.extend(start..start + len);
}

fn find_substring_pos(candidate: &[u8], query: &[u8]) -> Option<usize> {
    if query.is_empty() || candidate.len() < query.len() {
        return None;
    }
    (1..=(candidate.len() - query.len())).find(|&p| candidate[*p..p + query.len()] == *query)
}

/// Max Damerau-Levenshtein distance the subsequence-fit phase will accept for this query
/// length, per [`EdConfig::long_query_threshold`].
fn edit_cap(query_len: usize, cfg: &EdConfig) -> u32 {
    if query_len >= cfg.long_query_threshold {
        cfg.long_query_max_edit_distance
    } else {
        cfg.max_edit_distance
    }
}

/// Runs the Damerau-Levenshtein "fit" DP: the minimum-cost alignment of the whole query
/// against any substring of the candidate (free leading skip on row 0). Returns the raw score,
/// scaled by `substring_weight`, and the alignment it was built from, or `None` if the best
/// fit exceeds `edit_cap`. Reads the candidate from `buffer.lower_candidate`, already filled in
/// by the dispatcher; `candidate_len` is its length.
fn subsequence_phase(
    query: &PreparedQuery,
    candidate_len: usize,
    cfg: &EdConfig,
    buffer: &mut ScoringBuffer,
) -> Option<f64> {
    let q = query.lower.as_slice();
    let qlen = q.len();
    let clen = candidate_len;
    if qlen == 0 {
        return None;
    }

    buffer.ensure_capacity(qlen, clen);
    let stride = buffer.ed_stride();
    let idx = |i: usize, j: usize| i * stride + j;

    // Row 0: free leading skip.
    for j in 0..=clen {
        buffer.ed_dist[idx(0, j)] = 0.0;
        buffer.ed_op[idx(0, j)] = EdOp::FreeSkip;
    }
    // Column 0, rows >= 1: all-deletion cost.
    for i in 1..=qlen {
        buffer.ed_dist[idx(i, 0)] = i as f64;
        buffer.ed_op[idx(i, 0)] = EdOp::Delete;
    }

    for i in 1..=qlen {
        for j in 1..=clen {
            let is_match = q[i - 1] == buffer.lower_candidate[j - 1];
            let sub_cost = buffer.ed_dist[idx(i - 1, j - 1)] + if is_match { 0.0 } else { 1.0 };
            let del_cost = buffer.ed_dist[idx(i - 1, j)] + 1.0;
            let ins_cost = buffer.ed_dist[idx(i, j - 1)] + 1.0;

            let mut best = sub_cost;
            let mut op = if is_match { EdOp::Match } else { EdOp::Substitute };

            if i >= 2
                && j >= 2
                && q[i - 1] == buffer.lower_candidate[j - 2]
                && q[i - 2] == buffer.lower_candidate[j - 1]
            {
                let trans_cost = buffer.ed_dist[idx(i - 2, j - 2)] + 1.0;
                if trans_cost < best {
                    best = trans_cost;
                    op = EdOp::Transpose;
                }
            }
            if del_cost < best {
                best = del_cost;
                op = EdOp::Delete;
            }
            if ins_cost < best {
                best = ins_cost;
                op = EdOp::Insert;
            }

            buffer.ed_dist[idx(i, j)] = best;
            buffer.ed_op[idx(i, j)] = op;
        }
    }

    let mut best_j = 0usize;
    let mut best_d = buffer.ed_dist[idx(qlen, 0)];
    for j in 1..=clen {
        let d = buffer.ed_dist[idx(qlen, j)];
        if d < best_d {
            best_d = d;
            best_j = j;
        }
    }

    let cap = edit_cap(qlen, cfg) as f64;
    if best_d > cap {
        return None;
    }

    // Backtrack from (qlen, best_j) to recover the alignment.
    buffer.ed_matches.clear();
    let mut i = qlen;
    let mut j = best_j;
    let mut total_gap_bytes = 0u32;
    let mut gap_count = 0u32;
    let mut gap_run = false;
    let start = loop {
        if i == 0 {
            break j;
        }
        match buffer.ed_op[idx(i, j)] {
            EdOp::Start | EdOp::FreeSkip => break j,
            EdOp::Match | EdOp::Substitute => {
                buffer.ed_matches.push(j - 1);
                gap_run = false;
                i -= 1;
                j -= 1;
            }
            EdOp::Transpose => {
                buffer.ed_matches.push(j - 1);
                buffer.ed_matches.push(j - 2);
                gap_run = false;
                i -= 2;
                j -= 2;
            }
            EdOp::Delete => {
                i -= 1;
            }
            EdOp::Insert => {
                if !gap_run {
                    gap_count += 1;
                    gap_run = true;
                }
                total_gap_bytes += 1;
                j -= 1;
            }
        }
    };
    buffer.ed_matches.reverse();

    let raw = cfg.substring_weight * (1.0 - best_d / qlen as f64);
    let alignment = Alignment {
        start,
        matched_positions: &buffer.ed_matches,
        total_gap_bytes,
        gap_count,
    };
    Some(bonus_score(raw, &alignment, &buffer.boundary_class[..clen], qlen, clen, cfg))
}

/// Runs the five-phase edit-distance cascade against one already-lowercased, already-classified
/// candidate living in `buffer.lower_candidate[..candidate_len]` /
/// `buffer.boundary_class[..candidate_len]` (filled in by the dispatcher before this is called).
pub fn score(
    query: &PreparedQuery,
    candidate_len: usize,
    cfg: &EdConfig,
    min_score: f64,
    buffer: &mut ScoringBuffer,
) -> Option<ScoredMatch> {
    let q = query.lower.as_slice();
    if q.is_empty() {
        return None;
    }
    let clen = candidate_len;

    // Phase 1: exact.
    if buffer.lower_candidate[..clen] == *q {
        return Some(ScoredMatch {
            score: 1.0,
            kind: MatchKind::Exact,
        });
    }

    // Phase 2: prefix. Only a candidate score for now; whether it actually wins is decided
    // below by explicit comparison against substring and subsequence-fit, per the cascade's
    // best-of rule.
    let prefix_score = if clen >= q.len() && buffer.lower_candidate[..q.len()] == *q {
        fill_contiguous(&mut buffer.ed_matches, 0, q.len());
        let alignment = Alignment {
            start: 0,
            matched_positions: &buffer.ed_matches,
            total_gap_bytes: 0,
            gap_count: 0,
        };
        let raw = cfg.prefix_weight * length_factor(q.len(), clen);
        Some(bonus_score(raw, &alignment, &buffer.boundary_class[..clen], q.len(), clen, cfg))
    } else {
        None
    };

    // Phases 3 & 4: substring and subsequence-fit.
    let substring_pos = find_substring_pos(&buffer.lower_candidate[..clen], q);
    let substring_score = substring_pos.map(|p| {
        fill_contiguous(&mut buffer.ed_matches, p, q.len());
        let alignment = Alignment {
            start: p,
            matched_positions: &buffer.ed_matches,
            total_gap_bytes: 0,
            gap_count: 0,
        };
        bonus_score(
            cfg.substring_weight * length_factor(q.len(), clen),
            &alignment,
            &buffer.boundary_class[..clen],
            q.len(),
            clen,
            cfg,
        )
    });

    let subsequence_score = subsequence_phase(query, clen, cfg, buffer);

    // Best-of: prefix, substring, and subsequence-fit are all directly comparable raw-plus-
    // bonus scores, so the highest one present wins. Ties favor the earlier phase in cascade
    // order (prefix over substring over subsequence-fit).
    let mut best: Option<(f64, MatchKind)> = None;
    for (candidate_score, kind) in [
        (prefix_score, MatchKind::Prefix),
        (substring_score, MatchKind::Substring),
        (subsequence_score, MatchKind::Alignment),
    ] {
        if let Some(s) = candidate_score {
            if best.is_none_or(|(best_score, _)| s > best_score) {
                best = Some((s, kind));
            }
        }
    }
    if let Some((score_value, kind)) = best {
        if score_value >= min_score {
            return Some(ScoredMatch {
                score: score_value,
                kind,
            });
        }
    }

    // Phase 5: acronym, last resort, tried whenever nothing above cleared `min_score`.
    if is_acronym_query(q, cfg.acronym_max_len) {
        find_word_initials(
            &buffer.lower_candidate[..clen],
            &buffer.boundary_class[..clen],
            &mut buffer.acronym_initials,
            &mut buffer.acronym_initial_bytes,
        );
        let max_misses = if cfg.max_edit_distance >= 1 { 1 } else { 0 };
        if let Some((density_score, _misses)) =
            acronym_score(q, &buffer.acronym_initial_bytes, max_misses)
        {
            let raw = cfg.acronym_weight * density_score;
            let mut score_value = raw;
            if clen > q.len() {
                score_value -= cfg.length_penalty * (clen - q.len()) as f64;
            }
            let score_value = score_value.clamp(0.0, 1.0);
            if score_value >= min_score {
                return Some(ScoredMatch {
                    score: score_value,
                    kind: MatchKind::Acronym,
                });
            }
        }
    }

    None
}

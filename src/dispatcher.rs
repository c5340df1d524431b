//! Entry point tying prefilters and scorers together, plus thin allocating wrappers over a
//! whole candidate list. [`FuzzyMatcher`] is the long-lived, read-only half (config, and in SW
//! mode whichever atom-splitting policy that implies); [`ScoringBuffer`] is the short-lived,
//! exclusively-owned half. One matcher can be shared across any number of threads, each with
//! its own buffer.

#[cfg(feature = "parallel_sort")]
use rayon::prelude::*;

use crate::buffer::ScoringBuffer;
use crate::prefilter::{
    bitmask_prefilter_pass, candidate_bitmask, length_prefilter_pass, max_permitted_edits,
    trigram_prefilter_pass,
};
use crate::query::PreparedQuery;
use crate::{AlgorithmConfig, MatchConfig, ScoredMatch, edit_distance, smith_waterman};

/// Holds the active algorithm and `min_score` floor. Immutable once built; safe to share across
/// worker threads via `&FuzzyMatcher`.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    config: MatchConfig,
}

impl FuzzyMatcher {
    pub fn new(config: MatchConfig) -> Self {
        FuzzyMatcher { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Prepares a query for repeated scoring against many candidates. In Smith-Waterman mode
    /// with `split_spaces` on, this also splits the query into atoms.
    pub fn prepare(&self, query: &[u8]) -> PreparedQuery {
        let base = PreparedQuery::prepare_base(query);
        match &self.config.algorithm {
            AlgorithmConfig::SmithWaterman(cfg) if cfg.split_spaces => base.with_atoms(),
            _ => base,
        }
    }

    /// Allocates a fresh scoring buffer. Call once per worker thread and reuse it for every
    /// candidate that thread scores.
    pub fn make_buffer(&self) -> ScoringBuffer {
        ScoringBuffer::new()
    }

    /// Scores one candidate: lowercase into the buffer, run the three prefilters, classify
    /// boundaries, then dispatch to the configured scorer. Returns `None` if any prefilter
    /// rejects the candidate, if the scorer itself finds no qualifying match, or if the match
    /// it finds scores below `min_score`.
    pub fn score(
        &self,
        candidate: &[u8],
        query: &PreparedQuery,
        buffer: &mut ScoringBuffer,
    ) -> Option<ScoredMatch> {
        if query.is_empty() {
            return None;
        }

        let max_edits = max_permitted_edits(query.len(), &self.config.algorithm);
        if !length_prefilter_pass(
            query.len(),
            candidate.len(),
            max_edits,
            self.config.min_score,
            &self.config.algorithm,
        ) {
            return None;
        }

        buffer.lower_candidate_into(query.len(), candidate);
        let candidate_len = candidate.len();

        let candidate_mask = candidate_bitmask(&buffer.lower_candidate[..candidate_len]);
        if !bitmask_prefilter_pass(query.bitmask, candidate_mask, max_edits) {
            return None;
        }

        if !trigram_prefilter_pass(
            query,
            &buffer.lower_candidate[..candidate_len],
            max_edits,
            &mut buffer.candidate_trigrams,
        ) {
            return None;
        }

        buffer.fill_boundary(candidate);

        match &self.config.algorithm {
            AlgorithmConfig::EditDistance(cfg) => {
                edit_distance::score(query, candidate_len, cfg, self.config.min_score, buffer)
            }
            AlgorithmConfig::SmithWaterman(cfg) => {
                smith_waterman::score(query, candidate_len, cfg, self.config.min_score, buffer)
            }
        }
    }
}

/// One scored candidate out of a list, identified by its index into the original slice rather
/// than by an owned copy of the string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedMatch {
    pub index: usize,
    pub score: f64,
    pub kind: crate::MatchKind,
}

/// Scores every candidate in `haystacks` against `query`, keeping only the ones that clear
/// `matcher`'s `min_score`. Allocates a fresh [`ScoringBuffer`] for the call; for repeated
/// queries against the same list, prefer building a buffer once and calling
/// [`FuzzyMatcher::score`] directly in a loop.
pub fn matches<S: AsRef<[u8]>>(
    matcher: &FuzzyMatcher,
    query: &str,
    haystacks: &[S],
) -> Vec<IndexedMatch> {
    let prepared = matcher.prepare(query.as_bytes());
    let mut buffer = matcher.make_buffer();

    haystacks
        .iter()
        .enumerate()
        .filter_map(|(index, haystack)| {
            matcher
                .score(haystack.as_ref(), &prepared, &mut buffer)
                .map(|m| IndexedMatch {
                    index,
                    score: m.score,
                    kind: m.kind,
                })
        })
        .collect()
}

fn rank(a: &IndexedMatch, b: &IndexedMatch) -> std::cmp::Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| a.index.cmp(&b.index))
}

/// Like [`matches`], but keeps only the `limit` highest-scoring matches, sorted best first.
/// Ties break by ascending original index, so the result order is stable across runs. Sorts in
/// parallel via `rayon` when the `parallel_sort` feature is on (the default), matching how the
/// teacher's own `one_shot::match_list` switches between `par_sort_unstable`/`sort_unstable`.
pub fn top_matches<S: AsRef<[u8]>>(
    matcher: &FuzzyMatcher,
    query: &str,
    haystacks: &[S],
    limit: usize,
) -> Vec<IndexedMatch> {
    let mut all = matches(matcher, query, haystacks);
    #[cfg(feature = "parallel_sort")]
    all.par_sort_unstable_by(rank);
    #[cfg(not(feature = "parallel_sort"))]
    all.sort_unstable_by(rank);
    all.truncate(limit);
    all
}

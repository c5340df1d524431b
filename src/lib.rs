//! A fuzzy string matching engine built for interactive search UIs and programmatic ranking
//! over corpora of hundreds of thousands of strings, where scoring latency per candidate is
//! the dominant cost. Given a short query and a candidate string, [`FuzzyMatcher::score`]
//! returns either nothing (candidate rejected) or a normalized score in `[0.0, 1.0]` together
//! with a [`MatchKind`] describing how the match arose: exact, prefix, substring, acronym, or
//! local-alignment.
//!
//! Two scoring algorithms are available, selected via [`AlgorithmConfig`]:
//! - **Edit distance** ([`EdConfig`]): a phase cascade (exact -> prefix -> substring ->
//!   Damerau-Levenshtein subsequence fit -> acronym), good for typo-tolerant matching against
//!   short-to-medium candidates.
//! - **Smith-Waterman** ([`SwConfig`]): a single local-alignment pass with FZY-style position
//!   bonuses, good for matching against identifiers and paths where word-boundary structure
//!   matters more than edit count.
//!
//! Matching operates on bytes with ASCII-class case folding; it does not attempt
//! Unicode-correct collation or locale-aware folding. Non-ASCII bytes are treated as opaque,
//! distinct units.
//!
//! # Example
//!
//! ```
//! use fuzzmatch::{AlgorithmConfig, FuzzyMatcher, MatchConfig, EdConfig};
//!
//! let config = MatchConfig {
//!     min_score: 0.3,
//!     algorithm: AlgorithmConfig::EditDistance(EdConfig::default()),
//! };
//! let matcher = FuzzyMatcher::new(config);
//!
//! let query = matcher.prepare(b"user");
//! let mut buffer = matcher.make_buffer();
//!
//! let m = matcher.score(b"getCurrentUser", &query, &mut buffer).unwrap();
//! assert!(m.score > 0.0);
//! ```
//!
//! # Example: scoring a list and keeping only the best matches
//!
//! ```
//! use fuzzmatch::{AlgorithmConfig, FuzzyMatcher, MatchConfig, EdConfig, top_matches};
//!
//! let config = MatchConfig {
//!     min_score: 0.3,
//!     algorithm: AlgorithmConfig::EditDistance(EdConfig::default()),
//! };
//! let matcher = FuzzyMatcher::new(config);
//! let candidates = ["getUserById", "deleteUser", "listOrders"];
//!
//! let best = top_matches(&matcher, "user", &candidates, 2);
//! assert!(best.len() <= 2);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod acronym;
pub mod buffer;
pub mod byte_class;
mod dispatcher;
pub mod edit_distance;
pub mod prefilter;
pub mod query;
pub mod smith_waterman;

pub use buffer::ScoringBuffer;
pub use dispatcher::{FuzzyMatcher, IndexedMatch, matches, top_matches};
pub use query::PreparedQuery;

/// How a match arose. Reported alongside the score so callers can apply their own tie-breaks
/// or render a different UI affordance per kind (e.g. bold the matched prefix).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatchKind {
    /// Candidate equals the query exactly (case-insensitively).
    Exact,
    /// Candidate starts with the query.
    Prefix,
    /// Query occurs as a contiguous run inside the candidate, not at position 0.
    Substring,
    /// Query matched the candidate's word-initial letters (e.g. `"bms"` on
    /// `"Bristol-Myers Squibb"`).
    Acronym,
    /// Query matched via Damerau-Levenshtein subsequence fit (edit-distance mode) or
    /// Smith-Waterman local alignment (SW mode).
    Alignment,
}

/// The result of a successful [`FuzzyMatcher::score`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoredMatch {
    /// Normalized score in `[0.0, 1.0]`. Higher is a better match.
    pub score: f64,
    pub kind: MatchKind,
}

/// Top-level, immutable configuration for a [`FuzzyMatcher`]. Shared read-only across every
/// worker thread's scoring calls.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchConfig {
    /// Matches scoring below this floor are reported as `None` instead of `Some`. Collapses
    /// "prefilter rejected", "edit distance over cap" and "score too low" into one outcome.
    pub min_score: f64,
    pub algorithm: AlgorithmConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            min_score: 0.0,
            algorithm: AlgorithmConfig::EditDistance(EdConfig::default()),
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AlgorithmConfig {
    EditDistance(EdConfig),
    SmithWaterman(SwConfig),
}

/// How a multi-byte gap inside a matched alignment is penalized.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GapPenalty {
    /// `per * total_gap_bytes`.
    Linear { per: f64 },
    /// `open * #gaps + extend * (total_gap_bytes - #gaps)`.
    Affine { open: f64, extend: f64 },
}

/// Configuration for edit-distance mode scoring. Defaults match the values documented in the
/// spec this crate implements.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdConfig {
    /// Maximum Damerau-Levenshtein distance the subsequence-fit phase will accept.
    pub max_edit_distance: u32,
    /// Relaxed cap used once the query is at least `long_query_threshold` bytes long.
    pub long_query_max_edit_distance: u32,
    pub long_query_threshold: usize,

    /// Multiplier applied to a prefix match's base score (before bonuses).
    pub prefix_weight: f64,
    /// Multiplier applied to a substring match's base score.
    pub substring_weight: f64,
    /// Multiplier applied to an acronym match's base score.
    pub acronym_weight: f64,

    pub word_boundary_bonus: f64,
    pub consecutive_bonus: f64,
    pub gap_penalty: GapPenalty,

    /// Bonus for a match starting within `first_match_bonus_range` bytes of the candidate
    /// start, tapering linearly to 0 at the edge of the range.
    pub first_match_bonus: f64,
    pub first_match_bonus_range: usize,

    /// Per-byte penalty for each candidate byte beyond the query's length.
    pub length_penalty: f64,

    /// Queries longer than this are never attempted as acronyms (the acronym phase is for
    /// short, letters-only queries by construction).
    pub acronym_max_len: usize,
}

impl Default for EdConfig {
    fn default() -> Self {
        EdConfig {
            max_edit_distance: 2,
            long_query_max_edit_distance: 3,
            long_query_threshold: 13,
            prefix_weight: 1.5,
            substring_weight: 1.0,
            acronym_weight: 1.0,
            word_boundary_bonus: 0.1,
            consecutive_bonus: 0.05,
            gap_penalty: GapPenalty::Affine {
                open: 0.03,
                extend: 0.005,
            },
            first_match_bonus: 0.15,
            first_match_bonus_range: 10,
            length_penalty: 0.003,
            acronym_max_len: 8,
        }
    }
}

/// Configuration for Smith-Waterman local-alignment scoring. All scoring fields are integers;
/// the DP runs in fixed-point arithmetic and is only converted to a `f64` score at the very
/// end, per byte position bonuses modeled on FZY/FZF.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwConfig {
    pub score_match: i32,
    pub penalty_gap_start: i32,
    pub penalty_gap_extend: i32,

    pub bonus_consecutive: i32,
    pub bonus_boundary: i32,
    pub bonus_boundary_whitespace: i32,
    pub bonus_boundary_delimiter: i32,
    pub bonus_camel_case: i32,

    pub bonus_first_char_multiplier: i32,

    /// Split the query on whitespace and score each atom independently against the whole
    /// candidate, summing the results. Lets `"get user"` match `"getUserById"` even though the
    /// words appear in a different order than contiguous substring matching would allow.
    pub split_spaces: bool,
}

impl Default for SwConfig {
    fn default() -> Self {
        SwConfig {
            score_match: 16,
            penalty_gap_start: 3,
            penalty_gap_extend: 1,
            bonus_consecutive: 4,
            bonus_boundary: 8,
            bonus_boundary_whitespace: 10,
            bonus_boundary_delimiter: 9,
            bonus_camel_case: 5,
            bonus_first_char_multiplier: 2,
            split_spaces: true,
        }
    }
}

/// Cross-cutting properties that span the whole pipeline (dispatcher + both scorers), as
/// opposed to the phase-local tests living alongside each module.
#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::seq::SliceRandom;

    fn ed_matcher(min_score: f64) -> FuzzyMatcher {
        FuzzyMatcher::new(MatchConfig {
            min_score,
            algorithm: AlgorithmConfig::EditDistance(EdConfig::default()),
        })
    }

    #[test]
    fn test_score_always_in_unit_range() {
        let matcher = ed_matcher(0.0);
        for (q, c) in [
            ("user", "getCurrentUser"),
            ("bms", "Bristol-Myers Squibb"),
            ("xyz", "apple"),
            ("abc", "abc"),
        ] {
            let query = matcher.prepare(q.as_bytes());
            let mut buffer = matcher.make_buffer();
            if let Some(m) = matcher.score(c.as_bytes(), &query, &mut buffer) {
                assert!((0.0..=1.0).contains(&m.score), "{q} vs {c}: {}", m.score);
            }
        }
    }

    #[test]
    fn test_self_match_is_exact() {
        let matcher = ed_matcher(0.0);
        for q in ["user", "getUserById", "Bristol-Myers Squibb", "a"] {
            let query = matcher.prepare(q.as_bytes());
            let mut buffer = matcher.make_buffer();
            let m = matcher.score(q.as_bytes(), &query, &mut buffer).unwrap();
            assert_eq!(m.kind, MatchKind::Exact);
            assert_eq!(m.score, 1.0);
        }
    }

    #[test]
    fn test_case_fold_invariance() {
        let matcher = ed_matcher(0.0);
        let pairs = [("User", "getCurrentUser"), ("BMS", "Bristol-Myers Squibb")];
        for (q, c) in pairs {
            let lower_q = q.to_lowercase();
            let lower_c = c.to_lowercase();

            let query_a = matcher.prepare(q.as_bytes());
            let mut buf_a = matcher.make_buffer();
            let a = matcher.score(c.as_bytes(), &query_a, &mut buf_a);

            let query_b = matcher.prepare(lower_q.as_bytes());
            let mut buf_b = matcher.make_buffer();
            let b = matcher.score(lower_c.as_bytes(), &query_b, &mut buf_b);

            assert_eq!(a, b, "case folding changed the result for {q:?} vs {c:?}");
        }
    }

    #[test]
    fn test_empty_query_never_matches_with_positive_floor() {
        let matcher = ed_matcher(0.1);
        let query = matcher.prepare(b"");
        let mut buffer = matcher.make_buffer();
        for c in ["anything", "", "x"] {
            assert!(matcher.score(c.as_bytes(), &query, &mut buffer).is_none());
        }
    }

    #[test]
    fn test_buffer_reuse_equivalence_across_interleavings() {
        let matcher = ed_matcher(0.0);
        let query = matcher.prepare(b"user");
        let candidates = [
            "user",
            "getCurrentUser",
            "apple",
            "Users",
            "zzz",
            "UserRepository",
        ];

        let mut rng = rand::rng();
        let mut order_a: Vec<usize> = (0..candidates.len()).collect();
        let mut order_b = order_a.clone();
        order_a.shuffle(&mut rng);
        order_b.shuffle(&mut rng);

        let run = |order: &[usize]| -> Vec<Option<ScoredMatch>> {
            let mut buffer = matcher.make_buffer();
            order
                .iter()
                .map(|&i| matcher.score(candidates[i].as_bytes(), &query, &mut buffer))
                .collect()
        };

        let results_a: Vec<_> = order_a
            .iter()
            .zip(run(&order_a))
            .map(|(&i, r)| (i, r))
            .collect();
        let results_b: Vec<_> = order_b
            .iter()
            .zip(run(&order_b))
            .map(|(&i, r)| (i, r))
            .collect();

        for &(i, ref r) in &results_a {
            let matching = results_b.iter().find(|(j, _)| *j == i).unwrap();
            assert_eq!(r, &matching.1, "candidate {} disagreed across interleavings", candidates[i]);
        }
    }

    #[test]
    fn test_prefilter_never_rejects_a_phase_match() {
        let matcher = ed_matcher(0.0);
        let query = matcher.prepare(b"usr");
        let mut buffer = matcher.make_buffer();

        let mut rng = rand::rng();
        let alphabet = b"abcdefghijklmnopqrstuvwxyz_";
        for _ in 0..200 {
            let len = rng.random_range(0..20);
            let candidate: Vec<u8> = (0..len)
                .map(|_| alphabet[rng.random_range(0..alphabet.len())])
                .collect();

            let mut scratch = matcher.make_buffer();
            scratch.lower_candidate_into(query.len(), &candidate);
            scratch.fill_boundary(&candidate);
            let direct_phase_result = crate::edit_distance::score(
                &query,
                candidate.len(),
                &EdConfig::default(),
                0.0,
                &mut scratch,
            );

            let dispatched = matcher.score(&candidate, &query, &mut buffer);

            if direct_phase_result.is_some() {
                assert!(
                    dispatched.is_some(),
                    "prefilter rejected a candidate the phase cascade would have matched: {:?}",
                    String::from_utf8_lossy(&candidate)
                );
            }
        }
    }

    #[test]
    fn test_monotonic_length_penalty() {
        let matcher = ed_matcher(0.0);
        let query = matcher.prepare(b"user");
        let mut buffer = matcher.make_buffer();

        let short = matcher
            .score(b"useraccount", &query, &mut buffer)
            .unwrap();
        let long = matcher
            .score(b"useraccountmanagerservice", &query, &mut buffer)
            .unwrap();
        assert!(
            long.score <= short.score,
            "longer candidate scored higher: {} > {}",
            long.score,
            short.score
        );
    }

    #[test]
    fn test_kind_correctness() {
        let matcher = ed_matcher(0.0);
        let query = matcher.prepare(b"user");
        let mut buffer = matcher.make_buffer();

        let exact = matcher.score(b"User", &query, &mut buffer).unwrap();
        assert_eq!(exact.kind, MatchKind::Exact);

        let prefix = matcher.score(b"userAccount", &query, &mut buffer).unwrap();
        assert_eq!(prefix.kind, MatchKind::Prefix);
    }

    #[test]
    fn test_end_to_end_scenarios() {
        let matcher = ed_matcher(0.0);
        let scenarios: &[(&str, &str, MatchKind, f64, f64)] = &[
            ("user", "User", MatchKind::Exact, 1.0, 1.0),
            ("get", "getUserById", MatchKind::Prefix, 0.75, 1.0),
            ("user", "getCurrentUser", MatchKind::Substring, 0.40, 0.70),
        ];
        for &(q, c, kind, lo, hi) in scenarios {
            let query = matcher.prepare(q.as_bytes());
            let mut buffer = matcher.make_buffer();
            let m = matcher.score(c.as_bytes(), &query, &mut buffer).unwrap();
            assert_eq!(m.kind, kind, "{q:?} vs {c:?}");
            assert!((lo..=hi).contains(&m.score), "{q:?} vs {c:?}: {}", m.score);
        }

        let unrelated = matcher.score(
            b"apple",
            &matcher.prepare(b"xyz"),
            &mut matcher.make_buffer(),
        );
        assert!(unrelated.is_none());
    }

    #[test]
    fn test_smith_waterman_scenario_seven() {
        let matcher = FuzzyMatcher::new(MatchConfig {
            min_score: 0.0,
            algorithm: AlgorithmConfig::SmithWaterman(SwConfig::default()),
        });
        let query = matcher.prepare(b"gubi");
        let mut buffer = matcher.make_buffer();
        let m = matcher
            .score(b"getUserById", &query, &mut buffer)
            .unwrap();
        assert_eq!(m.kind, MatchKind::Alignment);
        assert!(m.score > 0.3, "score was {}", m.score);
    }
}

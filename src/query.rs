//! Query preparation. A [`PreparedQuery`] is built once per query string and reused across
//! every candidate it gets scored against. Lowercasing, the class bitmask and the trigram
//! multiset are all computed up front so the prefilters can reject candidates without
//! touching the DP tables.

use rustc_hash::FxHashMap;

use crate::byte_class::{class_bit_index, is_whitespace, to_lower};

/// Bag of 3-byte windows of a lowercased string. Keyed by the raw 3-byte tuple rather than a
/// hash of it, so the prefilter can do an exact multiset intersection instead of a Bloom-style
/// approximation.
pub type TrigramMultiset = FxHashMap<[u8; 3], u32>;

/// Immutable, precomputed view of a query string. Safe to share read-only across threads and
/// across any number of [`crate::buffer::ScoringBuffer`]s.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    /// Original query bytes, unmodified.
    pub raw: Vec<u8>,
    /// ASCII-lowercased query bytes. `lower.len() == raw.len()` always.
    pub lower: Vec<u8>,
    /// 37-bit mask (26 letters + 10 digits + 1 "other"), one bit per character class present
    /// in `lower`.
    pub bitmask: u64,
    /// Trigram multiset of `lower`. Empty when `lower.len() < 3`.
    pub trigrams: TrigramMultiset,
    /// Whether `lower` contains any ASCII whitespace byte.
    pub contains_whitespace: bool,
    /// Smith-Waterman atoms: `lower` split on whitespace runs, each prepared independently.
    /// Only populated by [`crate::FuzzyMatcher::prepare`] in SW mode with `split_spaces` on,
    /// and only when `contains_whitespace` is true. Atoms never carry their own atoms.
    pub atoms: Option<Vec<PreparedQuery>>,
}

impl PreparedQuery {
    /// Builds the base prepared query: lowercasing, bitmask, trigrams, whitespace flag. Does
    /// not populate `atoms`; that's the caller's job, since it depends on the active
    /// algorithm's configuration.
    pub(crate) fn prepare_base(raw: &[u8]) -> Self {
        let lower: Vec<u8> = raw.iter().map(|&b| to_lower(b)).collect();

        let mut bitmask: u64 = 0;
        for &b in &lower {
            bitmask |= 1u64 << class_bit_index(b);
        }

        let trigrams = build_trigrams(&lower);
        let contains_whitespace = lower.iter().any(|&b| is_whitespace(b));

        PreparedQuery {
            raw: raw.to_vec(),
            lower,
            bitmask,
            trigrams,
            contains_whitespace,
            atoms: None,
        }
    }

    /// Splits `lower` on whitespace runs and prepares each atom. Called by the matcher when
    /// Smith-Waterman atom splitting is enabled.
    pub(crate) fn with_atoms(mut self) -> Self {
        if self.contains_whitespace {
            let atoms = self
                .lower
                .split(|&b| is_whitespace(b))
                .filter(|chunk| !chunk.is_empty())
                .map(PreparedQuery::prepare_base)
                .collect();
            self.atoms = Some(atoms);
        }
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lower.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }
}

fn build_trigrams(lower: &[u8]) -> TrigramMultiset {
    let mut map = TrigramMultiset::default();
    if lower.len() < 3 {
        return map;
    }
    for window in lower.windows(3) {
        let key = [window[0], window[1], window[2]];
        *map.entry(key).or_insert(0) += 1;
    }
    map
}

//! Fuzzy name matching against registry search results.
//!
//! OCR-mangled names rarely survive an exact search, so the registry is
//! queried by wildcard prefix and every returned name variant is scored
//! against the query. Only a sufficiently similar best variant is accepted.

use strsim::normalized_levenshtein;

use super::label::LabelRecord;

/// Tunable fuzzy-match parameters.
///
/// Defaults were tuned on observed OCR misreads of prescription print;
/// treat them as a starting point, not an optimum.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Minimum 0-100 similarity for a fuzzy match to be accepted.
    pub similarity_threshold: f64,
    /// Shortest wildcard prefix taken from the query.
    pub prefix_min: usize,
    /// Longest wildcard prefix taken from the query.
    pub prefix_max: usize,
    /// Result-count limit for the wildcard search.
    pub fuzzy_result_limit: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 75.0,
            prefix_min: 4,
            prefix_max: 5,
            fuzzy_result_limit: 30,
        }
    }
}

/// The winning (record, variant, score) triple of a fuzzy scan.
#[derive(Debug, Clone)]
pub struct BestMatch<'a> {
    /// The label document the variant belongs to
    pub record: &'a LabelRecord,
    /// The registry name variant that matched
    pub variant: &'a str,
    /// Similarity score, 0-100
    pub score: f64,
}

/// Similarity between two names on a 0-100 scale.
///
/// Case-folded normalized edit distance; 100 means identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase()) * 100.0
}

/// Wildcard prefix for the fuzzy search: two characters shorter than the
/// query, clamped to `[prefix_min, prefix_max]`, never longer than the
/// query itself.
pub fn search_prefix(name: &str, config: &MatchConfig) -> String {
    let len = name.chars().count();
    let prefix_len = len
        .saturating_sub(2)
        .clamp(config.prefix_min, config.prefix_max)
        .min(len);
    name.chars().take(prefix_len).collect()
}

/// Scan every name variant of every result and keep the single highest
/// scorer. Equal scores keep the first variant encountered, in the order
/// the registry returned them.
///
/// Returns `None` when the best score is below the acceptance threshold.
pub fn select_best_match<'a>(
    query: &str,
    results: &'a [LabelRecord],
    config: &MatchConfig,
) -> Option<BestMatch<'a>> {
    let mut best: Option<BestMatch<'a>> = None;

    for record in results {
        for variant in record.name_variants() {
            let score = similarity(query, variant);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(BestMatch {
                    record,
                    variant,
                    score,
                });
            }
        }
    }

    match best {
        Some(b) if b.score >= config.similarity_threshold => Some(b),
        Some(b) => {
            tracing::debug!(
                query,
                variant = b.variant,
                score = b.score,
                "best fuzzy variant below threshold"
            );
            None
        }
        None => None,
    }
}

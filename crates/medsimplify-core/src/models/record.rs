//! Resolved drug record models.

use serde::{Deserialize, Serialize};

/// Where a drug record came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Fresh match from the external registry.
    Registry,
    /// Loaded from the durable cache written by a previous run.
    Cache,
    /// Fallback for a name the registry could not resolve.
    NotFound,
}

/// Match confidence for a drug record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Genuine registry match, exact or fuzzy above threshold.
    High,
    /// Not-found fallback.
    None,
}

/// Patient-facing information about one medication.
///
/// Immutable once created. Either every descriptive field was extracted
/// from a registry label (confidence [`High`](Confidence::High)), or every
/// field is the fixed not-found placeholder (confidence
/// [`None`](Confidence::None)); the two never mix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugRecord {
    /// Canonical display name
    pub name: String,
    /// Pharmacologic category
    pub category: String,
    /// What the drug treats
    pub treats: String,
    /// Plain-language description of how it works
    pub explanation: String,
    /// Typical dosage
    pub dosage: String,
    /// How often it is taken
    pub frequency: String,
    /// Common side effects (at most 5)
    pub side_effects: Vec<String>,
    /// Primary warning
    pub warnings: String,
    /// Provenance of this record
    pub source: RecordSource,
    /// Match confidence
    pub confidence: Confidence,
    /// When this record was written to the cache (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<String>,
}

impl DrugRecord {
    /// Fallback record for a name the registry could not resolve.
    pub fn not_found(name: &str) -> Self {
        Self {
            name: title_case(name),
            category: "Unknown".into(),
            treats: "Drug not found".into(),
            explanation: "Information not available. Please consult your doctor.".into(),
            dosage: "N/A".into(),
            frequency: "N/A".into(),
            side_effects: vec!["Information not available".into()],
            warnings: "Consult your doctor".into(),
            source: RecordSource::NotFound,
            confidence: Confidence::None,
            cached_at: None,
        }
    }

    /// Whether this record came from a genuine registry match.
    pub fn is_confident(&self) -> bool {
        self.confidence == Confidence::High
    }
}

/// Title-case a name: first letter of every alphabetic run upper-cased,
/// the rest lower-cased. Hyphenated names capitalize both halves.
pub(crate) fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for ch in name.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

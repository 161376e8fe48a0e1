//! Serde model of the registry's drug-label documents.
//!
//! Field names follow the registry's wire format: structured name and class
//! metadata lives under `openfda`, narrative label sections are arrays of
//! free-text strings. Every field defaults to empty so partial documents
//! deserialize cleanly.

use serde::Deserialize;

/// Top-level search response: zero or more label documents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<LabelRecord>,
}

/// Structured metadata block of a label document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenFdaMeta {
    /// Marketed brand names
    #[serde(default)]
    pub brand_name: Vec<String>,
    /// Generic compound names
    #[serde(default)]
    pub generic_name: Vec<String>,
    /// Established pharmacologic class, e.g. `"beta-Adrenergic Blocker [EPC]"`
    #[serde(default)]
    pub pharm_class_epc: Vec<String>,
}

/// One drug-label document returned by the registry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelRecord {
    /// Structured name and classification metadata
    #[serde(default)]
    pub openfda: OpenFdaMeta,
    /// What the drug is approved to treat
    #[serde(default)]
    pub indications_and_usage: Vec<String>,
    /// How the drug works, in pharmacological terms
    #[serde(default)]
    pub mechanism_of_action: Vec<String>,
    /// Clinical pharmacology narrative
    #[serde(default)]
    pub clinical_pharmacology: Vec<String>,
    /// General product description
    #[serde(default)]
    pub description: Vec<String>,
    /// Dosing instructions
    #[serde(default)]
    pub dosage_and_administration: Vec<String>,
    /// Observed adverse reactions
    #[serde(default)]
    pub adverse_reactions: Vec<String>,
    /// Warnings and precautions section
    #[serde(default)]
    pub warnings_and_cautions: Vec<String>,
    /// Plain warnings section (older label format)
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Boxed warning, when present
    #[serde(default)]
    pub boxed_warning: Vec<String>,
}

impl LabelRecord {
    /// All brand and generic name variants, in wire order.
    pub fn name_variants(&self) -> impl Iterator<Item = &str> {
        self.openfda
            .brand_name
            .iter()
            .chain(self.openfda.generic_name.iter())
            .map(String::as_str)
    }
}

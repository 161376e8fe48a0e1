//! Condition detection from resolved medication sets.
//!
//! A prescription that pairs certain drugs signals a known condition; the
//! table maps medication combinations to patient-friendly descriptions.
//! Only confidently resolved names participate, so an OCR misread cannot
//! invent a diagnosis.

use std::collections::HashSet;

use serde::Serialize;

/// A condition inferred from the confirmed medication set.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DetectedCondition {
    /// Condition name
    pub condition: String,
    /// Patient-friendly explanation
    pub explanation: String,
}

/// Drug combinations and the conditions they signal. A combination fires
/// when every drug in it appears in the confirmed set.
const DRUG_COMBINATIONS: &[(&[&str], &str, &str)] = &[
    (
        &["metformin", "glimepiride"],
        "Type 2 Diabetes (Moderate to Severe)",
        "Your blood sugar needs two medications to control it properly",
    ),
    (
        &["metformin", "glipizide"],
        "Type 2 Diabetes (Moderate to Severe)",
        "Your blood sugar needs two medications to control it properly",
    ),
    (
        &["amlodipine", "telmisartan"],
        "High Blood Pressure (Combination Therapy)",
        "Your blood pressure needs two medications working together",
    ),
    (
        &["amlodipine", "losartan"],
        "High Blood Pressure (Combination Therapy)",
        "Your blood pressure needs two medications working together",
    ),
    (
        &["aspirin", "atorvastatin"],
        "Heart Disease Prevention",
        "These medications protect your heart and blood vessels",
    ),
    (
        &["aspirin", "clopidogrel"],
        "Heart Disease / Stroke Prevention",
        "Dual antiplatelet therapy to prevent blood clots",
    ),
    (
        &["metformin", "atorvastatin", "amlodipine"],
        "Metabolic Syndrome",
        "You have multiple conditions: diabetes, high cholesterol, and high blood pressure",
    ),
    (
        &["levothyroxine"],
        "Hypothyroidism (Low Thyroid)",
        "Your thyroid gland is not producing enough hormone",
    ),
    (
        &["insulin"],
        "Diabetes (Type 1 or Advanced Type 2)",
        "Your blood sugar requires insulin treatment",
    ),
];

/// Detect known drug-combination conditions among confirmed names.
///
/// `confirmed` holds normalized (lower-cased, trimmed) drug names, as
/// produced by batch resolution.
pub fn detect_conditions(confirmed: &HashSet<String>) -> Vec<DetectedCondition> {
    DRUG_COMBINATIONS
        .iter()
        .filter(|(drugs, _, _)| drugs.iter().all(|drug| confirmed.contains(*drug)))
        .map(|(_, condition, explanation)| DetectedCondition {
            condition: (*condition).to_string(),
            explanation: (*explanation).to_string(),
        })
        .collect()
}

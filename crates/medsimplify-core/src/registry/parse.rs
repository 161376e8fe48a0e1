//! Turning a registry label document into a patient-facing [`DrugRecord`].
//!
//! Label sections are regulatory prose; the extractors pull one readable
//! sentence or token out of each, swap clinical jargon for plain phrases,
//! and cap lengths so the result fits a patient-facing card.

use std::sync::LazyLock;

use regex::Regex;

use super::label::LabelRecord;
use crate::models::{title_case, Confidence, DrugRecord, RecordSource};

/// Longest text kept for the category field.
const CATEGORY_MAX: usize = 100;

/// Longest text kept for sentence-derived fields.
const SENTENCE_MAX: usize = 200;

/// How much of the adverse-reactions text is scanned for side effects.
const ADVERSE_SCAN_MAX: usize = 300;

/// Most side-effect lines kept.
const SIDE_EFFECT_MAX: usize = 5;

/// First numeric dose token, e.g. "50 mg" or "5ml".
static DOSAGE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+\s*(?:mg|mcg|ml|g|units?)").unwrap());

/// Jargon substitutions applied to lower-cased sentences, longest phrase
/// first so that e.g. "contraindicated" is rewritten before "indicated for"
/// can take a bite out of it.
const JARGON_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("indicated for the treatment of", "treats"),
    ("cerebrovascular accident", "stroke"),
    ("myocardial infarction", "heart attack"),
    ("diabetes mellitus", "diabetes"),
    ("contraindicated", "should not be used"),
    ("angina pectoris", "chest pain"),
    ("hyperlipidemia", "high cholesterol"),
    ("administration", "taking"),
    ("patients with", "people with"),
    ("indicated for", "used to treat"),
    ("dyslipidemia", "abnormal cholesterol"),
    ("administered", "given"),
    ("hypertension", "high blood pressure"),
    ("concomitant", "together with"),
    ("prophylaxis", "prevention"),
    ("therapeutic", "treatment"),
    ("patients", "people"),
];

/// Frequency phrase markers scanned in priority order against the
/// lower-cased dosing text.
const FREQUENCY_MARKERS: &[(&[&str], &str)] = &[
    (&["once daily", "once a day", "qd"], "Once daily"),
    (&["twice daily", "bid"], "Twice daily"),
    (&["three times", "tid"], "Three times daily"),
    (&["four times", "qid"], "Four times daily"),
];

/// Build a high-confidence record from a label document.
///
/// `display_name` is the registry name variant the query matched; it
/// becomes the record's canonical name.
pub fn parse_label(record: &LabelRecord, display_name: &str) -> DrugRecord {
    DrugRecord {
        name: title_case(display_name),
        category: extract_category(record),
        treats: extract_treats(record),
        explanation: extract_explanation(record),
        dosage: extract_dosage(record),
        frequency: extract_frequency(record),
        side_effects: extract_side_effects(record),
        warnings: extract_warnings(record),
        source: RecordSource::Registry,
        confidence: Confidence::High,
        cached_at: None,
    }
}

fn extract_category(record: &LabelRecord) -> String {
    match nonempty_first(&record.openfda.pharm_class_epc) {
        Some(class) => truncate(strip_class_code(class), CATEGORY_MAX),
        None => "Prescription Medication".into(),
    }
}

/// Strip a trailing bracketed classification code,
/// e.g. `"beta-Adrenergic Blocker [EPC]"` → `"beta-Adrenergic Blocker"`.
fn strip_class_code(class: &str) -> &str {
    let trimmed = class.trim();
    if trimmed.ends_with(']') {
        if let Some(open) = trimmed.rfind('[') {
            return trimmed[..open].trim_end();
        }
    }
    trimmed
}

fn extract_treats(record: &LabelRecord) -> String {
    match nonempty_first(&record.indications_and_usage) {
        Some(text) => truncate(&simplify_jargon(first_sentence(text)), SENTENCE_MAX),
        None => "Various medical conditions".into(),
    }
}

fn extract_explanation(record: &LabelRecord) -> String {
    let section = nonempty_first(&record.mechanism_of_action)
        .or_else(|| nonempty_first(&record.clinical_pharmacology))
        .or_else(|| nonempty_first(&record.description));

    match section {
        Some(text) => truncate(&simplify_jargon(first_sentence(text)), SENTENCE_MAX),
        None => "Prescription medication - consult your doctor".into(),
    }
}

fn extract_dosage(record: &LabelRecord) -> String {
    nonempty_first(&record.dosage_and_administration)
        .and_then(|text| DOSAGE_TOKEN.find(text))
        .map(|token| token.as_str().to_string())
        .unwrap_or_else(|| "As prescribed by doctor".into())
}

fn extract_frequency(record: &LabelRecord) -> String {
    if let Some(text) = nonempty_first(&record.dosage_and_administration) {
        let lower = text.to_lowercase();
        for (markers, label) in FREQUENCY_MARKERS {
            if markers.iter().any(|marker| lower.contains(marker)) {
                return (*label).into();
            }
        }
    }
    "As directed by your doctor".into()
}

fn extract_side_effects(record: &LabelRecord) -> Vec<String> {
    if let Some(text) = nonempty_first(&record.adverse_reactions) {
        let scan: String = text.chars().take(ADVERSE_SCAN_MAX).collect();
        let effects: Vec<String> = scan
            .lines()
            .take(SIDE_EFFECT_MAX)
            .map(|line| line.trim_matches(|c: char| matches!(c, '•' | '-' | '*' | ' ' | '\t')))
            .filter(|line| {
                let len = line.chars().count();
                len > 3 && len < 50
            })
            .map(capitalize)
            .collect();
        if !effects.is_empty() {
            return effects;
        }
    }
    vec!["See package information".into()]
}

fn extract_warnings(record: &LabelRecord) -> String {
    let section = nonempty_first(&record.warnings_and_cautions)
        .or_else(|| nonempty_first(&record.warnings))
        .or_else(|| nonempty_first(&record.boxed_warning));

    match section {
        Some(text) => truncate(&simplify_jargon(first_sentence(text)), SENTENCE_MAX),
        None => "Consult your doctor before use".into(),
    }
}

/// Replace clinical jargon with plain phrases and capitalize the result.
fn simplify_jargon(text: &str) -> String {
    let mut simplified = text.to_lowercase();
    for (term, plain) in JARGON_SUBSTITUTIONS {
        simplified = simplified.replace(term, plain);
    }
    capitalize(&simplified)
}

/// First element of a label section, when present and non-empty.
fn nonempty_first(section: &[String]) -> Option<&str> {
    section
        .first()
        .map(String::as_str)
        .filter(|text| !text.is_empty())
}

fn first_sentence(text: &str) -> &str {
    text.split('.').next().unwrap_or("").trim()
}

/// Lower-case the text and upper-case its first letter.
fn capitalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => lower,
    }
}

/// Cap text at `max` characters (not bytes).
fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

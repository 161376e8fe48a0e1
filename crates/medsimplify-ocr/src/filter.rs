//! Lexical filtering of OCR text into drug-name candidates.
//!
//! There is no local drug database; candidates are recognized purely by
//! shape. A word survives if it has a plausible length, is letters with at
//! most one internal hyphen, is not common prescription vocabulary, and
//! carries a pharmacological affix. The registry decides the rest.

use std::sync::LazyLock;

use regex::Regex;

/// Most candidates forwarded downstream; the registry is rate-sensitive.
pub const MAX_CANDIDATES: usize = 8;

/// Length bounds for a plausible drug name.
const MIN_LEN: usize = 5;
const MAX_LEN: usize = 20;

/// Name endings common to pharmacological compounds.
const DRUG_SUFFIXES: &[&str] = &[
    "pine", "pril", "sartan", "olol", "statin",
    "cillin", "mycin", "floxacin", "zole", "prazole",
    "tidine", "formin", "zine", "mide", "done",
    "mab", "ast", "kind", "clar", "cal", "lin",
    "ride", "ine", "ide", "ate",
];

/// Name beginnings common to pharmacological compounds.
const DRUG_PREFIXES: &[&str] = &[
    "levo", "dex", "hydro", "pro", "anti", "met",
    "cef", "ator", "simva", "amlod", "abci", "vomi",
    "zoc", "gesta", "isox", "doxyl", "pyrid", "clari",
];

/// Words that appear on prescriptions but are never drug names.
/// Sorted for binary search; all lowercase.
const BLACKLIST: &[&str] = &[
    "address", "advice", "age", "blood", "boiled", "center", "centre",
    "chief", "chills", "clinic", "clinical", "closed", "complaints", "date",
    "diagnosis", "digest", "dosage", "duration", "entering", "evening",
    "female", "fever", "findings", "follow", "friday", "gender", "headache",
    "height", "hospital", "inside", "label", "male", "medical", "medicine",
    "monday", "morning", "name", "night", "outside", "patient", "phone",
    "prescription", "pressure", "refill", "required", "sample", "saturday",
    "signature", "sunday", "thursday", "time", "timing", "tuesday",
    "wednesday", "weight",
];

/// Medication-form tokens: "tab. 500mg" → "500mg".
static FORM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:tab|cap|syp|inj|dr|susp)\b\.?\s*").unwrap());

/// Dose quantities: "500mg", "2 ml", "1/2".
static DOSE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*(?:mg|mcg|ml|g|/\d+)").unwrap());

/// Dosing-frequency shorthand.
static FREQUENCY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:bid|tid|qid|od|sos|stat|prn|tds|x\d+d?)\b").unwrap());

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Anything but word characters, whitespace and hyphens.
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

/// Letters with at most one internal hyphen.
static CANDIDATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+(?:-[a-z]+)?$").unwrap());

/// Extract drug-name candidates from OCR text blocks.
///
/// Preserves first-seen order, deduplicates, and caps the result at
/// [`MAX_CANDIDATES`], logging when the cap truncates.
pub fn extract_candidates(text_blocks: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();

    for block in text_blocks {
        let cleaned = clean_block(block);
        for word in cleaned.split_whitespace() {
            if is_candidate(word) && !candidates.iter().any(|c| c == word) {
                candidates.push(word.to_string());
            }
        }
    }

    if candidates.len() > MAX_CANDIDATES {
        tracing::warn!(
            found = candidates.len(),
            kept = MAX_CANDIDATES,
            "truncating drug candidates"
        );
        candidates.truncate(MAX_CANDIDATES);
    }

    candidates
}

/// Normalize one OCR text block: lower-case, drop form, dose and frequency
/// tokens, remaining digits and punctuation (internal hyphens survive),
/// collapse whitespace.
pub fn clean_block(text: &str) -> String {
    let text = text.to_lowercase();
    let text = FORM_TOKEN.replace_all(&text, "");
    let text = DOSE_TOKEN.replace_all(&text, "");
    let text = FREQUENCY_TOKEN.replace_all(&text, "");
    let text = DIGITS.replace_all(&text, "");
    let text = NON_WORD.replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a cleaned word is plausibly a drug name.
///
/// The affix rules require the stem to be meaningfully longer than the
/// affix itself, so that e.g. "ride" alone never qualifies via "-ride".
pub fn is_candidate(word: &str) -> bool {
    let word = word.trim().to_lowercase();

    let len = word.chars().count();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return false;
    }

    if !CANDIDATE_SHAPE.is_match(&word) {
        return false;
    }

    if BLACKLIST.binary_search(&word.as_str()).is_ok() {
        return false;
    }

    DRUG_SUFFIXES
        .iter()
        .any(|suffix| word.ends_with(suffix) && len > suffix.len() + 2)
        || DRUG_PREFIXES
            .iter()
            .any(|prefix| word.starts_with(prefix) && len > prefix.len() + 2)
}

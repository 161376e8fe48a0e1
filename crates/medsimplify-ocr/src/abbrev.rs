//! Prescription shorthand expansion.
//!
//! Dosing abbreviations survive OCR well (they are short and printed), so
//! they are expanded verbatim rather than fuzzily matched.

/// Dosing abbreviations and their patient-readable forms.
/// Sorted by key for binary search; keys uppercase.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("AC", "Before Meals"),
    ("BD", "Twice Daily"),
    ("BID", "Twice Daily"),
    ("HS", "At Bedtime"),
    ("OD", "Once Daily"),
    ("PC", "After Meals"),
    ("PRN", "As Needed"),
    ("Q12H", "Every 12 Hours"),
    ("Q4H", "Every 4 Hours"),
    ("Q6H", "Every 6 Hours"),
    ("Q8H", "Every 8 Hours"),
    ("QH", "Every Hour"),
    ("QID", "Four Times Daily"),
    ("SOS", "If Necessary"),
    ("STAT", "Immediately"),
    ("TDS", "Three Times Daily"),
    ("TID", "Three Times Daily"),
];

/// Expand a dosing abbreviation, case-insensitively.
///
/// Returns `None` for anything that is not a known abbreviation.
pub fn expand_abbreviation(token: &str) -> Option<&'static str> {
    let upper = token.trim().to_uppercase();
    ABBREVIATIONS
        .binary_search_by_key(&upper.as_str(), |&(abbr, _)| abbr)
        .ok()
        .map(|idx| ABBREVIATIONS[idx].1)
}

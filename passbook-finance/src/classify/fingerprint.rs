//! Narration fingerprint: a stable counterparty key for rows with neither a
//! canonical merchant nor a beneficiary. Dates, reference numbers and masked
//! account numbers change every month, so they are stripped before hashing.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use super::normalize::{collapse_whitespace, normalize};

/// Applied in order; masked accounts go before bare digit runs.
static STRIP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 12-01-2024, 12/01/2024, 12/01/24
        r"\b\d{1,2}[-/]\d{1,2}[-/](\d{4}|\d{2})\b",
        // 12-JAN-2024, 12 JAN 2024
        r"\b\d{1,2}[- ](JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)[A-Z]*[- ]\d{2,4}\b",
        // 2024-01-12
        r"\b\d{4}-\d{2}-\d{2}\b",
        // JAN 12, 2024
        r"\b(JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)[A-Z]* \d{1,2}, ?\d{4}\b",
        // XXXXXX1234
        r"X{6,}\d{4}",
        r"\d{8,}",
        // Alphanumeric transaction ids: N123456, S98765
        r"\b[A-Z]\d{4,}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("fingerprint regex"))
    .collect()
});

/// Narration with volatile fragments removed, punctuation blanked.
pub fn stable_text(narration: &str) -> String {
    let mut text = normalize(narration).upper;
    for re in STRIP_PATTERNS.iter() {
        text = re.replace_all(&text, " ").into_owned();
    }
    let text: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    collapse_whitespace(&text)
}

/// SHA-256 hex of [`stable_text`]; `None` when nothing stable is left.
pub fn fingerprint(narration: &str) -> Option<String> {
    let text = stable_text(narration);
    if text.is_empty() {
        return None;
    }
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    Some(hex::encode(hasher.finalize()))
}

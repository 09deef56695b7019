//! Counterparty name extraction from dash/slash separated transfer narrations:
//! `UPI-<NAME>-<vpa>-REF`, `UPI/<rrn>/<NAME>/<vpa>/<bank>`, `NEFT-<IFSC>-<NAME>-...`.

use std::sync::LazyLock;

use passbook_core::Rail;
use regex::Regex;

use super::normalize::{collapse_whitespace, truncate_words};

static IFSC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("ifsc regex"));

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(REF|RRN|UTR|TXN|TRN)\b|^(REF|RRN|UTR|TXN)[ :]*\d").expect("reference regex")
});

/// Words that only describe the rail or the direction.
const RAIL_WORDS: &[&str] = &[
    "UPI", "IMPS", "NEFT", "RTGS", "MMT", "CR", "DR", "P2A", "P2M", "P2P", "INB", "IB", "UPIOUT",
    "UPIIN", "INW", "OUT", "IN", "TO", "FROM", "BY", "TRF", "TRANSFER",
];

/// Segments that carry no counterparty name.
const GENERIC_SEGMENTS: &[&str] = &[
    "PAYMENT",
    "PAY",
    "NA",
    "NULL",
    "COLLECT",
    "PAYMENT FROM PHONE",
    "SENT USING PAYTM UPI",
    "UPI INTENT",
    "OID",
];

/// Payer bank names that trail UPI narrations.
const BANK_CODES: &[&str] = &[
    "HDFC", "HDFC BANK", "ICIC", "ICICI", "ICICI BANK", "SBIN", "SBI", "STATE BANK OF INDIA",
    "UTIB", "AXIS", "AXIS BANK", "KKBK", "KOTAK", "KOTAK MAHINDRA BANK", "YESB", "YES BANK",
    "PUNB", "PNB", "BARB", "BANK OF BARODA", "CNRB", "CANARA BANK", "IDIB", "INDIAN BANK",
    "IDFB", "IDFC FIRST BANK", "INDB", "INDUSIND BANK", "FDRL", "FEDERAL BANK", "PYTM",
    "PAYTM PAYMENTS BANK", "AIRP", "AUBL", "RATN",
];

const MAX_WORDS: usize = 5;
const MAX_CHARS: usize = 60;

/// Only transfer rails carry a counterparty segment.
pub fn applies_to(rail: Rail) -> bool {
    matches!(
        rail,
        Rail::Upi | Rail::Imps | Rail::Neft | Rail::Rtgs | Rail::NetBanking
    )
}

/// Extract the counterparty name from an uppercased narration.
pub fn extract(upper: &str, rail: Rail) -> Option<String> {
    if !applies_to(rail) {
        return None;
    }
    upper
        .split(['-', '/'])
        .map(|seg| collapse_whitespace(seg.trim()))
        .find(|seg| is_name_segment(seg))
        .map(|seg| truncate_words(&seg, MAX_WORDS, MAX_CHARS))
}

fn is_name_segment(seg: &str) -> bool {
    if seg.is_empty() || seg.contains('@') {
        return false;
    }
    if seg.split_whitespace().all(|w| RAIL_WORDS.contains(&w)) {
        return false;
    }
    if GENERIC_SEGMENTS.contains(&seg) || BANK_CODES.contains(&seg) {
        return false;
    }
    if IFSC.is_match(seg) || REFERENCE.is_match(seg) {
        return false;
    }
    let letters = seg.chars().filter(|c| c.is_ascii_alphabetic()).count();
    let digits = seg.chars().filter(|c| c.is_ascii_digit()).count();
    letters >= 2 && digits * 2 <= letters + digits
}

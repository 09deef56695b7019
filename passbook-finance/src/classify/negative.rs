//! Person-to-person transfer detection. Payments to people look like payments
//! to small merchants, so a person-shaped counterparty demotes merchant and
//! intent evidence and the row is treated as a self transfer.

use passbook_core::Rail;

use super::intent::IntentScores;
use super::normalize::NormalizedNarration;

const EXPLICIT_TRANSFER_PHRASES: &[&str] = &[
    "FUND TRANSFER",
    "SELF TRANSFER",
    "SELF TRF",
    "TO SELF",
    "OWN ACCOUNT",
    "OWN A C",
];

/// Tokens that mark a counterparty as a business.
const BUSINESS_TOKENS: &[&str] = &[
    "PVT", "PRIVATE", "LTD", "LIMITED", "LLP", "INC", "CORP", "CORPORATION", "CO", "COMPANY",
    "STORE", "STORES", "TRADERS", "TRADING", "SERVICES", "SERVICE", "ENTERPRISES", "ENTERPRISE",
    "AGENCY", "AGENCIES", "INDUSTRIES", "SOLUTIONS", "TECHNOLOGIES", "TECH", "FOODS", "MART",
    "SHOP", "CENTRE", "CENTER", "HOSPITAL", "CLINIC", "MEDICAL", "PHARMA", "BANK", "FINANCE",
    "INSURANCE", "HOTEL", "RESTAURANT", "CAFE", "TRUST", "FOUNDATION", "ASSOCIATES",
    "INTERNATIONAL", "GLOBAL", "VENTURES", "HOLDINGS", "MOTORS", "AUTO", "ELECTRICALS",
    "ELECTRONICS", "JEWELLERS", "TRAVELS", "TOURS", "DAIRY", "BAKERY", "SWEETS", "GENERAL",
    "KIRANA", "PETROL", "FUELS", "COLLEGE", "SCHOOL", "UNIVERSITY", "ACADEMY", "INSTITUTE",
    "SOCIETY", "MERCHANT", "RETAIL", "INDIA", "PAYMENTS", "BROKING", "SECURITIES", "CAPITAL",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEvidence {
    /// Narration says so outright
    ExplicitPhrase,
    /// Counterparty looks like a person and nothing suggests a purchase
    PersonShapedName,
    /// Large instant transfer to a person-shaped name
    LargeInstantTransfer,
}

impl TransferEvidence {
    pub fn reason(self) -> &'static str {
        match self {
            TransferEvidence::ExplicitPhrase => "explicit transfer phrasing",
            TransferEvidence::PersonShapedName => "counterparty looks like a person",
            TransferEvidence::LargeInstantTransfer => "large instant transfer to a person",
        }
    }
}

/// 2-4 words, no digits, no business words.
pub fn is_person_shaped(name: &str) -> bool {
    let words: Vec<&str> = name.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
        return false;
    }
    if name.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    if !name.chars().all(|c| c.is_alphabetic() || c.is_whitespace() || c == '.') {
        return false;
    }
    !words
        .iter()
        .any(|w| BUSINESS_TOKENS.contains(&w.to_uppercase().as_str()))
}

pub struct TransferCheck<'a> {
    pub narration: &'a NormalizedNarration,
    pub beneficiary: Option<&'a str>,
    pub rail: Rail,
    pub amount: f64,
    pub intent: &'a IntentScores,
    pub large_transfer_amount: f64,
}

/// Returns the strongest evidence that the row is a person-to-person transfer.
pub fn person_transfer(check: &TransferCheck<'_>) -> Option<TransferEvidence> {
    if EXPLICIT_TRANSFER_PHRASES
        .iter()
        .any(|p| check.narration.has_phrase(p))
    {
        return Some(TransferEvidence::ExplicitPhrase);
    }

    let name = check.beneficiary?;
    if !is_person_shaped(name) {
        return None;
    }
    if check.rail.is_instant() && check.amount >= check.large_transfer_amount {
        return Some(TransferEvidence::LargeInstantTransfer);
    }
    if check.intent.scores.is_empty() {
        return Some(TransferEvidence::PersonShapedName);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::intent::score;
    use crate::classify::normalize::normalize;

    fn check(narration: &str, beneficiary: Option<&str>, rail: Rail, amount: f64) -> Option<TransferEvidence> {
        let n = normalize(narration);
        let intent = score(&n);
        person_transfer(&TransferCheck {
            narration: &n,
            beneficiary,
            rail,
            amount,
            intent: &intent,
            large_transfer_amount: 10_000.0,
        })
    }

    #[test]
    fn test_person_shape() {
        assert!(is_person_shaped("RAHUL SHARMA"));
        assert!(is_person_shaped("K. S. RAO"));
        assert!(!is_person_shaped("RAHUL"));
        assert!(!is_person_shaped("SHARMA TRADERS"));
        assert!(!is_person_shaped("FLAT 402 RENT"));
        assert!(!is_person_shaped("A B C D E"));
    }

    #[test]
    fn test_upi_to_person() {
        let ev = check("UPI-RAHUL SHARMA-rahul@ybl-REF 223344556677", Some("RAHUL SHARMA"), Rail::Upi, 12_000.0);
        assert_eq!(ev, Some(TransferEvidence::LargeInstantTransfer));
        let ev = check("UPI-RAHUL SHARMA-rahul@ybl-REF 2233", Some("RAHUL SHARMA"), Rail::Upi, 300.0);
        assert_eq!(ev, Some(TransferEvidence::PersonShapedName));
    }

    #[test]
    fn test_intent_keeps_small_purchases() {
        let ev = check("UPI-RAMESH DAIRY-ramesh@ybl", Some("RAMESH DAIRY"), Rail::Upi, 250.0);
        assert_eq!(ev, None);
        let ev = check("UPI-ANITA RAO-MILK-anita@ybl", Some("ANITA RAO"), Rail::Upi, 250.0);
        assert_eq!(ev, None);
    }

    #[test]
    fn test_explicit_phrase() {
        let ev = check("IB SELF TRANSFER TO 0012", None, Rail::NetBanking, 5_000.0);
        assert_eq!(ev, Some(TransferEvidence::ExplicitPhrase));
    }
}

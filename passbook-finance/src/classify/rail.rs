//! Payment rail detection. Most specific rail first; first match wins.

use passbook_core::Rail;

use super::normalize::NormalizedNarration;

/// VPA handles and wallet names that only ever ride on UPI.
const UPI_MARKERS: &[&str] = &[
    "@YBL", "@PAYTM", "@OK", "@AXL", "@IBL", "@PTYES", "@PTSBI", "@APL", "@UPI", "@JIO",
    "PHONEPE", "GPAY", "GOOGLE PAY", "BHIM",
];

const NETBANKING_MARKERS: &[&str] = &["NET BANKING", "NETBANKING", "FUNDS TRANSFER", "INB "];

const CHEQUE_MARKERS: &[&str] = &["CHQ", "CHEQUE", "CLG", "CLEARING", "CTS"];

/// Rail code as a token, or glued to the front of one (`NACHDR`, `NEFTCR`).
fn rail_word(n: &NormalizedNarration, code: &str) -> bool {
    n.tokens.iter().any(|t| t.starts_with(code))
}

pub fn detect_rail(n: &NormalizedNarration) -> Rail {
    if n.has_token("POS") || n.has_phrase("CARD PURCHASE") {
        return Rail::Pos;
    }
    // ACH must be a token of its own so NACH does not match it.
    if n.has_token("ACH") || n.has_phrase("ACH D") || n.has_phrase("ACH C") {
        return Rail::Ach;
    }
    if rail_word(n, "NACH") {
        return Rail::Nach;
    }
    if n.has_token("ECS") {
        return Rail::Ecs;
    }
    if rail_word(n, "RTGS") {
        return Rail::Rtgs;
    }
    if rail_word(n, "NEFT") {
        return Rail::Neft;
    }
    if rail_word(n, "IMPS") || n.has_token("MMT") {
        return Rail::Imps;
    }
    if n.has_token("UPI")
        || n.upper.contains("UPI/")
        || n.upper.contains("UPI-")
        || UPI_MARKERS.iter().any(|m| n.upper.contains(m))
    {
        return Rail::Upi;
    }
    if n.upper.starts_with("IB ")
        || n.upper.starts_with("IB-")
        || n.upper.contains(" IB ")
        || n.upper.contains(" IB-")
        || NETBANKING_MARKERS.iter().any(|m| n.upper.contains(m))
    {
        return Rail::NetBanking;
    }
    if CHEQUE_MARKERS.iter().any(|m| n.has_token(m)) || n.has_phrase("CHQ PAID") {
        return Rail::Cheque;
    }
    Rail::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::normalize::normalize;

    fn rail(s: &str) -> Rail {
        detect_rail(&normalize(s))
    }

    #[test]
    fn test_specific_rails_first() {
        assert_eq!(rail("POS 4598XXXXXX1234 AMAZON"), Rail::Pos);
        assert_eq!(rail("ACH D STAFF LOAN EMI REC"), Rail::Ach);
        assert_eq!(rail("NACH-DR-HDFC LIFE"), Rail::Nach);
        assert_eq!(rail("ECS/BAJAJ FINANCE"), Rail::Ecs);
        assert_eq!(rail("RTGS CR-HDFC0000001-ACME"), Rail::Rtgs);
        assert_eq!(rail("NEFT-ZERODHA BROKING LTD"), Rail::Neft);
        assert_eq!(rail("IMPS-223344-RAHUL"), Rail::Imps);
    }

    #[test]
    fn test_nach_is_not_ach() {
        assert_eq!(rail("NACHDR ICICI PRU"), Rail::Nach);
    }

    #[test]
    fn test_rail_codes_inside_words_do_not_match() {
        assert_eq!(rail("POS 4598XXXXXX1234 SHRIMPS BAR"), Rail::Pos);
        assert_eq!(rail("SHRIMPS AND CO"), Rail::Unknown);
        assert_eq!(rail("BENEFTS CREDIT"), Rail::Unknown);
        assert_eq!(rail("NEFTCR-HDFC0000001-ACME"), Rail::Neft);
    }

    #[test]
    fn test_upi_from_vpa_suffix() {
        assert_eq!(rail("UPI-RAHUL SHARMA-rahul@ybl-REF 1"), Rail::Upi);
        assert_eq!(rail("PAYMENT TO shop@okhdfcbank"), Rail::Upi);
        assert_eq!(rail("To store@ptyes 991"), Rail::Upi);
    }

    #[test]
    fn test_netbanking_and_cheque() {
        assert_eq!(rail("IB FUNDS TRANSFER DR-12345"), Rail::NetBanking);
        assert_eq!(rail("CHQ PAID-MICR CTS-KAVERI"), Rail::Cheque);
        assert_eq!(rail("CASH DEPOSIT"), Rail::Unknown);
    }
}

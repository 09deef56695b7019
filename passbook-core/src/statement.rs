//! Statement-level metadata supplied alongside the rows.

use serde::{Deserialize, Serialize};

/// Header facts printed on the statement itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatementMeta {
    pub account_no: String,
    pub customer_name: String,
    pub statement_period: String,
    #[serde(default)]
    pub opening_balance: f64,
    #[serde(default)]
    pub closing_balance: f64,
    /// Bank-printed credit total; trusted over computed totals when > 0
    #[serde(default)]
    pub official_total_credits: Option<f64>,
    /// Bank-printed debit total; trusted over computed totals when > 0
    #[serde(default)]
    pub official_total_debits: Option<f64>,
}

impl StatementMeta {
    pub fn official_credits(&self) -> Option<f64> {
        self.official_total_credits.filter(|v| *v > 0.0)
    }

    pub fn official_debits(&self) -> Option<f64> {
        self.official_total_debits.filter(|v| *v > 0.0)
    }

    pub fn masked_account_no(&self) -> String {
        mask_account_number(&self.account_no)
    }
}

/// Mask an account number to `XXXXXX` + last 4 characters.
///
/// Separators are ignored; numbers with 4 or fewer characters are fully masked.
pub fn mask_account_number(account_no: &str) -> String {
    let compact: Vec<char> = account_no
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if compact.len() <= 4 {
        return "XXXXXX".to_string();
    }
    let tail: String = compact[compact.len() - 4..].iter().collect();
    format!("XXXXXX{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_account_number() {
        assert_eq!(mask_account_number("50100123456789"), "XXXXXX6789");
        assert_eq!(mask_account_number("5010-0123-4567"), "XXXXXX4567");
        assert_eq!(mask_account_number("123"), "XXXXXX");
        assert_eq!(mask_account_number(""), "XXXXXX");
    }

    #[test]
    fn test_official_totals_ignore_zero() {
        let meta = StatementMeta {
            official_total_credits: Some(0.0),
            official_total_debits: Some(1500.0),
            ..Default::default()
        };
        assert_eq!(meta.official_credits(), None);
        assert_eq!(meta.official_debits(), Some(1500.0));
    }

    #[test]
    fn test_meta_deserializes_camel_case() {
        let meta: StatementMeta = serde_json::from_str(
            r#"{"accountNo":"50100123456789","customerName":"A","statementPeriod":"Jan 2024",
                "openingBalance":100.5,"closingBalance":250.0}"#,
        )
        .unwrap();
        assert_eq!(meta.opening_balance, 100.5);
        assert_eq!(meta.official_total_debits, None);
        assert_eq!(meta.masked_account_no(), "XXXXXX6789");
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::DateFormat;

/// One statement line as handed over by the statement parser.
///
/// Amounts accept JSON numbers, formatted strings ("1,234.50") or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub date: String,
    #[serde(default)]
    pub narration: String,
    #[serde(default)]
    pub cheque_ref_no: Option<String>,
    #[serde(default)]
    pub value_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub withdrawal_amount: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub deposit_amount: f64,
    /// Signed: negative when the account is overdrawn
    #[serde(default, deserialize_with = "lenient_balance")]
    pub closing_balance: f64,
}

impl RawTransaction {
    pub fn debit(date: &str, narration: &str, amount: f64) -> Self {
        Self {
            date: date.to_string(),
            narration: narration.to_string(),
            withdrawal_amount: amount,
            ..Default::default()
        }
    }

    pub fn credit(date: &str, narration: &str, amount: f64) -> Self {
        Self {
            date: date.to_string(),
            narration: narration.to_string(),
            deposit_amount: amount,
            ..Default::default()
        }
    }

    pub fn with_balance(mut self, closing_balance: f64) -> Self {
        self.closing_balance = closing_balance;
        self
    }
}

/// Debit or credit, after netting rows that carry both amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowDirection {
    Debit,
    Credit,
}

/// A raw row that passed validation, with its parsed date and net movement.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementRow {
    /// Position in the caller's list
    pub index: usize,
    pub posted: NaiveDate,
    pub date_format: DateFormat,
    pub direction: RowDirection,
    /// Net absolute amount (> 0)
    pub amount: f64,
    pub raw: RawTransaction,
}

/// A row dropped during intake and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    pub index: usize,
    pub reason: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Number(f64),
    Text(String),
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_with(deserializer, crate::amount::parse_amount)
}

fn lenient_balance<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_with(deserializer, crate::amount::parse_balance)
}

fn lenient_with<'de, D>(
    deserializer: D,
    parse: fn(&str) -> anyhow::Result<f64>,
) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let repr: Option<AmountRepr> = Option::deserialize(deserializer)?;
    Ok(match repr {
        None => 0.0,
        Some(AmountRepr::Number(n)) => n,
        Some(AmountRepr::Text(s)) => match parse(&s) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(value = %s, error = %e, "unparseable amount, treating as zero");
                0.0
            }
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_mixed_amounts() {
        let rows: Vec<RawTransaction> = serde_json::from_str(
            r#"[
                {"date":"05/01/2024","narration":"A","withdrawalAmount":"1,500.00","depositAmount":null,"closingBalance":20000},
                {"date":"06/01/2024","narration":"B","depositAmount":250.5}
            ]"#,
        )
        .unwrap();
        assert_eq!(rows[0].withdrawal_amount, 1500.0);
        assert_eq!(rows[0].deposit_amount, 0.0);
        assert_eq!(rows[0].closing_balance, 20000.0);
        assert_eq!(rows[1].deposit_amount, 250.5);
        assert_eq!(rows[1].cheque_ref_no, None);
    }

    #[test]
    fn test_overdrawn_balance_string_stays_negative() {
        let row: RawTransaction = serde_json::from_str(
            r#"{"date":"05/01/2024","withdrawalAmount":"100.00","closingBalance":"-5,000.00"}"#,
        )
        .unwrap();
        assert_eq!(row.withdrawal_amount, 100.0);
        assert_eq!(row.closing_balance, -5000.0);

        let row: RawTransaction =
            serde_json::from_str(r#"{"date":"05/01/2024","closingBalance":"750.00 Dr"}"#).unwrap();
        assert_eq!(row.closing_balance, -750.0);
    }

    #[test]
    fn test_garbage_amount_becomes_zero() {
        let row: RawTransaction =
            serde_json::from_str(r#"{"date":"05/01/2024","withdrawalAmount":"n/a"}"#).unwrap();
        assert_eq!(row.withdrawal_amount, 0.0);
    }
}

//! Row intake: parse dates, resolve net direction, drop malformed rows.

use anyhow::Result;

use crate::dates::parse_statement_date;
use crate::types::{RawTransaction, RowDirection, SkippedRow, StatementRow};

/// Validated rows plus the ones that were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intake {
    pub rows: Vec<StatementRow>,
    pub skipped: Vec<SkippedRow>,
}

impl Intake {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Validate one row. Errors carry the human-readable skip reason.
pub fn validate_row(index: usize, raw: &RawTransaction) -> Result<StatementRow> {
    let (posted, date_format) = parse_statement_date(&raw.date)?;

    let withdrawal = raw.withdrawal_amount.abs();
    let deposit = raw.deposit_amount.abs();
    if withdrawal == 0.0 && deposit == 0.0 {
        anyhow::bail!("both amounts are zero");
    }

    // Both columns filled: net them and keep the larger side's direction.
    let (direction, amount) = if withdrawal > deposit {
        (RowDirection::Debit, withdrawal - deposit)
    } else {
        (RowDirection::Credit, deposit - withdrawal)
    };
    if amount <= f64::EPSILON {
        anyhow::bail!("withdrawal and deposit cancel out");
    }

    Ok(StatementRow {
        index,
        posted,
        date_format,
        direction,
        amount,
        raw: raw.clone(),
    })
}

/// Validate every row, keeping input order. Never fails as a whole.
pub fn validate_rows(rows: &[RawTransaction]) -> Intake {
    let mut intake = Intake::default();
    for (index, raw) in rows.iter().enumerate() {
        match validate_row(index, raw) {
            Ok(row) => intake.rows.push(row),
            Err(e) => {
                tracing::debug!(index, error = %e, "skipping malformed row");
                intake.skipped.push(SkippedRow {
                    index,
                    reason: format!("{e:#}"),
                });
            }
        }
    }
    intake
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_and_credit_rows() {
        let intake = validate_rows(&[
            RawTransaction::debit("05/01/2024", "ATM WDL", 2000.0),
            RawTransaction::credit("06/01/2024", "INTEREST", 12.5),
        ]);
        assert_eq!(intake.rows.len(), 2);
        assert_eq!(intake.rows[0].direction, RowDirection::Debit);
        assert_eq!(intake.rows[0].amount, 2000.0);
        assert_eq!(intake.rows[1].direction, RowDirection::Credit);
        assert_eq!(intake.skipped_count(), 0);
    }

    #[test]
    fn test_both_amounts_resolve_to_net() {
        let mut raw = RawTransaction::debit("05/01/2024", "ADJ", 1000.0);
        raw.deposit_amount = 300.0;
        let row = validate_row(0, &raw).unwrap();
        assert_eq!(row.direction, RowDirection::Debit);
        assert_eq!(row.amount, 700.0);
    }

    #[test]
    fn test_malformed_rows_are_counted_not_fatal() {
        let mut equal = RawTransaction::debit("05/01/2024", "ADJ", 500.0);
        equal.deposit_amount = 500.0;
        let intake = validate_rows(&[
            RawTransaction::debit("not a date", "X", 10.0),
            RawTransaction::debit("05/01/2024", "ZERO", 0.0),
            equal,
            RawTransaction::debit("07/01/2024", "OK", 99.0),
        ]);
        assert_eq!(intake.rows.len(), 1);
        assert_eq!(intake.rows[0].index, 3);
        assert_eq!(intake.skipped_count(), 3);
        assert!(intake.skipped[1].reason.contains("both amounts are zero"));
    }
}

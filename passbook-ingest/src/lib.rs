//! passbook-ingest: intake of statement rows handed over by the statement
//! parser (dates, amounts, direction) ahead of classification.

pub mod amount;
pub mod dates;
pub mod types;
pub mod validate;

pub use dates::{DateFormat, format_ddmmyyyy, parse_statement_date};
pub use types::{RawTransaction, RowDirection, SkippedRow, StatementRow};
pub use validate::{Intake, validate_row, validate_rows};

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use passbook_core::{EngineConfig, FixedClock, StatementMeta};
use passbook_finance::Engine;
use passbook_ingest::RawTransaction;
use passbook_ingest::amount::{parse_amount, parse_balance};

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("statement.csv")
}

fn optional(field: Option<&str>) -> Option<String> {
    field.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn amount(field: Option<&str>) -> f64 {
    parse_amount(field.unwrap_or("")).unwrap()
}

/// Rows from the fixture statement export, header skipped.
pub fn load_fixture() -> Vec<RawTransaction> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(fixture_path())
        .unwrap();
    rdr.records()
        .map(|record| {
            let record = record.unwrap();
            RawTransaction {
                date: record.get(0).unwrap_or("").trim().to_string(),
                narration: record.get(1).unwrap_or("").to_string(),
                cheque_ref_no: optional(record.get(2)),
                value_date: optional(record.get(3)),
                withdrawal_amount: amount(record.get(4)),
                deposit_amount: amount(record.get(5)),
                closing_balance: parse_balance(record.get(6).unwrap_or("")).unwrap(),
            }
        })
        .collect()
}

pub fn fixture_meta() -> StatementMeta {
    StatementMeta {
        account_no: "50100123456789".to_string(),
        customer_name: "A. KUMAR".to_string(),
        statement_period: "01/01/2024 - 15/03/2024".to_string(),
        opening_balance: 50_000.0,
        closing_balance: 221_797.5,
        official_total_credits: None,
        official_total_debits: None,
    }
}

pub fn engine() -> Engine {
    let today = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
    Engine::new(EngineConfig::default()).with_clock(Arc::new(FixedClock::new(today)))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Ten small grocery debits, enough to arm the anomaly detector.
pub fn grocery_padding() -> Vec<RawTransaction> {
    (1..=10)
        .map(|day| {
            RawTransaction::debit(
                &format!("{day:02}/03/2024"),
                "POS 4598XXXXXX1234 BIGBASKET",
                1_000.0 + f64::from(day),
            )
        })
        .collect()
}

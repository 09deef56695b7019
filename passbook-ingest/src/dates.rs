//! Statement date formats.
//!
//! Indian bank exports mix `DD/MM/YY`, `DD/MM/YYYY`, `YYYY-MM-DD`,
//! `DD-MM-YYYY` and `DD-MMM-YYYY`; the shape of the string picks the format.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateFormat {
    /// 05/01/24
    DdMmYy,
    /// 05/01/2024
    DdMmYyyy,
    /// 2024-01-05
    Iso,
    /// 05-01-2024
    DdMmYyyyDash,
    /// 05-01-24
    DdMmYyDash,
    /// 05-Jan-2024
    DdMonYyyy,
}

impl DateFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            DateFormat::DdMmYy => "%d/%m/%y",
            DateFormat::DdMmYyyy => "%d/%m/%Y",
            DateFormat::Iso => "%Y-%m-%d",
            DateFormat::DdMmYyyyDash => "%d-%m-%Y",
            DateFormat::DdMmYyDash => "%d-%m-%y",
            DateFormat::DdMonYyyy => "%d-%b-%Y",
        }
    }

    /// Render a date back in this format.
    pub fn format(self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }
}

fn detect_format(s: &str) -> Option<DateFormat> {
    let sep = if s.contains('/') {
        '/'
    } else if s.contains('-') {
        '-'
    } else {
        return None;
    };
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }

    match (sep, parts[0].len(), parts[2].len()) {
        ('/', _, 2) => Some(DateFormat::DdMmYy),
        ('/', _, 4) => Some(DateFormat::DdMmYyyy),
        ('-', 4, _) => Some(DateFormat::Iso),
        ('-', _, 4) if parts[1].chars().all(|c| c.is_ascii_alphabetic()) => {
            Some(DateFormat::DdMonYyyy)
        }
        ('-', _, 4) => Some(DateFormat::DdMmYyyyDash),
        ('-', _, 2) => Some(DateFormat::DdMmYyDash),
        _ => None,
    }
}

/// Parse a statement date, returning the date and the format it was written in.
pub fn parse_statement_date(s: &str) -> Result<(NaiveDate, DateFormat)> {
    let s = s.trim();
    let format = detect_format(s).with_context(|| format!("unrecognised date format '{s}'"))?;
    let date = NaiveDate::parse_from_str(s, format.pattern())
        .with_context(|| format!("invalid date '{s}' for format {}", format.pattern()))?;
    Ok((date, format))
}

/// Canonical output format used where the input format is not at hand.
pub fn format_ddmmyyyy(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

use anyhow::{Context, Result};

/// Parse a statement amount such as `1,23,456.78`, `₹ 500`, `1500.00 Dr` or `(250.00)`.
///
/// The sign is dropped: direction comes from which column the amount sits in.
pub fn parse_amount(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(0.0);
    }

    let cleaned: String = trimmed
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c.is_whitespace())
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        anyhow::bail!("no digits in amount '{trimmed}'");
    }

    let value: f64 = cleaned
        .parse()
        .with_context(|| format!("invalid amount '{trimmed}'"))?;
    Ok(value.abs())
}

/// Parse a running balance, keeping its sign.
///
/// A leading `-`, a parenthesised figure or a `Dr` suffix marks an overdrawn
/// balance; `Cr` or no marker is positive.
pub fn parse_balance(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    let magnitude = parse_amount(trimmed)?;
    let upper = trimmed.to_ascii_uppercase();
    let negative = trimmed.starts_with('-')
        || (trimmed.starts_with('(') && trimmed.ends_with(')'))
        || upper.trim_end_matches('.').ends_with("DR");
    Ok(if negative && magnitude > 0.0 { -magnitude } else { magnitude })
}

//! Per-call engine configuration. Every threshold the pipeline uses lives
//! here so callers can tune without touching rule tables.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum amount for a big-ticket movement
    pub big_ticket_threshold: f64,
    /// Non-whitelisted debits above this raise a fraud alert
    pub fraud_large_amount: f64,
    /// Large-amount alerts above this are Medium risk
    pub fraud_medium_amount: f64,
    /// Unknown-merchant debits above this raise a fraud alert
    pub fraud_unknown_amount: f64,
    pub fraud_max_alerts: usize,

    /// Credits at or above this with salary wording count as salary
    pub salary_min_amount: f64,

    /// N for top beneficiaries / top expenses
    pub top_n: usize,

    pub recurring_probable: u8,
    pub recurring_confirmed: u8,

    /// Fewer debits than this and the anomaly detector stays silent
    pub anomaly_min_rows: usize,
    /// Minimum rows in a category before amount outliers are scored
    pub anomaly_min_category_rows: usize,
    pub anomaly_top: usize,
    /// How many earlier debits a duplicate check looks back over
    pub duplicate_lookback: usize,

    /// IMPS/UPI transfers to a person-shaped name at or above this are self transfers
    pub p2p_transfer_amount: f64,

    pub tax_bracket: f64,
    pub section_80c_cap: f64,
    pub section_80d_cap: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            big_ticket_threshold: 20_000.0,
            fraud_large_amount: 50_000.0,
            fraud_medium_amount: 100_000.0,
            fraud_unknown_amount: 10_000.0,
            fraud_max_alerts: 5,
            salary_min_amount: 50_000.0,
            top_n: 5,
            recurring_probable: 50,
            recurring_confirmed: 70,
            anomaly_min_rows: 10,
            anomaly_min_category_rows: 5,
            anomaly_top: 5,
            duplicate_lookback: 20,
            p2p_transfer_amount: 10_000.0,
            tax_bracket: 0.30,
            section_80c_cap: 150_000.0,
            section_80d_cap: 25_000.0,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> EngineResult<Self> {
        let cfg: EngineConfig =
            toml::from_str(s).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let positive = [
            ("big_ticket_threshold", self.big_ticket_threshold),
            ("fraud_large_amount", self.fraud_large_amount),
            ("fraud_medium_amount", self.fraud_medium_amount),
            ("fraud_unknown_amount", self.fraud_unknown_amount),
            ("salary_min_amount", self.salary_min_amount),
            ("p2p_transfer_amount", self.p2p_transfer_amount),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.recurring_probable > 100 || self.recurring_confirmed > 100 {
            return Err(EngineError::InvalidConfig(
                "recurring thresholds are percentages (0-100)".to_string(),
            ));
        }
        if self.recurring_confirmed < self.recurring_probable {
            return Err(EngineError::InvalidConfig(
                "recurring_confirmed must be >= recurring_probable".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.tax_bracket) {
            return Err(EngineError::InvalidConfig(format!(
                "tax_bracket must be within [0, 1], got {}",
                self.tax_bracket
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.big_ticket_threshold, 20_000.0);
        assert_eq!(cfg.top_n, 5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = EngineConfig::from_toml_str("big_ticket_threshold = 30000.0\ntop_n = 3\n").unwrap();
        assert_eq!(cfg.big_ticket_threshold, 30_000.0);
        assert_eq!(cfg.top_n, 3);
        assert_eq!(cfg.fraud_large_amount, 50_000.0);
    }

    #[test]
    fn test_rejects_inverted_recurring_thresholds() {
        let err = EngineConfig::from_toml_str("recurring_probable = 80\nrecurring_confirmed = 60\n")
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(EngineConfig::from_toml_str("top_n = \"five\"").is_err());
    }
}

//! Fraud alerts on non-whitelisted debits, and big-ticket movements.

use passbook_core::{Category, ClassifiedTransaction, Direction, EngineConfig, Method};
use serde::Serialize;

use super::stats::round2;
use crate::classify::normalize::{contains_bounded, normalize};

/// Known-legitimate payees, matched as whole words inside the uppercased merchant.
const WHITELIST_MERCHANTS: &[&str] = &[
    // investment platforms and market plumbing
    "ZERODHA",
    "GROWW",
    "UPSTOX",
    "ANGEL ONE",
    "KUVERA",
    "PAYTM MONEY",
    "SMALLCASE",
    "INDMONEY",
    "CLEARING",
    "NSCCL",
    "ICCL",
    "CDSL",
    "NSDL",
    "CAMS",
    "KFINTECH",
    // banks
    "HDFC BANK",
    "ICICI BANK",
    "STATE BANK",
    "SBI",
    "AXIS BANK",
    "KOTAK",
    // life insurers
    "LIC",
    "HDFC LIFE",
    "ICICI PRU",
    "SBI LIFE",
    "MAX LIFE",
    "TATA AIA",
    "BAJAJ ALLIANZ",
    // crypto exchanges
    "WAZIRX",
    "COINDCX",
    "COINSWITCH",
    "MUDREX",
    // tax
    "INCOME TAX",
    "GST",
];

/// Narration keywords that mark a deposit, fund or tax instruction.
const WHITELIST_KEYWORDS: &[&str] = &["SIP", "MF", "MUTUAL FUND", "RD", "FD", "TAX", "CBDT"];

const WHITELIST_CATEGORIES: &[Category] = &[
    Category::Investment,
    Category::SelfTransfer,
    Category::Income,
    Category::BillsUtilities,
    Category::Loan,
];

const WHITELIST_METHODS: &[Method] = &[
    Method::SelfTransfer,
    Method::Investment,
    Method::Rd,
    Method::Fd,
    Method::Sip,
];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FraudAlert {
    pub date: String,
    pub merchant: String,
    pub amount: f64,
    pub reason: String,
    pub risk: RiskLevel,
    #[serde(skip)]
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FraudRisk {
    pub level: RiskLevel,
    pub total_flagged: usize,
    pub alerts: Vec<FraudAlert>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BigTicketMovement {
    pub date: String,
    pub narration: String,
    pub merchant: String,
    pub amount: f64,
    pub direction: Direction,
    pub category: Category,
    pub method: Method,
    pub impact: RiskLevel,
}

pub fn is_whitelisted(t: &ClassifiedTransaction) -> bool {
    if WHITELIST_METHODS.contains(&t.method) || WHITELIST_CATEGORIES.contains(&t.category) {
        return true;
    }
    let merchant = t.merchant.to_uppercase();
    if WHITELIST_MERCHANTS.iter().any(|w| contains_bounded(&merchant, w)) {
        return true;
    }
    let n = normalize(&t.narration);
    WHITELIST_KEYWORDS.iter().any(|w| n.matches_keyword(w))
}

fn is_unknown_vendor(t: &ClassifiedTransaction) -> bool {
    !t.has_canonical_merchant() && t.category == Category::Other
}

fn alert_for(t: &ClassifiedTransaction, config: &EngineConfig) -> Option<FraudAlert> {
    if !t.is_debit() || is_whitelisted(t) {
        return None;
    }
    let (reason, risk) = if t.amount > config.fraud_large_amount {
        let risk = if t.amount > config.fraud_medium_amount {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        (format!("large debit of {:.2} to a non-whitelisted payee", t.amount), risk)
    } else if t.amount > config.fraud_unknown_amount && is_unknown_vendor(t) {
        (format!("{:.2} paid to an unrecognised vendor", t.amount), RiskLevel::Low)
    } else {
        return None;
    };
    Some(FraudAlert {
        date: t.date.clone(),
        merchant: t.merchant.clone(),
        amount: round2(t.amount),
        reason,
        risk,
        index: t.index,
    })
}

pub fn fraud_risk(rows: &[ClassifiedTransaction], config: &EngineConfig) -> FraudRisk {
    let mut alerts: Vec<FraudAlert> = rows.iter().filter_map(|t| alert_for(t, config)).collect();
    alerts.sort_by(|a, b| b.amount.total_cmp(&a.amount).then(a.index.cmp(&b.index)));
    let total_flagged = alerts.len();
    alerts.truncate(config.fraud_max_alerts);
    let level = match alerts.len() {
        0 => RiskLevel::Low,
        1..=3 => RiskLevel::Medium,
        _ => RiskLevel::High,
    };
    FraudRisk {
        level,
        total_flagged,
        alerts,
    }
}

pub fn big_ticket_movements(
    rows: &[ClassifiedTransaction],
    config: &EngineConfig,
) -> Vec<BigTicketMovement> {
    let threshold = config.big_ticket_threshold;
    let mut out: Vec<&ClassifiedTransaction> = rows
        .iter()
        .filter(|t| t.amount >= threshold)
        .filter(|t| !t.method.is_income() && t.category != Category::Salary)
        .collect();
    out.sort_by(|a, b| b.amount.total_cmp(&a.amount).then(a.index.cmp(&b.index)));
    out.into_iter()
        .map(|t| BigTicketMovement {
            date: t.date.clone(),
            narration: t.narration.clone(),
            merchant: t.merchant.clone(),
            amount: round2(t.amount),
            direction: t.direction,
            category: t.category,
            method: t.method,
            impact: if t.amount >= 2.0 * threshold {
                RiskLevel::High
            } else if t.amount >= 1.5 * threshold {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use passbook_ingest::{RawTransaction, validate_rows};

    fn classify(raws: &[RawTransaction]) -> Vec<ClassifiedTransaction> {
        let config = EngineConfig::default();
        Classifier::new(&config).classify_all(&validate_rows(raws).rows)
    }

    #[test]
    fn test_broker_never_alerts() {
        let rows = classify(&[RawTransaction::debit(
            "07/01/2024",
            "NEFT-ZERODHA BROKING LTD-NSE CLIENT AC-N24008812",
            80_000.0,
        )]);
        assert!(is_whitelisted(&rows[0]));
        let risk = fraud_risk(&rows, &EngineConfig::default());
        assert!(risk.alerts.is_empty());
        assert_eq!(risk.level, RiskLevel::Low);
    }

    #[test]
    fn test_unknown_vendor_alert() {
        let rows = classify(&[RawTransaction::debit("05/02/2024", "XQ 7781 ZZ", 50_000.0)]);
        let risk = fraud_risk(&rows, &EngineConfig::default());
        assert_eq!(risk.alerts.len(), 1);
        assert!(risk.alerts[0].reason.contains("unrecognised"));
        assert_eq!(risk.level, RiskLevel::Medium);
    }

    #[test]
    fn test_large_debit_risk_and_cap() {
        let raws: Vec<RawTransaction> = (1..=7)
            .map(|i| RawTransaction::debit(&format!("0{i}/02/2024"), "POS 4598XXXXXX1234 CROMA", 60_000.0 + f64::from(i) * 10_000.0))
            .collect();
        let rows = classify(&raws);
        let risk = fraud_risk(&rows, &EngineConfig::default());
        assert_eq!(risk.total_flagged, 7);
        assert_eq!(risk.alerts.len(), 5);
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(risk.alerts[0].amount, 130_000.0);
        assert_eq!(risk.alerts[0].risk, RiskLevel::Medium);
        assert_eq!(risk.alerts[4].risk, RiskLevel::Low);
    }

    #[test]
    fn test_big_ticket_excludes_salary() {
        let rows = classify(&[
            RawTransaction::credit("01/01/2024", "NEFT-ACME CORP SALARY JAN", 120_000.0),
            RawTransaction::debit("02/01/2024", "NEFT-ZERODHA BROKING LTD-N1", 45_000.0),
            RawTransaction::debit("03/01/2024", "POS 4598XXXXXX1234 CROMA", 30_000.0),
            RawTransaction::debit("04/01/2024", "POS 4598XXXXXX1234 CROMA", 20_000.0),
            RawTransaction::debit("05/01/2024", "POS 4598XXXXXX1234 CROMA", 19_999.0),
        ]);
        let big = big_ticket_movements(&rows, &EngineConfig::default());
        assert_eq!(big.len(), 3);
        assert_eq!(big[0].amount, 45_000.0);
        assert_eq!(big[0].impact, RiskLevel::High);
        assert_eq!(big[1].impact, RiskLevel::Medium);
        assert_eq!(big[2].impact, RiskLevel::Low);
    }
}

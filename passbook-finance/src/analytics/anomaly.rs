//! Statistical anomaly detection over debit rows.
//!
//! The spending profile is built once from every debit in the statement and
//! then frozen; scoring reads the snapshot and only walks backwards through
//! earlier rows for merchant history and duplicate checks.

use std::collections::{BTreeMap, BTreeSet};

use passbook_core::{
    CancellationToken, Category, ClassifiedTransaction, EngineConfig, EngineResult, Severity,
};
use serde::Serialize;
use tracing::debug;

use super::stats::{mean, percentile_nearest_rank, quantile, round2, sorted, std_dev};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    UnusualAmount,
    UnusualMerchant,
    DuplicatePayment,
    RoundAmount,
    SpendingSpike,
}

impl AnomalyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyKind::UnusualAmount => "unusual_amount",
            AnomalyKind::UnusualMerchant => "unusual_merchant",
            AnomalyKind::DuplicatePayment => "duplicate_payment",
            AnomalyKind::RoundAmount => "round_amount",
            AnomalyKind::SpendingSpike => "spending_spike",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    #[serde(skip)]
    pub index: usize,
    pub date: String,
    pub merchant: String,
    pub amount: f64,
    pub category: Category,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub score: f64,
    pub reason: String,
}

/// Distribution of one category's debit amounts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryProfile {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub p95: f64,
    pub p99: f64,
}

impl CategoryProfile {
    fn from_amounts(amounts: &[f64]) -> Self {
        let s = sorted(amounts);
        Self {
            count: s.len(),
            mean: mean(&s),
            std_dev: std_dev(&s),
            min: s.first().copied().unwrap_or_default(),
            max: s.last().copied().unwrap_or_default(),
            q1: quantile(&s, 0.25),
            median: quantile(&s, 0.5),
            q3: quantile(&s, 0.75),
            p95: percentile_nearest_rank(&s, 95.0),
            p99: percentile_nearest_rank(&s, 99.0),
        }
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    pub fn z_score(&self, amount: f64) -> f64 {
        if self.std_dev > 0.0 {
            (amount - self.mean) / self.std_dev
        } else {
            0.0
        }
    }

    /// Tukey upper fence scaled the way the critical band expects.
    pub fn extreme_fence(&self) -> f64 {
        1.5 * (self.q3 + 1.5 * self.iqr())
    }

    pub fn outlier_fence(&self) -> f64 {
        self.q3 + 1.5 * self.iqr()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpendingProfile {
    pub total_transactions: usize,
    /// Distinct posting dates with at least one debit
    pub transaction_days: usize,
    pub avg_daily_spend: f64,
    pub avg_weekly_spend: f64,
    pub categories: BTreeMap<Category, CategoryProfile>,
    pub merchant_frequency: BTreeMap<String, usize>,
}

impl SpendingProfile {
    pub fn build(debits: &[&ClassifiedTransaction]) -> Self {
        let mut amounts: BTreeMap<Category, Vec<f64>> = BTreeMap::new();
        let mut merchant_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut dates = BTreeSet::new();
        for t in debits {
            amounts.entry(t.category).or_default().push(t.amount);
            *merchant_frequency.entry(t.merchant.clone()).or_default() += 1;
            dates.insert(t.posted);
        }
        let first = debits.iter().map(|t| t.posted).min();
        let last = debits.iter().map(|t| t.posted).max();
        let days = match (first, last) {
            (Some(first), Some(last)) => (last - first).num_days() + 1,
            _ => 1,
        };
        let total: f64 = debits.iter().map(|t| t.amount).sum();
        let avg_daily_spend = total / days as f64;
        Self {
            total_transactions: debits.len(),
            transaction_days: dates.len(),
            avg_daily_spend,
            avg_weekly_spend: avg_daily_spend * 7.0,
            categories: amounts
                .into_iter()
                .map(|(c, a)| (c, CategoryProfile::from_amounts(&a)))
                .collect(),
            merchant_frequency,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    pub anomalies: Vec<Anomaly>,
    pub total_anomalies: usize,
    pub total_analyzed: usize,
    pub risk_score: f64,
    pub by_type: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<String, usize>,
}

struct Signal {
    kind: AnomalyKind,
    severity: Severity,
    score: f64,
    reason: String,
}

fn unusual_amount(t: &ClassifiedTransaction, p: &CategoryProfile) -> Option<Signal> {
    let z = p.z_score(t.amount);
    let (severity, score) = if z > 4.0 || t.amount > p.p99 || t.amount > p.extreme_fence() {
        (Severity::Critical, 0.95)
    } else if z > 3.0 || t.amount > p.p95 {
        (Severity::High, 0.80)
    } else if t.amount > p.outlier_fence() || z > 2.5 {
        (Severity::Medium, 0.60)
    } else if z > 2.0 {
        (Severity::Low, 0.40)
    } else {
        return None;
    };
    Some(Signal {
        kind: AnomalyKind::UnusualAmount,
        severity,
        score,
        reason: format!(
            "{:.2} is unusual for {} (z {:.2}, typical {:.2})",
            t.amount,
            t.category.label(),
            z,
            p.median
        ),
    })
}

fn unusual_merchant(t: &ClassifiedTransaction, seen_before: usize, avg_daily: f64) -> Option<Signal> {
    let (severity, score, reason) = match seen_before {
        0 if t.amount > 3.0 * avg_daily => (Severity::Medium, 0.65, "first payment to"),
        1 if t.amount > 2.0 * avg_daily => (Severity::Low, 0.45, "second payment to"),
        _ => return None,
    };
    Some(Signal {
        kind: AnomalyKind::UnusualMerchant,
        severity,
        score,
        reason: format!("{reason} {} well above daily spend", t.merchant),
    })
}

fn duplicate_payment(t: &ClassifiedTransaction, earlier: &[&ClassifiedTransaction]) -> Option<Signal> {
    let gap = earlier
        .iter()
        .filter(|prev| prev.merchant == t.merchant && (prev.amount - t.amount).abs() < 0.01)
        .map(|prev| (t.posted - prev.posted).num_days().abs())
        .min()?;
    let (severity, score) = match gap {
        0..=1 => (Severity::High, 0.85),
        2..=3 => (Severity::Medium, 0.60),
        _ => return None,
    };
    Some(Signal {
        kind: AnomalyKind::DuplicatePayment,
        severity,
        score,
        reason: format!("same amount to {} {gap} day(s) apart", t.merchant),
    })
}

fn round_amount(t: &ClassifiedTransaction) -> Option<Signal> {
    if t.amount < 25_000.0 || t.category != Category::Other {
        return None;
    }
    let unit = if t.amount >= 100_000.0 {
        100_000.0
    } else if t.amount >= 50_000.0 {
        10_000.0
    } else {
        1_000.0
    };
    if t.amount % unit != 0.0 {
        return None;
    }
    Some(Signal {
        kind: AnomalyKind::RoundAmount,
        severity: Severity::Medium,
        score: 0.55,
        reason: format!("round amount {:.0} to an uncategorised payee", t.amount),
    })
}

fn spending_spike(t: &ClassifiedTransaction, avg_daily: f64) -> Option<Signal> {
    let limit = 2.0 * avg_daily * 3.0;
    (limit > 0.0 && t.amount > limit).then(|| Signal {
        kind: AnomalyKind::SpendingSpike,
        severity: Severity::High,
        score: 0.75,
        reason: format!("single payment above twice three days of spend ({limit:.2})"),
    })
}

pub fn detect_anomalies(
    rows: &[ClassifiedTransaction],
    config: &EngineConfig,
    cancel: &CancellationToken,
) -> EngineResult<AnomalyReport> {
    let mut debits: Vec<&ClassifiedTransaction> = rows.iter().filter(|t| t.is_debit()).collect();
    debits.sort_by_key(|t| (t.posted, t.index));

    let mut report = AnomalyReport {
        total_analyzed: debits.len(),
        ..Default::default()
    };
    if debits.len() < config.anomaly_min_rows {
        debug!(debits = debits.len(), "too few debits for anomaly detection");
        return Ok(report);
    }

    cancel.check("anomaly profile")?;
    let profile = SpendingProfile::build(&debits);

    cancel.check("anomaly scoring")?;
    let mut found: Vec<Anomaly> = Vec::new();
    let mut merchant_seen: BTreeMap<&str, usize> = BTreeMap::new();
    for (pos, t) in debits.iter().enumerate() {
        let mut signals = Vec::new();
        if let Some(p) = profile
            .categories
            .get(&t.category)
            .filter(|p| p.count >= config.anomaly_min_category_rows)
        {
            signals.extend(unusual_amount(t, p));
        }
        let seen = merchant_seen.entry(t.merchant.as_str()).or_default();
        signals.extend(unusual_merchant(t, *seen, profile.avg_daily_spend));
        *seen += 1;
        let window = &debits[pos.saturating_sub(config.duplicate_lookback)..pos];
        signals.extend(duplicate_payment(t, window));
        signals.extend(round_amount(t));
        signals.extend(spending_spike(t, profile.avg_daily_spend));

        found.extend(signals.into_iter().map(|s| Anomaly {
            index: t.index,
            date: t.date.clone(),
            merchant: t.merchant.clone(),
            amount: t.amount,
            category: t.category,
            kind: s.kind,
            severity: s.severity,
            score: s.score,
            reason: s.reason,
        }));
    }

    let flagged_rows = {
        let mut idx: Vec<usize> = found.iter().map(|a| a.index).collect();
        idx.dedup();
        idx.len()
    };
    let weighted: f64 = found.iter().map(|a| a.score * a.severity.weight()).sum();
    let mut risk = weighted / (debits.len() as f64 * 4.0) * 100.0;
    if flagged_rows as f64 / debits.len() as f64 > 0.10 {
        risk *= 1.5;
    }

    for a in &found {
        *report.by_type.entry(a.kind.as_str().to_string()).or_default() += 1;
        *report
            .by_severity
            .entry(a.severity.as_str().to_string())
            .or_default() += 1;
    }
    report.total_anomalies = found.len();
    report.risk_score = round2(risk.min(100.0));

    found.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.index.cmp(&b.index))
            .then(a.kind.cmp(&b.kind))
    });
    found.truncate(config.anomaly_top);
    report.anomalies = found;
    debug!(
        anomalies = report.total_anomalies,
        risk = report.risk_score,
        "anomaly detection done"
    );
    Ok(report)
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

    fn groceries(n: u32) -> Vec<RawTransaction> {
        (1..=n)
            .map(|day| {
                RawTransaction::debit(&format!("{day:02}/03/2024"), "POS 4598XXXXXX1234 BIGBASKET", 1_000.0 + f64::from(day))
            })
            .collect()
    }

    fn run(raws: &[RawTransaction]) -> AnomalyReport {
        detect_anomalies(&classify(raws), &EngineConfig::default(), &CancellationToken::new()).unwrap()
    }

    #[test]
    fn test_too_few_rows_is_silent() {
        let report = run(&groceries(9));
        assert!(report.anomalies.is_empty());
        assert_eq!(report.total_analyzed, 9);
        assert_eq!(report.risk_score, 0.0);
    }

    #[test]
    fn test_duplicate_same_day() {
        let mut raws = groceries(12);
        raws.push(RawTransaction::debit("20/03/2024", "POS 4598XXXXXX1234 AMAZON", 4_999.0));
        raws.push(RawTransaction::debit("20/03/2024", "POS 4598XXXXXX1234 AMAZON", 4_999.0));
        let report = run(&raws);
        let dup = report
            .anomalies
            .iter()
            .find(|a| a.kind == AnomalyKind::DuplicatePayment)
            .unwrap();
        assert_eq!(dup.severity, Severity::High);
        assert_eq!(dup.score, 0.85);
        assert_eq!(dup.index, 13);
        assert_eq!(report.by_type["duplicate_payment"], 1);
    }

    #[test]
    fn test_round_amount_to_unknown() {
        let mut raws = groceries(12);
        raws.push(RawTransaction::debit("15/03/2024", "XQ 7781 ZZ", 50_000.0));
        let report = run(&raws);
        let round = report
            .anomalies
            .iter()
            .find(|a| a.kind == AnomalyKind::RoundAmount)
            .unwrap();
        assert_eq!(round.severity, Severity::Medium);
        assert_eq!(round.score, 0.55);
        assert!(report.risk_score > 0.0 && report.risk_score <= 100.0);
    }

    #[test]
    fn test_unusual_amount_in_category() {
        let mut raws = groceries(12);
        raws.push(RawTransaction::debit("13/03/2024", "POS 4598XXXXXX1234 BIGBASKET", 9_000.0));
        let report = run(&raws);
        let hit = report
            .anomalies
            .iter()
            .find(|a| a.kind == AnomalyKind::UnusualAmount)
            .unwrap();
        assert_eq!(hit.severity, Severity::Critical);
        assert_eq!(hit.amount, 9_000.0);
    }

    #[test]
    fn test_results_sorted_and_capped() {
        let mut raws = groceries(12);
        for day in 14..=20 {
            raws.push(RawTransaction::debit(&format!("{day}/03/2024"), "XQ 7781 ZZ", 60_000.0));
        }
        let report = run(&raws);
        assert_eq!(report.anomalies.len(), 5);
        assert!(report.anomalies.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(report.total_anomalies > 5);
        assert!(report.risk_score <= 100.0);
    }

    #[test]
    fn test_profile_quantiles() {
        let rows = classify(&groceries(10));
        let debits: Vec<&ClassifiedTransaction> = rows.iter().collect();
        let profile = SpendingProfile::build(&debits);
        let p = &profile.categories[&rows[0].category];
        assert_eq!(p.count, 10);
        assert_eq!(p.p99, 1_010.0);
        assert_eq!(p.min, 1_001.0);
        assert_eq!(p.max, 1_010.0);
        assert_eq!(profile.avg_daily_spend, 1_005.5);
        assert_eq!(profile.transaction_days, 10);
        assert_eq!(profile.merchant_frequency[&rows[0].merchant], 10);
    }

    #[test]
    fn test_cancellation_aborts() {
        let rows = classify(&groceries(12));
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(detect_anomalies(&rows, &EngineConfig::default(), &cancel).is_err());
    }
}

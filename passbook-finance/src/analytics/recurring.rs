//! Recurring payment detection.
//!
//! Rows are grouped by counterparty signature, each group is scored on
//! repetition, periodicity, amount stability, keywords, day-of-month
//! stability and direction, and groups at or above the probable threshold
//! form the inventory. A second pass marks member rows.

use std::collections::BTreeMap;

use chrono::Datelike;
use passbook_core::{
    Category, ClassifiedTransaction, Direction, EngineConfig, Frequency, Method,
    RecurringMetadata,
};
use serde::Serialize;

use super::stats::{mean, round2, std_dev};
use crate::classify::fingerprint::fingerprint;
use crate::classify::negative::is_person_shaped;
use crate::classify::normalize::{NormalizedNarration, normalize};

/// Merchant names too vague to identify a counterparty.
const GENERIC_MERCHANTS: &[&str] = &[
    "UNKNOWN", "MERCHANT", "PAYMENT", "TRANSACTION", "BANK", "ATM", "POS", "UPI", "IMPS", "NEFT",
];

/// Words that make a repeated payment likely to be a standing commitment.
const HIGH_CONFIDENCE_KEYWORDS: &[&str] = &[
    "EMI", "LOAN", "REPAY", "INSTALLMENT", "CC", "BILL", "SALARY", "RENT", "SUBSCRIPTION",
    "PREMIUM", "INSURANCE", "SIP", "NACH", "ECS", "AUTO DEBIT", "NETFLIX", "PRIME", "SPOTIFY",
];

const SALARY_WORDS: &[&str] = &["SALARY", "PAYROLL"];
const SUBSCRIPTION_WORDS: &[&str] = &["SUBSCRIPTION", "PRO"];

/// Fallback matching tolerates this much amount drift.
const FALLBACK_AMOUNT_TOLERANCE: f64 = 0.10;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPayment {
    /// Human-readable counterparty, never a raw signature
    pub name: String,
    /// Average amount
    pub amount: f64,
    pub day_of_month: u32,
    pub pattern: String,
    pub confidence: u8,
    pub confirmed: bool,
    pub frequency: Frequency,
    pub first_seen: String,
    pub last_seen: String,
    pub count: usize,
    pub category: Category,
    pub method: Method,
    pub direction: Direction,
    pub signature: String,
    #[serde(skip)]
    pub members: Vec<usize>,
}

impl RecurringPayment {
    pub fn is_subscription(&self) -> bool {
        self.direction == Direction::Debit
            && (self.category == Category::Entertainment
                || normalize(&self.name).matches_keyword("SUBSCRIPTION"))
    }
}

/// Counterparty signature: canonical merchant, else narration fingerprint,
/// else beneficiary.
pub fn signature(t: &ClassifiedTransaction) -> Option<String> {
    if t.withdrawal_amount == 0.0 && t.deposit_amount == 0.0 {
        return None;
    }
    if t.has_canonical_merchant() && !is_generic(&t.merchant) {
        return Some(format!("MERCHANT:{}", t.merchant.to_uppercase()));
    }
    if let Some(fp) = fingerprint(&t.narration) {
        return Some(format!("FINGERPRINT:{fp}"));
    }
    t.beneficiary
        .as_ref()
        .map(|b| format!("BENEFICIARY:{}", b.to_uppercase()))
}

fn is_generic(name: &str) -> bool {
    let upper = name.trim().to_uppercase();
    upper.is_empty() || GENERIC_MERCHANTS.contains(&upper.as_str())
}

fn has_any(n: &NormalizedNarration, words: &[&str]) -> bool {
    words.iter().any(|w| n.matches_keyword(w))
}

/// A UPI/IMPS payment to a person, with no salary wording.
pub fn is_p2p(t: &ClassifiedTransaction) -> bool {
    let n = normalize(&t.narration);
    if !t.classification_metadata.channel.is_instant() || has_any(&n, SALARY_WORDS) {
        return false;
    }
    t.classification_metadata.person_transfer
        || (!t.has_canonical_merchant() && t.beneficiary.as_deref().is_some_and(is_person_shaped))
}

struct Periodicity {
    frequency: Frequency,
    points: u32,
    mean_gap: f64,
}

fn periodicity(gaps: &[f64]) -> Periodicity {
    let mean_gap = mean(gaps);
    let all_within = |lo: f64, hi: f64| gaps.iter().all(|g| (lo..=hi).contains(g));
    let banded = |frequency, tight: bool| Periodicity {
        frequency,
        points: if tight { 25 } else { 20 },
        mean_gap,
    };
    if (28.0..=35.0).contains(&mean_gap) {
        return banded(Frequency::Monthly, all_within(25.0, 38.0));
    }
    if (85.0..=95.0).contains(&mean_gap) {
        return banded(Frequency::Quarterly, all_within(80.0, 100.0));
    }
    if (6.0..=8.0).contains(&mean_gap) {
        return banded(Frequency::Weekly, all_within(5.0, 10.0));
    }
    // Same-day repeats are duplicates, not a cadence.
    let points = if mean_gap >= 1.0 && std_dev(gaps) < 5.0 { 15 } else { 0 };
    Periodicity {
        frequency: Frequency::Custom,
        points,
        mean_gap,
    }
}

fn amount_points(amounts: &[f64]) -> u32 {
    let spread = max_relative_deviation(amounts);
    if spread <= 0.03 {
        20
    } else if spread <= 0.05 {
        15
    } else if spread <= 0.10 {
        10
    } else {
        0
    }
}

fn max_relative_deviation(amounts: &[f64]) -> f64 {
    let m = mean(amounts);
    if m <= 0.0 {
        return f64::INFINITY;
    }
    amounts
        .iter()
        .map(|a| (a - m).abs() / m)
        .fold(0.0, f64::max)
}

fn display_name(rows: &[&ClassifiedTransaction]) -> String {
    if let Some(t) = rows
        .iter()
        .find(|t| t.has_canonical_merchant() && !is_generic(&t.merchant))
    {
        return t.merchant.clone();
    }
    if let Some(b) = rows.iter().find_map(|t| t.beneficiary.clone()) {
        return b;
    }
    let text = rows
        .first()
        .map(|t| normalize(&t.narration).truncated(5, 60))
        .unwrap_or_default();
    if !text.is_empty() {
        return text;
    }
    let category = rows.first().map_or(Category::Other, |t| t.category);
    format!("{} payment", category.label())
}

fn describe(p: &Periodicity, day_of_month: u32) -> String {
    match p.frequency {
        Frequency::Monthly => format!("Monthly around day {day_of_month}"),
        Frequency::Quarterly => format!("Quarterly around day {day_of_month}"),
        Frequency::Weekly => "Weekly".to_string(),
        Frequency::Custom => format!("Every ~{} days", p.mean_gap.round()),
    }
}

/// Score one signature group; `None` when it cannot be recurring at all.
fn score_group(rows: &[&ClassifiedTransaction]) -> Option<(u8, Periodicity, u32)> {
    let narrations: Vec<NormalizedNarration> = rows.iter().map(|t| normalize(&t.narration)).collect();
    let keyword_hits = narrations
        .iter()
        .filter(|n| has_any(n, HIGH_CONFIDENCE_KEYWORDS))
        .count();

    let mut score: i32 = 30;
    match rows.len() {
        0 | 1 => return None,
        2 if keyword_hits > 0 => score += 5,
        2 => return None,
        _ => score += 10,
    }

    let gaps: Vec<f64> = rows
        .windows(2)
        .map(|w| (w[1].posted - w[0].posted).num_days() as f64)
        .collect();
    let period = periodicity(&gaps);
    score += period.points as i32;

    let amounts: Vec<f64> = rows.iter().map(|t| t.amount).collect();
    score += amount_points(&amounts) as i32;

    if keyword_hits == rows.len() {
        score += 15;
    } else if keyword_hits > 0 {
        score += 10;
    }

    let days: Vec<f64> = rows.iter().map(|t| f64::from(t.posted.day())).collect();
    let mean_day = mean(&days);
    if days.iter().all(|d| (d - mean_day).abs() <= 2.0) {
        score += 10;
    }

    let first_direction = rows[0].direction;
    if rows.iter().all(|t| t.direction == first_direction) {
        score += 5;
    }

    if rows.iter().any(|t| is_p2p(t)) {
        score = 0;
    }
    let food = rows.iter().any(|t| t.category == Category::FoodDelivery);
    if food
        && max_relative_deviation(&amounts) > 0.30
        && !narrations.iter().any(|n| has_any(n, SUBSCRIPTION_WORDS))
    {
        score = 0;
    }

    let day_of_month = mean_day.round().clamp(1.0, 31.0) as u32;
    Some((score.clamp(0, 100) as u8, period, day_of_month))
}

pub fn detect_recurring(
    rows: &[ClassifiedTransaction],
    config: &EngineConfig,
) -> Vec<RecurringPayment> {
    let mut groups: BTreeMap<String, Vec<&ClassifiedTransaction>> = BTreeMap::new();
    for t in rows {
        if let Some(sig) = signature(t) {
            groups.entry(sig).or_default().push(t);
        }
    }

    let mut inventory = Vec::new();
    for (sig, mut members) in groups {
        members.sort_by_key(|t| (t.posted, t.index));
        let Some((confidence, period, day_of_month)) = score_group(&members) else {
            continue;
        };
        if confidence < config.recurring_probable {
            continue;
        }
        let amounts: Vec<f64> = members.iter().map(|t| t.amount).collect();
        let first = members[0];
        let last = members[members.len() - 1];
        inventory.push(RecurringPayment {
            name: display_name(&members),
            amount: round2(mean(&amounts)),
            day_of_month,
            pattern: describe(&period, day_of_month),
            confidence,
            confirmed: confidence >= config.recurring_confirmed,
            frequency: period.frequency,
            first_seen: first.date.clone(),
            last_seen: last.date.clone(),
            count: members.len(),
            category: first.category,
            method: first.method,
            direction: first.direction,
            signature: sig,
            members: members.iter().map(|t| t.index).collect(),
        });
    }

    inventory.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.signature.cmp(&b.signature))
    });
    tracing::debug!(groups = inventory.len(), "recurring inventory built");
    inventory
}

/// Second pass: flag rows that belong to an inventory entry.
pub fn mark_recurring(rows: &mut [ClassifiedTransaction], inventory: &[RecurringPayment]) {
    let by_signature: BTreeMap<&str, &RecurringPayment> = inventory
        .iter()
        .map(|entry| (entry.signature.as_str(), entry))
        .collect();

    for t in rows.iter_mut() {
        let primary = signature(t).and_then(|sig| by_signature.get(sig.as_str()).copied());
        let entry = match primary {
            Some(entry) => Some(entry),
            None if !is_p2p(t) => fallback_match(t, inventory),
            None => None,
        };
        if let Some(entry) = entry {
            t.is_recurring = true;
            t.recurring_metadata = Some(RecurringMetadata {
                confidence: entry.confidence,
                frequency: entry.frequency,
                first_seen: entry.first_seen.clone(),
                last_seen: entry.last_seen.clone(),
                count: entry.count,
                pattern: entry.pattern.clone(),
                signature: entry.signature.clone(),
            });
        }
    }
}

/// Contains-match on merchant/beneficiary against entry names, same direction
/// and a close amount. Runs only when the primary signature missed.
fn fallback_match<'a>(
    t: &ClassifiedTransaction,
    inventory: &'a [RecurringPayment],
) -> Option<&'a RecurringPayment> {
    let names: Vec<String> = [Some(&t.merchant), t.beneficiary.as_ref()]
        .into_iter()
        .flatten()
        .map(|s| s.to_uppercase())
        .filter(|s| s.len() >= 4 && !is_generic(s))
        .collect();
    if names.is_empty() {
        return None;
    }
    inventory.iter().find(|entry| {
        let entry_name = entry.name.to_uppercase();
        entry.direction == t.direction
            && entry.amount > 0.0
            && (t.amount - entry.amount).abs() / entry.amount <= FALLBACK_AMOUNT_TOLERANCE
            && names
                .iter()
                .any(|n| entry_name.contains(n.as_str()) || n.contains(entry_name.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use passbook_ingest::{RawTransaction, validate_rows};

    fn classify(raws: &[RawTransaction]) -> Vec<ClassifiedTransaction> {
        let config = EngineConfig::default();
        let intake = validate_rows(raws);
        Classifier::new(&config).classify_all(&intake.rows)
    }

    fn emi(date: &str, amount: f64, reference: &str) -> RawTransaction {
        RawTransaction::debit(
            date,
            &format!("ACH D STAFF LOAN EMI REC {date} REF {reference}"),
            amount,
        )
    }

    #[test]
    fn test_single_row_is_not_recurring() {
        let rows = classify(&[emi("05/01/2024", 15_000.0, "1234567890")]);
        assert!(detect_recurring(&rows, &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_monthly_emi_is_confirmed() {
        let mut rows = classify(&[
            emi("05/01/2024", 15_000.0, "1234567890"),
            emi("06/02/2024", 15_300.0, "2234567890"),
            emi("04/03/2024", 14_700.0, "3234567890"),
            emi("05/04/2024", 15_000.0, "4234567890"),
        ]);
        let inventory = detect_recurring(&rows, &EngineConfig::default());
        assert_eq!(inventory.len(), 1);
        let entry = &inventory[0];
        assert_eq!(entry.frequency, Frequency::Monthly);
        assert!(entry.confidence >= 70);
        assert!(entry.confirmed);
        assert_eq!(entry.count, 4);
        assert_eq!(entry.day_of_month, 5);
        assert!(!entry.name.starts_with("FINGERPRINT"));

        mark_recurring(&mut rows, &inventory);
        assert!(rows.iter().all(|t| t.is_recurring));
        let meta = rows[2].recurring_metadata.as_ref().unwrap();
        assert_eq!(meta.signature, entry.signature);
    }

    #[test]
    fn test_p2p_transfers_never_recur() {
        let rows = classify(&[
            RawTransaction::debit("01/01/2024", "UPI-RAHUL SHARMA-rahul@ybl-REF 223344556671", 12_000.0),
            RawTransaction::debit("01/02/2024", "UPI-RAHUL SHARMA-rahul@ybl-REF 223344556672", 12_000.0),
            RawTransaction::debit("01/03/2024", "UPI-RAHUL SHARMA-rahul@ybl-REF 223344556673", 12_000.0),
        ]);
        assert!(detect_recurring(&rows, &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_monthly_neft_to_a_person_recurs() {
        let mut rows = classify(&[
            RawTransaction::debit("01/01/2024", "NEFT-HDFC0000001-RAMESH KUMAR-N24001", 25_000.0),
            RawTransaction::debit("01/02/2024", "NEFT-HDFC0000001-RAMESH KUMAR-N24002", 25_000.0),
            RawTransaction::debit("01/03/2024", "NEFT-HDFC0000001-RAMESH KUMAR-N24003", 25_000.0),
            RawTransaction::debit("01/04/2024", "NEFT-HDFC0000001-RAMESH KUMAR-N24004", 25_000.0),
        ]);
        assert!(rows.iter().all(|t| !is_p2p(t)));
        let inventory = detect_recurring(&rows, &EngineConfig::default());
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].frequency, Frequency::Monthly);
        assert!(inventory[0].confirmed);

        mark_recurring(&mut rows, &inventory);
        assert!(rows.iter().all(|t| t.is_recurring));
    }

    #[test]
    fn test_irregular_food_orders_are_excluded() {
        let rows = classify(&[
            RawTransaction::debit("02/01/2024", "UPI-SWIGGY-swiggy@icici", 250.0),
            RawTransaction::debit("09/01/2024", "UPI-SWIGGY-swiggy@icici", 900.0),
            RawTransaction::debit("16/01/2024", "UPI-SWIGGY-swiggy@icici", 420.0),
        ]);
        assert!(detect_recurring(&rows, &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_streaming_subscription() {
        let rows = classify(&[
            RawTransaction::debit("12/01/2024", "NETFLIX.COM SI", 649.0),
            RawTransaction::debit("12/02/2024", "NETFLIX.COM SI", 649.0),
            RawTransaction::debit("12/03/2024", "NETFLIX.COM SI", 649.0),
        ]);
        let inventory = detect_recurring(&rows, &EngineConfig::default());
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].name, "Netflix");
        assert!(inventory[0].is_subscription());
    }

    #[test]
    fn test_periodicity_bands() {
        assert_eq!(periodicity(&[31.0, 29.0]).points, 25);
        assert_eq!(periodicity(&[31.0, 40.0, 22.0]).frequency, Frequency::Monthly);
        assert_eq!(periodicity(&[31.0, 40.0, 22.0]).points, 20);
        assert_eq!(periodicity(&[91.0]).frequency, Frequency::Quarterly);
        assert_eq!(periodicity(&[7.0, 7.0]).frequency, Frequency::Weekly);
        assert_eq!(periodicity(&[14.0, 15.0]).points, 15);
        assert_eq!(periodicity(&[0.0]).points, 0);
    }
}

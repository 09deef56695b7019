//! Salary utilisation and the cash-flow health score.

use chrono::{Duration, NaiveDate};
use passbook_core::{Category, ClassifiedTransaction, EngineConfig, Method, StatementMeta};
use serde::Serialize;

use super::rollups::AccountSummary;
use super::stats::{mean, percent, round2};
use crate::classify::normalize::normalize;

const SALARY_WORDS: &[&str] = &["SALARY", "SAL", "PAYROLL", "WAGES"];
const FIXED_WORDS: &[&str] = &["RENT", "SUBSCRIPTION", "MAINTENANCE", "EMI"];

/// Post-salary windows, in days.
const WINDOWS: [i64; 3] = [3, 7, 15];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpendWindow {
    pub days: i64,
    pub amount: f64,
    /// Share of the average salary spent inside the window
    pub percent_of_salary: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalaryUtilization {
    pub salary_detected: bool,
    pub salary_credits: usize,
    pub average_salary: f64,
    pub latest_salary_date: Option<String>,
    pub spend_windows: Vec<SpendWindow>,
    pub days_salary_lasts: f64,
    pub fixed_expenses: f64,
    pub variable_expenses: f64,
    pub fixed_expense_percent: f64,
    pub variable_expense_percent: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum CashFlowLabel {
    Excellent,
    Healthy,
    Moderate,
    Poor,
}

impl CashFlowLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => CashFlowLabel::Excellent,
            60..=79 => CashFlowLabel::Healthy,
            40..=59 => CashFlowLabel::Moderate,
            _ => CashFlowLabel::Poor,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowScore {
    pub score: u8,
    pub label: CashFlowLabel,
    pub savings_rate: f64,
    /// Expense as a share of income; 0 when there is no income
    pub expense_ratio: f64,
    pub opening_balance: f64,
    pub closing_balance: f64,
}

pub fn is_salary(t: &ClassifiedTransaction, config: &EngineConfig) -> bool {
    if !t.is_credit() {
        return false;
    }
    if t.method == Method::Salary || t.category == Category::Salary {
        return true;
    }
    t.amount >= config.salary_min_amount && {
        let n = normalize(&t.narration);
        SALARY_WORDS.iter().any(|w| n.matches_keyword(w))
    }
}

/// Inclusive day span of the statement, at least 1.
pub fn statement_days(rows: &[ClassifiedTransaction]) -> i64 {
    let first = rows.iter().map(|t| t.posted).min();
    let last = rows.iter().map(|t| t.posted).max();
    match (first, last) {
        (Some(first), Some(last)) => (last - first).num_days() + 1,
        _ => 1,
    }
}

fn is_fixed(t: &ClassifiedTransaction) -> bool {
    if t.is_recurring || t.method == Method::Emi || t.category == Category::Loan {
        return true;
    }
    let n = normalize(&t.narration);
    FIXED_WORDS.iter().any(|w| n.matches_keyword(w))
}

pub fn salary_utilization(rows: &[ClassifiedTransaction], config: &EngineConfig) -> SalaryUtilization {
    let salaries: Vec<&ClassifiedTransaction> = rows.iter().filter(|t| is_salary(t, config)).collect();
    let average_salary = mean(&salaries.iter().map(|t| t.amount).collect::<Vec<_>>());
    let latest = salaries.iter().max_by_key(|t| (t.posted, t.index)).copied();

    let expenses: Vec<&ClassifiedTransaction> =
        rows.iter().filter(|t| t.is_operational_expense()).collect();
    let total_expense: f64 = expenses.iter().map(|t| t.amount).sum();

    let spend_windows = match latest {
        Some(salary) => WINDOWS
            .iter()
            .map(|&days| {
                let amount = spend_within(&expenses, salary.posted, days);
                SpendWindow {
                    days,
                    amount: round2(amount),
                    percent_of_salary: round2(percent(amount, average_salary)),
                }
            })
            .collect(),
        None => Vec::new(),
    };

    let daily_expense = total_expense / statement_days(rows) as f64;
    let days_salary_lasts = if daily_expense > 0.0 && average_salary > 0.0 {
        round2(average_salary / daily_expense)
    } else {
        0.0
    };

    let fixed: f64 = expenses.iter().filter(|t| is_fixed(t)).map(|t| t.amount).sum();
    let variable = total_expense - fixed;

    SalaryUtilization {
        salary_detected: !salaries.is_empty(),
        salary_credits: salaries.len(),
        average_salary: round2(average_salary),
        latest_salary_date: latest.map(|t| t.date.clone()),
        spend_windows,
        days_salary_lasts,
        fixed_expenses: round2(fixed),
        variable_expenses: round2(variable),
        fixed_expense_percent: round2(percent(fixed, total_expense)),
        variable_expense_percent: round2(percent(variable, total_expense)),
    }
}

fn spend_within(expenses: &[&ClassifiedTransaction], from: NaiveDate, days: i64) -> f64 {
    let until = from + Duration::days(days);
    expenses
        .iter()
        .filter(|t| t.posted >= from && t.posted <= until)
        .map(|t| t.amount)
        .sum()
}

/// Opening and closing balance from the statement header, or from the rows
/// when the header carries neither.
pub fn balances(meta: &StatementMeta, rows: &[ClassifiedTransaction]) -> (f64, f64) {
    if meta.opening_balance != 0.0 || meta.closing_balance != 0.0 {
        return (meta.opening_balance, meta.closing_balance);
    }
    let first = rows.iter().min_by_key(|t| (t.posted, t.index));
    let last = rows.iter().max_by_key(|t| (t.posted, t.index));
    match (first, last) {
        (Some(first), Some(last)) => {
            let signed = if first.is_credit() { first.amount } else { -first.amount };
            (round2(first.closing_balance - signed), last.closing_balance)
        }
        _ => (0.0, 0.0),
    }
}

pub fn cash_flow_score(
    summary: &AccountSummary,
    meta: &StatementMeta,
    rows: &[ClassifiedTransaction],
) -> CashFlowScore {
    let (opening, closing) = balances(meta, rows);
    let income = summary.total_income;
    let savings_rate = summary.savings_rate;
    let expense_ratio = percent(summary.total_expense, income);

    let mut score: u32 = 0;
    score += match savings_rate {
        r if r > 20.0 => 30,
        r if r > 10.0 => 20,
        r if r > 0.0 => 10,
        _ => 0,
    };
    score += if closing > opening {
        25
    } else if closing == opening {
        15
    } else {
        5
    };
    if income > 0.0 {
        score += 25;
        score += match expense_ratio {
            r if r < 70.0 => 20,
            r if r < 90.0 => 10,
            _ => 0,
        };
    }
    let score = u8::try_from(score.min(100)).unwrap_or(100);

    CashFlowScore {
        score,
        label: CashFlowLabel::from_score(score),
        savings_rate,
        expense_ratio: round2(expense_ratio),
        opening_balance: opening,
        closing_balance: closing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::rollups::account_summary;
    use crate::classify::Classifier;
    use passbook_ingest::{RawTransaction, validate_rows};

    fn classify(raws: &[RawTransaction]) -> Vec<ClassifiedTransaction> {
        let config = EngineConfig::default();
        Classifier::new(&config).classify_all(&validate_rows(raws).rows)
    }

    /// 120k salary on day 1, then 30 daily grocery debits of 3 000.
    fn month() -> Vec<RawTransaction> {
        let mut raws = vec![RawTransaction::credit("01/01/2024", "NEFT-ACME CORP SALARY JAN 2024", 120_000.0)];
        for day in 1..=30 {
            raws.push(RawTransaction::debit(
                &format!("{day:02}/01/2024"),
                "POS 4598XXXXXX1234 BIGBASKET",
                3_000.0,
            ));
        }
        raws
    }

    #[test]
    fn test_salary_detection() {
        let config = EngineConfig::default();
        let rows = classify(&[
            RawTransaction::credit("01/01/2024", "NEFT-ACME CORP SALARY JAN", 120_000.0),
            RawTransaction::credit("02/01/2024", "IMPS-223344-MOM", 60_000.0),
        ]);
        assert!(is_salary(&rows[0], &config));
        assert!(!is_salary(&rows[1], &config));
    }

    #[test]
    fn test_days_salary_lasts_and_windows() {
        let config = EngineConfig::default();
        let rows = classify(&month());
        let u = salary_utilization(&rows, &config);
        assert!(u.salary_detected);
        assert_eq!(u.average_salary, 120_000.0);
        assert_eq!(u.days_salary_lasts, 40.0);
        assert_eq!(u.latest_salary_date.as_deref(), Some("01/01/2024"));
        // days 1..=4 inside the 3-day window
        assert_eq!(u.spend_windows[0].amount, 12_000.0);
        assert_eq!(u.spend_windows[0].percent_of_salary, 10.0);
        assert_eq!(u.variable_expense_percent, 100.0);
    }

    #[test]
    fn test_cash_flow_healthy() {
        let rows = classify(&month());
        let meta = StatementMeta {
            opening_balance: 10_000.0,
            closing_balance: 40_000.0,
            ..Default::default()
        };
        let summary = account_summary(&meta, &rows);
        assert_eq!(summary.savings_rate, 25.0);
        let cf = cash_flow_score(&summary, &meta, &rows);
        // 30 savings + 25 balance + 25 income + 10 expense ratio (75 %)
        assert_eq!(cf.score, 90);
        assert_eq!(cf.label, CashFlowLabel::Excellent);
        assert_eq!(cf.expense_ratio, 75.0);
    }

    #[test]
    fn test_cash_flow_without_income_is_poor() {
        let rows = classify(&[RawTransaction::debit("01/01/2024", "POS BIGBASKET", 500.0).with_balance(1_500.0)]);
        let meta = StatementMeta::default();
        let summary = account_summary(&meta, &rows);
        let cf = cash_flow_score(&summary, &meta, &rows);
        assert_eq!(cf.opening_balance, 2_000.0);
        assert_eq!(cf.closing_balance, 1_500.0);
        assert_eq!(cf.score, 5);
        assert_eq!(cf.label, CashFlowLabel::Poor);
    }

    #[test]
    fn test_label_bands() {
        assert_eq!(CashFlowLabel::from_score(80), CashFlowLabel::Excellent);
        assert_eq!(CashFlowLabel::from_score(60), CashFlowLabel::Healthy);
        assert_eq!(CashFlowLabel::from_score(59), CashFlowLabel::Moderate);
        assert_eq!(CashFlowLabel::from_score(39), CashFlowLabel::Poor);
    }
}

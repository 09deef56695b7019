//! Narrative outputs built on top of the roll-ups: trends, recommendations,
//! behaviour and savings opportunities.

use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};
use passbook_core::{Category, ClassifiedTransaction, Rail};
use serde::Serialize;

use super::recurring::RecurringPayment;
use super::rollups::{AccountSummary, CategoryTotal, MonthlySummary};
use super::salary::CashFlowScore;
use super::stats::{mean, percent, round2};

const EATING_OUT_SHARE: f64 = 15.0;
const TARGET_SAVINGS_RATE: f64 = 20.0;
const HEALTHY_CASH_FLOW: u8 = 60;
const SUBSCRIPTION_LIMIT: usize = 3;
const SMALL_UPI_AMOUNT: f64 = 500.0;
const SUGGESTED_CUT_PERCENT: f64 = 20.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthAmount {
    pub month: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAmount {
    pub category: Category,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionTrends {
    pub highest_spend_month: Option<MonthAmount>,
    pub largest_category: Option<CategoryAmount>,
    pub average_monthly_expense: f64,
}

pub fn transaction_trends(months: &[MonthlySummary], categories: &[CategoryTotal]) -> TransactionTrends {
    // Earliest month wins a tie.
    let highest_spend_month = months
        .iter()
        .fold(None::<&MonthlySummary>, |best, m| match best {
            Some(b) if b.expense >= m.expense => Some(b),
            _ => Some(m),
        })
        .filter(|m| m.expense > 0.0)
        .map(|m| MonthAmount {
            month: m.month.clone(),
            amount: m.expense,
        });
    // Category summary is already sorted by amount.
    let largest_category = categories.first().map(|c| CategoryAmount {
        category: c.category,
        amount: c.amount,
    });
    let expenses: Vec<f64> = months.iter().map(|m| m.expense).collect();
    TransactionTrends {
        highest_spend_month,
        largest_category,
        average_monthly_expense: round2(mean(&expenses)),
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub detail: String,
    pub priority: Priority,
}

pub fn recommendations(
    summary: &AccountSummary,
    categories: &[CategoryTotal],
    cash_flow: &CashFlowScore,
    recurring: &[RecurringPayment],
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    let operational: f64 = categories.iter().map(|c| c.amount).sum();
    let eating_out: f64 = categories
        .iter()
        .filter(|c| matches!(c.category, Category::FoodDelivery | Category::Dining))
        .map(|c| c.amount)
        .sum();
    let share = percent(eating_out, operational);
    if share > EATING_OUT_SHARE {
        out.push(Recommendation {
            title: "Cut back on eating out".to_string(),
            detail: format!(
                "Food delivery and dining take {share:.1}% of spending ({eating_out:.2}); \
                 a weekly cap would free up cash"
            ),
            priority: Priority::Medium,
        });
    }

    if summary.total_income > 0.0 && summary.savings_rate < TARGET_SAVINGS_RATE {
        out.push(Recommendation {
            title: "Raise your savings rate".to_string(),
            detail: format!(
                "You saved {:.1}% of income this period; aim for at least {TARGET_SAVINGS_RATE:.0}%",
                summary.savings_rate
            ),
            priority: Priority::High,
        });
    }

    if cash_flow.score < HEALTHY_CASH_FLOW {
        out.push(Recommendation {
            title: "Stabilise cash flow".to_string(),
            detail: format!(
                "Cash-flow score is {} ({:?}); keep expenses below 70% of income and build a buffer",
                cash_flow.score, cash_flow.label
            ),
            priority: Priority::High,
        });
    }

    let subscriptions: Vec<&RecurringPayment> =
        recurring.iter().filter(|r| r.is_subscription()).collect();
    if subscriptions.len() > SUBSCRIPTION_LIMIT {
        let monthly: f64 = subscriptions.iter().map(|r| r.amount).sum();
        out.push(Recommendation {
            title: "Review subscriptions".to_string(),
            detail: format!(
                "{} subscriptions cost {monthly:.2} per cycle; cancel the ones you rarely use",
                subscriptions.len()
            ),
            priority: Priority::Low,
        });
    }

    out
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BehaviourInsights {
    pub weekend_spend_percent: f64,
    pub weekday_spend_percent: f64,
    pub average_transaction_size: f64,
    pub most_frequent_merchant: Option<String>,
    pub small_upi_debits: usize,
}

pub fn behaviour_insights(rows: &[ClassifiedTransaction]) -> BehaviourInsights {
    let expenses: Vec<&ClassifiedTransaction> =
        rows.iter().filter(|t| t.is_operational_expense()).collect();
    let total: f64 = expenses.iter().map(|t| t.amount).sum();
    let weekend: f64 = expenses
        .iter()
        .filter(|t| matches!(t.posted.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|t| t.amount)
        .sum();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for t in &expenses {
        *counts.entry(t.merchant.as_str()).or_default() += 1;
    }
    // BTreeMap order makes the alphabetically first merchant win ties.
    let most_frequent_merchant = counts
        .iter()
        .fold(None::<(&str, usize)>, |best, (&m, &c)| match best {
            Some((_, b)) if b >= c => best,
            _ => Some((m, c)),
        })
        .map(|(m, _)| m.to_string());

    let small_upi_debits = rows
        .iter()
        .filter(|t| t.is_debit() && t.amount < SMALL_UPI_AMOUNT)
        .filter(|t| t.classification_metadata.channel == Rail::Upi)
        .count();

    let weekend_spend_percent = round2(percent(weekend, total));
    BehaviourInsights {
        weekend_spend_percent,
        weekday_spend_percent: if total > 0.0 {
            round2(100.0 - weekend_spend_percent)
        } else {
            0.0
        },
        average_transaction_size: round2(mean(
            &expenses.iter().map(|t| t.amount).collect::<Vec<_>>(),
        )),
        most_frequent_merchant,
        small_upi_debits,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavingsOpportunity {
    pub category: Category,
    pub monthly_spend: f64,
    pub suggested_cut_percent: f64,
    pub projected_monthly_saving: f64,
}

pub fn savings_opportunities(categories: &[CategoryTotal], months: usize) -> Vec<SavingsOpportunity> {
    let months = months.max(1) as f64;
    categories
        .iter()
        .filter(|c| c.category.is_discretionary() && c.amount > 0.0)
        .map(|c| {
            let monthly = c.amount / months;
            SavingsOpportunity {
                category: c.category,
                monthly_spend: round2(monthly),
                suggested_cut_percent: SUGGESTED_CUT_PERCENT,
                projected_monthly_saving: round2(monthly * SUGGESTED_CUT_PERCENT / 100.0),
            }
        })
        .collect()
}

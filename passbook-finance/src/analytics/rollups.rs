//! Statement roll-ups over the classified rows.
//!
//! Shared exclusion policy: investment-family rows never count as operational
//! expense, income-family rows never count as expense at all.

use std::collections::BTreeMap;

use chrono::Datelike;
use passbook_core::{Category, ClassifiedTransaction, Method, StatementMeta};
use serde::Serialize;

use super::stats::{mean, percent, round2};

/// Merchants broken out individually in the merchant summary.
const BRANDED_MERCHANTS: &[&str] = &[
    "Amazon",
    "Flipkart",
    "Myntra",
    "Swiggy",
    "Zomato",
    "BigBasket",
    "Blinkit",
    "Zepto",
    "Swiggy Instamart",
    "Uber",
    "Ola",
    "IRCTC",
    "MakeMyTrip",
    "Netflix",
    "Amazon Prime",
    "Spotify",
    "Airtel",
    "Jio",
];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub account_no: String,
    pub customer_name: String,
    pub statement_period: String,
    pub opening_balance: f64,
    pub closing_balance: f64,
    pub total_income: f64,
    pub total_expense: f64,
    pub total_investments: f64,
    pub net_savings: f64,
    pub savings_rate: f64,
    pub transaction_count: usize,
    pub credit_count: usize,
    pub debit_count: usize,
    /// Income/debit totals came from the statement footer, not the rows
    pub used_official_totals: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MethodBucket {
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: f64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MerchantTotal {
    pub merchant: String,
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// "Jan 2024"
    pub month: String,
    pub income: f64,
    pub expense: f64,
    pub investments: f64,
    pub closing_balance: f64,
    pub top_category: Option<Category>,
    /// Expense versus the mean of the other months, in percent
    pub expense_spike: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopBeneficiary {
    pub name: String,
    pub amount: f64,
    pub count: usize,
    pub primary_method: Method,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopExpense {
    pub date: String,
    pub narration: String,
    pub merchant: String,
    pub amount: f64,
    pub category: Category,
    pub method: Method,
}

pub fn account_summary(meta: &StatementMeta, rows: &[ClassifiedTransaction]) -> AccountSummary {
    let credits: f64 = rows.iter().filter(|t| t.is_credit()).map(|t| t.amount).sum();
    let investments: f64 = rows
        .iter()
        .filter(|t| t.is_debit() && t.is_investment())
        .map(|t| t.amount)
        .sum();
    let expense: f64 = rows
        .iter()
        .filter(|t| t.is_debit() && !t.is_investment())
        .map(|t| t.amount)
        .sum();

    let official_credits = meta.official_credits();
    let official_debits = meta.official_debits();
    let income = official_credits.unwrap_or(credits);
    // Official debits are trusted as the total; only the investment split
    // comes from the rows.
    let expense = match official_debits {
        Some(total) => (total - investments).max(0.0),
        None => expense,
    };

    AccountSummary {
        account_no: meta.masked_account_no(),
        customer_name: meta.customer_name.clone(),
        statement_period: meta.statement_period.clone(),
        opening_balance: meta.opening_balance,
        closing_balance: meta.closing_balance,
        total_income: round2(income),
        total_expense: round2(expense),
        total_investments: round2(investments),
        net_savings: round2(income - expense - investments),
        savings_rate: round2(percent(income - expense, income)),
        transaction_count: rows.len(),
        credit_count: rows.iter().filter(|t| t.is_credit()).count(),
        debit_count: rows.iter().filter(|t| t.is_debit()).count(),
        used_official_totals: official_credits.is_some() || official_debits.is_some(),
    }
}

/// Per-method totals. RD/FD/SIP also feed the `Investment` bucket; self
/// transfers count only there.
pub fn transaction_breakdown(rows: &[ClassifiedTransaction]) -> BTreeMap<String, MethodBucket> {
    let mut out: BTreeMap<String, MethodBucket> = BTreeMap::new();
    let mut add = |key: &str, amount: f64| {
        let bucket = out.entry(key.to_string()).or_default();
        bucket.amount += amount;
        bucket.count += 1;
    };
    for t in rows {
        match t.method {
            Method::Rd | Method::Fd | Method::Sip => {
                add(t.method.as_str(), t.amount);
                add(Method::Investment.as_str(), t.amount);
            }
            Method::SelfTransfer => add(Method::Investment.as_str(), t.amount),
            method => add(method.as_str(), t.amount),
        }
    }
    for bucket in out.values_mut() {
        bucket.amount = round2(bucket.amount);
    }
    out
}

pub fn category_summary(rows: &[ClassifiedTransaction]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<Category, (f64, usize)> = BTreeMap::new();
    for t in rows.iter().filter(|t| t.is_operational_expense()) {
        let slot = totals.entry(t.category).or_default();
        slot.0 += t.amount;
        slot.1 += 1;
    }
    let grand: f64 = totals.values().map(|(amount, _)| amount).sum();
    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, (amount, count))| CategoryTotal {
            category,
            amount: round2(amount),
            count,
            percentage: round2(percent(amount, grand)),
        })
        .collect();
    out.sort_by(|a, b| b.amount.total_cmp(&a.amount).then(a.category.cmp(&b.category)));
    out
}

pub fn merchant_summary(rows: &[ClassifiedTransaction]) -> Vec<MerchantTotal> {
    let mut branded: BTreeMap<usize, (f64, usize)> = BTreeMap::new();
    let mut other = (0.0, 0usize);
    for t in rows.iter().filter(|t| t.is_operational_expense()) {
        let slot = match BRANDED_MERCHANTS.iter().position(|m| *m == t.merchant) {
            Some(i) if t.has_canonical_merchant() => branded.entry(i).or_default(),
            _ => &mut other,
        };
        slot.0 += t.amount;
        slot.1 += 1;
    }
    let mut out: Vec<MerchantTotal> = branded
        .into_iter()
        .map(|(i, (amount, count))| MerchantTotal {
            merchant: BRANDED_MERCHANTS[i].to_string(),
            amount: round2(amount),
            count,
        })
        .collect();
    if other.1 > 0 {
        out.push(MerchantTotal {
            merchant: "Other".to_string(),
            amount: round2(other.0),
            count: other.1,
        });
    }
    out
}

#[derive(Default)]
struct MonthAccumulator {
    income: f64,
    expense: f64,
    investments: f64,
    /// (posted, index, balance) of the latest row seen
    last: Option<(chrono::NaiveDate, usize, f64)>,
    by_category: BTreeMap<Category, f64>,
}

/// Calendar-ordered monthly series.
pub fn monthly_summary(rows: &[ClassifiedTransaction]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<(i32, u32), MonthAccumulator> = BTreeMap::new();
    for t in rows {
        let acc = months.entry((t.posted.year(), t.posted.month())).or_default();
        if t.is_credit() {
            acc.income += t.amount;
        } else if t.is_investment() {
            acc.investments += t.amount;
        } else if t.is_operational_expense() {
            acc.expense += t.amount;
            *acc.by_category.entry(t.category).or_default() += t.amount;
        }
        let key = (t.posted, t.index, t.closing_balance);
        if acc.last.is_none_or(|(d, i, _)| (key.0, key.1) >= (d, i)) {
            acc.last = Some(key);
        }
    }

    let expenses: Vec<f64> = months.values().map(|m| m.expense).collect();
    months
        .iter()
        .enumerate()
        .map(|(i, (&(year, month), acc))| {
            let others: Vec<f64> = expenses
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, e)| *e)
                .collect();
            let baseline = mean(&others);
            let expense_spike = if baseline > 0.0 {
                round2((acc.expense - baseline) / baseline * 100.0)
            } else {
                0.0
            };
            let top_category = acc
                .by_category
                .iter()
                .fold(None, |best: Option<(Category, f64)>, (&c, &amount)| match best {
                    Some((_, b)) if b >= amount => best,
                    _ => Some((c, amount)),
                })
                .map(|(c, _)| c);
            MonthlySummary {
                month: month_label(year, month),
                income: round2(acc.income),
                expense: round2(acc.expense),
                investments: round2(acc.investments),
                closing_balance: acc.last.map_or(0.0, |(_, _, balance)| balance),
                top_category,
                expense_spike,
            }
        })
        .collect()
}

fn month_label(year: i32, month: u32) -> String {
    chrono::NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}

pub fn top_beneficiaries(rows: &[ClassifiedTransaction], n: usize) -> Vec<TopBeneficiary> {
    if n == 0 {
        return Vec::new();
    }
    struct Acc {
        amount: f64,
        count: usize,
        by_method: BTreeMap<Method, f64>,
    }
    let mut groups: BTreeMap<String, Acc> = BTreeMap::new();
    for t in rows.iter().filter(|t| t.is_debit()) {
        let name = t.beneficiary.clone().unwrap_or_else(|| t.merchant.clone());
        let acc = groups.entry(name).or_insert_with(|| Acc {
            amount: 0.0,
            count: 0,
            by_method: BTreeMap::new(),
        });
        acc.amount += t.amount;
        acc.count += 1;
        *acc.by_method.entry(t.method).or_default() += t.amount;
    }
    let mut out: Vec<TopBeneficiary> = groups
        .into_iter()
        .map(|(name, acc)| {
            let primary_method = acc
                .by_method
                .iter()
                .fold((Method::Other, f64::MIN), |best, (&m, &amount)| {
                    if amount > best.1 { (m, amount) } else { best }
                })
                .0;
            TopBeneficiary {
                name,
                amount: round2(acc.amount),
                count: acc.count,
                primary_method,
            }
        })
        .collect();
    out.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    out.truncate(n);
    out
}

pub fn top_expenses(rows: &[ClassifiedTransaction], n: usize) -> Vec<TopExpense> {
    if n == 0 {
        return Vec::new();
    }
    let mut expenses: Vec<&ClassifiedTransaction> =
        rows.iter().filter(|t| t.is_operational_expense()).collect();
    expenses.sort_by(|a, b| b.amount.total_cmp(&a.amount).then(a.index.cmp(&b.index)));
    expenses
        .into_iter()
        .take(n)
        .map(|t| TopExpense {
            date: t.date.clone(),
            narration: t.narration.clone(),
            merchant: t.merchant.clone(),
            amount: round2(t.amount),
            category: t.category,
            method: t.method,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use passbook_core::EngineConfig;
    use passbook_ingest::{RawTransaction, validate_rows};

    fn classify(raws: &[RawTransaction]) -> Vec<ClassifiedTransaction> {
        let config = EngineConfig::default();
        Classifier::new(&config).classify_all(&validate_rows(raws).rows)
    }

    fn sample() -> Vec<ClassifiedTransaction> {
        classify(&[
            RawTransaction::credit("01/01/2024", "NEFT-ACME CORP SALARY JAN", 100_000.0).with_balance(110_000.0),
            RawTransaction::debit("03/01/2024", "UPI-SWIGGY-swiggy@icici", 600.0).with_balance(109_400.0),
            RawTransaction::debit("05/01/2024", "NEFT-ZERODHA BROKING LTD-N1", 20_000.0).with_balance(89_400.0),
            RawTransaction::debit("06/01/2024", "NACH-SIP-ICICI PRU MF-FOLIO 1", 5_000.0).with_balance(84_400.0),
            RawTransaction::debit("07/01/2024", "UPI-RAHUL SHARMA-rahul@ybl-REF 223344556677", 12_000.0).with_balance(72_400.0),
            RawTransaction::debit("02/02/2024", "POS 4598XXXXXX1234 FLIPKART INTERNET", 3_000.0).with_balance(69_400.0),
            RawTransaction::debit("10/02/2024", "UPI-ZOMATO-zomato@hdfc", 400.0).with_balance(69_000.0),
        ])
    }

    #[test]
    fn test_account_summary_partitions_investments() {
        let rows = sample();
        let s = account_summary(&StatementMeta::default(), &rows);
        assert_eq!(s.total_income, 100_000.0);
        assert_eq!(s.total_investments, 37_000.0);
        assert_eq!(s.total_expense, 4_000.0);
        assert_eq!(s.net_savings, 59_000.0);
        assert_eq!(s.savings_rate, 96.0);
        let debits: f64 = rows.iter().filter(|t| t.is_debit()).map(|t| t.amount).sum();
        assert!((s.total_expense + s.total_investments - debits).abs() < 0.01);
    }

    #[test]
    fn test_official_totals_win() {
        let rows = sample();
        let meta = StatementMeta {
            official_total_credits: Some(101_000.0),
            official_total_debits: Some(42_000.0),
            ..Default::default()
        };
        let s = account_summary(&meta, &rows);
        assert!(s.used_official_totals);
        assert_eq!(s.total_income, 101_000.0);
        assert_eq!(s.total_investments, 37_000.0);
        assert_eq!(s.total_expense, 5_000.0);
    }

    #[test]
    fn test_breakdown_investment_bucket() {
        let b = transaction_breakdown(&sample());
        assert_eq!(b["SIP"].amount, 5_000.0);
        // broker 20k + SIP 5k + self transfer 12k
        assert_eq!(b["Investment"].amount, 37_000.0);
        assert_eq!(b["Investment"].count, 3);
        assert!(!b.contains_key("Self_Transfer"));
    }

    #[test]
    fn test_category_summary_excludes_investments() {
        let cats = category_summary(&sample());
        assert!(cats.iter().all(|c| !c.category.is_investment()));
        assert_eq!(cats[0].category, Category::Shopping);
        let food = cats.iter().find(|c| c.category == Category::FoodDelivery).unwrap();
        assert_eq!(food.amount, 1_000.0);
        assert_eq!(food.count, 2);
    }

    #[test]
    fn test_merchant_summary_has_other_tail() {
        let rows = classify(&[
            RawTransaction::debit("03/01/2024", "UPI-SWIGGY-swiggy@icici", 600.0),
            RawTransaction::debit("04/01/2024", "POS CORNER BOOK DEPOT", 300.0),
        ]);
        let m = merchant_summary(&rows);
        assert_eq!(m[0].merchant, "Swiggy");
        assert_eq!(m.last().unwrap().merchant, "Other");
        assert_eq!(m.last().unwrap().amount, 300.0);
    }

    #[test]
    fn test_monthly_summary_calendar_order() {
        let months = monthly_summary(&sample());
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, "Jan 2024");
        assert_eq!(months[0].expense, 600.0);
        assert_eq!(months[0].investments, 37_000.0);
        assert_eq!(months[0].closing_balance, 72_400.0);
        assert_eq!(months[1].month, "Feb 2024");
        assert_eq!(months[1].top_category, Some(Category::Shopping));
        assert!(months[1].expense_spike > 0.0);
    }

    #[test]
    fn test_top_n() {
        let rows = sample();
        assert!(top_expenses(&rows, 0).is_empty());
        assert!(top_beneficiaries(&rows, 0).is_empty());

        let top = top_expenses(&rows, 5);
        assert_eq!(top.len(), 3);
        assert!(top.windows(2).all(|w| w[0].amount >= w[1].amount));
        assert_eq!(top[0].amount, 3_000.0);

        let bens = top_beneficiaries(&rows, 2);
        assert_eq!(bens.len(), 2);
        assert_eq!(bens[0].name, "ZERODHA BROKING LTD");
        assert_eq!(bens[0].primary_method, Method::Investment);
        assert_eq!(bens[1].name, "RAHUL SHARMA");
    }
}

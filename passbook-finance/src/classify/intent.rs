//! Weighted intent keywords. A category's intent score is the heaviest
//! keyword of that category found in the narration.

use std::collections::BTreeMap;

use passbook_core::{Category, Direction};

use super::normalize::NormalizedNarration;

use Category::*;

/// (keyword, category, weight); weights stay within [0.2, 0.5].
const INTENT_KEYWORDS: &[(&str, Category, f64)] = &[
    // Bills and utilities
    ("ELECTRICITY", BillsUtilities, 0.5),
    ("ELECTRIC", BillsUtilities, 0.4),
    ("BILLPAY", BillsUtilities, 0.4),
    ("BILL PAY", BillsUtilities, 0.4),
    ("BILL", BillsUtilities, 0.3),
    ("RECHARGE", BillsUtilities, 0.4),
    ("POSTPAID", BillsUtilities, 0.45),
    ("PREPAID", BillsUtilities, 0.35),
    ("BROADBAND", BillsUtilities, 0.45),
    ("DTH", BillsUtilities, 0.4),
    ("GAS", BillsUtilities, 0.35),
    ("LPG", BillsUtilities, 0.45),
    ("WATER BILL", BillsUtilities, 0.5),
    ("MAINTENANCE", BillsUtilities, 0.3),
    ("SOCIETY", BillsUtilities, 0.3),
    ("RENT", BillsUtilities, 0.4),
    ("INSURANCE", BillsUtilities, 0.45),
    ("PREMIUM", BillsUtilities, 0.35),
    ("CREDIT CARD", BillsUtilities, 0.4),
    ("CC BILL", BillsUtilities, 0.45),
    // Loans
    ("EMI", Loan, 0.5),
    ("LOAN", Loan, 0.5),
    ("REPAY", Loan, 0.4),
    ("INSTALLMENT", Loan, 0.45),
    ("INSTALMENT", Loan, 0.45),
    ("BNPL", Loan, 0.4),
    // Investments
    ("SIP", Investment, 0.5),
    ("MUTUAL FUND", Investment, 0.5),
    ("MF", Investment, 0.35),
    ("RD", Investment, 0.4),
    ("FD", Investment, 0.4),
    ("FIXED DEPOSIT", Investment, 0.5),
    ("RECURRING DEPOSIT", Investment, 0.5),
    ("ELSS", Investment, 0.5),
    ("PPF", Investment, 0.5),
    ("NPS", Investment, 0.45),
    ("DEMAT", Investment, 0.45),
    ("BROKING", Investment, 0.45),
    ("SECURITIES", Investment, 0.35),
    ("SHARES", Investment, 0.3),
    ("CRYPTO", Investment, 0.4),
    ("GOLD BOND", Investment, 0.4),
    // Fuel
    ("PETROL", Fuel, 0.5),
    ("DIESEL", Fuel, 0.5),
    ("FUEL", Fuel, 0.5),
    ("FILLING STATION", Fuel, 0.45),
    ("SERVICE STATION", Fuel, 0.35),
    ("CNG", Fuel, 0.4),
    // Travel
    ("TRAVEL", Travel, 0.4),
    ("FLIGHT", Travel, 0.45),
    ("AIRLINES", Travel, 0.45),
    ("AIRWAYS", Travel, 0.45),
    ("RAILWAY", Travel, 0.45),
    ("TRAIN", Travel, 0.35),
    ("METRO", Travel, 0.35),
    ("CAB", Travel, 0.3),
    ("TAXI", Travel, 0.4),
    ("HOTEL", Travel, 0.3),
    ("RESORT", Travel, 0.4),
    ("TOURS", Travel, 0.35),
    ("TOLL", Travel, 0.4),
    ("FASTAG", Travel, 0.45),
    ("PARKING", Travel, 0.3),
    // Dining
    ("RESTAURANT", Dining, 0.5),
    ("CAFE", Dining, 0.4),
    ("COFFEE", Dining, 0.35),
    ("BAKERY", Dining, 0.35),
    ("BAKERS", Dining, 0.35),
    ("DHABA", Dining, 0.45),
    ("BAR", Dining, 0.3),
    ("PUB", Dining, 0.3),
    ("KITCHEN", Dining, 0.3),
    ("BIRYANI", Dining, 0.4),
    ("PIZZA", Dining, 0.4),
    ("SWEETS", Dining, 0.35),
    ("JUICE", Dining, 0.3),
    ("CANTEEN", Dining, 0.35),
    ("FOODS", Dining, 0.25),
    // Food delivery
    ("FOOD DELIVERY", FoodDelivery, 0.5),
    ("FOOD ORDER", FoodDelivery, 0.45),
    // Groceries
    ("GROCERY", Groceries, 0.5),
    ("GROCERIES", Groceries, 0.5),
    ("KIRANA", Groceries, 0.5),
    ("SUPERMARKET", Groceries, 0.5),
    ("SUPER MARKET", Groceries, 0.5),
    ("HYPERMARKET", Groceries, 0.5),
    ("MART", Groceries, 0.35),
    ("PROVISION", Groceries, 0.45),
    ("GENERAL STORE", Groceries, 0.4),
    ("DAIRY", Groceries, 0.5),
    ("MILK", Groceries, 0.45),
    ("VEGETABLE", Groceries, 0.45),
    ("FRUITS", Groceries, 0.35),
    ("FRESH", Groceries, 0.25),
    // Healthcare
    ("HOSPITAL", Healthcare, 0.5),
    ("CLINIC", Healthcare, 0.5),
    ("PHARMACY", Healthcare, 0.5),
    ("PHARMA", Healthcare, 0.4),
    ("MEDICAL", Healthcare, 0.45),
    ("MEDICOS", Healthcare, 0.45),
    ("CHEMIST", Healthcare, 0.5),
    ("DIAGNOSTIC", Healthcare, 0.5),
    ("PATHLAB", Healthcare, 0.45),
    ("PATH LAB", Healthcare, 0.45),
    ("DENTAL", Healthcare, 0.45),
    ("DOCTOR", Healthcare, 0.4),
    ("HEALTHCARE", Healthcare, 0.4),
    ("OPTICAL", Healthcare, 0.35),
    ("GYM", Healthcare, 0.3),
    ("FITNESS", Healthcare, 0.3),
    // Entertainment
    ("MOVIE", Entertainment, 0.45),
    ("CINEMA", Entertainment, 0.45),
    ("MULTIPLEX", Entertainment, 0.45),
    ("STREAMING", Entertainment, 0.4),
    ("SUBSCRIPTION", Entertainment, 0.3),
    ("OTT", Entertainment, 0.35),
    ("GAMING", Entertainment, 0.4),
    ("GAMES", Entertainment, 0.35),
    ("CONCERT", Entertainment, 0.4),
    ("CLUB", Entertainment, 0.25),
    // Education
    ("SCHOOL", Education, 0.5),
    ("COLLEGE", Education, 0.5),
    ("UNIVERSITY", Education, 0.5),
    ("TUITION", Education, 0.5),
    ("EDUCATION", Education, 0.45),
    ("COACHING", Education, 0.45),
    ("ACADEMY", Education, 0.4),
    ("INSTITUTE", Education, 0.4),
    ("COURSE", Education, 0.4),
    ("CLASSES", Education, 0.35),
    ("EXAM", Education, 0.35),
    ("FEES", Education, 0.3),
    ("FEE", Education, 0.3),
    // Shopping
    ("SHOPPING", Shopping, 0.4),
    ("FASHION", Shopping, 0.35),
    ("GARMENTS", Shopping, 0.4),
    ("CLOTHING", Shopping, 0.4),
    ("FOOTWEAR", Shopping, 0.4),
    ("ELECTRONICS", Shopping, 0.4),
    ("JEWELLERS", Shopping, 0.45),
    ("JEWELLERY", Shopping, 0.45),
    ("TEXTILES", Shopping, 0.4),
    ("BOUTIQUE", Shopping, 0.4),
    ("MALL", Shopping, 0.3),
    // Credit side
    ("SALARY", Salary, 0.5),
    ("PAYROLL", Salary, 0.5),
    ("WAGES", Salary, 0.45),
    ("SAL", Salary, 0.35),
    ("REFUND", Refund, 0.5),
    ("REVERSAL", Refund, 0.45),
    ("CASHBACK", Refund, 0.45),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntentScores {
    pub scores: BTreeMap<Category, f64>,
    /// Every keyword that hit, in table order
    pub matched: Vec<&'static str>,
}

impl IntentScores {
    pub fn get(&self, category: Category) -> f64 {
        self.scores.get(&category).copied().unwrap_or(0.0)
    }

    /// Highest-scoring category; ties go to the earlier category.
    pub fn best(&self) -> Option<(Category, f64)> {
        self.best_where(|_| true)
    }

    /// Highest-scoring category a row of this direction may carry.
    /// Debits never take income-side categories.
    pub fn best_for(&self, direction: Direction) -> Option<(Category, f64)> {
        match direction {
            Direction::Debit => self.best_where(|c| !c.is_credit_side()),
            Direction::Credit => self.best_where(|_| true),
        }
    }

    fn best_where(&self, keep: impl Fn(Category) -> bool) -> Option<(Category, f64)> {
        let mut best: Option<(Category, f64)> = None;
        for (&category, &score) in &self.scores {
            if !keep(category) {
                continue;
            }
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((category, score));
            }
        }
        best
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.matched.contains(&keyword)
    }
}

pub fn score(n: &NormalizedNarration) -> IntentScores {
    let mut out = IntentScores::default();
    for &(keyword, category, weight) in INTENT_KEYWORDS {
        if !n.matches_keyword(keyword) {
            continue;
        }
        out.matched.push(keyword);
        let slot = out.scores.entry(category).or_insert(0.0);
        if weight > *slot {
            *slot = weight;
        }
    }
    out
}

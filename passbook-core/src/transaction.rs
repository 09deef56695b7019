//! Classified transaction types: payment methods, spend categories and the
//! explainability metadata stamped on every row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Payment rail a narration rode on, before any method specialisation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rail {
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "IMPS")]
    Imps,
    #[serde(rename = "NEFT")]
    Neft,
    #[serde(rename = "RTGS")]
    Rtgs,
    #[serde(rename = "ACH")]
    Ach,
    #[serde(rename = "NACH")]
    Nach,
    #[serde(rename = "ECS")]
    Ecs,
    #[serde(rename = "POS")]
    Pos,
    #[serde(rename = "NetBanking")]
    NetBanking,
    #[serde(rename = "Cheque")]
    Cheque,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Rail {
    /// Provisional method before keyword specialisation.
    pub fn method(self) -> Method {
        match self {
            Rail::Upi => Method::Upi,
            Rail::Imps => Method::Imps,
            Rail::Neft => Method::Neft,
            Rail::Rtgs => Method::Rtgs,
            Rail::Ach => Method::Ach,
            Rail::Nach => Method::Nach,
            Rail::Ecs => Method::Ecs,
            Rail::Pos => Method::DebitCard,
            Rail::NetBanking => Method::NetBanking,
            Rail::Cheque => Method::Cheque,
            Rail::Unknown => Method::Other,
        }
    }

    /// Mandate rails used for standing instructions (EMIs, SIPs, premiums).
    pub fn is_mandate(self) -> bool {
        matches!(self, Rail::Ach | Rail::Nach | Rail::Ecs)
    }

    /// Instant person-to-person capable rails.
    pub fn is_instant(self) -> bool {
        matches!(self, Rail::Upi | Rail::Imps)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rail::Upi => "UPI",
            Rail::Imps => "IMPS",
            Rail::Neft => "NEFT",
            Rail::Rtgs => "RTGS",
            Rail::Ach => "ACH",
            Rail::Nach => "NACH",
            Rail::Ecs => "ECS",
            Rail::Pos => "POS",
            Rail::NetBanking => "NetBanking",
            Rail::Cheque => "Cheque",
            Rail::Unknown => "Unknown",
        }
    }
}

/// Effective payment method after specialisation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "IMPS")]
    Imps,
    #[serde(rename = "NEFT")]
    Neft,
    #[serde(rename = "RTGS")]
    Rtgs,
    #[serde(rename = "DebitCard")]
    DebitCard,
    #[serde(rename = "NetBanking")]
    NetBanking,
    #[serde(rename = "EMI")]
    Emi,
    #[serde(rename = "ACH")]
    Ach,
    #[serde(rename = "NACH")]
    Nach,
    #[serde(rename = "ECS")]
    Ecs,
    #[serde(rename = "ATMWithdrawal")]
    AtmWithdrawal,
    #[serde(rename = "Cheque")]
    Cheque,
    #[serde(rename = "Salary")]
    Salary,
    #[serde(rename = "Interest")]
    Interest,
    #[serde(rename = "Dividend")]
    Dividend,
    #[serde(rename = "RD")]
    Rd,
    #[serde(rename = "FD")]
    Fd,
    #[serde(rename = "SIP")]
    Sip,
    #[serde(rename = "Investment")]
    Investment,
    #[serde(rename = "Self_Transfer")]
    SelfTransfer,
    #[serde(rename = "Insurance")]
    Insurance,
    #[serde(rename = "TaxPayment")]
    TaxPayment,
    #[serde(rename = "OnlineShopping")]
    OnlineShopping,
    #[serde(rename = "Other")]
    Other,
}

impl Method {
    pub const ALL: [Method; 24] = [
        Method::Upi,
        Method::Imps,
        Method::Neft,
        Method::Rtgs,
        Method::DebitCard,
        Method::NetBanking,
        Method::Emi,
        Method::Ach,
        Method::Nach,
        Method::Ecs,
        Method::AtmWithdrawal,
        Method::Cheque,
        Method::Salary,
        Method::Interest,
        Method::Dividend,
        Method::Rd,
        Method::Fd,
        Method::Sip,
        Method::Investment,
        Method::SelfTransfer,
        Method::Insurance,
        Method::TaxPayment,
        Method::OnlineShopping,
        Method::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Upi => "UPI",
            Method::Imps => "IMPS",
            Method::Neft => "NEFT",
            Method::Rtgs => "RTGS",
            Method::DebitCard => "DebitCard",
            Method::NetBanking => "NetBanking",
            Method::Emi => "EMI",
            Method::Ach => "ACH",
            Method::Nach => "NACH",
            Method::Ecs => "ECS",
            Method::AtmWithdrawal => "ATMWithdrawal",
            Method::Cheque => "Cheque",
            Method::Salary => "Salary",
            Method::Interest => "Interest",
            Method::Dividend => "Dividend",
            Method::Rd => "RD",
            Method::Fd => "FD",
            Method::Sip => "SIP",
            Method::Investment => "Investment",
            Method::SelfTransfer => "Self_Transfer",
            Method::Insurance => "Insurance",
            Method::TaxPayment => "TaxPayment",
            Method::OnlineShopping => "OnlineShopping",
            Method::Other => "Other",
        }
    }

    /// Money parked rather than spent: deposits, SIPs, brokers and self transfers.
    pub fn is_investment(self) -> bool {
        matches!(
            self,
            Method::Rd | Method::Fd | Method::Sip | Method::Investment | Method::SelfTransfer
        )
    }

    /// Credit-only methods that never count as spend or big-ticket movement.
    pub fn is_income(self) -> bool {
        matches!(self, Method::Salary | Method::Interest | Method::Dividend)
    }

    /// Methods that are still just the detected rail (no specialisation applied).
    pub fn is_rail_level(self) -> bool {
        matches!(
            self,
            Method::Upi
                | Method::Imps
                | Method::Neft
                | Method::Rtgs
                | Method::NetBanking
                | Method::Cheque
                | Method::Other
        )
    }
}

/// Spend/income category assigned to every row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "Food_Delivery")]
    FoodDelivery,
    #[serde(rename = "Dining")]
    Dining,
    #[serde(rename = "Groceries")]
    Groceries,
    #[serde(rename = "Shopping")]
    Shopping,
    #[serde(rename = "Travel")]
    Travel,
    #[serde(rename = "Fuel")]
    Fuel,
    #[serde(rename = "Bills_Utilities")]
    BillsUtilities,
    #[serde(rename = "Healthcare")]
    Healthcare,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Entertainment")]
    Entertainment,
    #[serde(rename = "Loan")]
    Loan,
    #[serde(rename = "Investment")]
    Investment,
    #[serde(rename = "Self_Transfer")]
    SelfTransfer,
    #[serde(rename = "Income")]
    Income,
    #[serde(rename = "Refund")]
    Refund,
    #[serde(rename = "Salary")]
    Salary,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 17] = [
        Category::FoodDelivery,
        Category::Dining,
        Category::Groceries,
        Category::Shopping,
        Category::Travel,
        Category::Fuel,
        Category::BillsUtilities,
        Category::Healthcare,
        Category::Education,
        Category::Entertainment,
        Category::Loan,
        Category::Investment,
        Category::SelfTransfer,
        Category::Income,
        Category::Refund,
        Category::Salary,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::FoodDelivery => "Food_Delivery",
            Category::Dining => "Dining",
            Category::Groceries => "Groceries",
            Category::Shopping => "Shopping",
            Category::Travel => "Travel",
            Category::Fuel => "Fuel",
            Category::BillsUtilities => "Bills_Utilities",
            Category::Healthcare => "Healthcare",
            Category::Education => "Education",
            Category::Entertainment => "Entertainment",
            Category::Loan => "Loan",
            Category::Investment => "Investment",
            Category::SelfTransfer => "Self_Transfer",
            Category::Income => "Income",
            Category::Refund => "Refund",
            Category::Salary => "Salary",
            Category::Other => "Other",
        }
    }

    /// Human-readable label for recommendations and display names.
    pub fn label(self) -> &'static str {
        match self {
            Category::FoodDelivery => "Food Delivery",
            Category::BillsUtilities => "Bills & Utilities",
            Category::SelfTransfer => "Self Transfer",
            other => other.as_str(),
        }
    }

    pub fn is_investment(self) -> bool {
        matches!(self, Category::Investment | Category::SelfTransfer)
    }

    pub fn is_income(self) -> bool {
        matches!(self, Category::Income | Category::Refund | Category::Salary)
    }

    /// Categories a credit row may carry.
    pub fn is_credit_side(self) -> bool {
        self.is_income()
    }

    /// Discretionary spend that savings suggestions target.
    pub fn is_discretionary(self) -> bool {
        matches!(
            self,
            Category::FoodDelivery | Category::Dining | Category::Shopping | Category::Entertainment
        )
    }
}

/// Money direction of a row after resolving both-amount rows to their net.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    Debit,
    Credit,
}

/// Where the `merchant` field of a classified row came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MerchantSource {
    /// Matched the alias table.
    Canonical,
    /// Extracted counterparty name from the narration.
    Beneficiary,
    /// Truncated narration text.
    Narration,
}

/// Periodicity of a recurring payment group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Weekly,
    Custom,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Monthly => "MONTHLY",
            Frequency::Quarterly => "QUARTERLY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Custom => "CUSTOM",
        }
    }
}

/// Anomaly severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Weight used by the risk score.
    pub fn weight(self) -> f64 {
        match self {
            Severity::Low => 1.0,
            Severity::Medium => 2.0,
            Severity::High => 3.0,
            Severity::Critical => 4.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Why and how confidently a row was classified.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationMetadata {
    /// Effective confidence in [0, 1]
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    pub gateway: Option<String>,
    pub wallet: Option<String>,
    pub channel: Rail,
    pub merchant_source: MerchantSource,
    /// Negative filter engaged: looks like a transfer to a person
    pub person_transfer: bool,
    pub rule_version: String,
    pub reason: String,
}

/// Recurring-group membership, filled in by the second pass.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringMetadata {
    pub confidence: u8,
    pub frequency: Frequency,
    pub first_seen: String,
    pub last_seen: String,
    pub count: usize,
    pub pattern: String,
    /// Counterparty signature of the inventory entry this row belongs to
    pub signature: String,
}

/// A statement row plus everything the classifier decided about it.
///
/// Raw fields are echoed untouched; `posted`, `direction` and `amount` are the
/// parsed view the analytics read.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedTransaction {
    pub date: String,
    pub narration: String,
    pub cheque_ref_no: Option<String>,
    pub value_date: Option<String>,
    pub withdrawal_amount: f64,
    pub deposit_amount: f64,
    pub closing_balance: f64,

    pub method: Method,
    pub category: Category,
    pub merchant: String,
    pub beneficiary: Option<String>,
    pub is_income: bool,
    pub is_recurring: bool,
    pub recurring_metadata: Option<RecurringMetadata>,
    pub classification_metadata: ClassificationMetadata,

    /// Position in the caller's row list
    #[serde(skip)]
    pub index: usize,
    #[serde(skip)]
    pub posted: NaiveDate,
    #[serde(skip)]
    pub direction: Direction,
    /// Net absolute amount moved
    #[serde(skip)]
    pub amount: f64,
}

impl ClassifiedTransaction {
    pub fn is_debit(&self) -> bool {
        self.direction == Direction::Debit
    }

    pub fn is_credit(&self) -> bool {
        self.direction == Direction::Credit
    }

    /// Investment family: never operational spend.
    pub fn is_investment(&self) -> bool {
        self.category.is_investment() || self.method.is_investment()
    }

    /// Income family: never spend, never a big-ticket movement.
    pub fn is_income_family(&self) -> bool {
        self.method.is_income() || self.category.is_income()
    }

    /// A debit that is neither an investment nor a self transfer.
    pub fn is_operational_expense(&self) -> bool {
        self.is_debit() && !self.is_investment() && !self.is_income_family()
    }

    pub fn has_canonical_merchant(&self) -> bool {
        self.classification_metadata.merchant_source == MerchantSource::Canonical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_serde_names() {
        assert_eq!(serde_json::to_string(&Method::SelfTransfer).unwrap(), "\"Self_Transfer\"");
        assert_eq!(serde_json::to_string(&Method::AtmWithdrawal).unwrap(), "\"ATMWithdrawal\"");
        for m in Method::ALL {
            assert_eq!(serde_json::to_string(&m).unwrap(), format!("\"{}\"", m.as_str()));
        }
    }

    #[test]
    fn test_category_serde_names() {
        for c in Category::ALL {
            assert_eq!(serde_json::to_string(&c).unwrap(), format!("\"{}\"", c.as_str()));
        }
        assert_eq!(Category::BillsUtilities.label(), "Bills & Utilities");
    }

    #[test]
    fn test_investment_and_income_families() {
        assert!(Method::Sip.is_investment());
        assert!(Method::SelfTransfer.is_investment());
        assert!(!Method::Emi.is_investment());
        assert!(Method::Dividend.is_income());
        assert!(Category::SelfTransfer.is_investment());
        assert!(Category::Refund.is_income());
        assert!(!Category::Loan.is_income());
    }

    #[test]
    fn test_rail_to_method() {
        assert_eq!(Rail::Pos.method(), Method::DebitCard);
        assert_eq!(Rail::Unknown.method(), Method::Other);
        assert!(Rail::Nach.is_mandate());
        assert!(Rail::Upi.is_instant());
    }

    #[test]
    fn test_severity_order_and_weight() {
        assert!(Severity::Critical > Severity::High);
        assert_eq!(Severity::Medium.weight(), 2.0);
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"critical\"");
    }

    #[test]
    fn test_frequency_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Frequency::Quarterly).unwrap(), "\"QUARTERLY\"");
    }
}

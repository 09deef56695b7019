use std::collections::BTreeMap;

use passbook_core::ClassifiedTransaction;
use serde::Serialize;

use super::anomaly::AnomalyReport;
use super::fraud::{BigTicketMovement, FraudRisk};
use super::insights::{
    BehaviourInsights, Recommendation, SavingsOpportunity, TransactionTrends,
};
use super::predictive::{PredictiveInsights, TaxInsights};
use super::recurring::RecurringPayment;
use super::rollups::{
    AccountSummary, CategoryTotal, MerchantTotal, MethodBucket, MonthlySummary, TopBeneficiary,
    TopExpense,
};
use super::salary::{CashFlowScore, SalaryUtilization};

/// Everything one `analyze` call produces, in a stable JSON shape.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub rule_version: String,
    pub account_summary: AccountSummary,
    pub transaction_breakdown: BTreeMap<String, MethodBucket>,
    pub top_beneficiaries: Vec<TopBeneficiary>,
    pub top_expenses: Vec<TopExpense>,
    pub monthly_summary: Vec<MonthlySummary>,
    pub category_summary: Vec<CategoryTotal>,
    pub merchant_summary: Vec<MerchantTotal>,
    pub transaction_trends: TransactionTrends,
    pub recommendations: Vec<Recommendation>,
    pub predictive_insights: PredictiveInsights,
    pub cash_flow_score: CashFlowScore,
    pub salary_utilization: SalaryUtilization,
    pub behaviour_insights: BehaviourInsights,
    pub recurring_payments: Vec<RecurringPayment>,
    pub savings_opportunities: Vec<SavingsOpportunity>,
    pub fraud_risk: FraudRisk,
    pub big_ticket_movements: Vec<BigTicketMovement>,
    pub tax_insights: TaxInsights,
    pub anomalies: AnomalyReport,
    pub transactions: Vec<ClassifiedTransaction>,
    /// Rows dropped for an unparseable date or zero amounts
    pub skipped_rows: usize,
}

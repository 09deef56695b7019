//! Statement-level analytics over the classified rows.

pub mod anomaly;
pub mod fraud;
pub mod insights;
pub mod predictive;
pub mod recurring;
pub mod response;
pub mod rollups;
pub mod salary;
pub mod stats;

pub use anomaly::{Anomaly, AnomalyKind, AnomalyReport, CategoryProfile, SpendingProfile};
pub use fraud::{BigTicketMovement, FraudAlert, FraudRisk, RiskLevel};
pub use insights::{BehaviourInsights, Priority, Recommendation, SavingsOpportunity, TransactionTrends};
pub use predictive::{PredictiveInsights, TaxInsights, TaxSection};
pub use recurring::RecurringPayment;
pub use response::AnalyticsResponse;
pub use rollups::{AccountSummary, CategoryTotal, MerchantTotal, MonthlySummary, TopBeneficiary, TopExpense};
pub use salary::{CashFlowLabel, CashFlowScore, SalaryUtilization};

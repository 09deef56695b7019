//! The `analyze` entry point: intake, classification, recurring detection and
//! every roll-up, assembled into one response.

use std::sync::Arc;

use passbook_core::{
    CancellationToken, Clock, EngineConfig, EngineResult, StatementMeta, SystemClock,
};
use passbook_ingest::{RawTransaction, validate_rows};
use tracing::{debug, info, instrument};

use crate::analytics::{
    AnalyticsResponse, anomaly, fraud, insights, predictive, recurring, rollups, salary,
};
use crate::classify::{Classifier, RULE_VERSION};

pub struct Engine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classify one statement and compute every analytic over it.
    ///
    /// Malformed rows are skipped and counted, never fatal. The only error is
    /// caller cancellation, in which case nothing partial is returned.
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub fn analyze(
        &self,
        meta: &StatementMeta,
        rows: &[RawTransaction],
    ) -> EngineResult<AnalyticsResponse> {
        let config = &self.config;
        let cancel = &self.cancel;

        let intake = validate_rows(rows);
        debug!(valid = intake.rows.len(), skipped = intake.skipped_count(), "intake done");
        cancel.check("intake")?;

        let mut transactions = Classifier::new(config).classify_all(&intake.rows);
        debug!(classified = transactions.len(), "classification done");
        cancel.check("classification")?;

        let recurring_payments = recurring::detect_recurring(&transactions, config);
        recurring::mark_recurring(&mut transactions, &recurring_payments);
        cancel.check("recurring")?;
        let txns = transactions.as_slice();

        let account_summary = rollups::account_summary(meta, txns);
        let transaction_breakdown = rollups::transaction_breakdown(txns);
        let category_summary = rollups::category_summary(txns);
        let merchant_summary = rollups::merchant_summary(txns);
        let monthly_summary = rollups::monthly_summary(txns);
        let top_beneficiaries = rollups::top_beneficiaries(txns, config.top_n);
        let top_expenses = rollups::top_expenses(txns, config.top_n);
        debug!(months = monthly_summary.len(), categories = category_summary.len(), "roll-ups done");
        cancel.check("roll-ups")?;

        let salary_utilization = salary::salary_utilization(txns, config);
        let cash_flow_score = salary::cash_flow_score(&account_summary, meta, txns);
        cancel.check("cash flow")?;

        let anomalies = anomaly::detect_anomalies(txns, config, cancel)?;
        cancel.check("anomalies")?;

        let fraud_risk = fraud::fraud_risk(txns, config);
        let big_ticket_movements = fraud::big_ticket_movements(txns, config);
        cancel.check("fraud")?;

        let predictive_insights = predictive::predictive_insights(meta, txns, self.clock.today());
        let tax_insights = predictive::tax_insights(txns, config);
        cancel.check("predictive")?;

        let transaction_trends = insights::transaction_trends(&monthly_summary, &category_summary);
        let recommendations = insights::recommendations(
            &account_summary,
            &category_summary,
            &cash_flow_score,
            &recurring_payments,
        );
        let behaviour_insights = insights::behaviour_insights(txns);
        let savings_opportunities =
            insights::savings_opportunities(&category_summary, monthly_summary.len());

        info!(
            rows = transactions.len(),
            skipped = intake.skipped_count(),
            recurring = recurring_payments.len(),
            anomalies = anomalies.total_anomalies,
            fraud_alerts = fraud_risk.alerts.len(),
            "statement analysed"
        );

        Ok(AnalyticsResponse {
            rule_version: RULE_VERSION.to_string(),
            account_summary,
            transaction_breakdown,
            top_beneficiaries,
            top_expenses,
            monthly_summary,
            category_summary,
            merchant_summary,
            transaction_trends,
            recommendations,
            predictive_insights,
            cash_flow_score,
            salary_utilization,
            behaviour_insights,
            recurring_payments,
            savings_opportunities,
            fraud_risk,
            big_ticket_movements,
            tax_insights,
            anomalies,
            skipped_rows: intake.skipped_count(),
            transactions,
        })
    }
}

/// Analyse with default config and the system clock.
pub fn analyze(meta: &StatementMeta, rows: &[RawTransaction]) -> EngineResult<AnalyticsResponse> {
    Engine::default().analyze(meta, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use passbook_core::{EngineError, FixedClock};

    fn engine() -> Engine {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        Engine::default().with_clock(Arc::new(FixedClock::new(today)))
    }

    #[test]
    fn test_empty_statement_is_well_formed() {
        let resp = engine().analyze(&StatementMeta::default(), &[]).unwrap();
        assert_eq!(resp.account_summary.total_income, 0.0);
        assert_eq!(resp.account_summary.total_expense, 0.0);
        assert!(resp.transactions.is_empty());
        assert!(resp.top_expenses.is_empty());
        assert!(resp.recurring_payments.is_empty());
        assert!(resp.anomalies.anomalies.is_empty());
        assert_eq!(resp.skipped_rows, 0);
    }

    #[test]
    fn test_malformed_rows_are_counted() {
        let rows = vec![
            RawTransaction::debit("05/01/2024", "UPI-SWIGGY-swiggy@icici", 450.0),
            RawTransaction::debit("not a date", "UPI-SWIGGY-swiggy@icici", 450.0),
            RawTransaction::debit("06/01/2024", "ZERO ROW", 0.0),
        ];
        let resp = engine().analyze(&StatementMeta::default(), &rows).unwrap();
        assert_eq!(resp.transactions.len(), 1);
        assert_eq!(resp.skipped_rows, 2);
    }

    #[test]
    fn test_cancelled_run_returns_error() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = engine()
            .with_cancellation(cancel)
            .analyze(&StatementMeta::default(), &[])
            .unwrap_err();
        assert!(matches!(err, EngineError::Cancelled { stage: "intake" }));
    }

    #[test]
    fn test_overdrawn_balance_has_no_runway() {
        let rows: Vec<RawTransaction> = serde_json::from_str(
            r#"[
                {"date":"05/01/2024","narration":"UPI-SWIGGY-swiggy@icici","withdrawalAmount":"450.00","closingBalance":"-4,550.00"},
                {"date":"06/01/2024","narration":"UPI-SWIGGY-swiggy@icici","withdrawalAmount":"450.00","closingBalance":"-5,000.00"}
            ]"#,
        )
        .unwrap();
        let resp = engine().analyze(&StatementMeta::default(), &rows).unwrap();
        assert_eq!(resp.cash_flow_score.closing_balance, -5000.0);
        assert_eq!(resp.cash_flow_score.opening_balance, -4100.0);
        assert_eq!(resp.predictive_insights.days_until_low_balance, None);
        assert_eq!(resp.predictive_insights.predicted_low_balance_date, None);
    }

    #[test]
    fn test_rule_version_stamped() {
        let rows = vec![RawTransaction::debit("05/01/2024", "UPI-SWIGGY-swiggy@icici", 450.0)];
        let resp = engine().analyze(&StatementMeta::default(), &rows).unwrap();
        assert_eq!(resp.rule_version, RULE_VERSION);
        assert_eq!(resp.transactions[0].classification_metadata.rule_version, RULE_VERSION);
    }
}

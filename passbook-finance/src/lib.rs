//! passbook-finance: bank statement classification and analytics engine

pub mod analytics;
pub mod classify;
pub mod engine;

pub use analytics::AnalyticsResponse;
pub use classify::{Classifier, RULE_VERSION};
pub use engine::{Engine, analyze};

//! passbook-core: shared types for the bank statement classification engine

pub mod cancel;
pub mod clock;
pub mod config;
pub mod error;
pub mod statement;
pub mod transaction;

pub use cancel::CancellationToken;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use statement::{StatementMeta, mask_account_number};
pub use transaction::{
    Category, ClassificationMetadata, ClassifiedTransaction, Direction, Frequency, MerchantSource,
    Method, Rail, RecurringMetadata, Severity,
};

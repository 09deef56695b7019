//! Cooperative cancellation shared between the caller and one `analyze` run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Bail out of `stage` if the caller has cancelled.
    pub fn check(&self, stage: &'static str) -> EngineResult<()> {
        if self.is_cancelled() {
            return Err(EngineError::Cancelled { stage });
        }
        Ok(())
    }
}

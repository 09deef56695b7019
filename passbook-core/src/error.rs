use thiserror::Error;

/// Failures surfaced by the engine. Row-level ambiguity is never one of them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Caller cancelled the run; partial results are discarded.
    #[error("analysis cancelled during {stage}")]
    Cancelled { stage: &'static str },

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

use thiserror::Error;

use crate::types::Hour;

#[derive(Error, Debug)]
pub enum HourglassError {
    /// A value outside its documented domain. Raised before any mutation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The caller broke a protocol invariant (e.g. unbalanced blocking intervals).
    #[error("Logic error: {0}")]
    Logic(String),

    #[error("Campaign already complete at hour {hour}")]
    TerminalState { hour: Hour },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HourglassError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }
}

pub type HourglassResult<T> = Result<T, HourglassError>;

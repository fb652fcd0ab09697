use thiserror::Error;

use crate::collaborator::PendingInput;
use crate::models::{DeliveryEvent, PendingIllegalState};

/// Errors surfaced to the scoring UI.
///
/// Only rejection and validation failures live here. Broken internal
/// invariants panic instead of being reported.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Invalid transition: {event} is not accepted while {pending}")]
    InvalidTransition { pending: PendingIllegalState, event: DeliveryEvent },

    #[error("Innings {innings} is closed")]
    InningsClosed { innings: u8 },

    #[error("Waiting for input: {0}")]
    AwaitingInput(PendingInput),

    #[error("No input was requested")]
    NoPendingInput,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScoringError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ScoringError::ValidationError(msg.into())
    }

    /// Whether the caller can fix the problem and retry (re-prompt, resolve
    /// the pending request, pick another button).
    pub fn is_recoverable(&self) -> bool {
        match self {
            ScoringError::InvalidTransition { .. } => true,
            ScoringError::AwaitingInput(_) => true,
            ScoringError::ValidationError(_) => true,
            ScoringError::NoPendingInput => true,
            ScoringError::InningsClosed { .. } => false,
            ScoringError::Serialization(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoringError>;

//! JSON API for driving a scorer
//!
//! Hosts that talk JSON (a web UI, a scripted replay) send one
//! [`ScoringRequest`] per call and get back an [`ApiResponse`] carrying the
//! [`DeliveryReport`] and a fresh [`Scorecard`]. Requests for one match must
//! be handled one at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::scorecard::Scorecard;
use crate::audit::AuditSink;
use crate::collaborator::{Innings2Players, ScoreObserver, WicketDetails};
use crate::engine::{DeliveryReport, MatchScorer};
use crate::error::{Result, ScoringError};
use crate::models::ScoreboardCell;

/// API version for schema compatibility
pub const API_VERSION: &str = "v1";

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub schema_version: String,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Structured API error with a stable code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    /// Whether the UI should re-prompt rather than give up
    pub recoverable: bool,
}

impl ApiError {
    pub fn new(code: &str, message: &str, recoverable: bool) -> Self {
        Self { code: code.to_string(), message: message.to_string(), recoverable }
    }
}

impl From<&ScoringError> for ApiError {
    fn from(error: &ScoringError) -> Self {
        let code = match error {
            ScoringError::InvalidTransition { .. } => "INVALID_TRANSITION",
            ScoringError::InningsClosed { .. } => "INNINGS_CLOSED",
            ScoringError::AwaitingInput(_) => "AWAITING_INPUT",
            ScoringError::NoPendingInput => "NO_PENDING_INPUT",
            ScoringError::ValidationError(_) => "VALIDATION_FAILED",
            ScoringError::Serialization(_) => "SERIALIZATION_ERROR",
        };
        Self::new(code, &error.to_string(), error.is_recoverable())
    }
}

/// One host action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScoringRequest {
    /// Scorer button symbol (`"4"`, `"W"`, `"+"`, `"NB"`, `"B2"`, ...)
    Delivery { symbol: String },
    Wicket(WicketDetails),
    Bowler {
        #[serde(default)]
        name: Option<String>,
    },
    Innings2(Innings2Players),
    Cancel,
    Undo,
    /// Replace ball `ball` of over `over` with a scoreboard symbol
    Correct { over: u32, ball: u8, cell: String },
}

impl ScoringRequest {
    pub fn apply<O: ScoreObserver, A: AuditSink>(
        self,
        scorer: &mut MatchScorer<O, A>,
    ) -> Result<DeliveryReport> {
        match self {
            ScoringRequest::Delivery { symbol } => scorer.submit_symbol(&symbol),
            ScoringRequest::Wicket(details) => scorer.confirm_wicket(details),
            ScoringRequest::Correct { over, ball, cell } => {
                let cell: ScoreboardCell = cell.parse()?;
                scorer.correct_cell(over, ball, cell)
            }
            ScoringRequest::Bowler { name } => {
                scorer.provide_bowler(name)?;
                Ok(Self::settled(scorer))
            }
            ScoringRequest::Innings2(players) => {
                scorer.provide_innings2_players(players)?;
                Ok(Self::settled(scorer))
            }
            ScoringRequest::Cancel => {
                scorer.cancel_pending()?;
                Ok(Self::settled(scorer))
            }
            ScoringRequest::Undo => {
                scorer.undo()?;
                Ok(Self::settled(scorer))
            }
        }
    }

    fn settled<O: ScoreObserver, A: AuditSink>(scorer: &MatchScorer<O, A>) -> DeliveryReport {
        DeliveryReport { pending: scorer.pending_input().cloned(), ..Default::default() }
    }
}

/// Response payload of [`handle_request_json`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResponse {
    pub report: DeliveryReport,
    pub scorecard: Scorecard,
}

fn to_json<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| "{}".to_string())
}

/// Applies a JSON-encoded [`ScoringRequest`].
///
/// # Returns
/// JSON string containing `ApiResponse<ScoringResponse>`
pub fn handle_request_json<O: ScoreObserver, A: AuditSink>(
    scorer: &mut MatchScorer<O, A>,
    request_json: &str,
) -> String {
    let request: ScoringRequest = match serde_json::from_str(request_json) {
        Ok(req) => req,
        Err(e) => {
            error!("Failed to parse ScoringRequest: {}", e);
            let error = ApiError::new("INVALID_JSON", &format!("Invalid JSON format: {}", e), true);
            return to_json(&ApiResponse::<ScoringResponse>::error(error));
        }
    };
    debug!(?request, "Processing scoring request");

    match request.apply(scorer) {
        Ok(report) => {
            let data = ScoringResponse { report, scorecard: scorer.scorecard() };
            to_json(&ApiResponse::success(data))
        }
        Err(e) => {
            warn!("Scoring request rejected: {}", e);
            to_json(&ApiResponse::<ScoringResponse>::error(ApiError::from(&e)))
        }
    }
}

/// # Returns
/// JSON string containing `ApiResponse<Scorecard>`
pub fn get_scorecard_json<O: ScoreObserver, A: AuditSink>(scorer: &MatchScorer<O, A>) -> String {
    to_json(&ApiResponse::success(scorer.scorecard()))
}

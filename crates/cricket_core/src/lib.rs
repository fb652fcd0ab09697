//! # cricket_core - Ball-by-Ball Cricket Scoring Engine
//!
//! Scores a limited-overs match one delivery at a time: illegal deliveries,
//! byes and leg-byes, strike rotation, over and innings transitions, and the
//! second-innings chase.
//!
//! ## Features
//! - Ledger-backed totals (runs and wickets are always recomputed from the
//!   ball-by-ball record, so corrections and undo stay consistent)
//! - Non-blocking host prompts via [`collaborator::PendingInput`]
//! - Optional delivery audit trail (in memory or JSON lines)
//! - JSON API for UI integration

pub mod api;
pub mod audit;
pub mod collaborator;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;

pub use api::{handle_request_json, Scorecard, ScoringRequest};
pub use audit::{AuditSink, JsonLinesAuditLog, MemoryAuditLog, NullAuditSink};
pub use collaborator::{
    Innings2Players, NullObserver, PendingInput, RecordingObserver, ScoreObserver, WicketDetails,
};
pub use config::{config_from_env, ConfigError, ScorerConfig};
pub use engine::{
    ChaseStatus, ChaseView, DeliveryReport, InningsEndReason, MatchScorer, TargetTracker,
};
pub use error::{Result, ScoringError};
pub use models::{
    BatterEnd, DeliveryEvent, ExtraKind, MatchResult, MatchSetup, MatchState, ScoreboardCell,
    Target, TossDecision, WicketType,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

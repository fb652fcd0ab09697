//! Scoring data model: delivery events, the ball-by-ball ledger, innings and
//! match state.

pub mod delivery;
pub mod innings;
pub mod ledger;
pub mod match_state;

pub use delivery::{DeliveryEvent, ExtraKind, PendingIllegalState, WicketType, MAX_RUNS_PER_EVENT};
pub use innings::{BatterEnd, Batters, InningsState, InningsSummary, MAX_WICKETS};
pub use ledger::{EditRecord, LedgerTotals, Over, ScoreLedger, ScoreboardCell, BALLS_PER_OVER};
pub use match_state::{MatchResult, MatchSetup, MatchState, Target, TossDecision};

//! Scoring engine
//!
//! - `delivery`: per-event state machine
//! - `strike`: striker / non-striker rotation
//! - `innings`: end-of-innings detection and the innings 1 → 2 transition
//! - `target`: chase view for the second innings
//! - `scorer`: the facade hosts drive

pub mod delivery;
pub mod innings;
pub mod scorer;
pub mod strike;
pub mod target;

pub use delivery::{DeliveryStateMachine, Resolution, ResolutionKind};
pub use innings::{InningsController, InningsEndReason, InningsTransition};
pub use scorer::{DeliveryReport, MatchScorer};
pub use strike::StrikeRotation;
pub use target::{ChaseStatus, ChaseView, TargetTracker};

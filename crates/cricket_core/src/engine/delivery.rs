//! Delivery State Machine
//!
//! Interprets one scoring event in the context of the pending illegal-delivery
//! state and writes the consequence into the innings ledger.
//!
//! ```text
//!            WideSignal (+1)                 Dot | Runs(n) | Wicket
//!   None ───────────────────► WidePending ─────────────────────────► None
//!     │      NoBallSignal (+1)               (runs → over extras,
//!     ├─────────────────────► NoBallPending   ball not counted)
//!     │      ExtraSignal(kind)               Dot | Runs(n)
//!     ├─────────────────────► ExtraPending ─────────────────────────► None
//!     │                                      (Extra(kind, n) cell, legal ball)
//!     │      Dot | Runs(n) | Wicket | ExtraRuns(kind, n)
//!     └──────────────────────────────────────► None  (cell written, legal ball)
//! ```
//!
//! Ball advancement is split out into [`DeliveryStateMachine::complete_legal_ball`]
//! so that a wicket can hold the delivery open until the dismissal details are
//! known.

use serde::{Deserialize, Serialize};

use super::strike::StrikeRotation;
use crate::error::{Result, ScoringError};
use crate::models::{
    DeliveryEvent, ExtraKind, InningsState, PendingIllegalState, ScoreboardCell, BALLS_PER_OVER,
};

/// How an accepted event was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    /// Wide / no-ball / bye announced; the outcome follows
    Signal,
    /// Outcome of a wide
    Wide,
    /// Outcome of a no-ball
    NoBall,
    /// Fair delivery played by the batter
    Legal,
    /// Fair delivery, runs taken as byes or leg-byes
    Extra(ExtraKind),
}

impl ResolutionKind {
    /// Counts toward the six balls of the over
    pub fn is_legal(&self) -> bool {
        matches!(self, ResolutionKind::Legal | ResolutionKind::Extra(_))
    }
}

/// What a single accepted event did to the innings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub event: DeliveryEvent,
    pub kind: ResolutionKind,
    /// Change in the team total caused by this event
    pub runs_added: u32,
    /// Strike rotated because of odd runs
    pub rotated: bool,
    pub wicket: bool,
    /// Over and ball slot the event was bowled at
    pub over: u32,
    pub ball: u8,
}

impl Resolution {
    pub fn is_signal(&self) -> bool {
        self.kind == ResolutionKind::Signal
    }
}

pub struct DeliveryStateMachine;

impl DeliveryStateMachine {
    /// Applies `event` to the innings.
    ///
    /// On error the innings is left untouched. The ball counter is not advanced
    /// here; callers finish legal deliveries with [`Self::complete_legal_ball`].
    pub fn submit(innings: &mut InningsState, event: DeliveryEvent) -> Result<Resolution> {
        if innings.is_over {
            return Err(ScoringError::InningsClosed { innings: innings.number });
        }
        event.validate()?;

        let over = innings.current_over;
        let ball = innings.current_ball;
        let runs_before = innings.runs;
        let pending = innings.pending;

        let (kind, rotated, wicket) = match (pending, event) {
            (PendingIllegalState::None, DeliveryEvent::WideSignal) => {
                innings.ledger.add_extras(over, 1);
                innings.pending = PendingIllegalState::WidePending;
                (ResolutionKind::Signal, false, false)
            }
            (PendingIllegalState::None, DeliveryEvent::NoBallSignal) => {
                innings.ledger.add_extras(over, 1);
                innings.pending = PendingIllegalState::NoBallPending;
                (ResolutionKind::Signal, false, false)
            }
            (PendingIllegalState::None, DeliveryEvent::ExtraSignal(extra)) => {
                innings.pending = PendingIllegalState::ExtraPending(extra);
                (ResolutionKind::Signal, false, false)
            }
            (PendingIllegalState::None, DeliveryEvent::Dot) => {
                innings.ledger.record_ball(over, ball, ScoreboardCell::Dot);
                (ResolutionKind::Legal, false, false)
            }
            (PendingIllegalState::None, DeliveryEvent::Runs(n)) => {
                innings.ledger.record_ball(over, ball, ScoreboardCell::RunsScored(n));
                let rotated = StrikeRotation::after_runs(&mut innings.batters, n);
                (ResolutionKind::Legal, rotated, false)
            }
            (PendingIllegalState::None, DeliveryEvent::Wicket) => {
                innings.ledger.record_ball(over, ball, ScoreboardCell::Wicket);
                (ResolutionKind::Legal, false, true)
            }
            (PendingIllegalState::None, DeliveryEvent::ExtraRuns(extra, n)) => {
                innings.ledger.record_ball(over, ball, ScoreboardCell::Extra(extra, n));
                let rotated = StrikeRotation::after_runs(&mut innings.batters, n);
                (ResolutionKind::Extra(extra), rotated, false)
            }
            (
                PendingIllegalState::WidePending | PendingIllegalState::NoBallPending,
                DeliveryEvent::Dot | DeliveryEvent::Runs(_) | DeliveryEvent::Wicket,
            ) => {
                // Everything taken off a wide or no-ball is booked as extras
                let n = event.runs();
                innings.ledger.add_extras(over, n as u32);
                let wicket = event == DeliveryEvent::Wicket;
                let rotated = if wicket {
                    innings.ledger.add_illegal_wicket(over);
                    false
                } else {
                    StrikeRotation::after_runs(&mut innings.batters, n)
                };
                innings.pending = PendingIllegalState::None;
                let kind = if pending == PendingIllegalState::WidePending {
                    ResolutionKind::Wide
                } else {
                    ResolutionKind::NoBall
                };
                (kind, rotated, wicket)
            }
            (
                PendingIllegalState::ExtraPending(extra),
                DeliveryEvent::Dot | DeliveryEvent::Runs(_),
            ) => {
                let n = event.runs();
                innings.ledger.record_ball(over, ball, ScoreboardCell::Extra(extra, n));
                let rotated = StrikeRotation::after_runs(&mut innings.batters, n);
                innings.pending = PendingIllegalState::None;
                (ResolutionKind::Extra(extra), rotated, false)
            }
            (pending, event) => {
                return Err(ScoringError::InvalidTransition { pending, event });
            }
        };

        innings.refresh_totals();
        Ok(Resolution {
            event,
            kind,
            runs_added: innings.runs.saturating_sub(runs_before),
            rotated,
            wicket,
            over,
            ball,
        })
    }

    /// Advances the ball counter after a legal delivery.
    ///
    /// Returns the number of the over that was just completed, if any. Over
    /// completion opens the next over in the ledger and changes ends.
    pub fn complete_legal_ball(innings: &mut InningsState) -> Option<u32> {
        innings.current_ball += 1;
        if innings.current_ball <= BALLS_PER_OVER {
            return None;
        }
        let completed = innings.current_over;
        innings.current_ball = 1;
        innings.current_over += 1;
        innings.ledger.open_over(innings.current_over);
        StrikeRotation::end_of_over(&mut innings.batters);
        Some(completed)
    }
}

//! Seams to the embedding application
//!
//! The scorer never blocks on user input. When it needs something from the
//! outside (dismissal details, a bowler for the next over, the opening
//! players of innings 2) it parks the delivery and hands back a
//! [`PendingInput`] token. The host answers through the matching
//! `MatchScorer` method or cancels the request.
//!
//! Presentation is push-only through [`ScoreObserver`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::InningsEndReason;
use crate::models::{BatterEnd, InningsSummary, Target, WicketType};

/// Outstanding request from the scorer to its host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum PendingInput {
    /// A wicket fell; who is out, how, and who comes in
    WicketDetails { striker: String, non_striker: String },
    /// Over `over` is about to start
    NewBowler { over: u32 },
    /// Innings 2 is open but has no players yet
    Innings2Players { batting_team: String, target: Target },
}

impl fmt::Display for PendingInput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PendingInput::WicketDetails { striker, non_striker } => {
                write!(f, "wicket details ({} / {})", striker, non_striker)
            }
            PendingInput::NewBowler { over } => write!(f, "bowler for over {}", over),
            PendingInput::Innings2Players { batting_team, target } => write!(
                f,
                "opening players for {} (target {})",
                batting_team, target.runs_to_win
            ),
        }
    }
}

/// Answer to [`PendingInput::WicketDetails`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WicketDetails {
    pub dismissed: BatterEnd,
    #[serde(default)]
    pub wicket_type: WicketType,
    /// Only optional when the wicket is the tenth
    #[serde(default)]
    pub new_batsman: Option<String>,
}

impl WicketDetails {
    pub fn new(dismissed: BatterEnd, wicket_type: WicketType, new_batsman: Option<&str>) -> Self {
        Self { dismissed, wicket_type, new_batsman: new_batsman.map(str::to_string) }
    }
}

/// Answer to [`PendingInput::Innings2Players`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Innings2Players {
    pub striker: String,
    pub non_striker: String,
    #[serde(default)]
    pub bowler: Option<String>,
}

/// Score notifications for the presentation layer.
///
/// Every method has a no-op default so hosts implement only what they show.
pub trait ScoreObserver {
    fn on_score_changed(&mut self, _runs: u32, _wickets: u32, _over_ball_text: &str) {}

    /// `summary` is the completed over, e.g. `"1 . 4 . . 2 (0)"`
    fn on_over_completed(&mut self, _over: u32, _summary: &str) {}

    fn on_innings_ended(&mut self, _reason: InningsEndReason, _summary: &InningsSummary) {}

    fn on_match_ended(&mut self, _result_text: &str) {}
}

impl<T: ScoreObserver + ?Sized> ScoreObserver for Box<T> {
    fn on_score_changed(&mut self, runs: u32, wickets: u32, over_ball_text: &str) {
        (**self).on_score_changed(runs, wickets, over_ball_text)
    }

    fn on_over_completed(&mut self, over: u32, summary: &str) {
        (**self).on_over_completed(over, summary)
    }

    fn on_innings_ended(&mut self, reason: InningsEndReason, summary: &InningsSummary) {
        (**self).on_innings_ended(reason, summary)
    }

    fn on_match_ended(&mut self, result_text: &str) {
        (**self).on_match_ended(result_text)
    }
}

/// Ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ScoreObserver for NullObserver {}

/// One captured notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreNotification {
    ScoreChanged { runs: u32, wickets: u32, over_ball_text: String },
    OverCompleted { over: u32, summary: String },
    InningsEnded { reason: InningsEndReason, summary: InningsSummary },
    MatchEnded { result: String },
}

/// Keeps every notification in order. Used by tests and the replay host.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub notifications: Vec<ScoreNotification>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_score(&self) -> Option<(u32, u32, &str)> {
        self.notifications.iter().rev().find_map(|n| match n {
            ScoreNotification::ScoreChanged { runs, wickets, over_ball_text } => {
                Some((*runs, *wickets, over_ball_text.as_str()))
            }
            _ => None,
        })
    }

    pub fn innings_endings(&self) -> Vec<InningsEndReason> {
        self.notifications
            .iter()
            .filter_map(|n| match n {
                ScoreNotification::InningsEnded { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect()
    }

    pub fn completed_overs(&self) -> Vec<u32> {
        self.notifications
            .iter()
            .filter_map(|n| match n {
                ScoreNotification::OverCompleted { over, .. } => Some(*over),
                _ => None,
            })
            .collect()
    }
}

impl ScoreObserver for RecordingObserver {
    fn on_score_changed(&mut self, runs: u32, wickets: u32, over_ball_text: &str) {
        self.notifications.push(ScoreNotification::ScoreChanged {
            runs,
            wickets,
            over_ball_text: over_ball_text.to_string(),
        });
    }

    fn on_over_completed(&mut self, over: u32, summary: &str) {
        self.notifications
            .push(ScoreNotification::OverCompleted { over, summary: summary.to_string() });
    }

    fn on_innings_ended(&mut self, reason: InningsEndReason, summary: &InningsSummary) {
        self.notifications
            .push(ScoreNotification::InningsEnded { reason, summary: summary.clone() });
    }

    fn on_match_ended(&mut self, result_text: &str) {
        self.notifications.push(ScoreNotification::MatchEnded { result: result_text.to_string() });
    }
}

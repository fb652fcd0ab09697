use serde::{Deserialize, Serialize};

use crate::models::{InningsState, Target, BALLS_PER_OVER};

/// Chase classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChaseStatus {
    Chasing,
    Won,
    Lost,
    Tied,
}

/// Derived view of a run chase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaseView {
    pub target: Target,
    /// Floored at 0 once the target is reached
    pub runs_required: u32,
    /// Floored at 0
    pub balls_remaining: u32,
    pub status: ChaseStatus,
}

impl ChaseView {
    /// `"Target: 150. Need 12 from 9 balls."`
    pub fn describe(&self) -> String {
        format!(
            "Target: {}. Need {} from {} balls.",
            self.target.runs_to_win, self.runs_required, self.balls_remaining
        )
    }
}

/// Pure read of innings state against a target. Never mutates.
pub struct TargetTracker;

impl TargetTracker {
    pub fn view(target: Target, innings: &InningsState) -> ChaseView {
        let total_balls = target.overs_allowed * BALLS_PER_OVER as u32;
        let balls_remaining = total_balls.saturating_sub(innings.balls_bowled());
        let runs_required = target.runs_to_win.saturating_sub(innings.runs);

        // All out leaves no resources either
        let exhausted = balls_remaining == 0 || innings.is_all_out();
        let status = if innings.runs >= target.runs_to_win {
            ChaseStatus::Won
        } else if exhausted && innings.runs + 1 == target.runs_to_win {
            ChaseStatus::Tied
        } else if exhausted {
            ChaseStatus::Lost
        } else {
            ChaseStatus::Chasing
        };

        ChaseView { target, runs_required, balls_remaining, status }
    }
}

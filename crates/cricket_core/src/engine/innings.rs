use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{
    Batters, InningsState, MatchResult, MatchState, PendingIllegalState, Target,
};

/// Why an innings closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InningsEndReason {
    AllOut,
    OversCompleted,
    TargetChased,
    MatchTied,
}

impl fmt::Display for InningsEndReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InningsEndReason::AllOut => write!(f, "All out"),
            InningsEndReason::OversCompleted => write!(f, "Overs completed"),
            InningsEndReason::TargetChased => write!(f, "Target chased"),
            InningsEndReason::MatchTied => write!(f, "Match tied"),
        }
    }
}

/// Outcome of closing an innings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InningsTransition {
    /// Innings 1 closed; innings 2 waits for its opening players
    SecondInningsOpened { target: Target },
    /// Innings 2 closed; the match is terminal
    MatchCompleted(MatchResult),
}

/// Detects innings-ending conditions and performs the transition.
pub struct InningsController;

impl InningsController {
    /// Evaluated after every resolved delivery, never after a signal.
    ///
    /// Priority: all out, overs completed (reported as a tie when the chase
    /// finishes one short), target chased.
    pub fn check_end_of_innings(state: &MatchState) -> Option<InningsEndReason> {
        let innings = state.current();
        if innings.is_over {
            return None;
        }
        if innings.is_all_out() {
            return Some(InningsEndReason::AllOut);
        }

        let target = if state.is_second_innings() { state.target } else { None };

        if innings.current_ball == 1 && innings.current_over == state.max_overs + 1 {
            let tied = target.is_some_and(|t| innings.runs + 1 == t.runs_to_win);
            return Some(if tied {
                InningsEndReason::MatchTied
            } else {
                InningsEndReason::OversCompleted
            });
        }

        match target {
            Some(t) if innings.runs >= t.runs_to_win => Some(InningsEndReason::TargetChased),
            _ => None,
        }
    }

    /// Closes the current innings.
    ///
    /// Closing innings 1 sets the target, swaps the team roles and opens a
    /// fresh innings 2 with no batters yet. Closing innings 2 decides the
    /// result and makes the match terminal.
    pub fn end_innings(state: &mut MatchState, reason: InningsEndReason) -> InningsTransition {
        assert!(!state.is_terminal(), "match already finished");

        let innings = state.current_mut();
        assert!(!innings.is_over, "innings {} already closed", innings.number);
        innings.is_over = true;
        innings.pending = PendingIllegalState::None;
        log::info!(
            "Innings {} closed ({}): {}/{} in {} overs",
            innings.number,
            reason,
            innings.runs,
            innings.wickets,
            innings.over_ball_text()
        );

        if !state.is_second_innings() {
            let first = &state.innings1;
            let target = Target::from_first_innings(first.runs, state.max_overs);
            let second = InningsState::new(
                2,
                first.bowling_team.clone(),
                first.batting_team.clone(),
                Batters::default(),
                String::new(),
            );
            state.target = Some(target);
            state.innings2 = Some(second);
            state.current_innings = 2;
            InningsTransition::SecondInningsOpened { target }
        } else {
            let target = state.target.unwrap_or_else(|| {
                Target::from_first_innings(state.innings1.runs, state.max_overs)
            });
            let result = MatchResult::decide(state.current(), target);
            state.result = Some(result.clone());
            InningsTransition::MatchCompleted(result)
        }
    }
}

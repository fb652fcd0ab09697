//! Match setup, target and result types
//!
//! `MatchState` is created once teams, toss and overs are confirmed and is
//! owned by a single [`crate::engine::MatchScorer`]. Innings 2 is created when
//! innings 1 closes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::innings::{Batters, InningsState, MAX_WICKETS};
use crate::error::{Result, ScoringError};

/// What the toss winner chose to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TossDecision {
    Bat,
    Bowl,
}

/// Everything the embedding application collects before the first ball
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSetup {
    pub match_id: String,
    pub team_one: String,
    pub team_two: String,
    pub toss_winner: String,
    pub toss_decision: TossDecision,
    /// Falls back to the configured default when absent
    #[serde(default)]
    pub max_overs: Option<u32>,
    pub striker: String,
    pub non_striker: String,
    #[serde(default)]
    pub bowler: Option<String>,
}

impl MatchSetup {
    pub fn validate(&self) -> Result<()> {
        let team_one = self.team_one.trim();
        let team_two = self.team_two.trim();
        if team_one.is_empty() || team_two.is_empty() {
            return Err(ScoringError::validation("both team names are required"));
        }
        if team_one == team_two {
            return Err(ScoringError::validation("team names must differ"));
        }
        let winner = self.toss_winner.trim();
        if winner != team_one && winner != team_two {
            return Err(ScoringError::validation(format!(
                "toss winner '{}' is not one of the teams",
                self.toss_winner
            )));
        }
        if self.max_overs == Some(0) {
            return Err(ScoringError::validation("max overs must be positive"));
        }
        validate_openers(&self.striker, &self.non_striker)
    }

    /// `(batting, bowling)` for innings 1
    pub fn batting_order(&self) -> (String, String) {
        let team_one = self.team_one.trim().to_string();
        let team_two = self.team_two.trim().to_string();
        let winner_is_one = self.toss_winner.trim() == team_one;
        match (winner_is_one, self.toss_decision) {
            (true, TossDecision::Bat) | (false, TossDecision::Bowl) => (team_one, team_two),
            (true, TossDecision::Bowl) | (false, TossDecision::Bat) => (team_two, team_one),
        }
    }
}

pub(crate) fn validate_openers(striker: &str, non_striker: &str) -> Result<()> {
    if striker.trim().is_empty() {
        return Err(ScoringError::validation("striker name required"));
    }
    if non_striker.trim().is_empty() {
        return Err(ScoringError::validation("non-striker name required"));
    }
    if striker.trim() == non_striker.trim() {
        return Err(ScoringError::validation("striker and non-striker must differ"));
    }
    Ok(())
}

/// Bowler name or the configured fallback
pub(crate) fn bowler_or(name: Option<&str>, unknown: &str) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => unknown.to_string(),
    }
}

/// Chase target for the second innings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub runs_to_win: u32,
    pub overs_allowed: u32,
}

impl Target {
    /// Target set by a completed first innings
    pub fn from_first_innings(runs: u32, max_overs: u32) -> Self {
        Self { runs_to_win: runs + 1, overs_allowed: max_overs }
    }

    /// Target typed in by the scorer for a display-only chase view
    pub fn manual(runs_to_win: u32, overs_allowed: u32) -> Result<Self> {
        if runs_to_win == 0 || overs_allowed == 0 {
            return Err(ScoringError::validation("target runs and overs must be positive"));
        }
        Ok(Self { runs_to_win, overs_allowed })
    }
}

/// Final outcome of the match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchResult {
    ChasingTeamWon { team: String, wickets_remaining: u32 },
    DefendingTeamWon { team: String, runs: u32 },
    Tied,
}

impl MatchResult {
    /// Derives the result from the closed second innings.
    pub fn decide(innings: &InningsState, target: Target) -> Self {
        if innings.runs >= target.runs_to_win {
            MatchResult::ChasingTeamWon {
                team: innings.batting_team.clone(),
                wickets_remaining: MAX_WICKETS.saturating_sub(innings.wickets),
            }
        } else if innings.runs + 1 == target.runs_to_win {
            MatchResult::Tied
        } else {
            MatchResult::DefendingTeamWon {
                team: innings.bowling_team.clone(),
                runs: target.runs_to_win - 1 - innings.runs,
            }
        }
    }
}

fn plural(n: u32, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchResult::ChasingTeamWon { team, wickets_remaining } => {
                write!(f, "{} won by {}", team, plural(*wickets_remaining, "wicket"))
            }
            MatchResult::DefendingTeamWon { team, runs } => {
                write!(f, "{} won by {}", team, plural(*runs, "run"))
            }
            MatchResult::Tied => write!(f, "Match tied"),
        }
    }
}

/// The whole match. One writer, any number of readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub match_id: String,
    pub max_overs: u32,
    /// 1 or 2
    pub current_innings: u8,
    pub innings1: InningsState,
    pub innings2: Option<InningsState>,
    pub target: Option<Target>,
    pub result: Option<MatchResult>,
}

impl MatchState {
    /// Builds the state for innings 1 from a validated setup.
    pub fn new(setup: &MatchSetup, max_overs: u32, unknown_bowler: &str) -> Result<Self> {
        setup.validate()?;
        if max_overs == 0 {
            return Err(ScoringError::validation("max overs must be positive"));
        }
        let (batting, bowling) = setup.batting_order();
        let batters = Batters::new(setup.striker.trim(), setup.non_striker.trim());
        let bowler = bowler_or(setup.bowler.as_deref(), unknown_bowler);
        Ok(Self {
            match_id: setup.match_id.clone(),
            max_overs,
            current_innings: 1,
            innings1: InningsState::new(1, batting, bowling, batters, bowler),
            innings2: None,
            target: None,
            result: None,
        })
    }

    pub fn current(&self) -> &InningsState {
        match (self.current_innings, &self.innings2) {
            (2, Some(innings)) => innings,
            _ => &self.innings1,
        }
    }

    pub fn current_mut(&mut self) -> &mut InningsState {
        match (self.current_innings, &mut self.innings2) {
            (2, Some(innings)) => innings,
            _ => &mut self.innings1,
        }
    }

    pub fn is_second_innings(&self) -> bool {
        self.current_innings == 2
    }

    /// No further mutation is permitted
    pub fn is_terminal(&self) -> bool {
        self.result.is_some()
    }
}

use serde::{Deserialize, Serialize};

use super::delivery::PendingIllegalState;
use super::ledger::{EditRecord, ScoreLedger, BALLS_PER_OVER};

/// Wickets that end an innings
pub const MAX_WICKETS: u32 = 10;

/// Which batter a wicket or replacement applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatterEnd {
    Striker,
    NonStriker,
}

/// The two batters at the crease
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Batters {
    pub striker: String,
    pub non_striker: String,
}

impl Batters {
    pub fn new(striker: impl Into<String>, non_striker: impl Into<String>) -> Self {
        Self { striker: striker.into(), non_striker: non_striker.into() }
    }

    pub fn name(&self, end: BatterEnd) -> &str {
        match end {
            BatterEnd::Striker => &self.striker,
            BatterEnd::NonStriker => &self.non_striker,
        }
    }

    /// Puts a new batter in at `end`, returning the one who left.
    pub fn replace(&mut self, end: BatterEnd, name: String) -> String {
        match end {
            BatterEnd::Striker => std::mem::replace(&mut self.striker, name),
            BatterEnd::NonStriker => std::mem::replace(&mut self.non_striker, name),
        }
    }
}

/// State of one innings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsState {
    /// 1 or 2
    pub number: u8,
    pub batting_team: String,
    pub bowling_team: String,
    pub ledger: ScoreLedger,

    /// Derived from the ledger after every mutation
    pub runs: u32,
    pub wickets: u32,

    /// 1-based over index
    pub current_over: u32,
    /// Next ball slot in the current over (1..=6)
    pub current_ball: u8,

    pub batters: Batters,
    pub bowler: String,
    pub pending: PendingIllegalState,
    pub is_over: bool,

    /// Manual corrections applied to the ledger
    pub edits: Vec<EditRecord>,
    /// Serial number of the next resolved delivery (audit trail)
    pub delivery_serial: u32,
}

impl InningsState {
    pub fn new(
        number: u8,
        batting_team: impl Into<String>,
        bowling_team: impl Into<String>,
        batters: Batters,
        bowler: impl Into<String>,
    ) -> Self {
        Self {
            number,
            batting_team: batting_team.into(),
            bowling_team: bowling_team.into(),
            ledger: ScoreLedger::new(),
            runs: 0,
            wickets: 0,
            current_over: 1,
            current_ball: 1,
            batters,
            bowler: bowler.into(),
            pending: PendingIllegalState::None,
            is_over: false,
            edits: Vec::new(),
            delivery_serial: 1,
        }
    }

    /// Re-derives runs and wickets from the ledger.
    pub fn refresh_totals(&mut self) {
        let totals = self.ledger.recompute();
        self.runs = totals.runs;
        self.wickets = totals.wickets.min(MAX_WICKETS);
    }

    pub fn is_all_out(&self) -> bool {
        self.wickets >= MAX_WICKETS
    }

    /// Legal balls bowled so far
    pub fn balls_bowled(&self) -> u32 {
        (self.current_over - 1) * BALLS_PER_OVER as u32 + (self.current_ball as u32 - 1)
    }

    /// `"{completed overs}.{balls this over}"`
    pub fn over_ball_text(&self) -> String {
        let balls = self.current_ball.saturating_sub(1).min(BALLS_PER_OVER);
        format!("{}.{}", self.current_over - 1, balls)
    }

    /// Whether ball `ball` of over `over` has already been bowled
    pub fn is_bowled(&self, over: u32, ball: u8) -> bool {
        if over == 0 || !(1..=BALLS_PER_OVER).contains(&ball) {
            return false;
        }
        over < self.current_over || (over == self.current_over && ball < self.current_ball)
    }

    pub fn summary(&self) -> InningsSummary {
        InningsSummary {
            innings: self.number,
            batting_team: self.batting_team.clone(),
            runs: self.runs,
            wickets: self.wickets,
            overs: self.over_ball_text(),
        }
    }
}

/// Compact result of an innings for notifications and scorecards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsSummary {
    pub innings: u8,
    pub batting_team: String,
    pub runs: u32,
    pub wickets: u32,
    pub overs: String,
}

impl std::fmt::Display for InningsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {}/{} ({} ov)", self.batting_team, self.runs, self.wickets, self.overs)
    }
}

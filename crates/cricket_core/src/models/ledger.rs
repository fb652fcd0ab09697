//! Score Ledger
//!
//! Per-over, per-ball record of outcomes. The ledger is the source of truth
//! for the innings aggregate: runs and wickets are always recomputed from the
//! stored cells, never trusted from running counters, so manual corrections
//! and undo stay consistent.
//!
//! ```text
//! over 1 | 1 . 4 W B2 6 | (2)     balls 1..6 + wide/no-ball extras
//! over 2 | . . _ _ _ _  | (0)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::delivery::{DeliveryEvent, ExtraKind, MAX_RUNS_PER_EVENT};
use crate::error::ScoringError;

/// Legal deliveries in one over
pub const BALLS_PER_OVER: u8 = 6;

/// Outcome recorded for one legal ball slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoreboardCell {
    #[default]
    Empty,
    Dot,
    RunsScored(u8),
    Wicket,
    Extra(ExtraKind, u8),
}

impl ScoreboardCell {
    /// Runs this cell contributes to the total
    pub fn runs(&self) -> u32 {
        match self {
            ScoreboardCell::RunsScored(n) | ScoreboardCell::Extra(_, n) => *n as u32,
            _ => 0,
        }
    }

    pub fn is_wicket(&self) -> bool {
        matches!(self, ScoreboardCell::Wicket)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ScoreboardCell::Empty)
    }

    /// Checks a cell supplied from outside (manual correction).
    pub fn validate(&self) -> Result<(), ScoringError> {
        match *self {
            ScoreboardCell::Empty => {
                Err(ScoringError::validation("a bowled ball cannot be cleared"))
            }
            ScoreboardCell::RunsScored(n) if n == 0 || n > MAX_RUNS_PER_EVENT => Err(
                ScoringError::validation(format!("runs must be 1-6 (use Dot for 0), got {}", n)),
            ),
            ScoreboardCell::Extra(kind, n) if n > MAX_RUNS_PER_EVENT => {
                Err(ScoringError::validation(format!("{} runs must be 0-6, got {}", kind, n)))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ScoreboardCell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScoreboardCell::Empty => write!(f, "_"),
            ScoreboardCell::Dot => write!(f, "."),
            ScoreboardCell::RunsScored(n) => write!(f, "{}", n),
            ScoreboardCell::Wicket => write!(f, "W"),
            ScoreboardCell::Extra(kind, n) => write!(f, "{}{}", kind.symbol(), n),
        }
    }
}

/// Parses the symbol shown on the scoreboard (`.`, `4`, `W`, `B2`, `L1`).
impl std::str::FromStr for ScoreboardCell {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cell = match s.parse::<DeliveryEvent>()? {
            DeliveryEvent::Dot => ScoreboardCell::Dot,
            DeliveryEvent::Runs(n) => ScoreboardCell::RunsScored(n),
            DeliveryEvent::Wicket => ScoreboardCell::Wicket,
            DeliveryEvent::ExtraRuns(kind, n) => ScoreboardCell::Extra(kind, n),
            signal => {
                return Err(ScoringError::validation(format!(
                    "{} is not a scoreboard cell",
                    signal
                )))
            }
        };
        cell.validate()?;
        Ok(cell)
    }
}

/// One over: six legal ball slots plus the wide/no-ball bookkeeping column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Over {
    balls: [ScoreboardCell; BALLS_PER_OVER as usize],
    /// Runs from wides and no-balls, including runs taken off them
    extras: u32,
    /// Wickets that fell on wides / no-balls (no ball slot is used)
    illegal_wickets: u32,
}

impl Over {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell at `ball` (1-based)
    pub fn ball(&self, ball: u8) -> ScoreboardCell {
        assert!((1..=BALLS_PER_OVER).contains(&ball), "ball {} out of range", ball);
        self.balls[(ball - 1) as usize]
    }

    pub fn balls(&self) -> &[ScoreboardCell] {
        &self.balls
    }

    pub fn extras(&self) -> u32 {
        self.extras
    }

    pub fn illegal_wickets(&self) -> u32 {
        self.illegal_wickets
    }

    /// Number of legal deliveries recorded
    pub fn legal_balls(&self) -> u8 {
        self.balls.iter().filter(|c| !c.is_empty()).count() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.legal_balls() == BALLS_PER_OVER
    }

    pub fn runs(&self) -> u32 {
        self.extras + self.balls.iter().map(ScoreboardCell::runs).sum::<u32>()
    }

    pub fn wickets(&self) -> u32 {
        self.illegal_wickets + self.balls.iter().filter(|c| c.is_wicket()).count() as u32
    }

    /// `"1 2 W . B2 _ (3)"`
    pub fn summary(&self) -> String {
        let balls: Vec<String> = self.balls.iter().map(|c| c.to_string()).collect();
        format!("{} ({})", balls.join(" "), self.extras)
    }
}

/// Aggregate recomputed from the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LedgerTotals {
    pub runs: u32,
    pub wickets: u32,
}

/// Manual correction of a recorded cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    pub over: u32,
    pub ball: u8,
    pub before: ScoreboardCell,
    pub after: ScoreboardCell,
}

/// Ordered overs of one innings. Over 1 exists from the start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLedger {
    overs: Vec<Over>,
}

impl Default for ScoreLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self { overs: vec![Over::new()] }
    }

    /// Number of overs opened so far
    pub fn over_count(&self) -> u32 {
        self.overs.len() as u32
    }

    /// Over by 1-based index
    pub fn over(&self, over: u32) -> Option<&Over> {
        if over == 0 {
            return None;
        }
        self.overs.get((over - 1) as usize)
    }

    pub fn overs(&self) -> &[Over] {
        &self.overs
    }

    fn over_mut(&mut self, over: u32) -> &mut Over {
        assert!(
            over >= 1 && over <= self.over_count(),
            "over {} does not exist (ledger has {})",
            over,
            self.over_count()
        );
        &mut self.overs[(over - 1) as usize]
    }

    /// Writes the outcome of a legal delivery into an empty slot.
    pub fn record_ball(&mut self, over: u32, ball: u8, cell: ScoreboardCell) {
        assert!(!cell.is_empty(), "cannot record an empty cell");
        assert!((1..=BALLS_PER_OVER).contains(&ball), "ball {} out of range", ball);
        let slot = &mut self.over_mut(over).balls[(ball - 1) as usize];
        assert!(slot.is_empty(), "ball {}.{} already recorded as {}", over, ball, slot);
        *slot = cell;
    }

    /// Replaces an already recorded cell, returning the previous value.
    pub fn replace_ball(&mut self, over: u32, ball: u8, cell: ScoreboardCell) -> ScoreboardCell {
        assert!(!cell.is_empty(), "cannot clear a recorded cell");
        assert!((1..=BALLS_PER_OVER).contains(&ball), "ball {} out of range", ball);
        let slot = &mut self.over_mut(over).balls[(ball - 1) as usize];
        assert!(!slot.is_empty(), "ball {}.{} has not been bowled", over, ball);
        std::mem::replace(slot, cell)
    }

    /// Adds wide / no-ball runs to an over's extras column.
    pub fn add_extras(&mut self, over: u32, runs: u32) {
        self.over_mut(over).extras += runs;
    }

    pub fn add_illegal_wicket(&mut self, over: u32) {
        self.over_mut(over).illegal_wickets += 1;
    }

    /// Opens the next over. The previous one must be complete.
    pub fn open_over(&mut self, over: u32) {
        assert_eq!(over, self.over_count() + 1, "overs must be opened in order");
        if let Some(last) = self.overs.last() {
            assert!(last.is_complete(), "over {} is not complete", self.over_count());
        }
        self.overs.push(Over::new());
    }

    /// Runs and wickets derived from every stored cell.
    pub fn recompute(&self) -> LedgerTotals {
        let totals = self.overs.iter().fold(LedgerTotals::default(), |acc, over| LedgerTotals {
            runs: acc.runs + over.runs(),
            wickets: acc.wickets + over.wickets(),
        });
        log::debug!(
            "Ledger recomputed over {} overs: {}/{}",
            self.overs.len(),
            totals.runs,
            totals.wickets
        );
        totals
    }

    /// One line per over: `"{over} | {summary}"`
    pub fn table(&self) -> String {
        self.lines().join("\n")
    }

    pub fn lines(&self) -> Vec<String> {
        self.overs.iter().enumerate().map(|(i, o)| format!("{} | {}", i + 1, o.summary())).collect()
    }
}

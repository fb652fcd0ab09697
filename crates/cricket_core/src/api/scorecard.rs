//! Read-only scorecard snapshot for the UI collaborator

use serde::{Deserialize, Serialize};

use crate::collaborator::PendingInput;
use crate::engine::ChaseView;
use crate::models::{InningsSummary, MatchState, PendingIllegalState, Target};

/// Scorecard layout version
pub const SCORECARD_SCHEMA_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scorecard {
    pub schema_version: String,
    pub match_id: String,
    pub innings: u8,
    pub batting_team: String,
    pub bowling_team: String,
    pub runs: u32,
    pub wickets: u32,
    /// `"{completed overs}.{balls}"`
    pub overs: String,
    pub striker: String,
    pub non_striker: String,
    pub bowler: String,
    pub pending_delivery: PendingIllegalState,
    pub awaiting: Option<PendingInput>,
    pub target: Option<Target>,
    pub chase: Option<ChaseView>,
    pub chase_text: Option<String>,
    /// Set once the first innings has closed
    pub first_innings: Option<InningsSummary>,
    pub result: Option<String>,
    /// `"{over} | {summary}"` per over of the current innings
    pub overs_table: Vec<String>,
}

impl Scorecard {
    pub fn from_state(
        state: &MatchState,
        awaiting: Option<&PendingInput>,
        chase: Option<ChaseView>,
    ) -> Self {
        let innings = state.current();
        let first_innings = state.innings1.is_over.then(|| state.innings1.summary());

        Self {
            schema_version: SCORECARD_SCHEMA_VERSION.to_string(),
            match_id: state.match_id.clone(),
            innings: innings.number,
            batting_team: innings.batting_team.clone(),
            bowling_team: innings.bowling_team.clone(),
            runs: innings.runs,
            wickets: innings.wickets,
            overs: innings.over_ball_text(),
            striker: innings.batters.striker.clone(),
            non_striker: innings.batters.non_striker.clone(),
            bowler: innings.bowler.clone(),
            pending_delivery: innings.pending,
            awaiting: awaiting.cloned(),
            target: state.target,
            chase_text: chase.as_ref().map(ChaseView::describe),
            chase,
            first_innings,
            result: state.result.as_ref().map(|r| r.to_string()),
            overs_table: innings.ledger.lines(),
        }
    }

    /// `"Lions 42/3 (7.2 ov)"`
    pub fn headline(&self) -> String {
        format!("{} {}/{} ({} ov)", self.batting_team, self.runs, self.wickets, self.overs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScorerConfig;
    use crate::engine::MatchScorer;
    use crate::models::{DeliveryEvent, MatchSetup, TossDecision};
    use insta::assert_snapshot;

    fn scorer() -> MatchScorer {
        let setup = MatchSetup {
            match_id: "m1".to_string(),
            team_one: "Lions".to_string(),
            team_two: "Tigers".to_string(),
            toss_winner: "Tigers".to_string(),
            toss_decision: TossDecision::Bowl,
            max_overs: Some(1),
            striker: "Asha".to_string(),
            non_striker: "Bilal".to_string(),
            bowler: Some("Chen".to_string()),
        };
        MatchScorer::new(&setup, &ScorerConfig::default()).unwrap()
    }

    #[test]
    fn test_scorecard_mid_over() {
        let mut s = scorer();
        for symbol in ["1", "+", "2", "4", "B", "1"] {
            s.submit_symbol(symbol).unwrap();
        }
        let card = s.scorecard();
        assert_eq!(card.headline(), "Lions 9/0 (0.3 ov)");
        assert_eq!(card.striker, "Asha");
        assert_eq!(card.bowler, "Chen");
        assert!(card.awaiting.is_none());
        assert!(card.chase.is_none());
        assert_snapshot!(card.overs_table.join("\n"), @"1 | 1 4 B1 _ _ _ (3)");
    }

    #[test]
    fn test_scorecard_between_innings() {
        let mut s = scorer();
        for _ in 0..5 {
            s.submit(DeliveryEvent::Dot).unwrap();
        }
        s.submit(DeliveryEvent::Runs(6)).unwrap();

        let card = s.scorecard();
        assert_eq!(card.innings, 2);
        assert_eq!(card.batting_team, "Tigers");
        let first = card.first_innings.as_ref().unwrap();
        assert_eq!(first.to_string(), "Lions 6/0 (1.0 ov)");
        assert_eq!(card.target.map(|t| t.runs_to_win), Some(7));
        assert!(matches!(card.awaiting, Some(PendingInput::Innings2Players { .. })));

        let json: serde_json::Value = serde_json::from_str(&s.scorecard_json().unwrap()).unwrap();
        assert_eq!(json["schema_version"], SCORECARD_SCHEMA_VERSION);
        assert_eq!(json["awaiting"]["request"], "innings2_players");
    }
}

//! Scripted match replay
//!
//! ```json
//! {
//!   "setup": { "match_id": "m1", "team_one": "Lions", ... },
//!   "steps": [
//!     "1", ".", "+", "2", "W",
//!     { "action": "wicket", "dismissed": "striker", "new_batsman": "Dev" },
//!     { "action": "bowler", "name": "Kofi" }
//!   ]
//! }
//! ```
//!
//! A bare string is a scorer button symbol; objects are full
//! [`ScoringRequest`]s.

use anyhow::{bail, Context, Result};
use cricket_core::audit::AuditSink;
use cricket_core::collaborator::{RecordingObserver, ScoreNotification};
use cricket_core::{MatchScorer, MatchSetup, Scorecard, ScorerConfig, ScoringRequest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    Symbol(String),
    Request(ScoringRequest),
}

impl From<ScriptStep> for ScoringRequest {
    fn from(step: ScriptStep) -> Self {
        match step {
            ScriptStep::Symbol(symbol) => ScoringRequest::Delivery { symbol },
            ScriptStep::Request(request) => request,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchScript {
    pub setup: MatchSetup,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

/// What a replay produced
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub scorecard: Scorecard,
    pub steps_applied: usize,
    pub notifications: Vec<ScoreNotification>,
}

pub fn load_script(path: &Path) -> Result<MatchScript> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    let script: MatchScript = serde_json::from_str(&json)
        .with_context(|| format!("Invalid script JSON: {}", path.display()))?;
    Ok(script)
}

/// Runs every step in order. The first rejected step aborts the replay.
pub fn replay<A: AuditSink>(
    script: MatchScript,
    config: &ScorerConfig,
    audit: A,
) -> Result<ReplayOutcome> {
    let mut scorer =
        MatchScorer::with_collaborators(&script.setup, config, RecordingObserver::new(), audit)
            .context("Invalid match setup")?;
    info!(match_id = %script.setup.match_id, steps = script.steps.len(), "Replaying script");

    let mut steps_applied = 0;
    for (index, step) in script.steps.into_iter().enumerate() {
        let request: ScoringRequest = step.into();
        debug!(step = index + 1, ?request, "Applying step");
        if let Err(e) = request.clone().apply(&mut scorer) {
            bail!(
                "Step {} ({:?}) rejected at {}: {}",
                index + 1,
                request,
                scorer.over_ball_text(),
                e
            );
        }
        steps_applied += 1;
    }

    if let Some(pending) = scorer.pending_input() {
        info!(%pending, "Script ended while input is pending");
    }

    Ok(ReplayOutcome {
        scorecard: scorer.scorecard(),
        steps_applied,
        notifications: scorer.observer().notifications.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cricket_core::audit::MemoryAuditLog;

    const SCRIPT: &str = r#"{
        "setup": {
            "match_id": "m1",
            "team_one": "Lions",
            "team_two": "Tigers",
            "toss_winner": "Tigers",
            "toss_decision": "bowl",
            "max_overs": 1,
            "striker": "Asha",
            "non_striker": "Bilal",
            "bowler": "Chen"
        },
        "steps": [
            "1", ".", "+", "2", "W",
            { "action": "wicket", "dismissed": "striker", "wicket_type": "caught", "new_batsman": "Dev" },
            "4", "6", ".",
            { "action": "innings2", "striker": "Tariq", "non_striker": "Uma", "bowler": "Vik" },
            "6", "6"
        ]
    }"#;

    #[test]
    fn test_script_steps_parse_both_forms() {
        let script: MatchScript = serde_json::from_str(SCRIPT).unwrap();
        assert_eq!(script.steps.len(), 12);
        assert_eq!(script.steps[0], ScriptStep::Symbol("1".to_string()));
        assert!(matches!(script.steps[5], ScriptStep::Request(ScoringRequest::Wicket(_))));
    }

    #[test]
    fn test_replay_full_match() {
        let script: MatchScript = serde_json::from_str(SCRIPT).unwrap();
        let outcome = replay(script, &ScorerConfig::default(), MemoryAuditLog::new()).unwrap();

        assert_eq!(outcome.steps_applied, 12);
        let card = &outcome.scorecard;
        assert_eq!(card.innings, 2);
        assert_eq!(card.target.map(|t| t.runs_to_win), Some(15));
        assert_eq!(card.runs, 12);
        assert_eq!(card.result, None);
        assert_eq!(card.first_innings.as_ref().map(|f| f.runs), Some(14));
        assert_eq!(card.first_innings.as_ref().map(|f| f.wickets), Some(1));
    }

    #[test]
    fn test_rejected_step_aborts() {
        let mut script: MatchScript = serde_json::from_str(SCRIPT).unwrap();
        script.steps.insert(5, ScriptStep::Symbol("1".to_string()));
        let err = replay(script, &ScorerConfig::default(), MemoryAuditLog::new()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Step 6"), "{}", message);
        assert!(message.contains("Waiting for input"), "{}", message);
    }

    #[test]
    fn test_load_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.json");
        fs::write(&path, SCRIPT).unwrap();
        assert_eq!(load_script(&path).unwrap().setup.match_id, "m1");
        assert!(load_script(&dir.path().join("missing.json")).is_err());
    }
}

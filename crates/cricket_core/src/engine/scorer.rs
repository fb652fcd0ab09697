//! Match scorer
//!
//! Single entry point for every mutation of a [`MatchState`]. Events run
//! through the [`DeliveryStateMachine`]; the scorer then finishes the
//! delivery (ball advance, over end, innings end) and talks to the host.
//!
//! Whenever input is needed the delivery is parked and a [`PendingInput`] is
//! returned. Until it is answered (or cancelled) every other mutation is
//! refused with [`ScoringError::AwaitingInput`].

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use tracing::{debug, info, warn};

use super::delivery::{DeliveryStateMachine, Resolution};
use super::innings::{InningsController, InningsEndReason, InningsTransition};
use super::target::{ChaseView, TargetTracker};
use crate::api::Scorecard;
use crate::audit::{AuditSink, DeliveryId, DeliveryRecord, NullAuditSink};
use crate::collaborator::{
    Innings2Players, NullObserver, PendingInput, ScoreObserver, WicketDetails,
};
use crate::config::{ScorerConfig, MAX_OVERS_LIMIT};
use crate::error::{Result, ScoringError};
use crate::models::match_state::{bowler_or, validate_openers};
use crate::models::{
    BatterEnd, Batters, DeliveryEvent, EditRecord, InningsState, MatchResult, MatchSetup,
    MatchState, ScoreboardCell, BALLS_PER_OVER, MAX_WICKETS,
};

/// What one call into the scorer changed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Present when an event was accepted by the state machine
    pub resolution: Option<Resolution>,
    pub over_completed: Option<u32>,
    pub innings_ended: Option<InningsEndReason>,
    pub result: Option<MatchResult>,
    /// Input the scorer now waits for
    pub pending: Option<PendingInput>,
}

/// A wicket delivery waiting for its dismissal details
#[derive(Debug, Clone)]
struct ParkedWicket {
    before: InningsState,
    delivery_id: Option<DeliveryId>,
    legal: bool,
}

pub struct MatchScorer<O: ScoreObserver = NullObserver, A: AuditSink = NullAuditSink> {
    state: MatchState,
    config: ScorerConfig,
    pending_input: Option<PendingInput>,
    parked: Option<ParkedWicket>,
    /// Innings snapshots before each accepted event, newest last
    history: VecDeque<InningsState>,
    observer: O,
    audit: A,
}

impl MatchScorer {
    /// Scorer with no observer and no audit trail
    pub fn new(setup: &MatchSetup, config: &ScorerConfig) -> Result<Self> {
        Self::with_collaborators(setup, config, NullObserver, NullAuditSink)
    }
}

impl<O: ScoreObserver, A: AuditSink> MatchScorer<O, A> {
    pub fn with_collaborators(
        setup: &MatchSetup,
        config: &ScorerConfig,
        observer: O,
        audit: A,
    ) -> Result<Self> {
        let max_overs = setup.max_overs.unwrap_or(config.max_overs);
        if max_overs > MAX_OVERS_LIMIT {
            return Err(ScoringError::validation(format!(
                "max overs must be 1-{}, got {}",
                MAX_OVERS_LIMIT, max_overs
            )));
        }
        let state = MatchState::new(setup, max_overs, &config.unknown_bowler)?;
        info!(
            match_id = %state.match_id,
            batting = %state.innings1.batting_team,
            bowling = %state.innings1.bowling_team,
            max_overs,
            "Match started"
        );
        Ok(Self {
            state,
            config: config.clone(),
            pending_input: None,
            parked: None,
            history: VecDeque::new(),
            observer,
            audit,
        })
    }

    // ========== Read side ==========

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn current_innings(&self) -> &InningsState {
        self.state.current()
    }

    pub fn pending_input(&self) -> Option<&PendingInput> {
        self.pending_input.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn over_ball_text(&self) -> String {
        self.state.current().over_ball_text()
    }

    /// Chase view while innings 2 is in play
    pub fn chase_view(&self) -> Option<ChaseView> {
        if !self.state.is_second_innings() {
            return None;
        }
        self.state.target.map(|t| TargetTracker::view(t, self.state.current()))
    }

    pub fn scorecard(&self) -> Scorecard {
        Scorecard::from_state(&self.state, self.pending_input.as_ref(), self.chase_view())
    }

    pub fn scorecard_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.scorecard())?)
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn audit_sink(&self) -> &A {
        &self.audit
    }

    /// Consumes the scorer, handing back its observer
    pub fn into_observer(self) -> O {
        self.observer
    }

    pub fn undo_available(&self) -> usize {
        self.history.len()
    }

    // ========== Scoring ==========

    /// Parses a scorer button symbol and submits it.
    pub fn submit_symbol(&mut self, symbol: &str) -> Result<DeliveryReport> {
        let event: DeliveryEvent = symbol.parse()?;
        self.submit(event)
    }

    /// Applies one scoring event.
    pub fn submit(&mut self, event: DeliveryEvent) -> Result<DeliveryReport> {
        self.ensure_open()?;

        let before = self.state.current().clone();
        let resolution = match DeliveryStateMachine::submit(self.state.current_mut(), event) {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(event = %event, error = %e, "Delivery rejected");
                return Err(e);
            }
        };
        debug!(
            innings = before.number,
            over = resolution.over,
            ball = resolution.ball,
            event = %event,
            runs_added = resolution.runs_added,
            "Delivery accepted"
        );
        self.push_history(before.clone());

        if resolution.is_signal() {
            self.notify_score();
            return Ok(DeliveryReport { resolution: Some(resolution), ..Default::default() });
        }

        let delivery_id = self.persist(&before, &resolution);
        self.state.current_mut().delivery_serial += 1;

        if resolution.wicket {
            let batters = self.state.current().batters.clone();
            let request = PendingInput::WicketDetails {
                striker: batters.striker,
                non_striker: batters.non_striker,
            };
            self.parked =
                Some(ParkedWicket { before, delivery_id, legal: resolution.kind.is_legal() });
            self.pending_input = Some(request.clone());
            self.notify_score();
            return Ok(DeliveryReport {
                resolution: Some(resolution),
                pending: Some(request),
                ..Default::default()
            });
        }

        let mut report = self.finish_delivery(resolution.kind.is_legal());
        report.resolution = Some(resolution);
        Ok(report)
    }

    /// Answers [`PendingInput::WicketDetails`] and finishes the parked delivery.
    pub fn confirm_wicket(&mut self, details: WicketDetails) -> Result<DeliveryReport> {
        self.expect_pending(|p| matches!(p, PendingInput::WicketDetails { .. }))?;

        let innings = self.state.current();
        let all_out = innings.wickets >= MAX_WICKETS;
        let new_batsman = match details.new_batsman.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => None,
        };
        if !all_out {
            let Some(name) = new_batsman.as_deref() else {
                return Err(ScoringError::validation("new batsman name required"));
            };
            let staying = match details.dismissed {
                BatterEnd::Striker => &innings.batters.non_striker,
                BatterEnd::NonStriker => &innings.batters.striker,
            };
            if name == staying {
                return Err(ScoringError::validation(format!("{} is already batting", name)));
            }
        }

        let Some(parked) = self.parked.take() else {
            return Err(ScoringError::NoPendingInput);
        };
        self.pending_input = None;

        let innings = self.state.current_mut();
        let dismissed = innings.batters.name(details.dismissed).to_string();
        if let (false, Some(name)) = (all_out, new_batsman) {
            innings.batters.replace(details.dismissed, name);
        }
        info!(
            dismissed = %dismissed,
            how = %details.wicket_type,
            wickets = innings.wickets,
            "Wicket confirmed"
        );

        if let Some(id) = &parked.delivery_id {
            if let Err(e) = self.audit.persist_wicket_details(id, &details.wicket_type, &dismissed) {
                log::warn!("Failed to persist wicket details for {}: {}", id, e);
            }
        }

        Ok(self.finish_delivery(parked.legal))
    }

    /// Answers [`PendingInput::NewBowler`]; `None` or blank uses the unknown label.
    pub fn provide_bowler(&mut self, name: Option<String>) -> Result<()> {
        self.expect_pending(|p| matches!(p, PendingInput::NewBowler { .. }))?;
        let bowler = bowler_or(name.as_deref(), &self.config.unknown_bowler);
        let innings = self.state.current_mut();
        info!(over = innings.current_over, bowler = %bowler, "New bowler");
        innings.bowler = bowler;
        self.pending_input = None;
        Ok(())
    }

    /// Answers [`PendingInput::Innings2Players`] and opens the chase.
    pub fn provide_innings2_players(&mut self, players: Innings2Players) -> Result<()> {
        self.expect_pending(|p| matches!(p, PendingInput::Innings2Players { .. }))?;
        validate_openers(&players.striker, &players.non_striker)?;

        let bowler = bowler_or(players.bowler.as_deref(), &self.config.unknown_bowler);
        let innings = self.state.current_mut();
        innings.batters = Batters::new(players.striker.trim(), players.non_striker.trim());
        innings.bowler = bowler;
        info!(
            batting = %innings.batting_team,
            striker = %innings.batters.striker,
            non_striker = %innings.batters.non_striker,
            "Second innings players set"
        );
        self.pending_input = None;
        self.notify_score();
        Ok(())
    }

    /// Withdraws the outstanding request.
    ///
    /// A wicket is rolled back as if it had never been submitted. A bowler
    /// request falls back to the unknown label. Innings 2 cannot start
    /// without players.
    pub fn cancel_pending(&mut self) -> Result<()> {
        match self.pending_input.clone() {
            None => Err(ScoringError::NoPendingInput),
            Some(PendingInput::NewBowler { .. }) => self.provide_bowler(None),
            Some(PendingInput::Innings2Players { .. }) => {
                Err(ScoringError::validation("second innings cannot start without players"))
            }
            Some(PendingInput::WicketDetails { .. }) => {
                let Some(parked) = self.parked.take() else {
                    return Err(ScoringError::NoPendingInput);
                };
                *self.state.current_mut() = parked.before;
                self.history.pop_back();
                self.pending_input = None;
                info!("Wicket cancelled, delivery rolled back");
                self.notify_score();
                Ok(())
            }
        }
    }

    /// Restores the innings as it was before the most recent accepted event.
    pub fn undo(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(ScoringError::InningsClosed { innings: self.state.current_innings });
        }
        if matches!(self.pending_input, Some(PendingInput::WicketDetails { .. })) {
            return self.cancel_pending();
        }
        if matches!(self.pending_input, Some(PendingInput::Innings2Players { .. })) {
            return Err(ScoringError::validation("nothing to undo in this innings"));
        }
        let Some(previous) = self.history.pop_back() else {
            return Err(ScoringError::validation("nothing to undo in this innings"));
        };
        *self.state.current_mut() = previous;
        self.pending_input = None;
        self.parked = None;
        let innings = self.state.current();
        log::info!(
            "Undo: innings {} back to {}/{} at {}",
            innings.number,
            innings.runs,
            innings.wickets,
            innings.over_ball_text()
        );
        self.notify_score();
        Ok(())
    }

    /// Replaces an already bowled ball in the current innings and
    /// recomputes the score from the ledger.
    pub fn correct_cell(
        &mut self,
        over: u32,
        ball: u8,
        cell: ScoreboardCell,
    ) -> Result<DeliveryReport> {
        self.ensure_open()?;
        cell.validate()?;
        if over == 0 || !(1..=BALLS_PER_OVER).contains(&ball) {
            return Err(ScoringError::validation(format!(
                "ball {}.{} is out of range",
                over, ball
            )));
        }
        if !self.state.current().is_bowled(over, ball) {
            return Err(ScoringError::validation(format!(
                "ball {}.{} has not been bowled yet",
                over, ball
            )));
        }

        self.push_history(self.state.current().clone());
        let innings = self.state.current_mut();
        let before = innings.ledger.replace_ball(over, ball, cell);
        innings.edits.push(EditRecord { over, ball, before, after: cell });
        innings.refresh_totals();
        log::info!(
            "Corrected {}.{}: {} -> {} (now {}/{})",
            over,
            ball,
            before,
            cell,
            innings.runs,
            innings.wickets
        );
        self.notify_score();

        let mut report = DeliveryReport::default();
        if let Some(reason) = InningsController::check_end_of_innings(&self.state) {
            self.close_innings(reason, &mut report);
        }
        Ok(report)
    }

    // ========== Internals ==========

    fn ensure_open(&self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(ScoringError::InningsClosed { innings: self.state.current_innings });
        }
        if let Some(pending) = &self.pending_input {
            return Err(ScoringError::AwaitingInput(pending.clone()));
        }
        Ok(())
    }

    fn expect_pending(&self, wanted: impl Fn(&PendingInput) -> bool) -> Result<()> {
        match &self.pending_input {
            None => Err(ScoringError::NoPendingInput),
            Some(p) if wanted(p) => Ok(()),
            Some(p) => Err(ScoringError::AwaitingInput(p.clone())),
        }
    }

    fn push_history(&mut self, snapshot: InningsState) {
        if self.config.undo_depth == 0 {
            return;
        }
        self.history.push_back(snapshot);
        while self.history.len() > self.config.undo_depth {
            self.history.pop_front();
        }
    }

    fn persist(&mut self, before: &InningsState, resolution: &Resolution) -> Option<DeliveryId> {
        let record = DeliveryRecord::from_resolution(&self.state.match_id, before, resolution);
        match self.audit.persist_delivery(&record) {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!(
                    "Failed to persist delivery {}.{} of innings {}: {}",
                    record.over,
                    record.ball,
                    record.innings,
                    e
                );
                None
            }
        }
    }

    fn notify_score(&mut self) {
        let innings = self.state.current();
        let text = innings.over_ball_text();
        self.observer.on_score_changed(innings.runs, innings.wickets, &text);
    }

    /// Ball advance, over end and innings end for a resolved delivery
    fn finish_delivery(&mut self, legal: bool) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        if legal {
            report.over_completed =
                DeliveryStateMachine::complete_legal_ball(self.state.current_mut());
        }
        if let Some(over) = report.over_completed {
            let summary = self
                .state
                .current()
                .ledger
                .over(over)
                .map(|o| o.summary())
                .unwrap_or_default();
            debug!(over, summary = %summary, "Over completed");
            self.observer.on_over_completed(over, &summary);
        }
        self.notify_score();

        if let Some(reason) = InningsController::check_end_of_innings(&self.state) {
            self.close_innings(reason, &mut report);
        } else if report.over_completed.is_some() {
            let request = PendingInput::NewBowler { over: self.state.current().current_over };
            self.pending_input = Some(request.clone());
            report.pending = Some(request);
        }
        report
    }

    fn close_innings(&mut self, reason: InningsEndReason, report: &mut DeliveryReport) {
        let summary = self.state.current().summary();
        let transition = InningsController::end_innings(&mut self.state, reason);
        info!(innings = summary.innings, reason = %reason, score = %summary, "Innings ended");
        self.observer.on_innings_ended(reason, &summary);
        self.history.clear();
        self.parked = None;
        report.innings_ended = Some(reason);

        match transition {
            InningsTransition::SecondInningsOpened { target } => {
                let request = PendingInput::Innings2Players {
                    batting_team: self.state.current().batting_team.clone(),
                    target,
                };
                self.pending_input = Some(request.clone());
                report.pending = Some(request);
            }
            InningsTransition::MatchCompleted(result) => {
                let text = result.to_string();
                info!(result = %text, "Match ended");
                self.observer.on_match_ended(&text);
                self.pending_input = None;
                report.result = Some(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditError, MemoryAuditLog};
    use crate::collaborator::{RecordingObserver, ScoreNotification};
    use crate::engine::ChaseStatus;
    use crate::models::{ExtraKind, PendingIllegalState, TossDecision, WicketType};

    type TestScorer = MatchScorer<RecordingObserver, MemoryAuditLog>;

    fn setup(max_overs: u32) -> MatchSetup {
        MatchSetup {
            match_id: "lions-v-tigers".to_string(),
            team_one: "Lions".to_string(),
            team_two: "Tigers".to_string(),
            toss_winner: "Lions".to_string(),
            toss_decision: TossDecision::Bat,
            max_overs: Some(max_overs),
            striker: "Asha".to_string(),
            non_striker: "Bilal".to_string(),
            bowler: Some("Chen".to_string()),
        }
    }

    fn scorer(max_overs: u32) -> TestScorer {
        MatchScorer::with_collaborators(
            &setup(max_overs),
            &ScorerConfig::default(),
            RecordingObserver::new(),
            MemoryAuditLog::new(),
        )
        .unwrap()
    }

    /// Submits and answers any bowler request with a fixed name
    fn bowl(scorer: &mut TestScorer, event: DeliveryEvent) -> DeliveryReport {
        let report = scorer.submit(event).unwrap();
        if let Some(PendingInput::NewBowler { over }) = &report.pending {
            scorer.provide_bowler(Some(format!("Bowler {}", over))).unwrap();
        }
        report
    }

    fn wicket(scorer: &mut TestScorer, new_batsman: Option<&str>) -> DeliveryReport {
        let report = scorer.submit(DeliveryEvent::Wicket).unwrap();
        assert!(matches!(report.pending, Some(PendingInput::WicketDetails { .. })));
        let report = scorer
            .confirm_wicket(WicketDetails::new(BatterEnd::Striker, WicketType::Bowled, new_batsman))
            .unwrap();
        if let Some(PendingInput::NewBowler { .. }) = &report.pending {
            scorer.provide_bowler(None).unwrap();
        }
        report
    }

    fn start_chase(scorer: &mut TestScorer) {
        scorer
            .provide_innings2_players(Innings2Players {
                striker: "Tariq".to_string(),
                non_striker: "Uma".to_string(),
                bowler: Some("Vik".to_string()),
            })
            .unwrap();
    }

    #[test]
    fn test_two_over_match_target_chased() {
        let mut s = scorer(2);
        for _ in 0..11 {
            bowl(&mut s, DeliveryEvent::Dot);
        }
        let last = bowl(&mut s, DeliveryEvent::Runs(6));
        assert_eq!(last.over_completed, Some(2));
        assert_eq!(last.innings_ended, Some(InningsEndReason::OversCompleted));

        let first = &s.state().innings1;
        assert_eq!((first.runs, first.wickets), (6, 0));
        assert!(first.is_over);
        let target = s.state().target.unwrap();
        assert_eq!(target.runs_to_win, 7);
        assert_eq!(target.overs_allowed, 2);
        assert!(matches!(
            s.pending_input(),
            Some(PendingInput::Innings2Players { batting_team, .. }) if batting_team == "Tigers"
        ));

        start_chase(&mut s);
        bowl(&mut s, DeliveryEvent::Runs(4));
        let report = bowl(&mut s, DeliveryEvent::Runs(4));
        assert_eq!(report.innings_ended, Some(InningsEndReason::TargetChased));
        let result = report.result.unwrap();
        assert_eq!(result.to_string(), "Tigers won by 10 wickets");
        assert!(s.is_finished());
        assert_eq!(s.current_innings().runs, 8);

        assert_eq!(
            s.observer().innings_endings(),
            vec![InningsEndReason::OversCompleted, InningsEndReason::TargetChased]
        );
        assert!(matches!(
            s.observer().notifications.last(),
            Some(ScoreNotification::MatchEnded { result }) if result == "Tigers won by 10 wickets"
        ));
    }

    #[test]
    fn test_terminal_match_rejects_everything() {
        let mut s = scorer(1);
        for _ in 0..6 {
            bowl(&mut s, DeliveryEvent::Dot);
        }
        start_chase(&mut s);
        bowl(&mut s, DeliveryEvent::Runs(1));
        assert!(s.is_finished());

        let err = s.submit(DeliveryEvent::Dot).unwrap_err();
        assert!(matches!(err, ScoringError::InningsClosed { innings: 2 }));
        assert!(!err.is_recoverable());
        assert!(s.undo().is_err());
        assert!(s.correct_cell(1, 1, ScoreboardCell::Dot).is_err());
    }

    #[test]
    fn test_ten_wickets_end_innings_mid_over() {
        let mut s = scorer(20);
        bowl(&mut s, DeliveryEvent::Runs(2));
        for i in 0..9 {
            let report = wicket(&mut s, Some(&format!("Batter {}", i + 3)));
            assert_eq!(report.innings_ended, None);
        }
        let report = wicket(&mut s, None);
        assert_eq!(report.innings_ended, Some(InningsEndReason::AllOut));

        let first = &s.state().innings1;
        assert_eq!(first.wickets, 10);
        assert_eq!(first.current_over, 2);
        assert_eq!(s.state().target.unwrap().runs_to_win, 3);
    }

    #[test]
    fn test_wide_then_three_runs() {
        let mut s = scorer(20);
        let signal = s.submit(DeliveryEvent::WideSignal).unwrap();
        assert!(signal.resolution.unwrap().is_signal());
        assert_eq!(s.current_innings().runs, 1);
        assert!(s.audit_sink().is_empty());

        let report = s.submit(DeliveryEvent::Runs(3)).unwrap();
        let resolution = report.resolution.unwrap();
        assert!(resolution.rotated);
        let innings = s.current_innings();
        assert_eq!(innings.runs, 4);
        assert_eq!(innings.over_ball_text(), "0.0");
        assert_eq!(innings.batters.striker, "Bilal");

        let records: Vec<_> = s.audit_sink().records().collect();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_wide);
        assert_eq!(records[0].striker, "Asha");
    }

    #[test]
    fn test_second_wide_signal_rejected() {
        let mut s = scorer(20);
        s.submit(DeliveryEvent::WideSignal).unwrap();
        let err = s.submit(DeliveryEvent::WideSignal).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidTransition { .. }));
        assert!(err.is_recoverable());
        assert_eq!(s.current_innings().pending, PendingIllegalState::WidePending);
        assert_eq!(s.current_innings().runs, 1);
    }

    #[test]
    fn test_dot_ending_over_rotates_and_requests_bowler() {
        let mut s = scorer(20);
        for _ in 0..5 {
            s.submit(DeliveryEvent::Dot).unwrap();
        }
        let report = s.submit(DeliveryEvent::Dot).unwrap();
        assert_eq!(report.over_completed, Some(1));
        assert_eq!(report.pending, Some(PendingInput::NewBowler { over: 2 }));
        assert_eq!(s.current_innings().batters.striker, "Bilal");

        let err = s.submit(DeliveryEvent::Dot).unwrap_err();
        assert!(matches!(err, ScoringError::AwaitingInput(PendingInput::NewBowler { over: 2 })));

        s.provide_bowler(Some("Dana".to_string())).unwrap();
        assert_eq!(s.current_innings().bowler, "Dana");
        assert_eq!(s.observer().completed_overs(), vec![1]);
    }

    #[test]
    fn test_cancel_bowler_request_uses_unknown() {
        let mut s = scorer(20);
        for _ in 0..6 {
            s.submit(DeliveryEvent::Dot).unwrap();
        }
        s.cancel_pending().unwrap();
        assert_eq!(s.current_innings().bowler, "Unknown");
        assert!(s.pending_input().is_none());
    }

    #[test]
    fn test_wicket_finalisation_waits_for_details() {
        let mut s = scorer(20);
        let report = s.submit(DeliveryEvent::Wicket).unwrap();
        assert_eq!(
            report.pending,
            Some(PendingInput::WicketDetails {
                striker: "Asha".to_string(),
                non_striker: "Bilal".to_string()
            })
        );
        assert_eq!(s.current_innings().current_ball, 1);
        assert_eq!(s.current_innings().wickets, 1);

        let err = s
            .confirm_wicket(WicketDetails::new(BatterEnd::Striker, WicketType::Caught, None))
            .unwrap_err();
        assert!(matches!(err, ScoringError::ValidationError(_)));
        let err = s
            .confirm_wicket(WicketDetails::new(BatterEnd::Striker, WicketType::Caught, Some("Bilal")))
            .unwrap_err();
        assert!(matches!(err, ScoringError::ValidationError(_)));

        s.confirm_wicket(WicketDetails::new(BatterEnd::Striker, WicketType::Caught, Some("Dev")))
            .unwrap();
        let innings = s.current_innings();
        assert_eq!(innings.current_ball, 2);
        assert_eq!(innings.batters.striker, "Dev");

        let record = s.audit_sink().records().next().unwrap();
        assert_eq!(record.wicket_type.as_deref(), Some("Caught"));
        assert_eq!(record.player_dismissed.as_deref(), Some("Asha"));
    }

    #[test]
    fn test_non_striker_run_out() {
        let mut s = scorer(20);
        s.submit(DeliveryEvent::Wicket).unwrap();
        s.confirm_wicket(WicketDetails::new(BatterEnd::NonStriker, WicketType::RunOut, Some("Dev")))
            .unwrap();
        let batters = &s.current_innings().batters;
        assert_eq!(batters.striker, "Asha");
        assert_eq!(batters.non_striker, "Dev");
    }

    #[test]
    fn test_cancel_wicket_rolls_back() {
        let mut s = scorer(20);
        s.submit(DeliveryEvent::Runs(2)).unwrap();
        let before = s.current_innings().clone();

        s.submit(DeliveryEvent::Wicket).unwrap();
        s.cancel_pending().unwrap();
        assert_eq!(s.current_innings(), &before);
        assert!(s.pending_input().is_none());
        s.submit(DeliveryEvent::Dot).unwrap();
        assert_eq!(s.current_innings().current_ball, 3);
    }

    #[test]
    fn test_wicket_on_last_ball_asks_details_before_bowler() {
        let mut s = scorer(20);
        for _ in 0..5 {
            s.submit(DeliveryEvent::Dot).unwrap();
        }
        let report = s.submit(DeliveryEvent::Wicket).unwrap();
        assert!(matches!(report.pending, Some(PendingInput::WicketDetails { .. })));
        let report = s
            .confirm_wicket(WicketDetails::new(BatterEnd::Striker, WicketType::Bowled, Some("Dev")))
            .unwrap();
        assert_eq!(report.over_completed, Some(1));
        assert_eq!(report.pending, Some(PendingInput::NewBowler { over: 2 }));
        // New batter came in on strike, then ends changed
        assert_eq!(s.current_innings().batters.non_striker, "Dev");
    }

    #[test]
    fn test_answering_wrong_request() {
        let mut s = scorer(20);
        assert!(matches!(s.provide_bowler(None), Err(ScoringError::NoPendingInput)));
        assert!(matches!(s.cancel_pending(), Err(ScoringError::NoPendingInput)));

        s.submit(DeliveryEvent::Wicket).unwrap();
        let err = s.provide_bowler(Some("Dana".to_string())).unwrap_err();
        assert!(matches!(err, ScoringError::AwaitingInput(PendingInput::WicketDetails { .. })));
    }

    #[test]
    fn test_innings2_players_required() {
        let mut s = scorer(1);
        for _ in 0..6 {
            bowl(&mut s, DeliveryEvent::Dot);
        }
        assert!(matches!(s.submit(DeliveryEvent::Dot), Err(ScoringError::AwaitingInput(_))));
        assert!(matches!(s.cancel_pending(), Err(ScoringError::ValidationError(_))));
        let err = s
            .provide_innings2_players(Innings2Players {
                striker: "Tariq".to_string(),
                non_striker: "Tariq".to_string(),
                bowler: None,
            })
            .unwrap_err();
        assert!(matches!(err, ScoringError::ValidationError(_)));

        s.provide_innings2_players(Innings2Players {
            striker: "Tariq".to_string(),
            non_striker: "Uma".to_string(),
            bowler: None,
        })
        .unwrap();
        let chase = s.current_innings();
        assert_eq!(chase.bowler, "Unknown");
        assert_eq!(chase.batting_team, "Tigers");
        assert_eq!(s.state().innings1.runs, 0);
    }

    #[test]
    fn test_chase_view_during_second_innings() {
        let mut s = scorer(2);
        assert!(s.chase_view().is_none());
        for _ in 0..11 {
            bowl(&mut s, DeliveryEvent::Dot);
        }
        bowl(&mut s, DeliveryEvent::Runs(6));
        start_chase(&mut s);
        bowl(&mut s, DeliveryEvent::Runs(2));

        let view = s.chase_view().unwrap();
        assert_eq!(view.runs_required, 5);
        assert_eq!(view.balls_remaining, 11);
        assert_eq!(view.status, ChaseStatus::Chasing);
    }

    #[test]
    fn test_tie_on_last_ball() {
        let mut s = scorer(1);
        for _ in 0..5 {
            bowl(&mut s, DeliveryEvent::Dot);
        }
        bowl(&mut s, DeliveryEvent::Runs(4));
        start_chase(&mut s);
        for _ in 0..5 {
            bowl(&mut s, DeliveryEvent::Dot);
        }
        let report = bowl(&mut s, DeliveryEvent::Runs(4));
        assert_eq!(report.innings_ended, Some(InningsEndReason::MatchTied));
        assert_eq!(report.result, Some(MatchResult::Tied));
    }

    #[test]
    fn test_all_out_on_last_ball_with_scores_level() {
        let mut s = scorer(1);
        for _ in 0..5 {
            bowl(&mut s, DeliveryEvent::Dot);
        }
        bowl(&mut s, DeliveryEvent::Runs(4));
        start_chase(&mut s);

        bowl(&mut s, DeliveryEvent::Runs(4));
        // Nine wickets already down off illegal deliveries
        for _ in 0..9 {
            s.state.current_mut().ledger.add_illegal_wicket(1);
        }
        s.state.current_mut().refresh_totals();
        for _ in 0..4 {
            bowl(&mut s, DeliveryEvent::Dot);
        }
        let report = wicket(&mut s, None);
        assert_eq!(report.innings_ended, Some(InningsEndReason::AllOut));
        assert_eq!(report.result, Some(MatchResult::Tied));
    }

    #[test]
    fn test_undo_restores_previous_event() {
        let mut s = scorer(20);
        s.submit(DeliveryEvent::Runs(1)).unwrap();
        let after_single = s.current_innings().clone();
        s.submit(DeliveryEvent::NoBallSignal).unwrap();
        s.submit(DeliveryEvent::Runs(4)).unwrap();

        s.undo().unwrap();
        assert_eq!(s.current_innings().pending, PendingIllegalState::NoBallPending);
        s.undo().unwrap();
        assert_eq!(s.current_innings(), &after_single);
        s.undo().unwrap();
        assert_eq!(s.current_innings().runs, 0);
        assert_eq!(s.current_innings().batters.striker, "Asha");
        assert!(matches!(s.undo(), Err(ScoringError::ValidationError(_))));
    }

    #[test]
    fn test_undo_discards_bowler_request() {
        let mut s = scorer(20);
        for _ in 0..6 {
            s.submit(DeliveryEvent::Dot).unwrap();
        }
        assert!(s.pending_input().is_some());
        s.undo().unwrap();
        assert!(s.pending_input().is_none());
        let innings = s.current_innings();
        assert_eq!((innings.current_over, innings.current_ball), (1, 6));
        assert_eq!(innings.ledger.over_count(), 1);
        assert_eq!(innings.batters.striker, "Asha");
    }

    #[test]
    fn test_undo_depth_is_bounded() {
        let config = ScorerConfig { undo_depth: 2, ..ScorerConfig::default() };
        let mut s = MatchScorer::new(&setup(20), &config).unwrap();
        for _ in 0..4 {
            s.submit(DeliveryEvent::Runs(2)).unwrap();
        }
        assert_eq!(s.undo_available(), 2);
        s.undo().unwrap();
        s.undo().unwrap();
        assert_eq!(s.current_innings().runs, 4);
        assert!(s.undo().is_err());

        let config = ScorerConfig { undo_depth: 0, ..ScorerConfig::default() };
        let mut s = MatchScorer::new(&setup(20), &config).unwrap();
        s.submit(DeliveryEvent::Dot).unwrap();
        assert!(s.undo().is_err());
    }

    #[test]
    fn test_undo_cleared_at_innings_change() {
        let mut s = scorer(1);
        for _ in 0..6 {
            bowl(&mut s, DeliveryEvent::Dot);
        }
        start_chase(&mut s);
        assert!(matches!(s.undo(), Err(ScoringError::ValidationError(_))));
    }

    #[test]
    fn test_correct_cell_recomputes_and_logs() {
        let mut s = scorer(20);
        s.submit(DeliveryEvent::Runs(1)).unwrap();
        s.submit(DeliveryEvent::Dot).unwrap();

        s.correct_cell(1, 2, ScoreboardCell::RunsScored(4)).unwrap();
        let innings = s.current_innings();
        assert_eq!(innings.runs, 5);
        assert_eq!(
            innings.edits,
            vec![EditRecord {
                over: 1,
                ball: 2,
                before: ScoreboardCell::Dot,
                after: ScoreboardCell::RunsScored(4)
            }]
        );

        assert!(s.correct_cell(1, 3, ScoreboardCell::Dot).is_err());
        assert!(s.correct_cell(0, 1, ScoreboardCell::Dot).is_err());
        assert!(s.correct_cell(1, 7, ScoreboardCell::Dot).is_err());
        assert!(s.correct_cell(1, 1, ScoreboardCell::Empty).is_err());

        s.undo().unwrap();
        assert_eq!(s.current_innings().runs, 1);
    }

    #[test]
    fn test_correction_can_finish_chase() {
        let mut s = scorer(2);
        for _ in 0..11 {
            bowl(&mut s, DeliveryEvent::Dot);
        }
        bowl(&mut s, DeliveryEvent::Runs(6));
        start_chase(&mut s);
        bowl(&mut s, DeliveryEvent::Runs(4));
        bowl(&mut s, DeliveryEvent::Runs(2));

        let report = s.correct_cell(1, 2, ScoreboardCell::RunsScored(4)).unwrap();
        assert_eq!(report.innings_ended, Some(InningsEndReason::TargetChased));
        assert!(s.is_finished());
    }

    #[test]
    fn test_bye_capture_through_symbols() {
        let mut s = scorer(20);
        s.submit_symbol("B").unwrap();
        s.submit_symbol("3").unwrap();
        let innings = s.current_innings();
        assert_eq!(innings.runs, 3);
        assert_eq!(innings.ledger.over(1).unwrap().ball(1), ScoreboardCell::Extra(ExtraKind::Bye, 3));
        assert_eq!(innings.batters.striker, "Bilal");
        assert!(matches!(s.submit_symbol("Q"), Err(ScoringError::ValidationError(_))));
    }

    struct BrokenSink;

    impl AuditSink for BrokenSink {
        fn persist_delivery(
            &mut self,
            _record: &DeliveryRecord,
        ) -> std::result::Result<DeliveryId, AuditError> {
            Err(AuditError::Unavailable("offline".to_string()))
        }

        fn persist_wicket_details(
            &mut self,
            _id: &DeliveryId,
            _wicket_type: &WicketType,
            _player_dismissed: &str,
        ) -> std::result::Result<(), AuditError> {
            Err(AuditError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_audit_failures_do_not_block_scoring() {
        let mut s = MatchScorer::with_collaborators(
            &setup(20),
            &ScorerConfig::default(),
            NullObserver,
            BrokenSink,
        )
        .unwrap();
        s.submit(DeliveryEvent::Runs(4)).unwrap();
        s.submit(DeliveryEvent::Wicket).unwrap();
        s.confirm_wicket(WicketDetails::new(BatterEnd::Striker, WicketType::Bowled, Some("Dev")))
            .unwrap();
        assert_eq!(s.current_innings().runs, 4);
        assert_eq!(s.current_innings().wickets, 1);
    }

    #[test]
    fn test_setup_overs_fall_back_to_config() {
        let mut no_overs = setup(20);
        no_overs.max_overs = None;
        let config = ScorerConfig { max_overs: 5, ..ScorerConfig::default() };
        let s = MatchScorer::new(&no_overs, &config).unwrap();
        assert_eq!(s.state().max_overs, 5);

        assert!(MatchScorer::new(&setup(51), &ScorerConfig::default()).is_err());
    }

    #[test]
    fn test_delivery_serials_count_resolved_deliveries() {
        let mut s = scorer(20);
        s.submit(DeliveryEvent::WideSignal).unwrap();
        s.submit(DeliveryEvent::Dot).unwrap();
        s.submit(DeliveryEvent::Runs(2)).unwrap();
        let serials: Vec<u32> =
            s.audit_sink().records().map(|r| r.delivery_innings_serial).collect();
        assert_eq!(serials, vec![1, 2]);
        assert_eq!(s.current_innings().delivery_serial, 3);
    }
}

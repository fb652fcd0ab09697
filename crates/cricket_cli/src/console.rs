//! Interactive scoring from a line-based terminal
//!
//! Each line is a button symbol (`1`, `.`, `W`, `+`, `NB`, `B`, `LB2`) or a
//! command (`undo`, `card`, `quit`). Prompts for wicket details, bowlers and
//! innings-2 players are answered on the following lines.

use anyhow::Result;
use cricket_core::audit::AuditSink;
use cricket_core::collaborator::{Innings2Players, PendingInput, ScoreObserver, WicketDetails};
use cricket_core::engine::InningsEndReason;
use cricket_core::models::InningsSummary;
use cricket_core::{BatterEnd, MatchScorer, WicketType};
use std::io::{BufRead, Write};
use tracing::warn;

/// Prints score notifications as plain lines
pub struct ConsoleObserver<W: Write> {
    out: W,
}

impl<W: Write> ConsoleObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: std::fmt::Arguments) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            warn!("Failed to write score update: {}", e);
        }
    }
}

impl<W: Write> ScoreObserver for ConsoleObserver<W> {
    fn on_score_changed(&mut self, runs: u32, wickets: u32, over_ball_text: &str) {
        self.line(format_args!("{}/{} ({})", runs, wickets, over_ball_text));
    }

    fn on_over_completed(&mut self, over: u32, summary: &str) {
        self.line(format_args!("End of over {}: {}", over, summary));
    }

    fn on_innings_ended(&mut self, reason: InningsEndReason, summary: &InningsSummary) {
        self.line(format_args!("{}. {}", reason, summary));
    }

    fn on_match_ended(&mut self, result_text: &str) {
        self.line(format_args!("Result: {}", result_text));
    }
}

/// Lowercase shorthand or full name; anything unrecognised is kept verbatim
pub fn parse_wicket_type(text: &str) -> WicketType {
    match text.trim().to_ascii_lowercase().as_str() {
        "" | "b" | "bowled" => WicketType::Bowled,
        "c" | "caught" => WicketType::Caught,
        "lbw" => WicketType::Lbw,
        "ro" | "run out" | "runout" => WicketType::RunOut,
        "st" | "stumped" => WicketType::Stumped,
        "hw" | "hit wicket" => WicketType::HitWicket,
        _ => WicketType::Other(text.trim().to_string()),
    }
}

struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Next trimmed line, `None` at end of input
    fn read(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{} ", question)?;
        self.output.flush()?;
        self.read()
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }
}

/// Drives `scorer` from `input` until the match ends, `quit`, or end of input.
pub fn run_live<O, A, R, W>(scorer: &mut MatchScorer<O, A>, input: R, output: W) -> Result<()>
where
    O: ScoreObserver,
    A: AuditSink,
    R: BufRead,
    W: Write,
{
    let mut io = Prompter { input, output };
    io.say(&scorer.scorecard().headline())?;

    while !scorer.is_finished() {
        if let Some(pending) = scorer.pending_input().cloned() {
            if !answer(scorer, &mut io, &pending)? {
                break;
            }
            continue;
        }

        let Some(line) = io.ask(">")? else {
            break;
        };
        let outcome = match line.to_ascii_lowercase().as_str() {
            "" => continue,
            "quit" | "q" => break,
            "card" => {
                let card = scorer.scorecard();
                io.say(&card.headline())?;
                for over in &card.overs_table {
                    io.say(over)?;
                }
                if let Some(chase) = &card.chase_text {
                    io.say(chase)?;
                }
                continue;
            }
            "undo" | "u" => scorer.undo(),
            _ => scorer.submit_symbol(&line).map(|_| ()),
        };
        if let Err(e) = outcome {
            io.say(&format!("! {}", e))?;
        }
    }

    if let Some(result) = &scorer.state().result {
        io.say(&format!("Final: {}", result))?;
    }
    Ok(())
}

/// Returns `false` when input ran out mid-prompt
fn answer<O, A, R, W>(
    scorer: &mut MatchScorer<O, A>,
    io: &mut Prompter<R, W>,
    pending: &PendingInput,
) -> Result<bool>
where
    O: ScoreObserver,
    A: AuditSink,
    R: BufRead,
    W: Write,
{
    let outcome = match pending {
        PendingInput::WicketDetails { striker, non_striker } => {
            let Some(who) = io.ask(&format!("Out: [s]triker {} / [n]on-striker {}?", striker, non_striker))? else {
                return Ok(false);
            };
            let dismissed = if who.to_ascii_lowercase().starts_with('n') {
                BatterEnd::NonStriker
            } else {
                BatterEnd::Striker
            };
            let Some(how) = io.ask("How out?")? else {
                return Ok(false);
            };
            let Some(new_batsman) = io.ask("New batsman (blank if all out)?")? else {
                return Ok(false);
            };
            let details = WicketDetails {
                dismissed,
                wicket_type: parse_wicket_type(&how),
                new_batsman: Some(new_batsman),
            };
            scorer.confirm_wicket(details).map(|_| ())
        }
        PendingInput::NewBowler { over } => {
            let Some(name) = io.ask(&format!("Bowler for over {}?", over))? else {
                return Ok(false);
            };
            scorer.provide_bowler(Some(name))
        }
        PendingInput::Innings2Players { batting_team, target } => {
            io.say(&format!("{} need {} to win", batting_team, target.runs_to_win))?;
            let Some(striker) = io.ask("Striker?")? else {
                return Ok(false);
            };
            let Some(non_striker) = io.ask("Non-striker?")? else {
                return Ok(false);
            };
            let Some(bowler) = io.ask("Opening bowler?")? else {
                return Ok(false);
            };
            scorer.provide_innings2_players(Innings2Players {
                striker,
                non_striker,
                bowler: Some(bowler),
            })
        }
    };
    if let Err(e) = outcome {
        io.say(&format!("! {}", e))?;
    }
    Ok(true)
}

//! Delivery events and pending illegal-delivery state
//!
//! Every button press of the scoring UI is decoded into a [`DeliveryEvent`]
//! at the boundary. The string symbols used by scorers (`D`, `W`, `+`, `NB`,
//! `B2`, ...) never travel further than [`DeliveryEvent::from_str`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScoringError;

/// Largest run value a single button can carry.
pub const MAX_RUNS_PER_EVENT: u8 = 6;

/// Runs scored without the bat on a legal delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtraKind {
    #[default]
    Bye,
    LegBye,
}

impl ExtraKind {
    /// Scoreboard prefix (`B4`, `L1`)
    pub fn symbol(self) -> char {
        match self {
            ExtraKind::Bye => 'B',
            ExtraKind::LegBye => 'L',
        }
    }
}

impl fmt::Display for ExtraKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExtraKind::Bye => write!(f, "bye"),
            ExtraKind::LegBye => write!(f, "leg-bye"),
        }
    }
}

/// A single scoring input.
///
/// `WideSignal`, `NoBallSignal` and `ExtraSignal` announce how the *next*
/// outcome must be interpreted; they are not outcomes themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryEvent {
    Dot,
    Runs(u8),
    Wicket,
    WideSignal,
    NoBallSignal,
    /// Enter bye / leg-bye capture; the following Dot or Runs carries the value
    ExtraSignal(ExtraKind),
    /// Bye / leg-bye runs submitted in one step
    ExtraRuns(ExtraKind, u8),
}

impl DeliveryEvent {
    /// Runs carried by this event (0 for signals, dots and wickets)
    pub fn runs(&self) -> u8 {
        match self {
            DeliveryEvent::Runs(n) | DeliveryEvent::ExtraRuns(_, n) => *n,
            _ => 0,
        }
    }

    pub fn is_signal(&self) -> bool {
        matches!(
            self,
            DeliveryEvent::WideSignal | DeliveryEvent::NoBallSignal | DeliveryEvent::ExtraSignal(_)
        )
    }

    /// Range checks for values that can arrive from outside.
    pub fn validate(&self) -> Result<(), ScoringError> {
        match *self {
            DeliveryEvent::Runs(n) if n == 0 || n > MAX_RUNS_PER_EVENT => Err(
                ScoringError::validation(format!("runs must be 1-6 (use Dot for 0), got {}", n)),
            ),
            DeliveryEvent::ExtraRuns(kind, n) if n > MAX_RUNS_PER_EVENT => Err(
                ScoringError::validation(format!("{} runs must be 0-6, got {}", kind, n)),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for DeliveryEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeliveryEvent::Dot => write!(f, "dot ball"),
            DeliveryEvent::Runs(1) => write!(f, "1 run"),
            DeliveryEvent::Runs(n) => write!(f, "{} runs", n),
            DeliveryEvent::Wicket => write!(f, "wicket"),
            DeliveryEvent::WideSignal => write!(f, "wide signal"),
            DeliveryEvent::NoBallSignal => write!(f, "no-ball signal"),
            DeliveryEvent::ExtraSignal(kind) => write!(f, "{} signal", kind),
            DeliveryEvent::ExtraRuns(kind, n) => write!(f, "{} {}", n, kind),
        }
    }
}

fn parse_extra_runs(kind: ExtraKind, digits: &str) -> Result<DeliveryEvent, ScoringError> {
    let runs: u8 = digits.parse().map_err(|_| {
        ScoringError::validation(format!("{} runs must be numeric, got '{}'", kind, digits))
    })?;
    let event = DeliveryEvent::ExtraRuns(kind, runs);
    event.validate()?;
    Ok(event)
}

impl FromStr for DeliveryEvent {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim().to_ascii_uppercase();
        let event = match symbol.as_str() {
            "D" | "." | "0" => DeliveryEvent::Dot,
            "W" => DeliveryEvent::Wicket,
            "+" | "WD" => DeliveryEvent::WideSignal,
            "NB" => DeliveryEvent::NoBallSignal,
            "X" | "B" => DeliveryEvent::ExtraSignal(ExtraKind::Bye),
            "LB" => DeliveryEvent::ExtraSignal(ExtraKind::LegBye),
            "1" | "2" | "3" | "4" | "5" | "6" => {
                DeliveryEvent::Runs(symbol.parse().map_err(|_| ScoringError::validation(s))?)
            }
            other => {
                if let Some(digits) = other.strip_prefix("LB") {
                    return parse_extra_runs(ExtraKind::LegBye, digits);
                }
                if let Some(digits) = other.strip_prefix('L') {
                    return parse_extra_runs(ExtraKind::LegBye, digits);
                }
                if let Some(digits) = other.strip_prefix('B') {
                    return parse_extra_runs(ExtraKind::Bye, digits);
                }
                return Err(ScoringError::validation(format!("unknown delivery symbol '{}'", s)));
            }
        };
        Ok(event)
    }
}

/// Pending illegal-delivery state. At most one can be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PendingIllegalState {
    #[default]
    None,
    WidePending,
    NoBallPending,
    /// Bye / leg-bye capture mode
    ExtraPending(ExtraKind),
}

impl PendingIllegalState {
    pub fn is_none(&self) -> bool {
        matches!(self, PendingIllegalState::None)
    }
}

impl fmt::Display for PendingIllegalState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PendingIllegalState::None => write!(f, "no delivery is pending"),
            PendingIllegalState::WidePending => write!(f, "a wide is pending"),
            PendingIllegalState::NoBallPending => write!(f, "a no-ball is pending"),
            PendingIllegalState::ExtraPending(kind) => write!(f, "{} runs are pending", kind),
        }
    }
}

/// How the batter was dismissed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WicketType {
    #[default]
    Bowled,
    Caught,
    Lbw,
    RunOut,
    Stumped,
    HitWicket,
    Other(String),
}

impl fmt::Display for WicketType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WicketType::Bowled => write!(f, "Bowled"),
            WicketType::Caught => write!(f, "Caught"),
            WicketType::Lbw => write!(f, "LBW"),
            WicketType::RunOut => write!(f, "Run Out"),
            WicketType::Stumped => write!(f, "Stumped"),
            WicketType::HitWicket => write!(f, "Hit Wicket"),
            WicketType::Other(desc) => write!(f, "{}", desc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_button_symbols() {
        assert_eq!("D".parse::<DeliveryEvent>().unwrap(), DeliveryEvent::Dot);
        assert_eq!("4".parse::<DeliveryEvent>().unwrap(), DeliveryEvent::Runs(4));
        assert_eq!(" w ".parse::<DeliveryEvent>().unwrap(), DeliveryEvent::Wicket);
        assert_eq!("+".parse::<DeliveryEvent>().unwrap(), DeliveryEvent::WideSignal);
        assert_eq!("nb".parse::<DeliveryEvent>().unwrap(), DeliveryEvent::NoBallSignal);
        assert_eq!(
            "X".parse::<DeliveryEvent>().unwrap(),
            DeliveryEvent::ExtraSignal(ExtraKind::Bye)
        );
        assert_eq!(
            "LB".parse::<DeliveryEvent>().unwrap(),
            DeliveryEvent::ExtraSignal(ExtraKind::LegBye)
        );
    }

    #[test]
    fn test_parse_encoded_extras() {
        assert_eq!(
            "B4".parse::<DeliveryEvent>().unwrap(),
            DeliveryEvent::ExtraRuns(ExtraKind::Bye, 4)
        );
        assert_eq!(
            "L0".parse::<DeliveryEvent>().unwrap(),
            DeliveryEvent::ExtraRuns(ExtraKind::LegBye, 0)
        );
        assert_eq!(
            "LB3".parse::<DeliveryEvent>().unwrap(),
            DeliveryEvent::ExtraRuns(ExtraKind::LegBye, 3)
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!("7".parse::<DeliveryEvent>(), Err(ScoringError::ValidationError(_))));
        assert!(matches!("B9".parse::<DeliveryEvent>(), Err(ScoringError::ValidationError(_))));
        assert!(matches!("Bx".parse::<DeliveryEvent>(), Err(ScoringError::ValidationError(_))));
        assert!("".parse::<DeliveryEvent>().is_err());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(DeliveryEvent::Runs(6).validate().is_ok());
        assert!(DeliveryEvent::Runs(0).validate().is_err());
        assert!(DeliveryEvent::Runs(7).validate().is_err());
        assert!(DeliveryEvent::ExtraRuns(ExtraKind::Bye, 0).validate().is_ok());
        assert!(DeliveryEvent::ExtraRuns(ExtraKind::Bye, 7).validate().is_err());
    }

    #[test]
    fn test_signals() {
        assert!(DeliveryEvent::WideSignal.is_signal());
        assert!(DeliveryEvent::ExtraSignal(ExtraKind::Bye).is_signal());
        assert!(!DeliveryEvent::ExtraRuns(ExtraKind::Bye, 1).is_signal());
        assert_eq!(DeliveryEvent::ExtraRuns(ExtraKind::LegBye, 3).runs(), 3);
        assert_eq!(DeliveryEvent::Wicket.runs(), 0);
    }
}

//! Cricket scorer host
//!
//! Scripted replays and an interactive stdin loop around
//! [`cricket_core::MatchScorer`].

pub mod console;
pub mod script;

use anyhow::{Context, Result};
use cricket_core::audit::{AuditSink, JsonLinesAuditLog, NullAuditSink};
use cricket_core::{config_from_env, MatchSetup, ScorerConfig};
use std::fs;
use std::path::Path;

pub use console::{run_live, ConsoleObserver};
pub use script::{load_script, replay, MatchScript, ReplayOutcome, ScriptStep};

/// Explicit file first, then `CRICKET_SCORER_CONFIG`, then defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<ScorerConfig> {
    if let Some(path) = explicit {
        return ScorerConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()));
    }
    Ok(config_from_env()?.unwrap_or_default())
}

/// JSON-lines sink at `explicit` or the configured path; no trail otherwise.
pub fn open_audit(explicit: Option<&Path>, config: &ScorerConfig) -> Result<Box<dyn AuditSink>> {
    let path = explicit.or(config.audit_log_path.as_deref());
    match path {
        Some(path) => {
            let sink = JsonLinesAuditLog::open(path)
                .with_context(|| format!("Failed to open audit log: {}", path.display()))?;
            Ok(Box::new(sink))
        }
        None => Ok(Box::new(NullAuditSink)),
    }
}

pub fn load_setup(path: &Path) -> Result<MatchSetup> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read setup file: {}", path.display()))?;
    let setup: MatchSetup = serde_json::from_str(&json)
        .with_context(|| format!("Invalid setup JSON: {}", path.display()))?;
    Ok(setup)
}

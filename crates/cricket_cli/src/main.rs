//! Cricket scorer CLI
//!
//! `live`: score ball by ball from stdin
//! `replay`: run a JSON match script and print the final scorecard

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "cricket_cli")]
#[command(about = "Ball-by-ball limited-overs cricket scorer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Score a match interactively
    Live {
        /// Match setup JSON (teams, toss, openers)
        #[arg(long)]
        setup: PathBuf,

        /// Scorer config (JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON-lines delivery audit file
        #[arg(long)]
        audit: Option<PathBuf>,
    },

    /// Replay a scripted match
    Replay {
        /// Match script JSON (setup + steps)
        #[arg(long)]
        script: PathBuf,

        /// Scorer config (JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON-lines delivery audit file
        #[arg(long)]
        audit: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Live { setup, config, audit } => {
            let config = cricket_cli::resolve_config(config.as_deref())?;
            let setup = cricket_cli::load_setup(&setup)?;
            let audit = cricket_cli::open_audit(audit.as_deref(), &config)?;
            let observer = cricket_cli::ConsoleObserver::new(std::io::stdout());
            let mut scorer =
                cricket_core::MatchScorer::with_collaborators(&setup, &config, observer, audit)?;

            let stdin = std::io::stdin();
            cricket_cli::run_live(&mut scorer, stdin.lock(), std::io::stdout())?;
        }
        Commands::Replay { script, config, audit } => {
            let config = cricket_cli::resolve_config(config.as_deref())?;
            let script = cricket_cli::load_script(&script)?;
            let audit = cricket_cli::open_audit(audit.as_deref(), &config)?;
            let outcome = cricket_cli::replay(script, &config, audit)?;

            tracing::info!(
                steps = outcome.steps_applied,
                notifications = outcome.notifications.len(),
                "Replay finished"
            );
            println!("{}", serde_json::to_string_pretty(&outcome.scorecard)?);
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("cricket_cli is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}

//! Delivery audit trail
//!
//! Each resolved delivery is written once through an [`AuditSink`]. Dismissal
//! details arrive later and are attached by id. The ledger stays the
//! authority; the scorer logs sink failures and carries on.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::engine::{Resolution, ResolutionKind};
use crate::models::{DeliveryEvent, ExtraKind, InningsState, WicketType};

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Opaque id handed out by a sink for one delivery record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(Uuid);

impl DeliveryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeliveryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtrasType {
    Wide,
    NoBall,
    Bye,
    LegBye,
}

impl From<ExtraKind> for ExtrasType {
    fn from(kind: ExtraKind) -> Self {
        match kind {
            ExtraKind::Bye => ExtrasType::Bye,
            ExtraKind::LegBye => ExtrasType::LegBye,
        }
    }
}

/// One resolved delivery as external persistence stores it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub match_id: String,
    pub innings: u8,
    pub delivery_innings_serial: u32,
    /// `YYYY-MM-DD` of the local timestamp
    pub date: String,
    pub local_timestamp: DateTime<Local>,
    pub over: u32,
    pub ball: u8,
    pub batting_team: String,
    pub bowling_team: String,
    pub striker: String,
    pub non_striker: String,
    pub bowler: String,
    pub runs_off_bat: u32,
    pub is_wide: bool,
    pub is_no_ball: bool,
    pub extras_runs: u32,
    pub extras_type: Option<ExtrasType>,
    pub is_wicket: bool,
    pub wicket_type: Option<String>,
    pub player_dismissed: Option<String>,
    pub outcome_symbol: String,
}

impl DeliveryRecord {
    /// Builds the record for `resolution` from the innings as it stood
    /// before the delivery was applied.
    ///
    /// A wide or no-ball logs its flat extra in `extrasRuns` and whatever
    /// was taken off it in `runsOffBat`. Byes and leg-byes log nothing off
    /// the bat.
    pub fn from_resolution(match_id: &str, before: &InningsState, resolution: &Resolution) -> Self {
        let taken = resolution.event.runs() as u32;
        let (runs_off_bat, extras_runs, extras_type) = match resolution.kind {
            ResolutionKind::Wide => (taken, 1, Some(ExtrasType::Wide)),
            ResolutionKind::NoBall => (taken, 1, Some(ExtrasType::NoBall)),
            ResolutionKind::Extra(kind) => (0, taken, Some(kind.into())),
            ResolutionKind::Legal | ResolutionKind::Signal => (taken, 0, None),
        };
        let now = Local::now();

        Self {
            match_id: match_id.to_string(),
            innings: before.number,
            delivery_innings_serial: before.delivery_serial,
            date: now.format("%Y-%m-%d").to_string(),
            local_timestamp: now,
            over: resolution.over,
            ball: resolution.ball,
            batting_team: before.batting_team.clone(),
            bowling_team: before.bowling_team.clone(),
            striker: before.batters.striker.clone(),
            non_striker: before.batters.non_striker.clone(),
            bowler: before.bowler.clone(),
            runs_off_bat,
            is_wide: resolution.kind == ResolutionKind::Wide,
            is_no_ball: resolution.kind == ResolutionKind::NoBall,
            extras_runs,
            extras_type,
            is_wicket: resolution.wicket,
            wicket_type: None,
            player_dismissed: None,
            outcome_symbol: outcome_symbol(resolution),
        }
    }
}

/// Scoreboard-style symbol: `.`, `4`, `W`, `B2`, `WD3`, `NBW`
fn outcome_symbol(resolution: &Resolution) -> String {
    let outcome = match resolution.event {
        DeliveryEvent::Dot => ".".to_string(),
        DeliveryEvent::Wicket => "W".to_string(),
        event => event.runs().to_string(),
    };
    match resolution.kind {
        ResolutionKind::Wide => format!("WD{}", outcome),
        ResolutionKind::NoBall => format!("NB{}", outcome),
        ResolutionKind::Extra(kind) => format!("{}{}", kind.symbol(), resolution.event.runs()),
        ResolutionKind::Legal | ResolutionKind::Signal => outcome,
    }
}

/// Optional persistence for the delivery trail
pub trait AuditSink {
    fn persist_delivery(&mut self, record: &DeliveryRecord) -> Result<DeliveryId, AuditError>;

    fn persist_wicket_details(
        &mut self,
        id: &DeliveryId,
        wicket_type: &WicketType,
        player_dismissed: &str,
    ) -> Result<(), AuditError>;
}

impl<T: AuditSink + ?Sized> AuditSink for Box<T> {
    fn persist_delivery(&mut self, record: &DeliveryRecord) -> Result<DeliveryId, AuditError> {
        (**self).persist_delivery(record)
    }

    fn persist_wicket_details(
        &mut self,
        id: &DeliveryId,
        wicket_type: &WicketType,
        player_dismissed: &str,
    ) -> Result<(), AuditError> {
        (**self).persist_wicket_details(id, wicket_type, player_dismissed)
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn persist_delivery(&mut self, _record: &DeliveryRecord) -> Result<DeliveryId, AuditError> {
        Ok(DeliveryId::new())
    }

    fn persist_wicket_details(
        &mut self,
        _id: &DeliveryId,
        _wicket_type: &WicketType,
        _player_dismissed: &str,
    ) -> Result<(), AuditError> {
        Ok(())
    }
}

/// Keeps records in memory, patching wicket details in place
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditLog {
    records: Vec<(DeliveryId, DeliveryRecord)>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> impl Iterator<Item = &DeliveryRecord> {
        self.records.iter().map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &DeliveryId) -> Option<&DeliveryRecord> {
        self.records.iter().find(|(i, _)| i == id).map(|(_, r)| r)
    }
}

impl AuditSink for MemoryAuditLog {
    fn persist_delivery(&mut self, record: &DeliveryRecord) -> Result<DeliveryId, AuditError> {
        let id = DeliveryId::new();
        self.records.push((id.clone(), record.clone()));
        Ok(id)
    }

    fn persist_wicket_details(
        &mut self,
        id: &DeliveryId,
        wicket_type: &WicketType,
        player_dismissed: &str,
    ) -> Result<(), AuditError> {
        let (_, record) = self
            .records
            .iter_mut()
            .find(|(i, _)| i == id)
            .ok_or_else(|| AuditError::Unavailable(format!("no delivery with id {}", id)))?;
        record.wicket_type = Some(wicket_type.to_string());
        record.player_dismissed = Some(player_dismissed.to_string());
        Ok(())
    }
}

/// One line of a JSON-lines audit file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AuditLine {
    Delivery {
        id: DeliveryId,
        record: DeliveryRecord,
    },
    #[serde(rename_all = "camelCase")]
    WicketUpdate {
        id: DeliveryId,
        wicket_type: String,
        player_dismissed: String,
    },
}

/// Append-only JSON-lines file
#[derive(Debug)]
pub struct JsonLinesAuditLog {
    path: PathBuf,
    file: File,
}

impl JsonLinesAuditLog {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        log::info!("Audit log opened at {}", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads back every line of an audit file
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<AuditLine>, AuditError> {
        let reader = BufReader::new(File::open(path)?);
        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            lines.push(serde_json::from_str(&line)?);
        }
        Ok(lines)
    }

    fn append(&mut self, line: &AuditLine) -> Result<(), AuditError> {
        let json = serde_json::to_string(line)?;
        writeln!(self.file, "{}", json)?;
        self.file.flush()?;
        Ok(())
    }
}

impl AuditSink for JsonLinesAuditLog {
    fn persist_delivery(&mut self, record: &DeliveryRecord) -> Result<DeliveryId, AuditError> {
        let id = DeliveryId::new();
        self.append(&AuditLine::Delivery { id: id.clone(), record: record.clone() })?;
        log::debug!("Delivery {}.{} logged as {}", record.over, record.ball, id);
        Ok(id)
    }

    fn persist_wicket_details(
        &mut self,
        id: &DeliveryId,
        wicket_type: &WicketType,
        player_dismissed: &str,
    ) -> Result<(), AuditError> {
        self.append(&AuditLine::WicketUpdate {
            id: id.clone(),
            wicket_type: wicket_type.to_string(),
            player_dismissed: player_dismissed.to_string(),
        })
    }
}

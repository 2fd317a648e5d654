//! JSON backup file format.
//!
//! # Responsibility
//! - Produce the `{version, timestamp, totalRecords, surveys}` snapshot.
//! - Parse a backup for restore, rejecting anything without a `surveys` array.
//!
//! # Invariants
//! - Parsing is pure; a rejected backup never reaches the repository.
//! - Restore only requires `surveys`; the other envelope fields are
//!   informational.

use crate::model::record::SurveyRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Backup envelope version written by this crate.
pub const BACKUP_FORMAT_VERSION: &str = "1.0";

pub type BackupResult<T> = Result<T, BackupError>;

/// Snapshot of all records for manual export/import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub total_records: usize,
    pub surveys: Vec<SurveyRecord>,
}

impl BackupFile {
    /// Builds a backup of `records` stamped with `created_at`.
    pub fn new(records: &[SurveyRecord], created_at: DateTime<Utc>) -> Self {
        Self {
            version: BACKUP_FORMAT_VERSION.to_string(),
            timestamp: created_at,
            total_records: records.len(),
            surveys: records.to_vec(),
        }
    }

    pub fn to_json(&self) -> BackupResult<String> {
        serde_json::to_string_pretty(self).map_err(BackupError::Json)
    }
}

/// Restore rejection. Every variant is a format error; no state changed.
#[derive(Debug)]
pub enum BackupError {
    /// Input is not JSON at all.
    Json(serde_json::Error),
    /// JSON has no `surveys` array.
    MissingSurveys,
    /// One entry in `surveys` is not a record.
    InvalidRecord {
        index: usize,
        source: serde_json::Error,
    },
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "backup is not valid JSON: {err}"),
            Self::MissingSurveys => write!(f, "backup must contain a `surveys` array"),
            Self::InvalidRecord { index, source } => {
                write!(f, "backup entry {index} is not a survey record: {source}")
            }
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::MissingSurveys => None,
            Self::InvalidRecord { source, .. } => Some(source),
        }
    }
}

/// Extracts the record list from backup text.
pub fn parse_backup(text: &str) -> BackupResult<Vec<SurveyRecord>> {
    let mut document: Value = serde_json::from_str(text).map_err(BackupError::Json)?;
    let Some(Value::Array(entries)) = document.get_mut("surveys").map(Value::take) else {
        return Err(BackupError::MissingSurveys);
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry)
                .map_err(|source| BackupError::InvalidRecord { index, source })
        })
        .collect()
}

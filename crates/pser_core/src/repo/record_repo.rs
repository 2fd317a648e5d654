//! In-memory record list synchronized with the primary and fallback stores.
//!
//! # Responsibility
//! - Own the authoritative record list for a session.
//! - Resynchronize both stores after every mutation.
//! - Absorb storage failures by degrading to the fallback store.
//!
//! # Invariants
//! - Record ids are unique within `records` at all times.
//! - `upsert` keeps the position of an existing record.
//! - Every persist mirrors the full list to the fallback store, whatever the
//!   primary outcome.
//! - No operation returns a storage error; outcomes are reported through
//!   [`PersistReport`] and [`Durability`].

use crate::model::record::{RecordId, SurveyRecord};
use crate::store::{FallbackStore, PrimaryStore, StoreError};
use log::{error, info, warn};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Primary store handle state for the session.
pub enum PrimaryState<H> {
    Available(H),
    Unavailable,
}

impl<H> PrimaryState<H> {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Which stores hold the current list after the last load or persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// Primary and fallback are both current.
    Full,
    /// Primary is current, the fallback mirror failed.
    PrimaryOnly,
    /// Primary is unavailable or failed; fallback is current.
    FallbackOnly,
    /// Neither store accepted the last write.
    Volatile,
}

/// Result of writing the list to one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Store was unavailable, nothing attempted.
    Skipped,
    Failed(String),
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written)
    }

    fn from_result(result: Result<(), StoreError>) -> Self {
        match result {
            Ok(()) => Self::Written,
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}

/// User-facing notice that the fallback copy could not be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageWarning {
    pub message: String,
}

impl Display for StorageWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Per-store outcome of one persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReport {
    pub primary: WriteOutcome,
    pub fallback: WriteOutcome,
}

impl PersistReport {
    pub fn durability(&self) -> Durability {
        match (self.primary.is_written(), self.fallback.is_written()) {
            (true, true) => Durability::Full,
            (true, false) => Durability::PrimaryOnly,
            (false, true) => Durability::FallbackOnly,
            (false, false) => Durability::Volatile,
        }
    }

    /// Returns a warning only when the fallback write failed.
    pub fn warning(&self) -> Option<StorageWarning> {
        match &self.fallback {
            WriteOutcome::Failed(reason) => Some(StorageWarning {
                message: format!("survey data could not be saved to backup storage: {reason}"),
            }),
            WriteOutcome::Written | WriteOutcome::Skipped => None,
        }
    }
}

/// Authoritative record list plus its two durable copies.
pub struct RecordRepository<P: PrimaryStore, F: FallbackStore> {
    primary: P,
    primary_state: PrimaryState<P::Handle>,
    fallback: F,
    records: Vec<SurveyRecord>,
    durability: Durability,
}

impl<P: PrimaryStore, F: FallbackStore> RecordRepository<P, F> {
    /// Opens the primary store and loads the record list.
    ///
    /// Never fails: an unopenable primary store leaves the repository in
    /// fallback-only mode.
    pub fn open(primary: P, fallback: F) -> Self {
        let primary_state = match primary.open() {
            Ok(handle) => PrimaryState::Available(handle),
            Err(err) => {
                warn!(
                    "event=repo_open module=repo status=fallback error_code={} error={}",
                    err.code(),
                    err
                );
                PrimaryState::Unavailable
            }
        };

        let mut repo = Self {
            primary,
            primary_state,
            fallback,
            records: Vec::new(),
            durability: Durability::FallbackOnly,
        };
        repo.load();
        repo
    }

    /// Reloads the list from durable storage.
    ///
    /// Reads the primary store first and falls back to the blob on any
    /// failure. A successful primary read is authoritative, empty or not, and
    /// is mirrored into the fallback so a stale blob cannot outlive it.
    pub fn load(&mut self) -> &[SurveyRecord] {
        let started_at = Instant::now();

        let primary_records = match &mut self.primary_state {
            PrimaryState::Available(handle) => match self.primary.read_all(handle) {
                Ok(records) => Some(records),
                Err(err) => {
                    warn!(
                        "event=repo_load module=repo status=fallback error_code={} error={}",
                        err.code(),
                        err
                    );
                    None
                }
            },
            PrimaryState::Unavailable => None,
        };

        let source = match primary_records {
            Some(records) => {
                self.records = dedupe_by_id(records);
                self.durability = match self.mirror_to_fallback() {
                    WriteOutcome::Written => Durability::Full,
                    _ => Durability::PrimaryOnly,
                };
                "primary"
            }
            None => {
                self.records = dedupe_by_id(self.fallback.read());
                self.durability = Durability::FallbackOnly;
                "fallback"
            }
        };

        info!(
            "event=repo_load module=repo status=ok source={source} count={} duration_ms={}",
            self.records.len(),
            started_at.elapsed().as_millis()
        );
        &self.records
    }

    /// Inserts a new record or replaces the one with the same id in place.
    pub fn upsert(&mut self, record: SurveyRecord) -> PersistReport {
        match self.position(&record.id) {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
        self.persist()
    }

    /// Removes the record with `id`; an unknown id leaves the list unchanged.
    pub fn delete(&mut self, id: &RecordId) -> PersistReport {
        self.records.retain(|record| &record.id != id);
        self.persist()
    }

    /// Replaces the whole list.
    ///
    /// Duplicate ids collapse into one entry at the first position, holding
    /// the last value seen.
    pub fn replace_all(&mut self, records: Vec<SurveyRecord>) -> PersistReport {
        let incoming = records.len();
        self.records = dedupe_by_id(records);
        if self.records.len() != incoming {
            warn!(
                "event=repo_replace_all module=repo status=deduplicated incoming={incoming} kept={}",
                self.records.len()
            );
        }
        self.persist()
    }

    /// Writes the full list to the primary store, then mirrors it to the
    /// fallback store.
    pub fn persist(&mut self) -> PersistReport {
        let started_at = Instant::now();
        let report = PersistReport {
            primary: self.write_primary(),
            fallback: self.mirror_to_fallback(),
        };
        self.durability = report.durability();

        if self.durability == Durability::Volatile {
            error!(
                "event=repo_persist module=repo status=error error_code=persist_lost count={} duration_ms={}",
                self.records.len(),
                started_at.elapsed().as_millis()
            );
        } else {
            info!(
                "event=repo_persist module=repo status=ok durability={:?} count={} duration_ms={}",
                self.durability,
                self.records.len(),
                started_at.elapsed().as_millis()
            );
        }
        report
    }

    /// Writes the current list to the fallback store.
    pub fn mirror_to_fallback(&self) -> WriteOutcome {
        let outcome = WriteOutcome::from_result(self.fallback.write(&self.records));
        if let WriteOutcome::Failed(reason) = &outcome {
            warn!(
                "event=fallback_mirror module=repo status=error error_code=blob_write_failure error={reason}"
            );
        }
        outcome
    }

    /// Returns clones of every record matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&SurveyRecord) -> bool) -> Vec<SurveyRecord> {
        self.records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &RecordId) -> Option<&SurveyRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.position(id).is_some()
    }

    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn durability(&self) -> Durability {
        self.durability
    }

    pub fn primary_available(&self) -> bool {
        self.primary_state.is_available()
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|record| &record.id == id)
    }

    fn write_primary(&mut self) -> WriteOutcome {
        match &mut self.primary_state {
            PrimaryState::Available(handle) => {
                let outcome =
                    WriteOutcome::from_result(self.primary.write_all(handle, &self.records));
                if let WriteOutcome::Failed(reason) = &outcome {
                    warn!(
                        "event=primary_write module=repo status=error error_code=write_failure error={reason}"
                    );
                }
                outcome
            }
            PrimaryState::Unavailable => WriteOutcome::Skipped,
        }
    }
}

fn dedupe_by_id(records: Vec<SurveyRecord>) -> Vec<SurveyRecord> {
    let mut positions: HashMap<RecordId, usize> = HashMap::with_capacity(records.len());
    let mut unique: Vec<SurveyRecord> = Vec::with_capacity(records.len());
    for record in records {
        match positions.get(&record.id) {
            Some(&index) => unique[index] = record,
            None => {
                positions.insert(record.id.clone(), unique.len());
                unique.push(record);
            }
        }
    }
    unique
}

//! Structured primary store backed by SQLite.
//!
//! # Responsibility
//! - Open (and migrate) the `surveys` table keyed by record id.
//! - Read the full record set and rewrite it wholesale.
//!
//! # Invariants
//! - Each row stores the full record as JSON in `body`; the
//!   `house_number`, `hoh_cnic` and `timestamp` columns only feed lookups.
//! - `read_all` returns rows in insertion order, which is the list order of
//!   the last `write_all`.
//! - `write_all` is clear-then-insert inside one transaction: either the new
//!   list is stored or the previous contents remain.

use super::migrations::apply_migrations;
use super::{StoreError, StoreFault, StoreResult};
use crate::model::record::SurveyRecord;
use chrono::SecondsFormat;
use log::{debug, error, info};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Structured store contract used by the repository.
///
/// `open` yields a handle that every later call borrows mutably; a store that
/// fails to open is treated as unavailable for the whole session.
pub trait PrimaryStore {
    type Handle;

    fn open(&self) -> StoreResult<Self::Handle>;
    fn read_all(&self, handle: &mut Self::Handle) -> StoreResult<Vec<SurveyRecord>>;
    fn write_all(&self, handle: &mut Self::Handle, records: &[SurveyRecord]) -> StoreResult<()>;
}

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

impl StoreLocation {
    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

/// SQLite-backed primary store.
#[derive(Debug, Clone)]
pub struct SqlitePrimaryStore {
    location: StoreLocation,
}

impl SqlitePrimaryStore {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            location: StoreLocation::File(path.as_ref().to_path_buf()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::Memory,
        }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Looks up records through the `house_number` index.
    ///
    /// The repository filters in memory; this exists for callers that query
    /// the store directly.
    pub fn find_by_house_number(
        &self,
        conn: &Connection,
        house_number: i64,
    ) -> StoreResult<Vec<SurveyRecord>> {
        let mut stmt = conn
            .prepare("SELECT body FROM surveys WHERE house_number = ?1 ORDER BY rowid;")
            .map_err(|err| StoreError::Read(err.into()))?;
        let bodies = stmt
            .query_map([house_number], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|err| StoreError::Read(err.into()))?;
        decode_bodies(bodies)
    }
}

impl PrimaryStore for SqlitePrimaryStore {
    type Handle = Connection;

    fn open(&self) -> StoreResult<Connection> {
        let started_at = Instant::now();
        let mode = self.location.mode();
        info!("event=primary_open module=store status=start mode={mode}");

        let result = match &self.location {
            StoreLocation::File(path) => Connection::open(path),
            StoreLocation::Memory => Connection::open_in_memory(),
        }
        .map_err(StoreFault::from)
        .and_then(|mut conn| bootstrap_connection(&mut conn).map(|()| conn));

        match result {
            Ok(conn) => {
                info!(
                    "event=primary_open module=store status=ok mode={mode} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(conn)
            }
            Err(fault) => {
                error!(
                    "event=primary_open module=store status=error mode={mode} duration_ms={} error_code=store_unavailable error={}",
                    started_at.elapsed().as_millis(),
                    fault
                );
                Err(StoreError::Unavailable(fault))
            }
        }
    }

    fn read_all(&self, conn: &mut Connection) -> StoreResult<Vec<SurveyRecord>> {
        let mut stmt = conn
            .prepare("SELECT body FROM surveys ORDER BY rowid;")
            .map_err(|err| StoreError::Read(err.into()))?;
        let bodies = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|err| StoreError::Read(err.into()))?;
        let records = decode_bodies(bodies)?;
        debug!(
            "event=primary_read module=store status=ok count={}",
            records.len()
        );
        Ok(records)
    }

    fn write_all(&self, conn: &mut Connection, records: &[SurveyRecord]) -> StoreResult<()> {
        rewrite_all(conn, records).map_err(StoreError::Write)?;
        debug!(
            "event=primary_write module=store status=ok count={}",
            records.len()
        );
        Ok(())
    }
}

fn bootstrap_connection(conn: &mut Connection) -> Result<(), StoreFault> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)
}

fn rewrite_all(conn: &mut Connection, records: &[SurveyRecord]) -> Result<(), StoreFault> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM surveys;", [])?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO surveys (id, house_number, hoh_cnic, timestamp, body)
             VALUES (?1, ?2, ?3, ?4, ?5);",
        )?;
        for record in records {
            let body = serde_json::to_string(record)?;
            insert.execute(params![
                record.id.as_str(),
                record.house_number,
                record.hoh_cnic.as_str(),
                record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                body,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn decode_bodies(bodies: Vec<String>) -> StoreResult<Vec<SurveyRecord>> {
    bodies
        .iter()
        .map(|body| serde_json::from_str::<SurveyRecord>(body))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| StoreError::Read(err.into()))
}

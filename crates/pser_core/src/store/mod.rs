//! Durable storage backends for survey records.
//!
//! # Responsibility
//! - Wrap the structured primary store (SQLite) and the single-blob fallback
//!   store (JSON file) behind small traits.
//! - Classify every storage failure into the kinds the repository reacts to.
//!
//! # Invariants
//! - Stores never validate record contents.
//! - Schema version is tracked via `PRAGMA user_version`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod fallback;
pub mod migrations;
pub mod primary;

pub use fallback::{FallbackStore, FileFallbackStore};
pub use primary::{PrimaryStore, SqlitePrimaryStore, StoreLocation};

pub type StoreResult<T> = Result<T, StoreError>;

/// Underlying cause of a storage failure.
#[derive(Debug)]
pub enum StoreFault {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    Json(serde_json::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for StoreFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for StoreFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreFault {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<std::io::Error> for StoreFault {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreFault {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Storage failure classified by the operation that failed.
#[derive(Debug)]
pub enum StoreError {
    /// Primary store cannot be opened or migrated.
    Unavailable(StoreFault),
    /// Primary store is open but reading failed.
    Read(StoreFault),
    /// Primary store rewrite failed.
    Write(StoreFault),
    /// Fallback blob could not be written.
    BlobWrite(StoreFault),
}

impl StoreError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "store_unavailable",
            Self::Read(_) => "read_failure",
            Self::Write(_) => "write_failure",
            Self::BlobWrite(_) => "blob_write_failure",
        }
    }

    pub fn fault(&self) -> &StoreFault {
        match self {
            Self::Unavailable(fault)
            | Self::Read(fault)
            | Self::Write(fault)
            | Self::BlobWrite(fault) => fault,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(fault) => write!(f, "primary store unavailable: {fault}"),
            Self::Read(fault) => write!(f, "primary store read failed: {fault}"),
            Self::Write(fault) => write!(f, "primary store write failed: {fault}"),
            Self::BlobWrite(fault) => write!(f, "fallback store write failed: {fault}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.fault())
    }
}

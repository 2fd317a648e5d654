//! Single-blob fallback store.
//!
//! # Responsibility
//! - Keep the whole record list as one JSON document under one key.
//! - Serve as the crash-safe copy when the primary store is unavailable.
//!
//! # Invariants
//! - `read` never fails: a missing or malformed blob reads as no data.
//! - `write` replaces the blob atomically (temp file + rename), so readers
//!   see either the old or the new list.

use super::{StoreError, StoreFault, StoreResult};
use crate::model::record::SurveyRecord;
use log::warn;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Flat store contract used by the repository.
pub trait FallbackStore {
    fn read(&self) -> Vec<SurveyRecord>;
    fn write(&self, records: &[SurveyRecord]) -> StoreResult<()>;
}

/// Fallback store writing `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileFallbackStore {
    dir: PathBuf,
    key: String,
}

impl FileFallbackStore {
    pub fn new(dir: impl AsRef<Path>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            key: key.into(),
        }
    }

    /// Full path of the blob file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    fn write_blob(&self, records: &[SurveyRecord]) -> Result<(), StoreFault> {
        std::fs::create_dir_all(&self.dir)?;
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer(&mut staged, records)?;
        staged.flush()?;
        staged.as_file().sync_all()?;
        staged
            .persist(self.path())
            .map_err(|err| StoreFault::Io(err.error))?;
        Ok(())
    }
}

impl FallbackStore for FileFallbackStore {
    fn read(&self) -> Vec<SurveyRecord> {
        let path = self.path();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!(
                    "event=fallback_read module=store status=error error_code=blob_unreadable key={} error={}",
                    self.key, err
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<SurveyRecord>>(&text) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "event=fallback_read module=store status=error error_code=blob_malformed key={} error={}",
                    self.key, err
                );
                Vec::new()
            }
        }
    }

    fn write(&self, records: &[SurveyRecord]) -> StoreResult<()> {
        self.write_blob(records).map_err(StoreError::BlobWrite)
    }
}

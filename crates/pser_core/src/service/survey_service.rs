//! Survey use-case service.
//!
//! # Responsibility
//! - Assign identity and timestamps, run caller-level validation, and hand
//!   records to the repository.
//! - Drive restore, export and the guarded clear-all flow.
//!
//! # Invariants
//! - Validation happens here, never in the repository.
//! - A rejected restore or clear leaves the record list untouched.
//! - Storage degradation surfaces only as `StorageWarning`, never as an error.

use crate::config::CoreConfig;
use crate::export::backup::{parse_backup, BackupError, BackupFile};
use crate::export::csv::export_csv;
use crate::model::record::{RecordId, RecordValidationError, SurveyRecord};
use crate::repo::record_repo::{Durability, RecordRepository, StorageWarning};
use crate::search::filter::{search, SurveyQuery};
use crate::service::confirmation::ConfirmationPolicy;
use crate::service::summary::SurveySummary;
use crate::store::{FallbackStore, FileFallbackStore, PrimaryStore, SqlitePrimaryStore};
use chrono::Utc;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service over the on-device SQLite + JSON file stores.
pub type LocalSurveyService = SurveyService<SqlitePrimaryStore, FileFallbackStore>;

#[derive(Debug)]
pub enum ServiceError {
    Validation(RecordValidationError),
    Backup(BackupError),
    NotFound(RecordId),
    ConfirmationRejected,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Backup(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "survey record not found: {id}"),
            Self::ConfirmationRejected => write!(f, "confirmation phrase did not match"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Backup(err) => Some(err),
            Self::NotFound(_) | Self::ConfirmationRejected => None,
        }
    }
}

impl From<RecordValidationError> for ServiceError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<BackupError> for ServiceError {
    fn from(value: BackupError) -> Self {
        Self::Backup(value)
    }
}

/// Saved record plus any storage warning raised while persisting it.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub record: SurveyRecord,
    pub warning: Option<StorageWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub restored: usize,
    pub warning: Option<StorageWarning>,
}

pub struct SurveyService<P: PrimaryStore, F: FallbackStore> {
    repo: RecordRepository<P, F>,
}

impl LocalSurveyService {
    /// Opens the stores described by `config` and loads all records.
    pub fn open(config: &CoreConfig) -> Self {
        if let Err(err) = std::fs::create_dir_all(&config.data_dir) {
            warn!(
                "event=service_open module=service status=error error_code=data_dir_create_failed error={err}"
            );
        }
        let primary = SqlitePrimaryStore::file(config.database_path());
        let fallback = FileFallbackStore::new(&config.data_dir, config.fallback_key.as_str());
        Self::new(RecordRepository::open(primary, fallback))
    }
}

impl<P: PrimaryStore, F: FallbackStore> SurveyService<P, F> {
    pub fn new(repo: RecordRepository<P, F>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &RecordRepository<P, F> {
        &self.repo
    }

    pub fn records(&self) -> &[SurveyRecord] {
        self.repo.records()
    }

    pub fn durability(&self) -> Durability {
        self.repo.durability()
    }

    /// Saves a new entry under a freshly generated id.
    ///
    /// Whatever id the draft carries is replaced.
    pub fn save_new(&mut self, mut draft: SurveyRecord) -> Result<SaveOutcome, ServiceError> {
        draft.id = RecordId::generate();
        draft.timestamp = Utc::now();
        draft.validate()?;

        let report = self.repo.upsert(draft.clone());
        info!(
            "event=survey_save module=service status=ok mode=create id={}",
            draft.id
        );
        Ok(SaveOutcome {
            record: draft,
            warning: report.warning(),
        })
    }

    /// Replaces an existing entry, keeping its id and list position.
    pub fn save_edit(&mut self, mut record: SurveyRecord) -> Result<SaveOutcome, ServiceError> {
        if !self.repo.contains(&record.id) {
            return Err(ServiceError::NotFound(record.id));
        }
        record.timestamp = Utc::now();
        record.validate()?;

        let report = self.repo.upsert(record.clone());
        info!(
            "event=survey_save module=service status=ok mode=edit id={}",
            record.id
        );
        Ok(SaveOutcome {
            record,
            warning: report.warning(),
        })
    }

    /// Deletes by id; unknown ids are accepted silently.
    pub fn delete(&mut self, id: &RecordId) -> Option<StorageWarning> {
        let existed = self.repo.contains(id);
        let report = self.repo.delete(id);
        info!("event=survey_delete module=service status=ok id={id} existed={existed}");
        report.warning()
    }

    pub fn search(&self, query: &SurveyQuery) -> Vec<SurveyRecord> {
        search(self.repo.records(), query)
    }

    pub fn summary(&self) -> SurveySummary {
        SurveySummary::from_records(self.repo.records())
    }

    pub fn export_csv(&self) -> String {
        export_csv(self.repo.records())
    }

    pub fn export_backup(&self) -> Result<String, BackupError> {
        BackupFile::new(self.repo.records(), Utc::now()).to_json()
    }

    /// Replaces every record with the contents of a backup.
    pub fn restore_backup(&mut self, text: &str) -> Result<RestoreOutcome, ServiceError> {
        let records = match parse_backup(text) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "event=survey_restore module=service status=error error_code=format_error error={err}"
                );
                return Err(err.into());
            }
        };

        let report = self.repo.replace_all(records);
        let restored = self.repo.len();
        info!("event=survey_restore module=service status=ok count={restored}");
        Ok(RestoreOutcome {
            restored,
            warning: report.warning(),
        })
    }

    /// Removes every record once `policy` accepts `input`.
    pub fn clear_all(
        &mut self,
        policy: &dyn ConfirmationPolicy,
        input: &str,
    ) -> Result<Option<StorageWarning>, ServiceError> {
        if !policy.confirms(input) {
            warn!("event=survey_clear module=service status=rejected");
            return Err(ServiceError::ConfirmationRejected);
        }

        let removed = self.repo.len();
        let report = self.repo.replace_all(Vec::new());
        info!("event=survey_clear module=service status=ok removed={removed}");
        Ok(report.warning())
    }
}

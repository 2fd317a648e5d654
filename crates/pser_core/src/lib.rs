//! Core persistence and data-consistency layer for the PSER household survey.
//! This crate owns the record list, its durable copies and the exporters.

pub mod config;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use export::backup::{parse_backup, BackupError, BackupFile, BACKUP_FORMAT_VERSION};
pub use export::csv::{csv_columns, export_csv};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::record::{
    ApplianceCounts, GeoLocation, LivestockCounts, RecordId, RecordValidationError,
    SurveyRecord, TransportCounts,
};
pub use repo::record_repo::{
    Durability, PersistReport, PrimaryState, RecordRepository, StorageWarning, WriteOutcome,
};
pub use search::filter::{search, SurveyQuery};
pub use service::confirmation::{ConfirmationPolicy, SharedPhraseConfirmation};
pub use service::summary::SurveySummary;
pub use service::survey_service::{
    LocalSurveyService, RestoreOutcome, SaveOutcome, ServiceError, SurveyService,
};
pub use store::{
    FallbackStore, FileFallbackStore, PrimaryStore, SqlitePrimaryStore, StoreError, StoreFault,
    StoreLocation, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

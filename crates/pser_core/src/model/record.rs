//! Survey record domain model.
//!
//! # Responsibility
//! - Define the canonical household survey entry persisted by core.
//! - Provide caller-level field checks used before a record is saved.
//!
//! # Invariants
//! - `id` is stable for the lifetime of a record and never reused.
//! - `total` is expected to equal `male + female + others`; only
//!   [`SurveyRecord::validate`] checks this, storage layers never do.
//! - Count mappings have a fixed shape; unknown categories are dropped on read.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static CNIC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}-\d{7}-\d$").expect("CNIC pattern is valid"));
static CONTACT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^03\d{2}-\d{7}$").expect("contact pattern is valid"));

/// Opaque record identifier.
///
/// Fresh ids are time-ordered UUIDv7 strings. Ids imported from backups keep
/// whatever text they were written with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a new time-ordered id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Device position captured alongside a survey entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported accuracy radius in meters.
    pub accuracy: f64,
}

/// Livestock owned by the household.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LivestockCounts {
    pub cows: u32,
    pub buffaloes: u32,
    pub goats: u32,
    pub sheep: u32,
    pub poultry: u32,
    pub others: u32,
}

impl LivestockCounts {
    /// Category name/count pairs in export column order.
    pub fn entries(&self) -> [(&'static str, u32); 6] {
        [
            ("cows", self.cows),
            ("buffaloes", self.buffaloes),
            ("goats", self.goats),
            ("sheep", self.sheep),
            ("poultry", self.poultry),
            ("others", self.others),
        ]
    }
}

/// Vehicles owned by the household.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransportCounts {
    pub bicycles: u32,
    pub motorcycles: u32,
    pub cars: u32,
    pub rickshaws: u32,
    pub tractors: u32,
}

impl TransportCounts {
    pub fn entries(&self) -> [(&'static str, u32); 5] {
        [
            ("bicycles", self.bicycles),
            ("motorcycles", self.motorcycles),
            ("cars", self.cars),
            ("rickshaws", self.rickshaws),
            ("tractors", self.tractors),
        ]
    }
}

/// Household appliances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplianceCounts {
    pub televisions: u32,
    pub refrigerators: u32,
    pub air_conditioners: u32,
    pub washing_machines: u32,
    pub computers: u32,
}

impl ApplianceCounts {
    pub fn entries(&self) -> [(&'static str, u32); 5] {
        [
            ("televisions", self.televisions),
            ("refrigerators", self.refrigerators),
            ("air_conditioners", self.air_conditioners),
            ("washing_machines", self.washing_machines),
            ("computers", self.computers),
        ]
    }
}

/// One household survey submission.
///
/// Storage layers treat this as an opaque value: they neither validate nor
/// normalize fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRecord {
    pub id: RecordId,
    pub house_number: i64,
    #[serde(default)]
    pub house_code: String,
    #[serde(default)]
    pub register_number: Option<i64>,
    pub families_count: i64,
    #[serde(default)]
    pub respondent_name: String,
    #[serde(default)]
    pub hoh_name: String,
    #[serde(default)]
    pub hoh_cnic: String,
    #[serde(default)]
    pub contact_number: String,
    pub male: i64,
    pub female: i64,
    pub others: i64,
    /// Serialized as `totalMembers` to match the backup file schema.
    #[serde(rename = "totalMembers")]
    pub total: i64,
    #[serde(default)]
    pub livestock: LivestockCounts,
    #[serde(default)]
    pub transport: TransportCounts,
    #[serde(default)]
    pub appliances: ApplianceCounts,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    /// Encoded image (data URL or base64), opaque to core.
    #[serde(default)]
    pub photo: Option<String>,
    /// Encoded signature image, opaque to core.
    #[serde(default)]
    pub signature: Option<String>,
    /// Creation or last update time.
    pub timestamp: DateTime<Utc>,
}

impl SurveyRecord {
    /// Creates a one-family, zero-member record stamped with the current time.
    ///
    /// Callers fill in the remaining fields before saving.
    pub fn new(id: RecordId, house_number: i64) -> Self {
        Self {
            id,
            house_number,
            house_code: String::new(),
            register_number: None,
            families_count: 1,
            respondent_name: String::new(),
            hoh_name: String::new(),
            hoh_cnic: String::new(),
            contact_number: String::new(),
            male: 0,
            female: 0,
            others: 0,
            total: 0,
            livestock: LivestockCounts::default(),
            transport: TransportCounts::default(),
            appliances: ApplianceCounts::default(),
            location: None,
            photo: None,
            signature: None,
            timestamp: Utc::now(),
        }
    }

    /// Sets member counts and derives `total` from them, saturating at `i64::MAX`.
    pub fn set_members(&mut self, male: i64, female: i64, others: i64) {
        self.male = male;
        self.female = female;
        self.others = others;
        self.total = male.saturating_add(female).saturating_add(others);
    }

    /// Returns `hoh_cnic` with every non-digit removed.
    pub fn cnic_digits(&self) -> String {
        self.hoh_cnic.chars().filter(char::is_ascii_digit).collect()
    }

    /// Runs caller-level field checks.
    ///
    /// Repository and stores never call this; the service does before saving.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.house_number < 1 {
            return Err(RecordValidationError::InvalidHouseNumber(self.house_number));
        }
        if self.families_count < 1 {
            return Err(RecordValidationError::InvalidFamiliesCount(
                self.families_count,
            ));
        }
        if self.hoh_name.trim().is_empty() {
            return Err(RecordValidationError::MissingHeadOfHousehold);
        }
        if !CNIC_PATTERN.is_match(&self.hoh_cnic) {
            return Err(RecordValidationError::InvalidCnic);
        }
        if !self.contact_number.is_empty() && !CONTACT_PATTERN.is_match(&self.contact_number) {
            return Err(RecordValidationError::InvalidContactNumber);
        }
        if self.male < 0 || self.female < 0 || self.others < 0 {
            return Err(RecordValidationError::NegativeMemberCount);
        }
        let expected = self
            .male
            .checked_add(self.female)
            .and_then(|sum| sum.checked_add(self.others))
            .ok_or(RecordValidationError::MemberCountOverflow)?;
        if self.total != expected {
            return Err(RecordValidationError::MemberTotalMismatch {
                expected,
                actual: self.total,
            });
        }
        if let Some(location) = self.location {
            let in_range = (-90.0..=90.0).contains(&location.latitude)
                && (-180.0..=180.0).contains(&location.longitude)
                && location.accuracy >= 0.0;
            if !in_range {
                return Err(RecordValidationError::InvalidLocation);
            }
        }
        Ok(())
    }
}

/// Field-level rejection raised by [`SurveyRecord::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    InvalidHouseNumber(i64),
    InvalidFamiliesCount(i64),
    MissingHeadOfHousehold,
    InvalidCnic,
    InvalidContactNumber,
    NegativeMemberCount,
    MemberCountOverflow,
    MemberTotalMismatch { expected: i64, actual: i64 },
    InvalidLocation,
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHouseNumber(value) => {
                write!(f, "house number must be at least 1, got {value}")
            }
            Self::InvalidFamiliesCount(value) => {
                write!(f, "families count must be at least 1, got {value}")
            }
            Self::MissingHeadOfHousehold => write!(f, "head of household name is required"),
            Self::InvalidCnic => write!(f, "CNIC must match #####-#######-#"),
            Self::InvalidContactNumber => write!(f, "contact number must match 03##-#######"),
            Self::NegativeMemberCount => write!(f, "member counts must not be negative"),
            Self::MemberCountOverflow => write!(f, "member counts are too large to add up"),
            Self::MemberTotalMismatch { expected, actual } => write!(
                f,
                "total members {actual} does not match male + female + others = {expected}"
            ),
            Self::InvalidLocation => write!(f, "location coordinates are out of range"),
        }
    }
}

impl Error for RecordValidationError {}

#[cfg(test)]
mod tests {
    use super::{GeoLocation, RecordId, RecordValidationError, SurveyRecord};

    fn valid_record() -> SurveyRecord {
        let mut record = SurveyRecord::new(RecordId::from("r-1"), 12);
        record.hoh_name = "Head".to_string();
        record.hoh_cnic = "35202-1234567-1".to_string();
        record.contact_number = "0300-1234567".to_string();
        record.set_members(2, 3, 0);
        record
    }

    #[test]
    fn generated_ids_are_unique_and_time_ordered() {
        let first = RecordId::generate();
        let second = RecordId::generate();
        assert_ne!(first, second);
        assert!(first < second);
    }

    #[test]
    fn validate_accepts_complete_record() {
        valid_record().validate().expect("record should be valid");
    }

    #[test]
    fn validate_rejects_malformed_cnic() {
        let mut record = valid_record();
        record.hoh_cnic = "3520212345671".to_string();
        assert_eq!(record.validate(), Err(RecordValidationError::InvalidCnic));
    }

    #[test]
    fn validate_rejects_total_mismatch() {
        let mut record = valid_record();
        record.total = 9;
        assert_eq!(
            record.validate(),
            Err(RecordValidationError::MemberTotalMismatch {
                expected: 5,
                actual: 9
            })
        );
    }

    #[test]
    fn validate_rejects_member_counts_that_overflow() {
        let mut record = valid_record();
        record.male = i64::MAX;
        record.female = 1;
        record.total = i64::MAX;
        assert_eq!(
            record.validate(),
            Err(RecordValidationError::MemberCountOverflow)
        );
    }

    #[test]
    fn set_members_saturates_total() {
        let mut record = valid_record();
        record.set_members(i64::MAX, 1, 1);
        assert_eq!(record.total, i64::MAX);
    }

    #[test]
    fn validate_allows_missing_contact_but_rejects_bad_location() {
        let mut record = valid_record();
        record.contact_number.clear();
        record.validate().expect("contact number is optional");

        record.location = Some(GeoLocation {
            latitude: 120.0,
            longitude: 74.3,
            accuracy: 10.0,
        });
        assert_eq!(record.validate(), Err(RecordValidationError::InvalidLocation));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let record = valid_record();
        let value = serde_json::to_value(&record).expect("record should serialize");
        assert_eq!(value["houseNumber"], 12);
        assert_eq!(value["totalMembers"], 5);
        assert_eq!(value["hohCnic"], "35202-1234567-1");
        assert!(value["location"].is_null());
    }

    #[test]
    fn deserializes_sparse_counts_with_defaults() {
        let json = r#"{
            "id": "1700000000000",
            "houseNumber": 5,
            "familiesCount": 1,
            "male": 1,
            "female": 1,
            "others": 0,
            "totalMembers": 2,
            "livestock": {"goats": 3, "camels": 2},
            "timestamp": "2024-03-01T10:00:00.000Z"
        }"#;
        let record: SurveyRecord = serde_json::from_str(json).expect("record should parse");
        assert_eq!(record.id.as_str(), "1700000000000");
        assert_eq!(record.livestock.goats, 3);
        assert_eq!(record.livestock.cows, 0);
        assert_eq!(record.transport.cars, 0);
        assert_eq!(record.register_number, None);
    }

    #[test]
    fn cnic_digits_strips_separators() {
        assert_eq!(valid_record().cnic_digits(), "3520212345671");
    }
}

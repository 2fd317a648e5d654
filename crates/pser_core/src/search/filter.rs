//! House number / CNIC filtering over an in-memory record list.
//!
//! # Invariants
//! - Filters combine with AND; an empty query matches every record.
//! - CNIC matching compares digits only, as a substring.
//! - Result order is the list order.

use crate::model::record::SurveyRecord;

/// Search options for record lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyQuery {
    /// Exact house number match.
    pub house_number: Option<i64>,
    /// Digits that must appear contiguously in the head-of-household CNIC.
    pub cnic_digits: Option<String>,
}

impl SurveyQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_house_number(mut self, house_number: i64) -> Self {
        self.house_number = Some(house_number);
        self
    }

    /// Adds a CNIC filter. Non-digits are dropped; input with no digits
    /// leaves the filter unset.
    pub fn with_cnic(mut self, cnic: &str) -> Self {
        let digits: String = cnic.chars().filter(char::is_ascii_digit).collect();
        self.cnic_digits = if digits.is_empty() {
            None
        } else {
            Some(digits)
        };
        self
    }

    /// Builds a query from raw text inputs, ignoring blank fields.
    ///
    /// Returns `None` when the house number is present but not an integer.
    pub fn from_inputs(house_number: &str, cnic: &str) -> Option<Self> {
        let mut query = Self::new().with_cnic(cnic);
        let house_number = house_number.trim();
        if !house_number.is_empty() {
            query = query.with_house_number(house_number.parse().ok()?);
        }
        Some(query)
    }

    pub fn is_empty(&self) -> bool {
        self.house_number.is_none() && self.cnic_digits.is_none()
    }

    pub fn matches(&self, record: &SurveyRecord) -> bool {
        if let Some(house_number) = self.house_number {
            if record.house_number != house_number {
                return false;
            }
        }
        if let Some(digits) = self.cnic_digits.as_deref() {
            if !record.cnic_digits().contains(digits) {
                return false;
            }
        }
        true
    }
}

/// Returns clones of the records matching `query`, in list order.
pub fn search(records: &[SurveyRecord], query: &SurveyQuery) -> Vec<SurveyRecord> {
    records
        .iter()
        .filter(|record| query.matches(record))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{search, SurveyQuery};
    use crate::model::record::{RecordId, SurveyRecord};

    fn record(id: &str, house_number: i64, cnic: &str) -> SurveyRecord {
        let mut record = SurveyRecord::new(RecordId::from(id), house_number);
        record.hoh_cnic = cnic.to_string();
        record
    }

    #[test]
    fn cnic_filter_ignores_separators_on_both_sides() {
        let records = vec![
            record("1", 1, "35202-1234567-1"),
            record("2", 2, "61101-7654321-9"),
        ];
        let hits = search(&records, &SurveyQuery::new().with_cnic("2-123"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "1");
    }

    #[test]
    fn combined_filters_require_both() {
        let records = vec![
            record("1", 7, "35202-1234567-1"),
            record("2", 7, "61101-7654321-9"),
            record("3", 8, "35202-1234567-3"),
        ];
        let query = SurveyQuery::new().with_house_number(7).with_cnic("35202");
        let hits = search(&records, &query);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "1");
    }

    #[test]
    fn empty_query_returns_everything() {
        let records = vec![record("1", 1, ""), record("2", 2, "")];
        let query = SurveyQuery::new().with_cnic(" - ");
        assert!(query.is_empty());
        assert_eq!(search(&records, &query).len(), 2);
    }

    #[test]
    fn from_inputs_parses_and_rejects_house_number() {
        let query = SurveyQuery::from_inputs(" 101 ", "").expect("numeric input parses");
        assert_eq!(query.house_number, Some(101));
        assert!(query.cnic_digits.is_none());

        assert!(SurveyQuery::from_inputs("10a", "").is_none());
        assert!(SurveyQuery::from_inputs("", "").expect("blank parses").is_empty());
    }
}

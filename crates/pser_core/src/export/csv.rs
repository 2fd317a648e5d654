//! Spreadsheet (CSV) export.
//!
//! # Invariants
//! - One fixed header row, then one row per record in list order.
//! - Free-text fields are always quoted with embedded quotes doubled;
//!   numeric fields are written bare.
//! - Absent optional fields render as empty cells.
//! - Photo and signature payloads are never embedded, only their presence.

use crate::model::record::{ApplianceCounts, LivestockCounts, SurveyRecord, TransportCounts};
use chrono::SecondsFormat;

const LEADING_COLUMNS: &[&str] = &[
    "ID",
    "Timestamp",
    "House Number",
    "House Code",
    "Register Number",
    "Families",
    "Respondent Name",
    "Head of Household",
    "HOH CNIC",
    "Contact Number",
    "Male",
    "Female",
    "Others",
    "Total Members",
];

const TRAILING_COLUMNS: &[&str] = &[
    "Latitude",
    "Longitude",
    "Accuracy",
    "Has Photo",
    "Has Signature",
];

/// Returns the header row column names.
pub fn csv_columns() -> Vec<String> {
    let livestock = LivestockCounts::default().entries();
    let transport = TransportCounts::default().entries();
    let appliances = ApplianceCounts::default().entries();

    LEADING_COLUMNS
        .iter()
        .map(|name| (*name).to_string())
        .chain(livestock.iter().map(|(name, _)| format!("Livestock {name}")))
        .chain(transport.iter().map(|(name, _)| format!("Transport {name}")))
        .chain(appliances.iter().map(|(name, _)| format!("Appliance {name}")))
        .chain(TRAILING_COLUMNS.iter().map(|name| (*name).to_string()))
        .collect()
}

/// Renders `records` as CSV text with a trailing newline.
pub fn export_csv(records: &[SurveyRecord]) -> String {
    let mut out = String::new();
    let header = csv_columns()
        .iter()
        .map(|name| quote(name))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&header);
    out.push('\n');

    for record in records {
        out.push_str(&render_row(record).join(","));
        out.push('\n');
    }
    out
}

fn render_row(record: &SurveyRecord) -> Vec<String> {
    let mut cells = vec![
        quote(record.id.as_str()),
        quote(&record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        record.house_number.to_string(),
        quote(&record.house_code),
        record
            .register_number
            .map(|value| value.to_string())
            .unwrap_or_default(),
        record.families_count.to_string(),
        quote(&record.respondent_name),
        quote(&record.hoh_name),
        quote(&record.hoh_cnic),
        quote(&record.contact_number),
        record.male.to_string(),
        record.female.to_string(),
        record.others.to_string(),
        record.total.to_string(),
    ];

    let counts = record
        .livestock
        .entries()
        .into_iter()
        .chain(record.transport.entries())
        .chain(record.appliances.entries());
    cells.extend(counts.map(|(_, count)| count.to_string()));

    match record.location {
        Some(location) => {
            cells.push(location.latitude.to_string());
            cells.push(location.longitude.to_string());
            cells.push(location.accuracy.to_string());
        }
        None => cells.extend(std::iter::repeat(String::new()).take(3)),
    }
    cells.push(yes_no(record.photo.is_some()).to_string());
    cells.push(yes_no(record.signature.is_some()).to_string());
    cells
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

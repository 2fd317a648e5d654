//! Record exporters.
//!
//! Pure functions over a record snapshot; none of them touch storage.

pub mod backup;
pub mod csv;

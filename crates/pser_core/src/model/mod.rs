//! Survey domain model.
//!
//! # Responsibility
//! - Define the record shape shared by storage, search and export.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Deletion is a hard removal; there are no tombstones.

pub mod record;

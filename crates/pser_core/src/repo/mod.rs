//! Record repository.
//!
//! # Responsibility
//! - Keep the session's record list and its durable copies in step.
//! - Hide store failures from callers behind best-effort persistence.
//!
//! # Invariants
//! - Callers see a write as accepted even when storage degraded; the
//!   degradation is observable via `Durability` and `PersistReport`.

pub mod record_repo;

//! Survey use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep callers decoupled from storage details.

pub mod confirmation;
pub mod summary;
pub mod survey_service;

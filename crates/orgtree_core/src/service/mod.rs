//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate payload validation and repository calls into the two
//!   operations the console offers: import and family lookup.
//! - Keep the CLI layer decoupled from storage details.

pub mod family_service;
pub mod import_service;

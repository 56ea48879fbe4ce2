//! JSON payload validation entry points.
//!
//! # Responsibility
//! - Check that a payload fits the `company_units` table schema.
//! - Coerce payload rows into typed write models.

pub mod payload;

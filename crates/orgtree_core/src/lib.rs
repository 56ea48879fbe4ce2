//! Core domain logic for the orgtree company-units console.
//! This crate is the single source of truth for import and lineage invariants.

pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use import::payload::{coerce_rows, fit_schema, PayloadError, SchemaViolation};
pub use logging::{default_log_level, init_logging};
pub use model::unit::{ImportRow, Unit, UnitId};
pub use repo::unit_repo::{RepoError, RepoResult, SqliteUnitRepository, UnitRepository};
pub use service::family_service::{render_family_table, FamilyService};
pub use service::import_service::{ImportError, ImportResult, ImportService};

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

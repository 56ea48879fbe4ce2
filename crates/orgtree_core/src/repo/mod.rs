//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the unit store contract consumed by import and query services.
//! - Isolate SQLite statement details from service orchestration.
//!
//! # Invariants
//! - Multi-row writes are atomic: one transaction, commit or rollback.
//! - Child listings are deterministic: `id ASC`.

pub mod unit_repo;

//! Domain model for the company-units hierarchy.
//!
//! # Responsibility
//! - Define the canonical unit read model and the coerced import row.
//!
//! # Invariants
//! - `id` is the stable identity of a unit; `parent_id=NULL` marks a root.

pub mod unit;

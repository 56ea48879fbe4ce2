//! Company unit domain model.
//!
//! # Responsibility
//! - Define the persisted unit shape and the coerced write model.
//!
//! # Invariants
//! - The parent relation is expected to form a forest; cycles are not
//!   prevented by the schema and traversal code must guard its own
//!   termination.

use serde::{Deserialize, Serialize};

/// Stable identifier for a company unit.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type UnitId = i64;

/// Persisted company unit as read back from the store.
///
/// Field renames match the external JSON payload naming (`ParentId`,
/// `Name`), so fixtures and exports round-trip without a second shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    /// Parent unit id. `None` marks a root unit.
    #[serde(rename = "ParentId")]
    pub parent_id: Option<UnitId>,
    #[serde(rename = "Name")]
    pub name: String,
}

impl Unit {
    /// Returns whether this unit is a root of its tree.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// One coerced payload row, ready for insertion.
///
/// `name` stays optional here: a null `Name` passes coercion and is
/// rejected by the `NOT NULL` column constraint at insert time, which
/// rolls back the whole import as a database error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub id: UnitId,
    pub parent_id: Option<UnitId>,
    pub name: Option<String>,
}

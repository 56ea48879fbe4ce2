//! Payload schema validation and row coercion.
//!
//! # Responsibility
//! - Reject payloads whose shape does not fit the `company_units` table.
//! - Coerce each element into an `ImportRow` or name the offending row.
//!
//! # Invariants
//! - Every element must carry exactly the keys `id`, `ParentId`, `Name`,
//!   in that order. Key order is observable because `serde_json` is built
//!   with `preserve_order`.
//! - Validation never touches the store; the caller decides what to do
//!   with the coerced rows.

use crate::model::unit::ImportRow;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Exact key set and order required of every payload element.
pub const EXPECTED_KEYS: [&str; 3] = ["id", "ParentId", "Name"];

pub type PayloadResult<T> = Result<T, PayloadError>;

/// Errors from payload validation and coercion.
#[derive(Debug)]
pub enum PayloadError {
    /// Payload shape does not fit the table schema.
    Schema(SchemaViolation),
    /// One row carries a value that cannot be coerced.
    RowData {
        index: usize,
        field: &'static str,
        message: String,
    },
}

impl Display for PayloadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(violation) => {
                write!(f, "payload does not fit the company_units schema: {violation}")
            }
            Self::RowData {
                index,
                field,
                message,
            } => write!(f, "invalid data in payload row {index}, field `{field}`: {message}"),
        }
    }
}

impl Error for PayloadError {}

impl From<SchemaViolation> for PayloadError {
    fn from(value: SchemaViolation) -> Self {
        Self::Schema(value)
    }
}

/// Reasons a payload fails the fit-schema check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    /// Top level is not a JSON array.
    NotAnArray,
    /// Top-level array is empty.
    EmptyPayload,
    /// One element is not a JSON object.
    ElementNotObject { index: usize },
    /// One element carries the wrong keys or the wrong key order.
    WrongKeys { index: usize, found: Vec<String> },
}

impl Display for SchemaViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnArray => write!(f, "top level must be a JSON array"),
            Self::EmptyPayload => write!(f, "payload array must not be empty"),
            Self::ElementNotObject { index } => {
                write!(f, "element {index} must be a JSON object")
            }
            Self::WrongKeys { index, found } => write!(
                f,
                "element {index} must carry exactly the keys {EXPECTED_KEYS:?} in order, found {found:?}"
            ),
        }
    }
}

impl Error for SchemaViolation {}

/// Checks that the payload fits the `company_units` schema.
///
/// The check is shape-only: values are not inspected, so a payload can
/// pass here and still fail row coercion later.
pub fn fit_schema(payload: &Value) -> Result<(), SchemaViolation> {
    let elements = match payload {
        Value::Array(elements) => elements,
        _ => return Err(SchemaViolation::NotAnArray),
    };
    if elements.is_empty() {
        return Err(SchemaViolation::EmptyPayload);
    }

    for (index, element) in elements.iter().enumerate() {
        let object = element
            .as_object()
            .ok_or(SchemaViolation::ElementNotObject { index })?;
        if !object.keys().eq(EXPECTED_KEYS) {
            return Err(SchemaViolation::WrongKeys {
                index,
                found: object.keys().cloned().collect(),
            });
        }
    }

    Ok(())
}

/// Validates the payload shape and coerces every element into an
/// `ImportRow`.
///
/// Coercion mirrors the loose importer contract: ids accept integers,
/// truncating floats and trimmed numeric strings; names accept strings
/// and stringify numbers and booleans. `ParentId` and `Name` may be
/// null.
pub fn coerce_rows(payload: &Value) -> PayloadResult<Vec<ImportRow>> {
    fit_schema(payload)?;

    // fit_schema guarantees the array/object shape below.
    let elements = payload.as_array().ok_or(SchemaViolation::NotAnArray)?;
    let mut rows = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        let object = element
            .as_object()
            .ok_or(SchemaViolation::ElementNotObject { index })?;

        // Key order was validated above, so values arrive as id, ParentId, Name.
        let mut values = object.values();
        let (id_value, parent_value, name_value) =
            match (values.next(), values.next(), values.next()) {
                (Some(id), Some(parent), Some(name)) => (id, parent, name),
                _ => {
                    return Err(SchemaViolation::WrongKeys {
                        index,
                        found: object.keys().cloned().collect(),
                    }
                    .into())
                }
            };

        let id = coerce_integer(id_value).map_err(|message| PayloadError::RowData {
            index,
            field: "id",
            message,
        })?;
        let parent_id = match parent_value {
            Value::Null => None,
            value => Some(coerce_integer(value).map_err(|message| PayloadError::RowData {
                index,
                field: "ParentId",
                message,
            })?),
        };
        let name = coerce_name(name_value).map_err(|message| PayloadError::RowData {
            index,
            field: "Name",
            message,
        })?;

        rows.push(ImportRow {
            id,
            parent_id,
            name,
        });
    }

    Ok(rows)
}

fn coerce_integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                Ok(integer)
            } else if let Some(float) = number.as_f64() {
                // Truncation toward zero, matching loose int() coercion.
                Ok(float.trunc() as i64)
            } else {
                Err(format!("number `{number}` is out of integer range"))
            }
        }
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("string `{text}` is not an integer")),
        other => Err(format!("{} cannot be read as an integer", json_kind(other))),
    }
}

fn coerce_name(value: &Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        other => Err(format!("{} cannot be read as a name", json_kind(other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

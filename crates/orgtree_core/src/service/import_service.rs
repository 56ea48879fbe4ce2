//! JSON import use-case service.
//!
//! # Responsibility
//! - Run the whole import pipeline: read file, parse JSON, validate the
//!   payload shape, coerce rows, write them in one transaction.
//!
//! # Invariants
//! - The store is unchanged on every failure path; only a fully valid
//!   payload commits.
//! - The returned count equals the number of committed rows.

use crate::import::payload::{coerce_rows, PayloadError, SchemaViolation};
use crate::repo::unit_repo::{RepoError, UnitRepository};
use log::{error, info};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type ImportResult<T> = Result<T, ImportError>;

/// Errors from the import pipeline, in pipeline order.
#[derive(Debug)]
pub enum ImportError {
    /// Payload file cannot be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Payload file is not valid JSON.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Payload shape does not fit the table schema.
    Schema(SchemaViolation),
    /// One row carries a value that cannot be coerced.
    RowData {
        index: usize,
        field: &'static str,
        message: String,
    },
    /// Store-level failure (constraint violation, connectivity loss).
    Repo(RepoError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read payload file `{}`: {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(
                    f,
                    "payload file `{}` is not valid JSON: {source}",
                    path.display()
                )
            }
            Self::Schema(violation) => {
                write!(f, "payload does not fit the company_units schema: {violation}")
            }
            Self::RowData {
                index,
                field,
                message,
            } => write!(f, "invalid data in payload row {index}, field `{field}`: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Schema(violation) => Some(violation),
            Self::RowData { .. } => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<PayloadError> for ImportError {
    fn from(value: PayloadError) -> Self {
        match value {
            PayloadError::Schema(violation) => Self::Schema(violation),
            PayloadError::RowData {
                index,
                field,
                message,
            } => Self::RowData {
                index,
                field,
                message,
            },
        }
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Import use-case facade.
pub struct ImportService<R: UnitRepository> {
    repo: R,
}

impl<R: UnitRepository> ImportService<R> {
    /// Creates the service from a store implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Imports a JSON payload file into the store.
    ///
    /// Returns the committed row count. On any failure the store is
    /// exactly as it was before the call.
    ///
    /// # Side effects
    /// - Emits `import` logging events with duration and status.
    pub fn import_file(
        &self,
        path: impl AsRef<Path>,
        clear_existing: bool,
    ) -> ImportResult<usize> {
        let path = path.as_ref();
        let started_at = Instant::now();
        info!(
            "event=import module=import status=start file={} clear={clear_existing}",
            path.display()
        );

        let result = self.import_file_inner(path, clear_existing);
        match &result {
            Ok(count) => info!(
                "event=import module=import status=ok file={} rows={count} duration_ms={}",
                path.display(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=import module=import status=error file={} duration_ms={} error={err}",
                path.display(),
                started_at.elapsed().as_millis()
            ),
        }

        result
    }

    /// Imports an already-parsed payload value.
    pub fn import_value(&self, payload: &Value, clear_existing: bool) -> ImportResult<usize> {
        let rows = coerce_rows(payload)?;
        let count = self.repo.import_units(&rows, clear_existing)?;
        Ok(count)
    }

    fn import_file_inner(&self, path: &Path, clear_existing: bool) -> ImportResult<usize> {
        let text = fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let payload: Value = serde_json::from_str(&text).map_err(|source| ImportError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        self.import_value(&payload, clear_existing)
    }
}

//! Unit store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs over the `company_units` table.
//! - Keep SQL details and transaction scoping inside the repository
//!   boundary.
//!
//! # Invariants
//! - `import_units` is all-or-nothing: the transaction commits only when
//!   every row inserted; any failure rolls the whole batch back,
//!   including the optional clearing delete.
//! - `children_of` and `list_units` return rows ordered by `id ASC`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::unit::{ImportRow, Unit, UnitId};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const UNIT_SELECT_SQL: &str = "SELECT id, parent_id, name FROM company_units";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from unit store operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from the expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "unit repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "unit repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "unit repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store interface consumed by the import and family query services.
pub trait UnitRepository {
    /// Inserts the batch in one transaction, optionally clearing the
    /// table first. Returns the committed row count.
    fn import_units(&self, rows: &[ImportRow], clear_existing: bool) -> RepoResult<usize>;
    /// Loads one unit by id.
    fn get_unit(&self, id: UnitId) -> RepoResult<Option<Unit>>;
    /// Lists direct children of one unit, ordered by id.
    fn children_of(&self, parent_id: UnitId) -> RepoResult<Vec<Unit>>;
    /// Lists every unit, ordered by id.
    fn list_units(&self) -> RepoResult<Vec<Unit>>;
    /// Counts stored units.
    fn count_units(&self) -> RepoResult<u64>;
}

/// SQLite-backed unit repository.
pub struct SqliteUnitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUnitRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_units_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UnitRepository for SqliteUnitRepository<'_> {
    fn import_units(&self, rows: &[ImportRow], clear_existing: bool) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        if clear_existing {
            tx.execute("DELETE FROM company_units;", [])?;
        }

        for row in rows {
            tx.execute(
                "INSERT INTO company_units (id, parent_id, name) VALUES (?1, ?2, ?3);",
                params![row.id, row.parent_id, row.name.as_deref()],
            )?;
        }

        tx.commit()?;
        Ok(rows.len())
    }

    fn get_unit(&self, id: UnitId) -> RepoResult<Option<Unit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{UNIT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_unit_row(row)?));
        }
        Ok(None)
    }

    fn children_of(&self, parent_id: UnitId) -> RepoResult<Vec<Unit>> {
        let mut stmt = self.conn.prepare(&format!(
            "{UNIT_SELECT_SQL} WHERE parent_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([parent_id])?;

        let mut units = Vec::new();
        while let Some(row) = rows.next()? {
            units.push(parse_unit_row(row)?);
        }
        Ok(units)
    }

    fn list_units(&self) -> RepoResult<Vec<Unit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{UNIT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;

        let mut units = Vec::new();
        while let Some(row) = rows.next()? {
            units.push(parse_unit_row(row)?);
        }
        Ok(units)
    }

    fn count_units(&self) -> RepoResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM company_units;", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn parse_unit_row(row: &Row<'_>) -> RepoResult<Unit> {
    Ok(Unit {
        id: row.get("id")?,
        parent_id: row.get("parent_id")?,
        name: row.get("name")?,
    })
}

fn ensure_units_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "company_units")? {
        return Err(RepoError::MissingRequiredTable("company_units"));
    }

    for column in ["id", "parent_id", "name"] {
        if !table_has_column(conn, "company_units", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "company_units",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

//! Same-root-family query use-case service.
//!
//! # Responsibility
//! - Resolve, for a seed unit, every leaf unit under the same root.
//! - Render query results as the Num/ID/Name console table.
//!
//! # Invariants
//! - A missing seed yields an empty result, not an error.
//! - Output order is breadth-first discovery order from the root, with
//!   sibling ties broken by ascending id.
//! - Only units with no children are returned; a childless root counts
//!   as its own employee.

use crate::model::unit::{Unit, UnitId};
use crate::repo::unit_repo::{RepoResult, UnitRepository};
use log::{error, info};
use std::collections::{HashSet, VecDeque};
use std::fmt::Write as _;
use std::time::Instant;

const NUM_WIDTH: usize = 6;
const ID_WIDTH: usize = 10;
const NAME_WIDTH: usize = 40;

/// Family lookup use-case facade.
pub struct FamilyService<R: UnitRepository> {
    repo: R,
}

impl<R: UnitRepository> FamilyService<R> {
    /// Creates the service from a store implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns every leaf unit ("employee") belonging to the same root
    /// as `seed_id`.
    ///
    /// Two fixed-point phases: an ancestor walk up the `parent_id`
    /// chain, then a breadth-first closure over the parent-to-children
    /// edge starting at the root.
    ///
    /// # Side effects
    /// - Emits `family_query` logging events with duration and status.
    pub fn family_employees(&self, seed_id: UnitId) -> RepoResult<Vec<Unit>> {
        let started_at = Instant::now();
        info!("event=family_query module=family status=start seed={seed_id}");

        let result = self.family_employees_inner(seed_id);
        match &result {
            Ok(units) => info!(
                "event=family_query module=family status=ok seed={seed_id} rows={} duration_ms={}",
                units.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=family_query module=family status=error seed={seed_id} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }

        result
    }

    fn family_employees_inner(&self, seed_id: UnitId) -> RepoResult<Vec<Unit>> {
        let root = match self.find_root(seed_id)? {
            Some(root) => root,
            None => return Ok(Vec::new()),
        };
        self.collect_leaves(root)
    }

    /// Walks the `parent_id` chain upward until a root is reached.
    ///
    /// The schema does not prevent cycles, so a visited set guards
    /// termination; the last unit reached before revisiting acts as the
    /// top of the walk. A dangling parent reference stops the walk the
    /// same way.
    fn find_root(&self, seed_id: UnitId) -> RepoResult<Option<Unit>> {
        let mut current = match self.repo.get_unit(seed_id)? {
            Some(unit) => unit,
            None => return Ok(None),
        };

        let mut visited = HashSet::new();
        while let Some(parent_id) = current.parent_id {
            if !visited.insert(current.id) {
                break;
            }
            match self.repo.get_unit(parent_id)? {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Ok(Some(current))
    }

    /// Breadth-first descendant closure keeping only childless units.
    ///
    /// Children arrive from the store in ascending-id order, so the
    /// discovery order is deterministic.
    fn collect_leaves(&self, root: Unit) -> RepoResult<Vec<Unit>> {
        let mut queue = VecDeque::from([root]);
        let mut seen: HashSet<UnitId> = HashSet::new();
        let mut leaves = Vec::new();

        while let Some(unit) = queue.pop_front() {
            if !seen.insert(unit.id) {
                continue;
            }

            let children = self.repo.children_of(unit.id)?;
            if children.is_empty() {
                leaves.push(unit);
            } else {
                queue.extend(children);
            }
        }

        Ok(leaves)
    }
}

/// Renders the family query result as the console's Num/ID/Name table.
pub fn render_family_table(units: &[Unit]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        " {:<nw$} {:<iw$} {:<mw$}",
        "Num",
        "ID",
        "Name",
        nw = NUM_WIDTH,
        iw = ID_WIDTH,
        mw = NAME_WIDTH
    );
    let _ = write_separator(&mut out);

    for (index, unit) in units.iter().enumerate() {
        let _ = writeln!(
            out,
            " {:<nw$} {:<iw$} {:<mw$}",
            index + 1,
            unit.id,
            unit.name,
            nw = NUM_WIDTH,
            iw = ID_WIDTH,
            mw = NAME_WIDTH
        );
        let _ = write_separator(&mut out);
    }

    out
}

fn write_separator(out: &mut String) -> std::fmt::Result {
    writeln!(
        out,
        "{:-<nw$} {:-<iw$} {:-<mw$}",
        "",
        "",
        "",
        nw = NUM_WIDTH,
        iw = ID_WIDTH,
        mw = NAME_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::render_family_table;
    use crate::model::unit::Unit;

    #[test]
    fn render_family_table_numbers_rows_from_one() {
        let units = vec![
            Unit {
                id: 3,
                parent_id: Some(2),
                name: "Support".to_string(),
            },
            Unit {
                id: 4,
                parent_id: Some(2),
                name: "Sales".to_string(),
            },
        ];

        let table = render_family_table(&units);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with(" Num"));
        assert!(lines[1].starts_with("------"));
        assert!(lines[2].starts_with(" 1"));
        assert!(lines[2].contains("Support"));
        assert!(lines[4].starts_with(" 2"));
        assert!(lines[4].contains("Sales"));
    }

    #[test]
    fn render_family_table_with_no_units_prints_header_only() {
        let table = render_family_table(&[]);
        assert_eq!(table.lines().count(), 2);
        assert!(table.contains("ID"));
    }
}

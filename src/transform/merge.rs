//! Merge two datasets and derive the aggregate `Total` column.
//!
//! This is the transformation core of the pipeline:
//!
//! ```text
//! Project rows              Reference rows         Merged output
//! ┌──────────────┐          ┌─────────────┐        ┌──────────────────────────┐
//! │ id: 1, val 10│          │ id: 1, tag A│        │ id 1, val 10, tag A, T 11│
//! │ id: 2, val 20│    +     │ id: 3, tag B│   →    │ id 2, val 20, tag ∅, T 20│
//! └──────────────┘          └─────────────┘        └──────────────────────────┘
//! ```
//!
//! Join semantics are a left outer join keyed on the project dataset's
//! first column, matched against the same-named column in the reference
//! dataset. Duplicate keys fan out, unmatched project rows keep empty
//! reference cells, and unmatched reference rows are dropped.

use std::collections::HashMap;

use crate::error::{JoinError, JoinResult};
use crate::model::{Cell, Dataset};

/// Name of the derived aggregate column.
pub const TOTAL_COLUMN: &str = "Total";

/// Suffix applied to reference columns whose name collides with a
/// project column.
const COLLISION_SUFFIX: &str = "_ref";

/// Left outer join of `project` against `reference` on the project's
/// first column.
pub fn merge_datasets(project: &Dataset, reference: &Dataset) -> JoinResult<Dataset> {
    if project.columns.is_empty() {
        return Err(JoinError::EmptyProject);
    }

    let key_name = &project.columns[0];
    let ref_key_idx = reference
        .column_index(key_name)
        .ok_or_else(|| JoinError::KeyMissingInReference {
            column: key_name.clone(),
        })?;

    // Reference columns carried into the output, key column excluded.
    let carried: Vec<usize> = (0..reference.columns.len())
        .filter(|&i| i != ref_key_idx)
        .collect();

    let mut columns = project.columns.clone();
    for &i in &carried {
        columns.push(unique_name(&columns, &reference.columns[i]));
    }

    // Index reference rows by canonical key, preserving reference order.
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (row_idx, row) in reference.rows.iter().enumerate() {
        if let Some(key) = row.get(ref_key_idx).and_then(Cell::join_key) {
            index.entry(key).or_default().push(row_idx);
        }
    }

    let mut rows = Vec::with_capacity(project.rows.len());
    for project_row in &project.rows {
        let matches = project_row
            .first()
            .and_then(Cell::join_key)
            .and_then(|key| index.get(&key));

        match matches {
            Some(ref_rows) => {
                for &ref_idx in ref_rows {
                    let mut row = project_row.clone();
                    for &col in &carried {
                        row.push(reference.rows[ref_idx][col].clone());
                    }
                    rows.push(row);
                }
            }
            None => {
                let mut row = project_row.clone();
                row.extend(std::iter::repeat(Cell::Empty).take(carried.len()));
                rows.push(row);
            }
        }
    }

    Ok(Dataset::new(columns, rows))
}

/// Resolve a reference column name against names already emitted.
fn unique_name(existing: &[String], name: &str) -> String {
    let mut candidate = name.to_string();
    while existing.contains(&candidate) {
        candidate.push_str(COLLISION_SUFFIX);
    }
    candidate
}

/// Append the derived `Total` column: per row, the sum of all numeric
/// cells. Text, boolean and empty cells contribute nothing. A dataset
/// that already carries a `Total` column gets its values overwritten in
/// place instead of a second column.
pub fn append_total(dataset: &mut Dataset) {
    let existing = dataset.column_index(TOTAL_COLUMN);

    if existing.is_none() {
        dataset.columns.push(TOTAL_COLUMN.to_string());
    }

    for row in &mut dataset.rows {
        let total: f64 = row.iter().filter_map(Cell::as_number).sum();
        match existing {
            Some(idx) => row[idx] = Cell::Number(total),
            None => row.push(Cell::Number(total)),
        }
    }
}

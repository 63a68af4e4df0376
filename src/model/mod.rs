//! Domain models for the sheetflow pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Cell`] - a single scalar value (text, number, boolean, or empty)
//! - [`Dataset`] - an ordered set of named columns plus ordered rows
//!
//! A `Dataset` is the in-memory form of one worksheet or CSV file: the
//! column order is the file's column order, and each row is positionally
//! aligned with the column list.

// =============================================================================
// Cell
// =============================================================================

/// A single scalar value in a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing / blank value.
    Empty,
    /// Numeric value. Integers are carried as `f64`, like a worksheet does.
    Number(f64),
    /// Text value.
    Text(String),
    /// Boolean value. Excluded from numeric aggregation.
    Bool(bool),
}

impl Cell {
    /// Numeric view of the cell, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the cell is blank.
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Canonical join-key form of the cell.
    ///
    /// Returns `None` for values that never match anything: blanks and
    /// non-finite numbers. Numbers are formatted with `{}` so that a
    /// worksheet integer `1` and the float `1.0` produce the same key.
    pub fn join_key(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) if !n.is_finite() => None,
            Cell::Number(n) => Some(format!("{}", n)),
            Cell::Text(s) => Some(s.clone()),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }

    /// Display form used when writing delimited text.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => format!("{}", n),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// An ordered sequence of named columns and an ordered sequence of rows.
///
/// Rows are positionally aligned with `columns`; short rows are padded
/// with [`Cell::Empty`] on construction by the readers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    /// Column names, in file order.
    pub columns: Vec<String>,
    /// Row data, in file order.
    pub rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Create a dataset from columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Positional index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, column name), if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_key_number_formats() {
        // Worksheet integer and float forms must collide.
        assert_eq!(Cell::Number(1.0).join_key(), Some("1".to_string()));
        assert_eq!(Cell::Number(1.5).join_key(), Some("1.5".to_string()));
    }

    #[test]
    fn test_join_key_blank_and_nan_never_match() {
        assert_eq!(Cell::Empty.join_key(), None);
        assert_eq!(Cell::Number(f64::NAN).join_key(), None);
        assert_eq!(Cell::Number(f64::INFINITY).join_key(), None);
    }

    #[test]
    fn test_cell_as_number() {
        assert_eq!(Cell::Number(2.5).as_number(), Some(2.5));
        assert_eq!(Cell::Text("2.5".into()).as_number(), None);
        assert_eq!(Cell::Bool(true).as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
    }

    #[test]
    fn test_dataset_lookup() {
        let ds = Dataset::new(
            vec!["id".into(), "val".into()],
            vec![vec![Cell::Number(1.0), Cell::Text("a".into())]],
        );
        assert_eq!(ds.row_count(), 1);
        assert_eq!(ds.column_index("val"), Some(1));
        assert_eq!(ds.cell(0, "val"), Some(&Cell::Text("a".into())));
        assert_eq!(ds.cell(0, "missing"), None);
    }

    #[test]
    fn test_cell_from_str() {
        assert_eq!(Cell::from(""), Cell::Empty);
        assert_eq!(Cell::from("x"), Cell::Text("x".into()));
    }
}

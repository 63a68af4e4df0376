//! Tabular file readers: spreadsheet workbooks and delimited text.
//!
//! Converts one worksheet or CSV file into a [`Dataset`]. The first row
//! supplies column names; blank header cells get positional fallback
//! names so every column stays addressable.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{ReadError, ReadResult};
use crate::model::{Cell, Dataset};

/// Extensions recognized as spreadsheet workbooks.
pub const WORKBOOK_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Extensions recognized as delimited text.
pub const DELIMITED_EXTENSIONS: [&str; 1] = ["csv"];

/// Whether a path carries a recognized tabular extension.
pub fn is_tabular(path: &Path) -> bool {
    match extension_of(path) {
        Some(ext) => {
            WORKBOOK_EXTENSIONS.contains(&ext.as_str())
                || DELIMITED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Lowercased extension of a path, if any.
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Display name of a path, for error context.
fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read a tabular file into a dataset, dispatching on its extension.
pub fn read_dataset(path: &Path) -> ReadResult<Dataset> {
    match extension_of(path).as_deref() {
        Some("xlsx") | Some("xls") => read_workbook(path),
        Some("csv") => read_csv(path),
        _ => Err(ReadError::UnsupportedFormat {
            file: file_label(path),
        }),
    }
}

/// Read the first worksheet of a workbook into a dataset.
pub fn read_workbook(path: &Path) -> ReadResult<Dataset> {
    let file = file_label(path);

    let mut workbook = open_workbook_auto(path).map_err(|e| ReadError::Spreadsheet {
        file: file.clone(),
        message: e.to_string(),
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReadError::NoWorksheet { file: file.clone() })?
        .map_err(|e| ReadError::Spreadsheet {
            file: file.clone(),
            message: e.to_string(),
        })?;

    let mut row_iter = range.rows();

    let columns = match row_iter.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(i, cell)| header_name(cell, i))
            .collect(),
        None => Vec::new(),
    };

    let rows = row_iter
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Ok(pad_rows(Dataset::new(columns, rows)))
}

/// Read a delimited text file into a dataset.
///
/// Fields that parse as numbers become [`Cell::Number`]; everything
/// else stays text, blanks stay empty.
pub fn read_csv(path: &Path) -> ReadResult<Dataset> {
    let file = file_label(path);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| ReadError::Csv {
            file: file.clone(),
            message: e.to_string(),
        })?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| ReadError::Csv {
            file: file.clone(),
            message: e.to_string(),
        })?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let name = h.trim();
            if name.is_empty() {
                fallback_name(i)
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReadError::Csv {
            file: file.clone(),
            message: e.to_string(),
        })?;
        rows.push(record.iter().map(parse_field).collect());
    }

    Ok(pad_rows(Dataset::new(columns, rows)))
}

/// Header cell to column name, with positional fallback for blanks.
fn header_name(cell: &Data, index: usize) -> String {
    let name = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    };
    if name.is_empty() {
        fallback_name(index)
    } else {
        name
    }
}

fn fallback_name(index: usize) -> String {
    format!("column_{}", index + 1)
}

/// Map a calamine cell to the pipeline scalar type.
fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // Dates, durations and cell errors carry no numeric meaning for
        // the Total aggregation; keep their display form.
        other => Cell::Text(other.to_string()),
    }
}

/// Parse a CSV field into the pipeline scalar type.
fn parse_field(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::Text(trimmed.to_string()),
    }
}

/// Pad short rows so every row is positionally aligned with the columns.
fn pad_rows(mut dataset: Dataset) -> Dataset {
    let width = dataset.columns.len();
    for row in &mut dataset.rows {
        if row.len() < width {
            row.resize(width, Cell::Empty);
        } else if row.len() > width {
            row.truncate(width);
        }
    }
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_temp_csv(content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("input.csv")).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        dir
    }

    #[test]
    fn test_read_csv_types() {
        let dir = write_temp_csv("id,val,tag\n1,10.5,A\n2,,B\n");
        let ds = read_csv(&dir.path().join("input.csv")).unwrap();

        assert_eq!(ds.columns, vec!["id", "val", "tag"]);
        assert_eq!(ds.rows[0][0], Cell::Number(1.0));
        assert_eq!(ds.rows[0][1], Cell::Number(10.5));
        assert_eq!(ds.rows[0][2], Cell::Text("A".into()));
        assert_eq!(ds.rows[1][1], Cell::Empty);
    }

    #[test]
    fn test_read_csv_short_rows_padded() {
        let dir = write_temp_csv("a,b,c\n1,2\n");
        let ds = read_csv(&dir.path().join("input.csv")).unwrap();
        assert_eq!(ds.rows[0].len(), 3);
        assert_eq!(ds.rows[0][2], Cell::Empty);
    }

    #[test]
    fn test_read_csv_blank_header_named() {
        let dir = write_temp_csv("id,,val\n1,2,3\n");
        let ds = read_csv(&dir.path().join("input.csv")).unwrap();
        assert_eq!(ds.columns[1], "column_2");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = read_dataset(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, ReadError::UnsupportedFormat { .. }));
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_corrupt_workbook_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"this is not a zip container").unwrap();

        let err = read_dataset(&path).unwrap_err();
        assert!(matches!(err, ReadError::Spreadsheet { .. }));
        assert!(err.to_string().contains("broken.xlsx"));
    }

    #[test]
    fn test_is_tabular() {
        assert!(is_tabular(Path::new("a.xlsx")));
        assert!(is_tabular(Path::new("A.XLS")));
        assert!(is_tabular(Path::new("out.csv")));
        assert!(!is_tabular(Path::new("bundle.zip")));
        assert!(!is_tabular(Path::new("README")));
    }
}

//! Tabular file writers: spreadsheet workbooks and delimited text.
//!
//! Persistence is atomic with respect to output discovery: content is
//! serialized to a buffer, written to a `.part` sibling, then renamed
//! into place. A failed write never leaves a file behind that matches
//! the recognized tabular extensions.

use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::error::{WriteError, WriteResult};
use crate::model::{Cell, Dataset};

/// Write a dataset to a tabular file, dispatching on the extension.
pub fn write_dataset(dataset: &Dataset, path: &Path) -> WriteResult<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let bytes = match ext.as_deref() {
        Some("xlsx") => workbook_bytes(dataset, path)?,
        Some("csv") => csv_bytes(dataset, path)?,
        _ => {
            return Err(WriteError::UnsupportedFormat {
                file: file_label(path),
            })
        }
    };

    persist(path, &bytes)
}

/// Serialize a dataset into an xlsx workbook buffer.
fn workbook_bytes(dataset: &Dataset, path: &Path) -> WriteResult<Vec<u8>> {
    let file = file_label(path);
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| WriteError::Xlsx {
        file: file.clone(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in dataset.columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, name).map_err(xlsx_err)?;
    }

    for (row_idx, row) in dataset.rows.iter().enumerate() {
        let out_row = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let out_col = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Number(n) => {
                    worksheet.write_number(out_row, out_col, *n).map_err(xlsx_err)?;
                }
                Cell::Text(s) => {
                    worksheet
                        .write_string(out_row, out_col, s.as_str())
                        .map_err(xlsx_err)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(out_row, out_col, *b).map_err(xlsx_err)?;
                }
            }
        }
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

/// Serialize a dataset into a CSV buffer.
fn csv_bytes(dataset: &Dataset, path: &Path) -> WriteResult<Vec<u8>> {
    let file = file_label(path);
    let csv_err = |message: String| WriteError::Csv {
        file: file.clone(),
        message,
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&dataset.columns)
        .map_err(|e| csv_err(e.to_string()))?;

    for row in &dataset.rows {
        let record: Vec<String> = row.iter().map(Cell::to_field).collect();
        writer
            .write_record(&record)
            .map_err(|e| csv_err(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| csv_err(e.to_string()))
}

/// Write bytes to a `.part` sibling, then rename into place.
fn persist(path: &Path, bytes: &[u8]) -> WriteResult<()> {
    let file = file_label(path);
    let io_err = |source: std::io::Error| WriteError::Io {
        file: file.clone(),
        source,
    };

    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part_path = std::path::PathBuf::from(part);

    if let Err(e) = std::fs::write(&part_path, bytes) {
        let _ = std::fs::remove_file(&part_path);
        return Err(io_err(e));
    }

    std::fs::rename(&part_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&part_path);
        io_err(e)
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{read_csv, read_workbook};

    fn sample() -> Dataset {
        Dataset::new(
            vec!["id".into(), "val".into(), "tag".into()],
            vec![
                vec![Cell::Number(1.0), Cell::Number(10.0), Cell::Text("A".into())],
                vec![Cell::Number(2.0), Cell::Number(20.0), Cell::Empty],
            ],
        )
    }

    #[test]
    fn test_write_then_read_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_dataset(&sample(), &path).unwrap();
        let back = read_csv(&path).unwrap();

        assert_eq!(back.columns, vec!["id", "val", "tag"]);
        assert_eq!(back.rows[0][1], Cell::Number(10.0));
        assert_eq!(back.rows[1][2], Cell::Empty);
    }

    #[test]
    fn test_write_then_read_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        write_dataset(&sample(), &path).unwrap();
        let back = read_workbook(&path).unwrap();

        assert_eq!(back.columns, vec!["id", "val", "tag"]);
        assert_eq!(back.rows.len(), 2);
        assert_eq!(back.rows[0][0], Cell::Number(1.0));
        assert_eq!(back.rows[0][2], Cell::Text("A".into()));
    }

    #[test]
    fn test_no_part_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        write_dataset(&sample(), &path).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["out.xlsx"]);
    }

    #[test]
    fn test_unsupported_output_format() {
        let err = write_dataset(&sample(), Path::new("out.parquet")).unwrap_err();
        assert!(matches!(err, WriteError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_failed_write_leaves_no_discoverable_file() {
        let dir = tempfile::tempdir().unwrap();
        // Target inside a directory that does not exist.
        let path = dir.path().join("missing").join("out.xlsx");

        let err = write_dataset(&sample(), &path).unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}

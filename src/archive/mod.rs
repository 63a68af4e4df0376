//! Bundle selected output files into a zip archive.
//!
//! The archive is a flat, deflate-compressed zip: entries are named by
//! the original filenames, no directory structure, containing exactly
//! the selected files byte-for-byte. The `.zip` extension is not in the
//! tabular discovery set, so the archive can live in the working
//! directory without selecting itself on a later scan.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackagingError, PackagingResult};
use crate::select::Candidate;

/// Default archive filename in the working directory.
pub const DEFAULT_ARCHIVE_NAME: &str = "outputs_top3.zip";

/// Write the selected files into `archive_path`.
///
/// A failed build removes the partial archive before returning, so no
/// truncated zip is ever offered for download.
pub fn bundle_selection(selection: &[Candidate], archive_path: &Path) -> PackagingResult<PathBuf> {
    if selection.is_empty() {
        return Err(PackagingError::EmptySelection);
    }

    match write_archive(selection, archive_path) {
        Ok(()) => Ok(archive_path.to_path_buf()),
        Err(e) => {
            let _ = std::fs::remove_file(archive_path);
            Err(e)
        }
    }
}

fn write_archive(selection: &[Candidate], archive_path: &Path) -> PackagingResult<()> {
    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for candidate in selection {
        // A member can vanish between selection and archiving; surface
        // that with the filename rather than a bare IO error.
        let bytes = std::fs::read(&candidate.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PackagingError::MemberMissing {
                    file: candidate.name.clone(),
                }
            } else {
                PackagingError::Io(e)
            }
        })?;

        zip.start_file(candidate.name.as_str(), options)
            .map_err(|e| PackagingError::Zip(e.to_string()))?;
        zip.write_all(&bytes)?;
    }

    zip.finish().map_err(|e| PackagingError::Zip(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn stage(dir: &Path, name: &str, content: &[u8]) -> Candidate {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        Candidate {
            name: name.to_string(),
            path,
        }
    }

    fn entry_bytes(archive: &Path, name: &str) -> Vec<u8> {
        let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut entry = zip.by_name(name).unwrap();
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_bundle_contains_exact_members() {
        let dir = tempfile::tempdir().unwrap();
        let members = vec![
            stage(dir.path(), "output_a.csv", b"id,val\n1,2\n"),
            stage(dir.path(), "output_b.xlsx", b"fake workbook bytes"),
        ];
        let archive = dir.path().join(DEFAULT_ARCHIVE_NAME);

        bundle_selection(&members, &archive).unwrap();

        let zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        assert_eq!(zip.len(), 2);

        assert_eq!(entry_bytes(&archive, "output_a.csv"), b"id,val\n1,2\n");
        assert_eq!(entry_bytes(&archive, "output_b.xlsx"), b"fake workbook bytes");
    }

    #[test]
    fn test_entries_are_flat() {
        let dir = tempfile::tempdir().unwrap();
        let members = vec![stage(dir.path(), "output.csv", b"x")];
        let archive = dir.path().join("bundle.zip");

        bundle_selection(&members, &archive).unwrap();

        let zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let names: Vec<&str> = zip.file_names().collect();
        assert_eq!(names, vec!["output.csv"]);
    }

    #[test]
    fn test_single_member_archive() {
        let dir = tempfile::tempdir().unwrap();
        let members = vec![stage(dir.path(), "only.xlsx", b"solo")];
        let archive = dir.path().join("bundle.zip");

        bundle_selection(&members, &archive).unwrap();
        assert_eq!(entry_bytes(&archive, "only.xlsx"), b"solo");
    }

    #[test]
    fn test_vanished_member_reported_and_no_partial_archive() {
        let dir = tempfile::tempdir().unwrap();
        let kept = stage(dir.path(), "output_a.csv", b"x");
        let gone = stage(dir.path(), "output_b.csv", b"y");
        std::fs::remove_file(&gone.path).unwrap();

        let archive = dir.path().join("bundle.zip");
        let err = bundle_selection(&[kept, gone], &archive).unwrap_err();

        match err {
            PackagingError::MemberMissing { file } => assert_eq!(file, "output_b.csv"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!archive.exists());
    }

    #[test]
    fn test_empty_selection_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = bundle_selection(&[], &dir.path().join("bundle.zip")).unwrap_err();
        assert!(matches!(err, PackagingError::EmptySelection));
    }
}

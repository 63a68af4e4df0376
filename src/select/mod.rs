//! Output discovery and selection.
//!
//! After the transform has written its outputs, the working directory
//! is scanned for tabular files and up to three of them are chosen for
//! bundling:
//!
//! 1. **Discovery** - non-recursive scan for recognized tabular
//!    extensions; scan order is not meaningful.
//! 2. **Tiering** - filenames containing the marker `"output"`
//!    (case-insensitive) form the preferred tier. A non-empty tier is
//!    used exclusively; an empty tier falls back to everything found.
//! 3. **Ranking** - ascending lexicographic filename sort, first three.
//!
//! The two-tier rule is a preference, not a hard filter: as long as any
//! tabular file exists, the selection is non-empty.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::reader::is_tabular;

/// Maximum number of files in a selection.
pub const SELECTION_LIMIT: usize = 3;

/// Case-insensitive filename marker for the preferred tier.
pub const OUTPUT_MARKER: &str = "output";

/// One discovered output candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Bare filename, used for tiering, ranking and archive entries.
    pub name: String,
    /// Full path in the working directory.
    pub path: PathBuf,
}

/// The chosen subset of discovered outputs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Selection {
    /// All discovered candidates, lexicographically sorted.
    pub discovered: Vec<Candidate>,
    /// Chosen candidates, lexicographically sorted, at most
    /// [`SELECTION_LIMIT`] of them.
    pub chosen: Vec<Candidate>,
    /// Whether the preferred tier supplied the selection.
    pub from_preferred_tier: bool,
}

impl Selection {
    /// Whether discovery found nothing at all.
    pub fn is_empty(&self) -> bool {
        self.discovered.is_empty()
    }
}

/// Scan a directory (non-recursive) for tabular output files and
/// select up to three of them.
pub fn select_outputs(dir: &Path) -> std::io::Result<Selection> {
    let mut candidates = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if !is_tabular(&path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            candidates.push(Candidate {
                name: name.to_string(),
                path,
            });
        }
    }

    Ok(select_candidates(candidates))
}

/// Pure selection policy over an unordered candidate set.
pub fn select_candidates(mut candidates: Vec<Candidate>) -> Selection {
    candidates.sort_by(|a, b| a.name.cmp(&b.name));

    let tagged: Vec<Candidate> = candidates
        .iter()
        .filter(|c| c.name.to_lowercase().contains(OUTPUT_MARKER))
        .cloned()
        .collect();

    let from_preferred_tier = !tagged.is_empty();
    let mut chosen = if from_preferred_tier {
        tagged
    } else {
        candidates.clone()
    };
    chosen.truncate(SELECTION_LIMIT);

    Selection {
        discovered: candidates,
        chosen,
        from_preferred_tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(names: &[&str]) -> Vec<Candidate> {
        names
            .iter()
            .map(|n| Candidate {
                name: n.to_string(),
                path: PathBuf::from(n),
            })
            .collect()
    }

    fn chosen_names(selection: &Selection) -> Vec<&str> {
        selection.chosen.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_preferred_tier_wins() {
        let sel = select_candidates(candidates(&[
            "a.xlsx",
            "output_final.xlsx",
            "output_2024.csv",
            "b.csv",
        ]));

        assert!(sel.from_preferred_tier);
        assert_eq!(chosen_names(&sel), vec!["output_2024.csv", "output_final.xlsx"]);
    }

    #[test]
    fn test_fallback_to_full_set() {
        let sel = select_candidates(candidates(&["c.xlsx", "a.csv", "b.xls", "d.csv"]));

        assert!(!sel.from_preferred_tier);
        assert_eq!(chosen_names(&sel), vec!["a.csv", "b.xls", "c.xlsx"]);
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        let sel = select_candidates(candidates(&["plain.csv", "OUTPUT_B.xlsx"]));

        assert!(sel.from_preferred_tier);
        assert_eq!(chosen_names(&sel), vec!["OUTPUT_B.xlsx"]);
    }

    #[test]
    fn test_no_padding_from_other_tier() {
        // One tagged file: selection is exactly it, even though two
        // untagged files are available.
        let sel = select_candidates(candidates(&["a.csv", "b.csv", "output.xlsx"]));
        assert_eq!(chosen_names(&sel), vec!["output.xlsx"]);
    }

    #[test]
    fn test_limit_applies_within_tier() {
        let sel = select_candidates(candidates(&[
            "output_d.csv",
            "output_a.csv",
            "output_c.csv",
            "output_b.csv",
        ]));
        assert_eq!(
            chosen_names(&sel),
            vec!["output_a.csv", "output_b.csv", "output_c.csv"]
        );
    }

    #[test]
    fn test_selection_is_deterministic() {
        let names = ["z.csv", "m.xlsx", "a.xls", "q.csv", "b.xlsx"];
        let first = select_candidates(candidates(&names));
        for _ in 0..10 {
            let again = select_candidates(candidates(&names));
            assert_eq!(chosen_names(&first), chosen_names(&again));
        }
    }

    #[test]
    fn test_empty_input() {
        let sel = select_candidates(Vec::new());
        assert!(sel.is_empty());
        assert!(sel.chosen.is_empty());
    }

    #[test]
    fn test_directory_scan_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["output_1.xlsx", "notes.txt", "data.csv", "bundle.zip"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let sel = select_outputs(dir.path()).unwrap();
        let discovered: Vec<&str> = sel.discovered.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(discovered, vec!["data.csv", "output_1.xlsx"]);
        assert_eq!(chosen_names(&sel), vec!["output_1.xlsx"]);
    }
}

//! One-level directory listing beneath the share root.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::resolver::resolve_directory;

/// A single child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Base name of the entry.
    pub name: String,
    /// Slash-separated path relative to the share root.
    pub relative_path: String,
    /// Whether the entry is a directory (symlinks are followed).
    pub is_dir: bool,
    /// Size in bytes, present only for regular files.
    pub size: Option<u64>,
}

/// List the children of the directory at `relative` beneath `root`.
///
/// Directories come first, then everything else; each group is ordered
/// by case-insensitive name.
pub fn list(root: &Path, relative: &str) -> Result<Vec<Entry>> {
    let directory = resolve_directory(root, relative)?;
    let base = posix_clean(relative);

    let mut entries = Vec::new();
    for entry in fs::read_dir(&directory)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();

        // Follow symlinks; an entry that cannot be stat'ed is neither a
        // directory nor a sized file.
        let metadata = fs::metadata(entry.path()).ok();
        let is_dir = metadata.as_ref().is_some_and(|m| m.is_dir());
        let size = metadata.filter(|m| m.is_file()).map(|m| m.len());

        let relative_path = if base.is_empty() {
            name.clone()
        } else {
            format!("{base}/{name}")
        };

        entries.push(Entry {
            name,
            relative_path,
            is_dir,
            size,
        });
    }

    entries.sort_by(compare_entries);
    Ok(entries)
}

fn compare_entries(a: &Entry, b: &Entry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Drop empty and `.` segments from a slash-separated path.
fn posix_clean(relative: &str) -> String {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShareError;
    use tempfile::TempDir;

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_directories_first_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("b.txt"), "b").unwrap();
        fs::create_dir(root.join("A")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::create_dir(root.join("B")).unwrap();

        let entries = list(root, "").unwrap();
        assert_eq!(names(&entries), vec!["A", "B", "a.txt", "b.txt"]);
        assert!(entries[0].is_dir);
        assert!(entries[1].is_dir);
        assert!(!entries[2].is_dir);
        assert!(!entries[3].is_dir);
    }

    #[test]
    fn test_case_insensitive_interleaving() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("Zebra.txt"), "z").unwrap();
        fs::write(root.join("apple.txt"), "a").unwrap();
        fs::write(root.join("Banana.txt"), "b").unwrap();

        let entries = list(root, "").unwrap();
        assert_eq!(names(&entries), vec!["apple.txt", "Banana.txt", "Zebra.txt"]);
    }

    #[test]
    fn test_root_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/readme.txt"), "hello world").unwrap();
        fs::create_dir_all(root.join("images")).unwrap();

        let entries = list(root, "").unwrap();
        assert_eq!(
            entries,
            vec![
                Entry {
                    name: "docs".to_string(),
                    relative_path: "docs".to_string(),
                    is_dir: true,
                    size: None,
                },
                Entry {
                    name: "images".to_string(),
                    relative_path: "images".to_string(),
                    is_dir: true,
                    size: None,
                },
            ]
        );

        let docs = list(root, "docs").unwrap();
        assert_eq!(
            docs,
            vec![Entry {
                name: "readme.txt".to_string(),
                relative_path: "docs/readme.txt".to_string(),
                is_dir: false,
                size: Some(11),
            }]
        );
    }

    #[test]
    fn test_relative_paths_are_posix_joined() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("a/b/c.txt"), "c").unwrap();

        let entries = list(root, "a//./b/").unwrap();
        assert_eq!(entries[0].relative_path, "a/b/c.txt");
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("empty")).unwrap();

        let entries = list(temp_dir.path(), "empty").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_errors_propagate() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("file.txt"), "x").unwrap();

        assert!(matches!(list(&root, "missing"), Err(ShareError::NotFound(_))));
        assert!(matches!(list(&root, "file.txt"), Err(ShareError::NotFound(_))));
        assert!(matches!(list(&root, ".."), Err(ShareError::OutsideRoot)));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_listed_without_size() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        symlink(root.join("gone"), root.join("dangling")).unwrap();

        let entries = list(root, "").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "dangling");
        assert!(!entries[0].is_dir);
        assert_eq!(entries[0].size, None);
    }

    #[test]
    fn test_entry_serialization() {
        let entry = Entry {
            name: "docs".to_string(),
            relative_path: "docs".to_string(),
            is_dir: true,
            size: None,
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"name":"docs","relative_path":"docs","is_dir":true,"size":null}"#
        );
    }
}

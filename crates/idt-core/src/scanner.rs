//! Discovery of exported table archive files

use crate::error::Result;
use crate::kind::TableKind;
use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Exported archive files, keyed by the table they hold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportedTables {
    files: BTreeMap<TableKind, PathBuf>,
}

impl ExportedTables {
    /// Create an empty set of exports
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the exports the export tool wrote into `dir` as `<TableName>.idt`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let mut exports = Self::new();
        for kind in TableKind::ALL {
            let path = dir.join(kind.file_name());
            if path.is_file() {
                exports.insert(kind, path);
            }
        }
        exports
    }

    /// Recursively scan one or more roots for `.idt` files named after a known table.
    ///
    /// When several roots hold the same table, the last root wins.
    pub fn scan<P: AsRef<Path>>(roots: &[P]) -> Result<Self> {
        let mut exports = Self::new();

        for root in roots {
            let mut found: Vec<(TableKind, PathBuf)> = Vec::new();

            for entry in WalkDir::new(root.as_ref()).follow_links(true).sort_by_file_name() {
                let entry = entry?;
                let path = entry.path();

                if !entry.file_type().is_file()
                    || !path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("idt"))
                {
                    continue;
                }

                let kind = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|stem| TableKind::ALL.into_iter().find(|k| k.name() == stem));

                match kind {
                    Some(kind) => found.push((kind, path.to_path_buf())),
                    None => debug!("ignoring unknown table export {}", path.display()),
                }
            }

            // Within one root, the shallowest file for a kind wins
            found.sort_by_key(|(_, path)| std::cmp::Reverse(path.components().count()));
            for (kind, path) in found {
                exports.insert(kind, path);
            }
        }

        Ok(exports)
    }

    /// Record (or replace) the file for a table kind
    pub fn insert(&mut self, kind: TableKind, path: PathBuf) {
        self.files.insert(kind, path);
    }

    /// Path of the export for `kind`, if one exists
    pub fn path(&self, kind: TableKind) -> Option<&Path> {
        self.files.get(&kind).map(PathBuf::as_path)
    }

    /// Kinds that have an export, in canonical order
    pub fn kinds(&self) -> Vec<TableKind> {
        self.files.keys().copied().collect()
    }

    /// Iterate over `(kind, path)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (TableKind, &Path)> {
        self.files.iter().map(|(kind, path)| (*kind, path.as_path()))
    }

    /// Get the number of exports found
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check whether no exports were found
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_in_dir_only_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Property.idt"), "").unwrap();
        fs::write(dir.path().join("Shortcut.idt"), "").unwrap();
        fs::write(dir.path().join("Registry.idt"), "").unwrap();

        let exports = ExportedTables::in_dir(dir.path());
        assert_eq!(exports.kinds(), vec![TableKind::Property, TableKind::Shortcut]);
        assert_eq!(
            exports.path(TableKind::Property),
            Some(dir.path().join("Property.idt").as_path())
        );
        assert!(exports.path(TableKind::File).is_none());
    }

    #[test]
    fn test_scan_recurses_and_ignores_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Directory.idt"), "").unwrap();
        fs::write(nested.join("Feature.idt"), "").unwrap();
        fs::write(nested.join("notes.txt"), "").unwrap();

        let exports = ExportedTables::scan(&[dir.path()]).unwrap();
        assert_eq!(exports.kinds(), vec![TableKind::Directory]);
        assert_eq!(exports.len(), 1);
    }

    #[test]
    fn test_scan_later_root_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("Property.idt"), "").unwrap();
        fs::write(first.path().join("File.idt"), "").unwrap();
        fs::write(second.path().join("Property.idt"), "").unwrap();

        let exports = ExportedTables::scan(&[first.path(), second.path()]).unwrap();
        assert_eq!(
            exports.path(TableKind::Property),
            Some(second.path().join("Property.idt").as_path())
        );
        assert_eq!(
            exports.path(TableKind::File),
            Some(first.path().join("File.idt").as_path())
        );
    }

    #[test]
    fn test_scan_missing_root_fails() {
        assert!(ExportedTables::scan(&["/nonexistent/exports"]).is_err());
    }

    #[test]
    fn test_scan_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exports = ExportedTables::scan(&[dir.path()]).unwrap();
        assert!(exports.is_empty());
    }
}

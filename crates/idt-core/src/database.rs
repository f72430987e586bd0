//! In-memory database of exported installer tables
//!
//! A `Database` is an immutable map from table kind to loaded table. The
//! relational lookups the installer would do with SQL (directory chains,
//! file key dereferences, shortcut targets) are done here by hand.

use crate::config::LoadConfig;
use crate::error::{Error, Result};
use crate::field::file_name_from_field;
use crate::formatted::expand_formatted_string;
use crate::header::parse_header;
use crate::kind::TableKind;
use crate::scanner::ExportedTables;
use crate::table::{load_table, Table};
use log::{debug, trace};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Directory ids that stand for OS special folders.
///
/// A directory chain stops at one of these; the id itself becomes the first
/// path component.
pub const ROOT_DIRECTORIES: [&str; 4] = [
    "DesktopFolder",
    "LocalAppDataFolder",
    "ProgramFiles64Folder",
    "ProgramMenuFolder",
];

/// An installed shortcut, resolved from the Shortcut table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Shortcut {
    /// Where the link file is installed
    pub path: PathBuf,
    /// What the link points at
    pub target: PathBuf,
    /// Working directory of the link
    pub work_dir: PathBuf,
}

/// Loaded tables keyed by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Database {
    tables: BTreeMap<TableKind, Table>,
}

impl Database {
    /// Build a database from already loaded tables
    pub fn new(tables: BTreeMap<TableKind, Table>) -> Self {
        Self { tables }
    }

    /// Load the requested tables from their exports.
    ///
    /// Kinds without an export file are skipped; they simply contribute no facts.
    pub fn load(exports: &ExportedTables, kinds: &[TableKind]) -> Result<Self> {
        let mut tables = BTreeMap::new();

        for &kind in kinds {
            let Some(path) = exports.path(kind) else {
                debug!("no export for table '{}', skipping", kind);
                continue;
            };

            let header = parse_header(path)?;
            let table = load_table(path, &header)?;
            tables.insert(kind, table);
        }

        Ok(Self::new(tables))
    }

    /// Load the requested tables from `<dir>/<TableName>.idt` files
    pub fn load_dir<P: AsRef<Path>>(dir: P, kinds: &[TableKind]) -> Result<Self> {
        Self::load(&ExportedTables::in_dir(dir), kinds)
    }

    /// Scan the configured roots and load the configured tables
    pub fn from_config(config: &LoadConfig) -> Result<Self> {
        let exports = ExportedTables::scan(&config.roots)?;
        Self::load(&exports, &config.tables)
    }

    /// Kinds of the tables present
    pub fn table_kinds(&self) -> BTreeSet<TableKind> {
        self.tables.keys().copied().collect()
    }

    /// Get a loaded table
    pub fn table(&self, kind: TableKind) -> Option<&Table> {
        self.tables.get(&kind)
    }

    /// Check whether no tables are loaded
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn require(&self, kind: TableKind) -> Result<&Table> {
        self.table(kind).ok_or(Error::MissingTable(kind))
    }

    /// Combine two databases into a new one.
    ///
    /// A kind present in both takes `other`'s table whole; rows are not merged.
    pub fn append(&self, other: &Database) -> Database {
        let mut tables = self.tables.clone();
        tables.extend(other.tables.iter().map(|(kind, table)| (*kind, table.clone())));
        Database::new(tables)
    }

    /// Value of a property from the Property table
    pub fn find_property(&self, name: &str) -> Result<Option<&str>> {
        let Some(properties) = self.table(TableKind::Property) else {
            return Ok(None);
        };

        match properties.find_row("Property", name)? {
            Some(row) => row.get("Value").map(Some),
            None => Ok(None),
        }
    }

    /// Resolve every row of the Shortcut table, in table order
    pub fn list_shortcuts(&self) -> Result<Vec<Shortcut>> {
        let Some(shortcuts) = self.table(TableKind::Shortcut) else {
            return Ok(Vec::new());
        };

        shortcuts
            .rows()
            .map(|row| -> Result<Shortcut> {
                let path = self
                    .directory_path(row.get("Directory_")?)?
                    .join(file_name_from_field(row.get("Name")?));
                let work_dir = self.directory_path(row.get("WkDir")?)?;
                let target = PathBuf::from(self.expand_formatted_string(row.get("Target")?)?);

                Ok(Shortcut {
                    path,
                    target,
                    work_dir,
                })
            })
            .collect()
    }

    /// Resolve a directory id to a path by walking the Directory_Parent chain
    /// up to one of the [`ROOT_DIRECTORIES`].
    ///
    /// An id with no Directory row fails with `UnresolvedDirectory`, also when
    /// no Directory table is loaded at all.
    pub fn directory_path(&self, directory_id: &str) -> Result<PathBuf> {
        let mut components: Vec<&str> = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut chain: Vec<String> = Vec::new();
        let mut cursor = directory_id;

        loop {
            if ROOT_DIRECTORIES.contains(&cursor) {
                components.push(cursor);
                break;
            }

            chain.push(cursor.to_string());
            if !visited.insert(cursor) {
                return Err(Error::DirectoryCycle {
                    id: directory_id.to_string(),
                    chain,
                });
            }

            let row = match self.table(TableKind::Directory) {
                Some(directories) => directories.find_row("Directory", cursor)?,
                None => None,
            };
            let row = row.ok_or_else(|| Error::UnresolvedDirectory(cursor.to_string()))?;

            let name = file_name_from_field(row.get("DefaultDir")?);
            trace!("directory '{}' -> '{}'", cursor, name);
            components.push(name);
            cursor = row.get("Directory_Parent")?;
        }

        Ok(components.iter().rev().collect())
    }

    /// Expand a formatted string against this database.
    ///
    /// Only `[~]` and file key references (`[#FileKey]`) are supported.
    pub fn expand_formatted_string(&self, value: &str) -> Result<String> {
        expand_formatted_string(value, |token| self.resolve_token(token))
    }

    fn resolve_token(&self, token: &str) -> Result<String> {
        match token.strip_prefix('#') {
            Some(file_key) => Ok(self.file_path(file_key)?.to_string_lossy().into_owned()),
            None => Err(Error::UnsupportedFormattedToken(token.to_string())),
        }
    }

    /// Install path of a file from the File table
    pub fn file_path(&self, file_key: &str) -> Result<PathBuf> {
        let file = self
            .require(TableKind::File)?
            .find_row("File", file_key)?
            .ok_or_else(|| Error::UnresolvedFileKey(file_key.to_string()))?;

        let component_id = file.get("Component_")?;
        let component = self
            .require(TableKind::Component)?
            .find_row("Component", component_id)?
            .ok_or_else(|| Error::UnresolvedComponent(component_id.to_string()))?;

        let dir = self.directory_path(component.get("Directory_")?)?;
        Ok(dir.join(file_name_from_field(file.get("FileName")?)))
    }
}

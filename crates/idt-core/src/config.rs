//! Load configuration: where the exports live and which tables to read

use crate::error::{Error, Result};
use crate::kind::TableKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A JSON file describing which exported tables to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Root directories to scan for exports
    pub roots: Vec<PathBuf>,
    /// Table kinds to load
    #[serde(default = "all_kinds")]
    pub tables: Vec<TableKind>,
}

fn all_kinds() -> Vec<TableKind> {
    TableKind::ALL.to_vec()
}

impl LoadConfig {
    /// Create a config that loads every known table from `roots`
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            tables: all_kinds(),
        }
    }

    /// Load a config file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the config file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

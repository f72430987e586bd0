//! Error types for idt-core

use crate::kind::TableKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in idt-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The three header lines of a table archive are not usable
    #[error("malformed header in '{path}': {message}")]
    MalformedHeader { path: PathBuf, message: String },

    /// A well-formed codepage number with no known text encoding
    #[error("unsupported codepage {codepage} in '{path}'")]
    UnsupportedCodepage { path: PathBuf, codepage: u32 },

    /// A data row does not have one field per header column
    #[error("line {line} of '{path}' has {found} fields, expected {expected}")]
    RowColumnCountMismatch {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Columns of a table differ in length, or there are none
    #[error("invalid table '{table}': {message}")]
    InvalidTable { table: String, message: String },

    /// A lookup named a column the table does not have
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    /// A resolution step needs a table that was not loaded
    #[error("table '{0}' is not loaded")]
    MissingTable(TableKind),

    /// Directory id not present in the Directory table
    #[error("directory '{0}' not found in the Directory table")]
    UnresolvedDirectory(String),

    /// The Directory_Parent chain loops back on itself
    #[error("directory '{id}' has a cyclic parent chain: {}", .chain.join(" -> "))]
    DirectoryCycle { id: String, chain: Vec<String> },

    /// File key not present in the File table
    #[error("file key '{0}' not found in the File table")]
    UnresolvedFileKey(String),

    /// Component id not present in the Component table
    #[error("component '{0}' not found in the Component table")]
    UnresolvedComponent(String),

    /// Formatted-string token outside the supported subset
    #[error("unsupported formatted string token '[{0}]'")]
    UnsupportedFormattedToken(String),

    /// Name that is not one of the known table kinds
    #[error("unknown table kind: {0}")]
    UnknownTableKind(String),

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

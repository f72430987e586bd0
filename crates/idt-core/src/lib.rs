//! idt-core: Core library for reading exported installer database tables
//!
//! This library provides functionality to:
//! - Parse the three-line header of a table archive (.idt) file
//! - Load the rows of an archive into a column-oriented table
//! - Discover exported archives on disk
//! - Resolve directory chains, file keys and shortcut targets across tables

pub mod config;
pub mod database;
pub mod error;
pub mod field;
pub mod formatted;
pub mod header;
pub mod kind;
pub mod scanner;
pub mod table;

pub use config::LoadConfig;
pub use database::{Database, Shortcut, ROOT_DIRECTORIES};
pub use error::{Error, Result};
pub use field::file_name_from_field;
pub use formatted::expand_formatted_string;
pub use header::{parse_header, Header};
pub use kind::TableKind;
pub use scanner::ExportedTables;
pub use table::{load_table, Column, Row, Table};

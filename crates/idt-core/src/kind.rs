//! Known installer table kinds

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A table the engine knows how to load and query.
///
/// The canonical name doubles as the export file basename
/// (`Shortcut` -> `Shortcut.idt`) and as the map key in a `Database`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TableKind {
    Component,
    Directory,
    File,
    Property,
    Shortcut,
}

impl TableKind {
    /// Every known kind, in canonical order
    pub const ALL: [TableKind; 5] = [
        TableKind::Component,
        TableKind::Directory,
        TableKind::File,
        TableKind::Property,
        TableKind::Shortcut,
    ];

    /// Canonical table name
    pub fn name(self) -> &'static str {
        match self {
            TableKind::Component => "Component",
            TableKind::Directory => "Directory",
            TableKind::File => "File",
            TableKind::Property => "Property",
            TableKind::Shortcut => "Shortcut",
        }
    }

    /// File name the export tool writes this table to
    pub fn file_name(self) -> String {
        format!("{}.idt", self.name())
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownTableKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in TableKind::ALL {
            assert_eq!(kind.name().parse::<TableKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_parse_ignores_case() {
        assert_eq!("shortcut".parse::<TableKind>().unwrap(), TableKind::Shortcut);
    }

    #[test]
    fn test_kind_parse_unknown() {
        assert!(matches!(
            "Registry".parse::<TableKind>(),
            Err(Error::UnknownTableKind(name)) if name == "Registry"
        ));
    }

    #[test]
    fn test_kind_file_name() {
        assert_eq!(TableKind::Directory.file_name(), "Directory.idt");
    }
}

//! Helpers for interpreting individual cell values

/// Extract the file or directory name to use as a path component.
///
/// Name cells may hold `SHORTNAME|LongName`; the long name wins when present.
///
/// Examples:
/// - "SHORT~1|LongName.txt" -> "LongName.txt"
/// - "PLAIN" -> "PLAIN"
pub fn file_name_from_field(value: &str) -> &str {
    match value.split_once('|') {
        Some((_, long_name)) => long_name,
        None => value,
    }
}

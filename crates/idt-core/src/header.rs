//! Header parser for exported table archive (.idt) files
//!
//! Every archive starts with three tab-separated lines:
//! 1. column names
//! 2. column type/key specifiers (kept raw, never interpreted)
//! 3. `[codepage] tableName keyColumn`
//!
//! The header is always 7-bit text, whatever codepage the data rows use; it is
//! decoded with [`DEFAULT_CHARSET`], so stray bytes above 0x7F are read as
//! windows-1252 rather than rejected.

use crate::error::{Error, Result};
use encoding_rs::Encoding;
use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Encoding used for headers and for tables without a codepage.
///
/// `encoding_rs` resolves the `us-ascii` label to windows-1252, which is a
/// strict superset of 7-bit ASCII.
pub const DEFAULT_CHARSET: &Encoding = encoding_rs::WINDOWS_1252;

/// Parsed table header
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Encoding of the data rows
    pub charset: &'static Encoding,
    /// Column names in file order
    pub columns: Vec<String>,
    /// Raw column type/key specifiers from line 2
    pub column_specs: Vec<String>,
    /// Codepage number from line 3, if one was given
    pub codepage: Option<u32>,
    /// Table name from line 3
    pub table_name: String,
    /// Key column specification from line 3
    pub key_columns: Vec<String>,
}

impl Header {
    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Parse the header of an archive file
pub fn parse_header<P: AsRef<Path>>(path: P) -> Result<Header> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let content = DEFAULT_CHARSET.decode_without_bom_handling(&bytes).0;
    let lines: Vec<String> = split_lines(&content).take(3).map(str::to_string).collect();
    parse_header_lines(&lines, path)
}

/// Parse a header from in-memory text (useful for testing)
pub fn parse_header_str(content: &str, source_name: &str) -> Result<Header> {
    let lines: Vec<String> = split_lines(content).take(3).map(str::to_string).collect();
    parse_header_lines(&lines, Path::new(source_name))
}

/// Split text into lines ending at `\n`, `\r\n` or a lone `\r`.
///
/// A terminator at the very end does not start an extra empty line.
pub(crate) fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = content;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(end) => {
                let line = &rest[..end];
                let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[end + terminator..];
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}

fn parse_header_lines(lines: &[String], path: &Path) -> Result<Header> {
    let malformed = |message: String| Error::MalformedHeader {
        path: path.to_path_buf(),
        message,
    };

    if lines.len() < 3 {
        return Err(malformed(format!(
            "expected 3 header lines, found {}",
            lines.len()
        )));
    }

    let columns: Vec<String> = lines[0].split('\t').map(str::to_string).collect();
    let column_specs: Vec<String> = lines[1].split('\t').map(str::to_string).collect();

    let mut seen = HashSet::new();
    for name in &columns {
        if !seen.insert(name.as_str()) {
            warn!("duplicate column '{}' in {}", name, path.display());
        }
    }

    let meta: Vec<&str> = lines[2].split('\t').collect();
    let (codepage, table_name, key_columns) = match meta.as_slice() {
        [table, key] => (None, *table, vec![key.to_string()]),
        [codepage, table, key] => {
            let codepage = parse_codepage(codepage)
                .ok_or_else(|| malformed(format!("invalid codepage '{}'", codepage)))?;
            (Some(codepage), *table, vec![key.to_string()])
        }
        _ => {
            return Err(malformed(format!(
                "expected 2 or 3 fields on line 3, found {}",
                meta.len()
            )))
        }
    };

    let charset = match codepage {
        Some(cp) => codepage_encoding(cp).ok_or_else(|| Error::UnsupportedCodepage {
            path: PathBuf::from(path),
            codepage: cp,
        })?,
        None => DEFAULT_CHARSET,
    };

    debug!(
        "header of {}: table '{}', {} columns, encoding {}",
        path.display(),
        table_name,
        columns.len(),
        charset.name()
    );

    Ok(Header {
        charset,
        columns,
        column_specs,
        codepage,
        table_name: table_name.to_string(),
        key_columns,
    })
}

/// Parse a codepage token: a positive decimal integer without leading zeros
fn parse_codepage(token: &str) -> Option<u32> {
    let mut chars = token.chars();
    match chars.next() {
        Some('1'..='9') if chars.all(|c| c.is_ascii_digit()) => token.parse().ok(),
        _ => None,
    }
}

/// Map a Windows codepage number to a text encoding
pub fn codepage_encoding(codepage: u32) -> Option<&'static Encoding> {
    let encoding = match codepage {
        866 => encoding_rs::IBM866,
        874 => encoding_rs::WINDOWS_874,
        932 => encoding_rs::SHIFT_JIS,
        936 => encoding_rs::GBK,
        949 => encoding_rs::EUC_KR,
        950 => encoding_rs::BIG5,
        1250 => encoding_rs::WINDOWS_1250,
        1251 => encoding_rs::WINDOWS_1251,
        1252 | 20127 | 28591 => encoding_rs::WINDOWS_1252,
        1253 => encoding_rs::WINDOWS_1253,
        1254 => encoding_rs::WINDOWS_1254,
        1255 => encoding_rs::WINDOWS_1255,
        1256 => encoding_rs::WINDOWS_1256,
        1257 => encoding_rs::WINDOWS_1257,
        1258 => encoding_rs::WINDOWS_1258,
        20866 => encoding_rs::KOI8_R,
        21866 => encoding_rs::KOI8_U,
        28592 => encoding_rs::ISO_8859_2,
        28593 => encoding_rs::ISO_8859_3,
        28594 => encoding_rs::ISO_8859_4,
        28595 => encoding_rs::ISO_8859_5,
        28596 => encoding_rs::ISO_8859_6,
        28597 => encoding_rs::ISO_8859_7,
        28598 => encoding_rs::ISO_8859_8,
        28603 => encoding_rs::ISO_8859_13,
        28605 => encoding_rs::ISO_8859_15,
        65001 => encoding_rs::UTF_8,
        _ => return None,
    };
    Some(encoding)
}

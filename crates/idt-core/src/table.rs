//! Column-oriented tables loaded from archive files

use crate::error::{Error, Result};
use crate::header::{parse_header, split_lines, Header};
use log::info;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A table loaded from a single archive file.
///
/// Every column holds exactly one value per row, and there is at least one
/// column. Both are checked on construction, so a `Table` is never ragged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableData")]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    source_path: PathBuf,
}

/// Unchecked wire form of a `Table`
#[derive(Deserialize)]
struct TableData {
    name: String,
    columns: Vec<Column>,
    source_path: PathBuf,
}

impl TryFrom<TableData> for Table {
    type Error = Error;

    fn try_from(data: TableData) -> Result<Self> {
        Table::new(data.name, data.columns, data.source_path)
    }
}

/// A named column and its values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: Vec<String>,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One value per row, in row order
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl Table {
    /// Build a table from columns, checking that it has at least one column
    /// and that all columns have the same length
    pub fn new(
        name: impl Into<String>,
        columns: Vec<Column>,
        source_path: impl Into<PathBuf>,
    ) -> Result<Table> {
        let name = name.into();

        let Some(first) = columns.first() else {
            return Err(Error::InvalidTable {
                table: name,
                message: "table has no columns".to_string(),
            });
        };

        let expected = first.values.len();
        if let Some(ragged) = columns.iter().find(|c| c.values.len() != expected) {
            return Err(Error::InvalidTable {
                message: format!(
                    "column '{}' has {} values, expected {}",
                    ragged.name,
                    ragged.values.len(),
                    expected
                ),
                table: name,
            });
        }

        Ok(Table {
            name,
            columns,
            source_path: source_path.into(),
        })
    }

    /// Parse the header, then the rows, of an archive file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Table> {
        let header = parse_header(path.as_ref())?;
        load_table(path, &header)
    }

    /// Table name from the header
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in header order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Source file path
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Find a column by name, failing if the table has no such column
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.find_column(name).ok_or_else(|| Error::UnknownColumn {
            table: self.name.clone(),
            column: name.to_string(),
        })
    }

    /// Get a row accessor by index
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.row_count()).then_some(Row { table: self, index })
    }

    /// Iterate over all rows in file order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.row_count()).map(move |index| Row { table: self, index })
    }

    /// Find the first row whose `column` holds `value`
    pub fn find_row(&self, column: &str, value: &str) -> Result<Option<Row<'_>>> {
        let column = self.column(column)?;
        Ok(column
            .values
            .iter()
            .position(|v| v == value)
            .map(|index| Row { table: self, index }))
    }

    /// Write the table as CSV, column names first
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(self.columns.iter().map(|c| c.name.as_str()))?;
        for row in self.rows() {
            writer.write_record(row.values())?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// A single row of a table, addressed by column name
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    /// Row position in the source table
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the value of a column in this row
    pub fn get(&self, column: &str) -> Result<&'a str> {
        let column = self.table.column(column)?;
        Ok(column.values[self.index].as_str())
    }

    /// Values of this row in column order
    pub fn values(self) -> impl Iterator<Item = &'a str> {
        let index = self.index;
        self.table
            .columns
            .iter()
            .map(move |c| c.values[index].as_str())
    }
}

/// Load the data rows of an archive file whose header is already parsed
pub fn load_table<P: AsRef<Path>>(path: P, header: &Header) -> Result<Table> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let content = header.charset.decode_without_bom_handling(&bytes).0;
    let table = build_table(&content, header, path)?;

    info!(
        "loaded table '{}' from {}: {} rows, encoding {}",
        table.name,
        path.display(),
        table.row_count(),
        header.charset.name()
    );

    Ok(table)
}

/// Parse a table from in-memory text, header lines included (useful for testing)
pub fn parse_table_str(content: &str, header: &Header, source_name: &str) -> Result<Table> {
    build_table(content, header, Path::new(source_name))
}

fn build_table(content: &str, header: &Header, path: &Path) -> Result<Table> {
    let mut columns: Vec<Column> = header
        .columns
        .iter()
        .map(|name| Column::new(name.clone(), Vec::new()))
        .collect();

    for (line_idx, line) in split_lines(content).enumerate().skip(3) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != columns.len() {
            return Err(Error::RowColumnCountMismatch {
                path: path.to_path_buf(),
                line: line_idx + 1,
                expected: columns.len(),
                found: fields.len(),
            });
        }

        for (column, field) in columns.iter_mut().zip(fields) {
            column.values.push(unescape(field).into_owned());
        }
    }

    Table::new(header.table_name.clone(), columns, path)
}

/// Replace the archive format's reserved control codes with the characters they stand for
pub fn unescape(value: &str) -> Cow<'_, str> {
    if !value.chars().any(|c| unescaped_char(c).is_some()) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(
        value
            .chars()
            .map(|c| unescaped_char(c).unwrap_or(c))
            .collect(),
    )
}

fn unescaped_char(c: char) -> Option<char> {
    match c {
        '\u{15}' => Some('\0'),
        '\u{1B}' => Some('\u{8}'),
        '\u{10}' => Some('\t'),
        '\u{19}' => Some('\n'),
        '\u{18}' => Some('\u{C}'),
        '\u{11}' => Some('\r'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::parse_header_str;

    const PROPERTY: &str = "Property\tValue\ns72\tl0\nProperty\tProperty\n\
                            ProductName\tDemo App\nEmpty\t\nARPNOMODIFY\t1\n";

    fn parse(content: &str) -> Result<Table> {
        let header = parse_header_str(content, "test.idt")?;
        parse_table_str(content, &header, "test.idt")
    }

    #[test]
    fn test_parse_simple_table() {
        let table = parse(PROPERTY).unwrap();

        assert_eq!(table.name, "Property");
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.columns()[0].name(), "Property");
        assert_eq!(table.columns()[1].values(), ["Demo App", "", "1"]);
    }

    #[test]
    fn test_trailing_empty_cell_preserved() {
        let table = parse(PROPERTY).unwrap();
        let row = table.row(1).unwrap();

        assert_eq!(row.get("Property").unwrap(), "Empty");
        assert_eq!(row.get("Value").unwrap(), "");
    }

    #[test]
    fn test_header_only_table_has_no_rows() {
        let table = parse("A\tB\ns72\ts72\nT\tA\n").unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 2);
        assert!(table.row(0).is_none());
    }

    #[test]
    fn test_row_column_count_mismatch_reports_line() {
        let content = "A\tB\ns72\ts72\nT\tA\nx\ty\nonly\n";
        match parse(content).unwrap_err() {
            Error::RowColumnCountMismatch {
                line,
                expected,
                found,
                ..
            } => {
                assert_eq!(line, 5);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unescape_all_control_codes() {
        assert_eq!(unescape("a\u{15}b"), "a\0b");
        assert_eq!(unescape("a\u{1B}b"), "a\u{8}b");
        assert_eq!(unescape("a\u{10}b"), "a\tb");
        assert_eq!(unescape("a\u{19}b"), "a\nb");
        assert_eq!(unescape("a\u{18}b"), "a\u{C}b");
        assert_eq!(unescape("a\u{11}b"), "a\rb");
        assert!(matches!(unescape("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_cells_are_unescaped() {
        let content = "A\tB\ns72\ts72\nT\tA\n\u{10}lead\tline1\u{19}line2\u{11}\n";
        let table = parse(content).unwrap();
        let row = table.row(0).unwrap();

        assert_eq!(row.get("A").unwrap(), "\tlead");
        assert_eq!(row.get("B").unwrap(), "line1\nline2\r");
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let table = parse(PROPERTY).unwrap();
        let row = table.row(0).unwrap();

        assert!(matches!(
            row.get("Nope"),
            Err(Error::UnknownColumn { ref table, ref column }) if table == "Property" && column == "Nope"
        ));
        assert!(table.find_row("Nope", "x").is_err());
    }

    #[test]
    fn test_find_row_returns_first_match() {
        let table = parse("K\tV\ns72\ts72\nT\tK\na\t1\nb\t2\na\t3\n").unwrap();

        let row = table.find_row("K", "a").unwrap().unwrap();
        assert_eq!(row.index(), 0);
        assert_eq!(row.get("V").unwrap(), "1");

        assert!(table.find_row("K", "zzz").unwrap().is_none());
    }

    #[test]
    fn test_load_table_with_codepage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Property.idt");
        let mut bytes = b"Property\tValue\ns72\tl0\n1251\tProperty\tProperty\nName\t".to_vec();
        bytes.extend_from_slice(&[0xCF, 0xF0, 0xE8]);
        bytes.push(b'\n');
        std::fs::write(&path, bytes).unwrap();

        let table = Table::load(&path).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.row(0).unwrap().get("Value").unwrap(), "При");
        assert_eq!(table.source_path(), path.as_path());
    }

    #[test]
    fn test_write_csv() {
        let table = parse("K\tV\ns72\ts72\nT\tK\na\tx,y\n").unwrap();
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "K,V\na,\"x,y\"\n");
    }

    #[test]
    fn test_ragged_columns_are_rejected() {
        let columns = vec![
            Column::new("A", vec!["a".to_string()]),
            Column::new("B", Vec::new()),
        ];

        match Table::new("T", columns, "T.idt").unwrap_err() {
            Error::InvalidTable { table, message } => {
                assert_eq!(table, "T");
                assert!(message.contains("'B'"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_table_without_columns_is_rejected() {
        assert!(matches!(
            Table::new("T", Vec::new(), "T.idt"),
            Err(Error::InvalidTable { .. })
        ));
    }

    #[test]
    fn test_deserialize_checks_column_lengths() {
        let ragged = r#"{"name": "T", "source_path": "T.idt",
            "columns": [{"name": "A", "values": ["a"]}, {"name": "B", "values": []}]}"#;
        assert!(serde_json::from_str::<Table>(ragged).is_err());

        let table = parse(PROPERTY).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(serde_json::from_str::<Table>(&json).unwrap(), table);
    }

    #[test]
    fn test_row_values_in_column_order() {
        let table = parse(PROPERTY).unwrap();
        let values: Vec<&str> = table.row(0).unwrap().values().collect();
        assert_eq!(values, vec!["ProductName", "Demo App"]);
    }

    #[test]
    fn test_lone_carriage_return_ends_a_line() {
        let table = parse("A\tB\rs72\ts72\rT\tA\rx\ty\rz\t\r").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row(1).unwrap().get("B").unwrap(), "");
    }

    #[test]
    fn test_high_bytes_without_codepage_decode_as_windows_1252() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Property.idt");
        std::fs::write(
            &path,
            b"Property\tValue\ns72\tl0\nProperty\tProperty\nName\tCaf\xe9 \x80\n",
        )
        .unwrap();

        let table = Table::load(&path).unwrap();
        assert_eq!(table.row(0).unwrap().get("Value").unwrap(), "Caf\u{e9} \u{20ac}");
    }
}

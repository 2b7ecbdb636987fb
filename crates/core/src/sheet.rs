use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{Error, Result};

/// Spreadsheet error literals treated as corrupt cells when read from CSV.
const ERROR_LITERALS: &[&str] = &[
    "#REF!", "#N/A", "#VALUE!", "#DIV/0!", "#NAME?", "#NULL!", "#NUM!",
];

/// A single spreadsheet cell, reduced to what the catalog needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A spreadsheet error value such as `#REF!`.
    Error(String),
}

impl Cell {
    /// Interpret a raw CSV field.
    pub fn from_field(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else if ERROR_LITERALS.contains(&trimmed) {
            Cell::Error(trimmed.to_string())
        } else {
            Cell::Text(field.to_string())
        }
    }

    /// Trimmed, non-empty text. Whole numbers render without a fraction so
    /// numeric SKU codes read back as `"1001"`, not `"1001.0"`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => {
                let t = s.trim();
                (!t.is_empty()).then(|| t.to_string())
            }
            Cell::Number(n) if n.is_finite() => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            Cell::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Numeric value; text cells are parsed after dropping thousands separators.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => s.trim().replace(',', "").parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Cell::Error(_))
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }
}

/// A header row plus the data rows below it.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Split raw rows at `header_row` (0-based).
    pub fn from_rows(path: &Path, mut raw: Vec<Vec<Cell>>, header_row: usize) -> Result<Self> {
        if header_row >= raw.len() {
            return Err(Error::HeaderRowOutOfRange {
                path: path.to_path_buf(),
                header_row,
                rows: raw.len(),
            });
        }
        let rows = raw.split_off(header_row + 1);
        let headers = raw
            .pop()
            .unwrap_or_default()
            .iter()
            .map(|c| c.as_text().unwrap_or_default())
            .collect();
        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Position of a header, compared trimmed and case-insensitively.
    pub fn column(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
    }

    /// Like [`Table::column`], but a missing header is an error.
    pub fn require_column(&self, table: &str, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| Error::MissingColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
    }
}

/// Read a worksheet or CSV file into a [`Table`].
///
/// `.csv` files go through the `csv` crate; every other extension is opened as
/// a workbook. `sheet` selects a worksheet by name, defaulting to the first.
/// `header_row` counts from the top of the sheet, including blank rows, for
/// both workbooks and CSV files.
pub fn read_table(path: &Path, sheet: Option<&str>, header_row: usize) -> Result<Table> {
    if !path.is_file() {
        return Err(Error::TableNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let raw = match ext.as_str() {
        "csv" => read_csv_rows(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook_rows(path, sheet)?,
        _ => return Err(Error::UnsupportedTable(path.to_path_buf())),
    };

    Table::from_rows(path, raw, header_row)
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let data = fs::read(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_slice());

    // The csv reader drops empty lines; put them back as empty rows so
    // `header_row` means the same line it would in a workbook.
    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut consumed = 0;
    while reader.read_record(&mut record)? {
        let skipped = blank_lines_at(&data, consumed);
        rows.extend(std::iter::repeat_with(Vec::new).take(skipped));
        rows.push(record.iter().map(Cell::from_field).collect());
        consumed = reader.position().byte() as usize;
    }
    Ok(rows)
}

/// Count the empty lines starting at byte `start`, which is where the
/// previous record ended.
fn blank_lines_at(data: &[u8], start: usize) -> usize {
    let mut i = start;
    // A CRLF terminator ends the record at `\r` and leaves its `\n` behind.
    if i > 0 && data.get(i - 1) == Some(&b'\r') && data.get(i) == Some(&b'\n') {
        i += 1;
    }

    let mut count = 0;
    while let Some(&b) = data.get(i) {
        match b {
            b'\n' => i += 1,
            b'\r' => {
                i += 1;
                if data.get(i) == Some(&b'\n') {
                    i += 1;
                }
            }
            _ => break,
        }
        count += 1;
    }
    count
}

fn read_workbook_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open_workbook_auto(path)?;

    let name = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(Error::SheetNotFound {
                    path: path.to_path_buf(),
                    sheet: name.to_string(),
                });
            }
            name.to_string()
        }
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| Error::EmptyWorkbook(path.to_path_buf()))?,
    };

    let range = workbook.worksheet_range(&name)?;

    // The used range may start below/right of A1; pad so row and column
    // positions match the sheet.
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(Cell::from));
        rows.push(cells);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Cell ────────────────────────────────────────────────────

    #[test]
    fn test_cell_from_field() {
        assert_eq!(Cell::from_field("  "), Cell::Empty);
        assert_eq!(Cell::from_field("#REF!"), Cell::Error("#REF!".to_string()));
        assert_eq!(Cell::from_field(" SR-CLE "), Cell::Text(" SR-CLE ".to_string()));
    }

    #[test]
    fn test_cell_as_text() {
        assert_eq!(Cell::Text("  BT-AQ ".into()).as_text(), Some("BT-AQ".to_string()));
        assert_eq!(Cell::Number(1001.0).as_text(), Some("1001".to_string()));
        assert_eq!(Cell::Number(12.5).as_text(), Some("12.5".to_string()));
        assert_eq!(Cell::Empty.as_text(), None);
        assert_eq!(Cell::Error("#N/A".into()).as_text(), None);
        assert_eq!(Cell::Number(f64::NAN).as_text(), None);
    }

    #[test]
    fn test_cell_as_number() {
        assert_eq!(Cell::Number(4999.0).as_number(), Some(4999.0));
        assert_eq!(Cell::Text(" 12,499 ".into()).as_number(), Some(12499.0));
        assert_eq!(Cell::Text("n/a".into()).as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
    }

    #[test]
    fn test_cell_from_calamine_data() {
        assert_eq!(Cell::from(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(Cell::from(&Data::String(" ".into())), Cell::Empty);
        assert!(Cell::from(&Data::Error(calamine::CellErrorType::Ref)).is_error());
    }

    // ── Table ───────────────────────────────────────────────────

    fn text_row(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::from_field(v)).collect()
    }

    #[test]
    fn test_table_header_offset() {
        let raw = vec![
            text_row(&["Dimensions Master"]),
            text_row(&[""]),
            text_row(&["MTP SKU Code", "Lcm"]),
            text_row(&["SR-CLE", "60"]),
        ];
        let table = Table::from_rows(Path::new("dims.csv"), raw, 2).unwrap();
        assert_eq!(table.headers(), &["MTP SKU Code", "Lcm"]);
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.column("lcm"), Some(1));
    }

    #[test]
    fn test_table_header_row_out_of_range() {
        let err = Table::from_rows(Path::new("x.csv"), vec![text_row(&["a"])], 3).unwrap_err();
        assert!(matches!(err, Error::HeaderRowOutOfRange { rows: 1, .. }));
    }

    #[test]
    fn test_table_column_trimmed_case_insensitive() {
        let raw = vec![text_row(&["SKU Code", " Child Color"])];
        let table = Table::from_rows(Path::new("x.csv"), raw, 0).unwrap();
        assert_eq!(table.column("child color"), Some(1));
        assert!(table.require_column("SKU", "MRP").is_err());
    }

    // ── read_table ──────────────────────────────────────────────

    #[test]
    fn test_read_csv_table() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("skus.csv");
        fs::write(&path, "SKU Code,MRP\nSR-CLE-W,4999\nBT-AQ-W\n").unwrap();

        let table = read_table(&path, None, 0).unwrap();
        assert_eq!(table.headers(), &["SKU Code", "MRP"]);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0][1].as_number(), Some(4999.0));
        // Short rows are allowed
        assert_eq!(table.rows()[1].len(), 1);
    }

    #[test]
    fn test_read_csv_header_offset_counts_blank_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("dims.csv");
        fs::write(&path, "Dimensions Master\n\nMTP SKU Code,Lcm\nSR-CLE,60\n").unwrap();

        let table = read_table(&path, None, 2).unwrap();
        assert_eq!(table.headers(), &["MTP SKU Code", "Lcm"]);
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.rows()[0][1].as_number(), Some(60.0));
    }

    #[test]
    fn test_read_csv_blank_lines_with_crlf() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("dims.csv");
        fs::write(&path, "Dimensions Master\r\n\r\n\r\nMTP SKU Code,Lcm\r\nSR-CLE,60\r\n").unwrap();

        let table = read_table(&path, None, 3).unwrap();
        assert_eq!(table.headers(), &["MTP SKU Code", "Lcm"]);
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn test_read_csv_blank_line_between_data_rows_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("skus.csv");
        fs::write(&path, "SKU Code\nSR-CLE-W\n\nBT-AQ-W\n").unwrap();

        let table = read_table(&path, None, 0).unwrap();
        assert_eq!(table.rows().len(), 3);
        assert!(table.rows()[1].is_empty());
        assert_eq!(table.rows()[2][0].as_text(), Some("BT-AQ-W".to_string()));
    }

    #[test]
    fn test_blank_lines_at() {
        assert_eq!(blank_lines_at(b"a\n\n\nb", 2), 2);
        assert_eq!(blank_lines_at(b"a\r\n\r\nb", 2), 1);
        assert_eq!(blank_lines_at(b"a\nb", 2), 0);
        assert_eq!(blank_lines_at(b"\n\nb", 0), 2);
    }

    #[test]
    fn test_read_table_missing_file() {
        let err = read_table(Path::new("/nonexistent/skus.xlsx"), None, 0).unwrap_err();
        assert!(matches!(err, Error::TableNotFound(_)));
    }

    #[test]
    fn test_read_table_unsupported_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("skus.json");
        fs::write(&path, "[]").unwrap();
        let err = read_table(&path, None, 0).unwrap_err();
        assert!(matches!(err, Error::UnsupportedTable(_)));
    }

    #[test]
    fn test_read_corrupt_workbook_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("skus.xlsx");
        fs::write(&path, b"not a zip archive").unwrap();
        assert!(read_table(&path, None, 0).is_err());
    }
}

//! Parser for lab result exports: delimited text or xlsx workbooks.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use sha2::{Digest, Sha256};

use super::source::{DataTable, SourceMetadata};
use crate::error::{Result, WaterMetalError};

/// Delimiters to try when auto-detecting, most specific first.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Number of leading lines inspected when detecting the delimiter.
const SNIFF_LINES: usize = 10;

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Quote character.
    pub quote: u8,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
            max_rows: None,
        }
    }
}

/// Parses delimited text or xlsx workbooks into a [`DataTable`].
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the table with its source metadata.
    ///
    /// `.xlsx`/`.xlsm` files are read as workbooks; anything else as
    /// delimited text.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| WaterMetalError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let (table, format) = if is_workbook(path) {
            (self.parse_workbook(&contents)?, "xlsx")
        } else {
            let delimiter = match self.config.delimiter {
                Some(d) => d,
                None => detect_delimiter(&contents)?,
            };
            (self.parse_bytes(&contents, delimiter)?, format_name(delimiter))
        };

        log::debug!(
            "parsed {} as {} ({} rows, {} columns)",
            path.display(),
            format,
            table.row_count(),
            table.column_count()
        );

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            contents.len() as u64,
            format.to_string(),
            table.row_count(),
            table.column_count(),
        );

        Ok((table, metadata))
    }

    /// Parse in-memory text, detecting the delimiter unless configured.
    pub fn parse_str(&self, text: &str) -> Result<DataTable> {
        let bytes = text.as_bytes();
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        self.parse_bytes(bytes, delimiter)
    }

    /// Parse the first worksheet of an xlsx workbook. Its first row holds
    /// the headers.
    pub fn parse_workbook(&self, bytes: &[u8]) -> Result<DataTable> {
        let mut workbook = Xlsx::new(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| WaterMetalError::EmptyData("Workbook has no worksheets".to_string()))??;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|row| row.iter().map(cell_text).collect())
            .unwrap_or_default();
        let records = rows.map(|row| -> Result<Vec<String>> {
            Ok(row.iter().map(cell_text).collect())
        });
        self.collect_rows(headers, records)
    }

    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        let records = reader.records().map(|record| -> Result<Vec<String>> {
            let record = record?;
            Ok(record.iter().map(|s| s.to_string()).collect())
        });
        self.collect_rows(headers, records)
    }

    fn collect_rows<I>(&self, headers: Vec<String>, records: I) -> Result<DataTable>
    where
        I: Iterator<Item = Result<Vec<String>>>,
    {
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(WaterMetalError::EmptyData("No columns found".to_string()));
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();
        for (row_idx, record) in records.enumerate() {
            if self.config.max_rows.is_some_and(|max| row_idx >= max) {
                break;
            }
            let mut row = record?;
            // Spreadsheet exports often end with rows of bare delimiters.
            if row.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            row.resize(expected_cols, String::new());
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(WaterMetalError::EmptyData("No data rows found".to_string()));
        }

        Ok(DataTable::new(headers, rows))
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("xlsm"))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        // #N/A, #DIV/0! and friends read as missing
        Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

fn format_name(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}

/// Detect the delimiter from the first few non-blank lines.
///
/// A delimiter that appears the same number of times on every line wins;
/// among consistent candidates the higher count wins, with a small bonus
/// for tabs since they rarely occur inside values.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    if lines.is_empty() {
        return Err(WaterMetalError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let score = if counts.iter().all(|&c| c == first_count) {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, ignoring quoted sections.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"S.No,Pb,Cd\n1,40,2\n2,10,0.5";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"S.No\tPb\tCd\n1\t40\t2\n2\t10\t0.5";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_semicolon_with_decimal_commas_quoted() {
        let data = b"site;Pb;Zn\nA;\"40,1\";12\nB;\"10,0\";9";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_parse_str_pads_short_rows() {
        let table = Parser::new().parse_str("site,Pb,Cd\nA,40\nB,10,1\n").unwrap();

        assert_eq!(table.headers, vec!["site", "Pb", "Cd"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 2), Some(""));
        assert_eq!(table.get(1, 2), Some("1"));
    }

    #[test]
    fn test_parse_str_skips_blank_trailing_rows() {
        let table = Parser::new().parse_str("site,Pb\nA,40\n,\n,\n").unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_parse_str_header_only_is_empty() {
        let err = Parser::new().parse_str("site,Pb\n").unwrap_err();
        assert!(matches!(err, WaterMetalError::EmptyData(_)));
    }

    #[test]
    fn test_max_rows() {
        let parser = Parser::with_config(ParserConfig {
            max_rows: Some(1),
            ..ParserConfig::default()
        });
        let table = parser.parse_str("site,Pb\nA,1\nB,2\nC,3\n").unwrap();
        assert_eq!(table.row_count(), 1);
    }

    fn write_workbook(path: &Path) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["S.No", "Pb (mg/kg)", "Zn"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_number(1, 0, 1.0).unwrap();
        sheet.write_number(1, 1, 40.0).unwrap();
        sheet.write_number(1, 2, 95.5).unwrap();
        sheet.write_number(2, 0, 2.0).unwrap();
        sheet.write_string(2, 1, "ND").unwrap();
        sheet.write_number(2, 2, 120.0).unwrap();
        sheet.write_number(3, 0, 3.0).unwrap();
        sheet.write_number(3, 1, 12.0).unwrap();

        let other = workbook.add_worksheet();
        other.write_string(0, 0, "notes").unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_parse_workbook_first_sheet() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("stations.xlsx");
        write_workbook(&path);

        let (table, source) = Parser::new().parse_file(&path).unwrap();

        assert_eq!(source.format, "xlsx");
        assert_eq!(table.headers, vec!["S.No", "Pb (mg/kg)", "Zn"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.get(0, 1), Some("40"));
        assert_eq!(table.get(0, 2), Some("95.5"));
        assert_eq!(table.get(1, 1), Some("ND"));
        assert_eq!(table.get(2, 2), Some(""));
    }

    #[test]
    fn test_workbook_extension_with_text_content_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        fs::write(&path, "S.No,Pb\n1,40\n").unwrap();

        let err = Parser::new().parse_file(&path).unwrap_err();
        assert!(matches!(err, WaterMetalError::Workbook(_)));
    }

    #[test]
    fn test_is_null_value() {
        assert!(DataTable::is_null_value(""));
        assert!(DataTable::is_null_value("NA"));
        assert!(DataTable::is_null_value("n/a"));
        assert!(DataTable::is_null_value("NaN"));
        assert!(DataTable::is_null_value("-"));
        assert!(!DataTable::is_null_value("0"));
        assert!(!DataTable::is_null_value("-1.5"));
    }
}

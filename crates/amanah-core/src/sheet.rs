//! Workbook parsing for bulk import
//!
//! Turns raw xlsx bytes into named sheets of header-labelled rows. Real-world
//! upload sheets routinely carry title banners and merged cells above the
//! actual header, so the header row is auto-detected rather than assumed to
//! be row 0.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::Result;

/// How many leading physical rows are scanned for the header row
const HEADER_SCAN_ROWS: usize = 10;

/// A header row must have more populated cells than this to qualify
const HEADER_MIN_CELLS: usize = 5;

/// A typed cell value from a parsed sheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

/// One data row, keyed by upper-cased trimmed header label.
///
/// Columns with empty cells are absent from the map; duplicate header labels
/// are last-one-wins.
pub type RawRow = HashMap<String, CellValue>;

/// One parsed sheet from an uploaded workbook
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub name: String,
    /// Zero-based physical index of the detected header row
    pub header_row: usize,
    pub rows: Vec<RawRow>,
}

/// Parse all sheets of an xlsx workbook from raw bytes.
///
/// A sheet that cannot be read as tabular data yields an empty row list
/// rather than failing the whole workbook; only an unreadable container is a
/// hard error.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<ParsedSheet>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let sheet = match workbook.worksheet_range(&name) {
            Ok(range) => parse_sheet(&name, &range),
            Err(e) => {
                warn!("Sheet '{}' could not be read: {}", name, e);
                ParsedSheet {
                    name,
                    header_row: 0,
                    rows: Vec::new(),
                }
            }
        };
        sheets.push(sheet);
    }

    Ok(sheets)
}

fn parse_sheet(name: &str, range: &Range<Data>) -> ParsedSheet {
    // calamine trims to the used range; keep track of its top row so the
    // reported header index stays physical
    let start_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let all_rows: Vec<&[Data]> = range.rows().collect();
    let detected = detect_header_row(&all_rows);
    let header_row = start_row + detected;

    let headers: Vec<String> = match all_rows.get(detected) {
        Some(row) => row.iter().map(header_label).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for row in all_rows.iter().skip(detected + 1) {
        let mut record: RawRow = HashMap::new();
        for (col, cell) in row.iter().enumerate() {
            let Some(label) = headers.get(col).filter(|l| !l.is_empty()) else {
                continue;
            };
            if let Some(value) = cell_value(cell) {
                record.insert(label.clone(), value);
            }
        }
        rows.push(record);
    }

    debug!(
        "Parsed sheet '{}': header at row {}, {} data rows",
        name,
        header_row,
        rows.len()
    );

    ParsedSheet {
        name: name.to_string(),
        header_row,
        rows,
    }
}

/// Find the header row: the first of the leading rows with more than
/// [`HEADER_MIN_CELLS`] populated cells. Falls back to row 0 when none
/// qualifies (e.g. narrow or empty sheets).
fn detect_header_row(rows: &[&[Data]]) -> usize {
    for (idx, row) in rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
        let populated = row.iter().filter(|c| !cell_is_empty(c)).count();
        if populated > HEADER_MIN_CELLS {
            return idx;
        }
    }
    0
}

fn cell_is_empty(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Render a header cell as an upper-cased trimmed label
fn header_label(cell: &Data) -> String {
    let label = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            // Use integer representation when the value is whole
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    };
    label.to_uppercase()
}

/// Convert a data cell to a typed value; empty/error cells map to None
fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(CellValue::Text(trimmed.to_string()))
            }
        }
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Text(b.to_string())),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ndt| CellValue::Date(ndt.date()))
            .or_else(|| Some(CellValue::Number(dt.as_f64()))),
        Data::DateTimeIso(s) => NaiveDate::parse_from_str(&s[..s.len().min(10)], "%Y-%m-%d")
            .ok()
            .map(CellValue::Date)
            .or_else(|| Some(CellValue::Text(s.clone()))),
        Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(_) | Data::Empty => None,
    }
}

//! Export shaping for contribution and membership records
//!
//! The inverse of the import mapper: stored records become spreadsheet-ready
//! rows grouped by calendar month, with internal fields (IDs, organization
//! and admin references, timestamps) stripped and a canonical column layout
//! that the import aliases recognize on re-import.

use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{FinancialRecord, MembershipRecord};

/// Number format applied to numeric cells in xlsx exports
pub const NUMBER_FORMAT: &str = "#,##0.00";

const MONTH_NAMES: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

/// A single display cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportCell {
    /// Rendered as a blank cell (also used for zero fund amounts, keeping
    /// exported sheets visually clean)
    Empty,
    Text(String),
    Number(f64),
}

/// One output row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportRow {
    /// Blank row between month groups
    Separator,
    /// Single-cell month header, e.g. "JANUARY 2024"
    GroupHeader(String),
    /// Data row: (column label, display value) pairs in column order
    Record(Vec<(String, ExportCell)>),
}

/// A shaped, spreadsheet-ready export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSheet {
    pub columns: Vec<String>,
    pub rows: Vec<ExportRow>,
}

/// Canonical financial column layout, in display order
pub fn financial_columns() -> Vec<String> {
    let mut columns = vec![
        "RECEIPT NO".to_string(),
        "CHANDA NO".to_string(),
        "NAME".to_string(),
    ];
    for (label, _) in crate::models::FundBreakdown::default().labelled() {
        columns.push(label.to_string());
    }
    columns.push("TOTAL (NGN)".to_string());
    columns.push("MONTH PAID FOR".to_string());
    columns.push("DATE".to_string());
    columns
}

/// Canonical membership column layout, in display order
pub fn membership_columns() -> Vec<String> {
    [
        "S/N",
        "SURNAME",
        "OTHER NAMES",
        "TITLE",
        "MAJLIS",
        "CHANDA NO",
        "WASIYYAT NO",
        "PRESENCE",
        "FAMILY",
        "ELECTION",
        "ACADEMIC STATUS",
        "DATE OF BIRTH",
        "EMAIL",
        "PHONE",
        "ADDRESS",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn text_cell(value: &str) -> ExportCell {
    if value.trim().is_empty() {
        ExportCell::Empty
    } else {
        ExportCell::Text(value.trim().to_string())
    }
}

/// Fund amounts render blank when zero
fn amount_cell(value: f64) -> ExportCell {
    if value == 0.0 {
        ExportCell::Empty
    } else {
        ExportCell::Number(value)
    }
}

fn date_cell(date: Option<NaiveDate>) -> ExportCell {
    match date {
        Some(d) => ExportCell::Text(d.format("%d/%m/%Y").to_string()),
        None => ExportCell::Empty,
    }
}

fn financial_cells(rec: &FinancialRecord) -> Vec<(String, ExportCell)> {
    let mut cells = vec![
        ("RECEIPT NO".to_string(), text_cell(&rec.receipt_no)),
        ("CHANDA NO".to_string(), text_cell(&rec.chanda_no)),
        ("NAME".to_string(), text_cell(&rec.name)),
    ];
    for (label, amount) in rec.funds.labelled() {
        cells.push((label.to_string(), amount_cell(amount)));
    }
    // The total renders even when zero; it is the ledger's headline column
    cells.push(("TOTAL (NGN)".to_string(), ExportCell::Number(rec.total_ngn)));
    cells.push((
        "MONTH PAID FOR".to_string(),
        text_cell(&rec.month_paid_for.to_uppercase()),
    ));
    cells.push(("DATE".to_string(), date_cell(rec.date)));
    cells
}

fn membership_cells(rec: &MembershipRecord) -> Vec<(String, ExportCell)> {
    vec![
        ("S/N".to_string(), text_cell(&rec.sn)),
        ("SURNAME".to_string(), text_cell(&rec.surname)),
        ("OTHER NAMES".to_string(), text_cell(&rec.other_names)),
        ("TITLE".to_string(), text_cell(&rec.title)),
        ("MAJLIS".to_string(), text_cell(&rec.majlis)),
        ("CHANDA NO".to_string(), text_cell(&rec.chanda_no)),
        ("WASIYYAT NO".to_string(), text_cell(&rec.wasiyyat_no)),
        ("PRESENCE".to_string(), text_cell(&rec.presence)),
        ("FAMILY".to_string(), text_cell(&rec.family)),
        ("ELECTION".to_string(), text_cell(&rec.election)),
        (
            "ACADEMIC STATUS".to_string(),
            text_cell(&rec.academic_status),
        ),
        ("DATE OF BIRTH".to_string(), date_cell(rec.date_of_birth)),
        ("EMAIL".to_string(), text_cell(&rec.email)),
        ("PHONE".to_string(), text_cell(&rec.phone)),
        ("ADDRESS".to_string(), text_cell(&rec.address)),
    ]
}

fn project_columns(canonical: Vec<String>, wanted: Option<&[String]>) -> Vec<String> {
    match wanted {
        Some(subset) => canonical
            .into_iter()
            .filter(|label| subset.iter().any(|w| w.eq_ignore_ascii_case(label)))
            .collect(),
        None => canonical,
    }
}

fn project_cells(
    cells: Vec<(String, ExportCell)>,
    columns: &[String],
) -> Vec<(String, ExportCell)> {
    cells
        .into_iter()
        .filter(|(label, _)| columns.iter().any(|c| c == label))
        .collect()
}

/// Walk records already sorted ascending by their grouping date, emitting a
/// month header (preceded by a blank separator after the first group) at
/// every calendar-month boundary.
fn shape<R>(
    records: &[R],
    group_date: impl Fn(&R) -> NaiveDate,
    cells: impl Fn(&R) -> Vec<(String, ExportCell)>,
    columns: Vec<String>,
) -> ExportSheet {
    let mut rows = Vec::new();
    let mut current_group: Option<(i32, u32)> = None;

    for rec in records {
        let date = group_date(rec);
        let key = (date.year(), date.month());
        if current_group != Some(key) {
            if current_group.is_some() {
                rows.push(ExportRow::Separator);
            }
            let label = format!("{} {}", MONTH_NAMES[key.1 as usize - 1], key.0);
            rows.push(ExportRow::GroupHeader(label));
            current_group = Some(key);
        }
        rows.push(ExportRow::Record(project_cells(cells(rec), &columns)));
    }

    ExportSheet { columns, rows }
}

/// Shape contributions for export. `columns` optionally projects a subset of
/// the canonical layout (canonical display order is preserved).
pub fn shape_financial(records: &[FinancialRecord], columns: Option<&[String]>) -> ExportSheet {
    let columns = project_columns(financial_columns(), columns);
    shape(
        records,
        |rec| rec.date.unwrap_or_else(|| rec.created_at.date_naive()),
        financial_cells,
        columns,
    )
}

/// Shape members for export, grouped by the month they were entered
pub fn shape_membership(records: &[MembershipRecord], columns: Option<&[String]>) -> ExportSheet {
    let columns = project_columns(membership_columns(), columns);
    shape(
        records,
        |rec| rec.created_at.date_naive(),
        membership_cells,
        columns,
    )
}

/// Serialize a shaped export to xlsx bytes
pub fn write_workbook(sheet: &ExportSheet, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let bold = Format::new().set_bold();
    let number_format = Format::new().set_num_format(NUMBER_FORMAT);

    for (col, label) in sheet.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, label, &bold)?;
    }

    let mut row_idx: u32 = 1;
    for row in &sheet.rows {
        match row {
            ExportRow::Separator => { /* Leave the row blank */ }
            ExportRow::GroupHeader(label) => {
                worksheet.write_string_with_format(row_idx, 0, label, &bold)?;
            }
            ExportRow::Record(cells) => {
                for (col, (_, cell)) in cells.iter().enumerate() {
                    match cell {
                        ExportCell::Empty => { /* Leave cell empty */ }
                        ExportCell::Text(s) => {
                            worksheet.write_string(row_idx, col as u16, s)?;
                        }
                        ExportCell::Number(n) => {
                            worksheet.write_number_with_format(
                                row_idx,
                                col as u16,
                                *n,
                                &number_format,
                            )?;
                        }
                    }
                }
            }
        }
        row_idx += 1;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Serialize a shaped export to CSV text
pub fn write_csv(sheet: &ExportSheet) -> String {
    let mut csv = String::new();
    csv.push_str(
        &sheet
            .columns
            .iter()
            .map(|c| escape_csv_field(c))
            .collect::<Vec<_>>()
            .join(","),
    );
    csv.push('\n');

    for row in &sheet.rows {
        match row {
            ExportRow::Separator => csv.push('\n'),
            ExportRow::GroupHeader(label) => {
                csv.push_str(&escape_csv_field(label));
                csv.push('\n');
            }
            ExportRow::Record(cells) => {
                let line = cells
                    .iter()
                    .map(|(_, cell)| match cell {
                        ExportCell::Empty => String::new(),
                        ExportCell::Text(s) => escape_csv_field(s),
                        ExportCell::Number(n) => format!("{:.2}", n),
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                csv.push_str(&line);
                csv.push('\n');
            }
        }
    }

    csv
}

/// Escape a field for CSV output
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::map_financial_row;
    use crate::models::{FundBreakdown, NewFinancialRecord};
    use crate::sheet::CellValue;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn record(id: i64, date: Option<NaiveDate>, total: f64) -> FinancialRecord {
        FinancialRecord {
            id,
            organization_id: 1,
            admin_id: Some(1),
            chanda_no: format!("CH-{}", id),
            name: format!("Contributor {}", id),
            receipt_no: format!("R-{}", id),
            date,
            month_paid_for: "JAN2024".to_string(),
            funds: FundBreakdown {
                chanda_aam: 100.0,
                ..Default::default()
            },
            total_ngn: total,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_month_grouping_order() {
        let records = vec![
            record(1, NaiveDate::from_ymd_opt(2024, 1, 15), 100.0),
            record(2, NaiveDate::from_ymd_opt(2024, 1, 20), 200.0),
            record(3, NaiveDate::from_ymd_opt(2024, 2, 1), 300.0),
        ];

        let sheet = shape_financial(&records, None);
        assert_eq!(
            sheet.rows[0],
            ExportRow::GroupHeader("JANUARY 2024".to_string())
        );
        assert!(matches!(sheet.rows[1], ExportRow::Record(_)));
        assert!(matches!(sheet.rows[2], ExportRow::Record(_)));
        assert_eq!(sheet.rows[3], ExportRow::Separator);
        assert_eq!(
            sheet.rows[4],
            ExportRow::GroupHeader("FEBRUARY 2024".to_string())
        );
        assert!(matches!(sheet.rows[5], ExportRow::Record(_)));
        assert_eq!(sheet.rows.len(), 6);
    }

    #[test]
    fn test_dateless_records_group_by_created_at() {
        let records = vec![record(1, None, 100.0)];
        let sheet = shape_financial(&records, None);
        assert_eq!(
            sheet.rows[0],
            ExportRow::GroupHeader("MARCH 2024".to_string())
        );
    }

    #[test]
    fn test_zero_funds_render_empty() {
        let records = vec![record(1, NaiveDate::from_ymd_opt(2024, 1, 15), 100.0)];
        let sheet = shape_financial(&records, None);

        let ExportRow::Record(cells) = &sheet.rows[1] else {
            panic!("expected a data row");
        };
        let cell = |label: &str| {
            cells
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, c)| c.clone())
                .unwrap()
        };
        assert_eq!(cell("CHANDA AAM"), ExportCell::Number(100.0));
        assert_eq!(cell("ZAKAT"), ExportCell::Empty);
        assert_eq!(cell("TOTAL (NGN)"), ExportCell::Number(100.0));
        assert_eq!(cell("DATE"), ExportCell::Text("15/01/2024".to_string()));
    }

    #[test]
    fn test_column_projection_preserves_canonical_order() {
        let records = vec![record(1, NaiveDate::from_ymd_opt(2024, 1, 15), 100.0)];
        // Requested out of order; canonical order must win
        let wanted = vec![
            "TOTAL (NGN)".to_string(),
            "name".to_string(),
            "RECEIPT NO".to_string(),
        ];
        let sheet = shape_financial(&records, Some(&wanted));

        assert_eq!(sheet.columns, vec!["RECEIPT NO", "NAME", "TOTAL (NGN)"]);
        let ExportRow::Record(cells) = &sheet.rows[1] else {
            panic!("expected a data row");
        };
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].0, "RECEIPT NO");
    }

    #[test]
    fn test_reimport_of_export_reconstructs_record() {
        let original = NewFinancialRecord {
            chanda_no: "CH-104".to_string(),
            name: "Bashir Ahmad".to_string(),
            receipt_no: "R-0042".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15),
            month_paid_for: "JAN2024, FEB2024".to_string(),
            funds: FundBreakdown {
                chanda_aam: 1000.0,
                mosque_donation: 250.5,
                ..Default::default()
            },
            total_ngn: 1250.5,
        };
        let stored = FinancialRecord {
            id: 1,
            organization_id: 1,
            admin_id: None,
            chanda_no: original.chanda_no.clone(),
            name: original.name.clone(),
            receipt_no: original.receipt_no.clone(),
            date: original.date,
            month_paid_for: original.month_paid_for.clone(),
            funds: original.funds.clone(),
            total_ngn: original.total_ngn,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        };

        let sheet = shape_financial(&[stored], None);
        let ExportRow::Record(cells) = &sheet.rows[1] else {
            panic!("expected a data row");
        };

        // Feed the exported row back through the import mapper
        let raw: HashMap<String, CellValue> = cells
            .iter()
            .filter_map(|(label, cell)| {
                let value = match cell {
                    ExportCell::Empty => return None,
                    ExportCell::Text(s) => CellValue::Text(s.clone()),
                    ExportCell::Number(n) => CellValue::Number(*n),
                };
                Some((label.clone(), value))
            })
            .collect();
        let roundtripped = map_financial_row(&raw);

        assert_eq!(roundtripped.chanda_no, original.chanda_no);
        assert_eq!(roundtripped.name, original.name);
        assert_eq!(roundtripped.receipt_no, original.receipt_no);
        assert_eq!(roundtripped.date, original.date);
        assert_eq!(roundtripped.month_paid_for, original.month_paid_for);
        assert_eq!(roundtripped.funds, original.funds);
        assert_eq!(roundtripped.total_ngn, original.total_ngn);
    }

    #[test]
    fn test_write_workbook_roundtrips_through_parser() {
        let records = vec![
            record(1, NaiveDate::from_ymd_opt(2024, 1, 15), 100.0),
            record(2, NaiveDate::from_ymd_opt(2024, 2, 1), 200.0),
        ];
        let sheet = shape_financial(&records, None);
        let bytes = write_workbook(&sheet, "Contributions").unwrap();

        let parsed = crate::sheet::parse_workbook(&bytes).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "Contributions");
        // Header row 0 qualifies (well over 5 populated cells), so data rows
        // include group headers, separators and records
        assert_eq!(parsed[0].header_row, 0);
        assert!(!parsed[0].rows.is_empty());
    }

    #[test]
    fn test_write_csv() {
        let records = vec![record(1, NaiveDate::from_ymd_opt(2024, 1, 15), 1234.5)];
        let sheet = shape_financial(
            &records,
            Some(&["NAME".to_string(), "TOTAL (NGN)".to_string()]),
        );
        let csv = write_csv(&sheet);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "NAME,TOTAL (NGN)");
        assert_eq!(lines[1], "JANUARY 2024");
        assert_eq!(lines[2], "Contributor 1,1234.50");
    }

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("simple"), "simple");
        assert_eq!(escape_csv_field("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv_field("with\"quote"), "\"with\"\"quote\"");
    }
}

//! Bulk import pipeline: row mapping, validity filtering, per-sheet
//! orchestration
//!
//! Supplier workbooks arrive with inconsistent column labels across chapters
//! and years, so each canonical field is looked up under a prioritized list
//! of acceptable aliases. Mapping is total: unknown or unparsable cells
//! degrade to zero / empty / null rather than failing a row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::models::{
    normalize_majlis, FundBreakdown, NewFinancialRecord, NewMembershipRecord, RecordKind,
};
use crate::sheet::{CellValue, ParsedSheet, RawRow};

/// Column alias tables, consulted in priority order.
///
/// Labels are matched against upper-cased trimmed sheet headers.
mod aliases {
    pub const CHANDA_NO: &[&str] = &["CHANDA NO", "CHANDA NO.", "CHANDA NUMBER", "AIMS NO"];
    pub const NAME: &[&str] = &["NAME", "FULL NAME", "NAMES", "CONTRIBUTOR"];
    pub const RECEIPT_NO: &[&str] = &["RECEIPT NO", "RECEIPT NO.", "RCPT NO", "RECEIPT"];
    pub const DATE: &[&str] = &["DATE", "PAYMENT DATE", "DATE PAID"];
    pub const MONTH_PAID_FOR: &[&str] =
        &["MONTH PAID FOR", "MONTH(S) PAID FOR", "MONTHS PAID", "MONTH"];
    pub const TOTAL: &[&str] = &["TOTAL (NGN)", "SUB TOTAL", "TOTAL", "GRAND TOTAL"];

    pub const CHANDA_AAM: &[&str] = &["CHANDA AAM", "AAM"];
    pub const CHANDA_WASIYYAT: &[&str] = &["CHANDA WASIYYAT", "WASIYYAT"];
    pub const JALSA_SALANA: &[&str] = &["JALSA SALANA", "JALSA"];
    pub const TAHRIK_JADID: &[&str] = &["TAHRIK JADID", "TAHRIK-E-JADID", "TEHRIK JADID"];
    pub const WAQF_JADID: &[&str] = &["WAQF JADID", "WAQF-E-JADID", "WAQFI JADID"];
    pub const ZAKAT: &[&str] = &["ZAKAT", "ZAKAAT"];
    pub const FITRANA: &[&str] = &["FITRANA", "FITR"];
    pub const SADAQAT: &[&str] = &["SADAQAT", "SADAQA", "SADAQAH"];
    // "MOAQUE" is a recurring supplier misspelling; keep it first
    pub const MOSQUE_DONATION: &[&str] = &["MOAQUE DONATION", "MOSQUE DONATION", "MOSQUE"];
    pub const MTA: &[&str] = &["MTA", "MTA DONATION"];
    pub const MARYAM_FUND: &[&str] = &["MARYAM FUND", "MARYAM"];
    pub const SCHOLARSHIP: &[&str] = &["SCHOLARSHIP", "SCHOLARSHIP FUND"];
    pub const WELFARE: &[&str] = &["WELFARE", "WELFARE FUND"];
    pub const PUBLICATIONS: &[&str] = &["PUBLICATIONS", "PUBLICATION"];
    pub const CENTENARY: &[&str] = &["CENTENARY", "CENTENARY JUBILEE"];
    pub const EID_FUND: &[&str] = &["EID FUND", "EID"];
    pub const TABLIGH: &[&str] = &["TABLIGH"];
    pub const HISSA_JAIDAD: &[&str] = &["HISSA JAIDAD", "WASIYYAT HISSA JAIDAD"];
    pub const NATIONAL_LIABILITY: &[&str] = &["NATIONAL LIABILITY", "LIABILITY"];
    pub const MISCELLANEOUS: &[&str] = &["MISCELLANEOUS", "MISC", "OTHERS"];

    pub const SN: &[&str] = &["S/N", "SN", "S/NO", "NO"];
    pub const SURNAME: &[&str] = &["SURNAME", "LAST NAME"];
    pub const OTHER_NAMES: &[&str] = &["OTHER NAMES", "OTHERNAMES", "FIRST NAME", "FIRST NAMES"];
    pub const TITLE: &[&str] = &["TITLE"];
    pub const MAJLIS: &[&str] = &["MAJLIS", "AUXILIARY", "AUXILIARY BODY"];
    pub const WASIYYAT_NO: &[&str] = &["WASIYYAT NO", "WASIYYAT NO.", "WASSIYAT NO"];
    pub const PRESENCE: &[&str] = &["PRESENCE", "PRESENT"];
    pub const FAMILY: &[&str] = &["FAMILY", "FAMILY NAME"];
    pub const ELECTION: &[&str] = &["ELECTION", "ELECTED OFFICE", "OFFICE"];
    pub const ACADEMIC_STATUS: &[&str] = &["ACADEMIC STATUS", "EDUCATION", "QUALIFICATION"];
    pub const DATE_OF_BIRTH: &[&str] = &["DATE OF BIRTH", "DOB", "D.O.B", "D.O.B."];
    pub const EMAIL: &[&str] = &["EMAIL", "E-MAIL", "EMAIL ADDRESS"];
    pub const PHONE: &[&str] = &["PHONE", "PHONE NO", "PHONE NUMBER", "GSM", "TEL"];
    pub const ADDRESS: &[&str] = &["ADDRESS", "RESIDENTIAL ADDRESS", "HOME ADDRESS"];
}

fn lookup<'a>(row: &'a RawRow, names: &[&str]) -> Option<&'a CellValue> {
    names.iter().find_map(|name| row.get(*name))
}

/// Read a cell as display text; numbers render without a trailing ".0"
fn text(row: &RawRow, names: &[&str]) -> String {
    match lookup(row, names) {
        Some(CellValue::Text(s)) => s.trim().to_string(),
        Some(CellValue::Number(f)) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Some(CellValue::Date(d)) => d.format("%d/%m/%Y").to_string(),
        None => String::new(),
    }
}

/// Read a cell as an amount; anything unparsable is 0
fn num(row: &RawRow, names: &[&str]) -> f64 {
    match lookup(row, names) {
        Some(CellValue::Number(f)) => *f,
        Some(CellValue::Text(s)) => parse_amount(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Read a cell as a date; date-typed cells pass through, text is accepted
/// when it parses, anything else is null
fn date(row: &RawRow, names: &[&str]) -> Option<NaiveDate> {
    match lookup(row, names) {
        Some(CellValue::Date(d)) => Some(*d),
        Some(CellValue::Text(s)) => parse_date(s),
        _ => None,
    }
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['₦', '$', ',', ' '], "")
        .replace("NGN", "")
        .replace('(', "-")
        .replace(')', "");

    cleaned.parse::<f64>().ok()
}

/// Parse a date string in the formats seen in supplier sheets.
///
/// Day-first formats lead because that is how the ledgers (and our own
/// exports) are written.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%d/%m/%Y", // 15/01/2024
        "%d/%m/%y", // 15/01/24
        "%Y-%m-%d", // 2024-01-15
        "%d-%m-%Y", // 15-01-2024
        "%m/%d/%Y", // 01/15/2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    None
}

/// Normalize month-paid-for tokens to upper case, comma-joined in order
fn normalize_month_tokens(raw: &str) -> String {
    raw.split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Map a raw sheet row to a canonical contribution record.
///
/// Total over any input: absent or malformed columns degrade to defaults,
/// never an error.
pub fn map_financial_row(row: &RawRow) -> NewFinancialRecord {
    let funds = FundBreakdown {
        chanda_aam: num(row, aliases::CHANDA_AAM),
        chanda_wasiyyat: num(row, aliases::CHANDA_WASIYYAT),
        jalsa_salana: num(row, aliases::JALSA_SALANA),
        tahrik_jadid: num(row, aliases::TAHRIK_JADID),
        waqf_jadid: num(row, aliases::WAQF_JADID),
        zakat: num(row, aliases::ZAKAT),
        fitrana: num(row, aliases::FITRANA),
        sadaqat: num(row, aliases::SADAQAT),
        mosque_donation: num(row, aliases::MOSQUE_DONATION),
        mta: num(row, aliases::MTA),
        maryam_fund: num(row, aliases::MARYAM_FUND),
        scholarship: num(row, aliases::SCHOLARSHIP),
        welfare: num(row, aliases::WELFARE),
        publications: num(row, aliases::PUBLICATIONS),
        centenary: num(row, aliases::CENTENARY),
        eid_fund: num(row, aliases::EID_FUND),
        tabligh: num(row, aliases::TABLIGH),
        hissa_jaidad: num(row, aliases::HISSA_JAIDAD),
        national_liability: num(row, aliases::NATIONAL_LIABILITY),
        miscellaneous: num(row, aliases::MISCELLANEOUS),
    };

    NewFinancialRecord {
        chanda_no: text(row, aliases::CHANDA_NO),
        name: text(row, aliases::NAME),
        receipt_no: text(row, aliases::RECEIPT_NO),
        date: date(row, aliases::DATE),
        month_paid_for: normalize_month_tokens(&text(row, aliases::MONTH_PAID_FOR)),
        funds,
        // Supplied by the sheet (or the edit form); not re-derived from the
        // fund breakdown here
        total_ngn: num(row, aliases::TOTAL),
    }
}

/// Map a raw sheet row to a canonical membership record
pub fn map_membership_row(row: &RawRow) -> NewMembershipRecord {
    NewMembershipRecord {
        sn: text(row, aliases::SN),
        surname: text(row, aliases::SURNAME),
        other_names: text(row, aliases::OTHER_NAMES),
        title: text(row, aliases::TITLE),
        majlis: normalize_majlis(&text(row, aliases::MAJLIS)),
        chanda_no: text(row, aliases::CHANDA_NO),
        wasiyyat_no: text(row, aliases::WASIYYAT_NO),
        presence: text(row, aliases::PRESENCE),
        family: text(row, aliases::FAMILY),
        election: text(row, aliases::ELECTION),
        academic_status: text(row, aliases::ACADEMIC_STATUS),
        date_of_birth: date(row, aliases::DATE_OF_BIRTH),
        email: text(row, aliases::EMAIL),
        phone: text(row, aliases::PHONE),
        address: text(row, aliases::ADDRESS),
    }
}

/// Keep a contribution only when at least one identifying field is present.
/// Sheets routinely carry trailing padding rows with formulas or zeros.
pub fn is_identifiable_financial(record: &NewFinancialRecord) -> bool {
    !record.name.trim().is_empty()
        || !record.chanda_no.trim().is_empty()
        || !record.receipt_no.trim().is_empty()
}

/// Keep a member only when at least one identifying field is present
pub fn is_identifiable_membership(record: &NewMembershipRecord) -> bool {
    !record.surname.trim().is_empty()
        || !record.other_names.trim().is_empty()
        || !record.chanda_no.trim().is_empty()
}

/// Per-sheet import state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetStatus {
    /// Not selected for this run (or not reached yet)
    Pending,
    /// In flight; only observable while a sheet is being written
    Processing,
    Completed,
    Error,
}

/// Outcome of one sheet within an import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetOutcome {
    pub name: String,
    pub status: SheetStatus,
    /// Rows actually inserted (duplicates contribute 0)
    pub inserted_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Aggregate outcome across all selected sheets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    Imported,
    NoNewRecords,
    CompletedWithErrors,
}

/// Result of a whole import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub outcomes: Vec<SheetOutcome>,
    pub total_inserted: u64,
    pub outcome: BatchOutcome,
}

impl ImportReport {
    /// End-of-batch message shown to the operator
    pub fn message(&self) -> String {
        match self.outcome {
            BatchOutcome::Imported => {
                format!("Imported {} new record(s)", self.total_inserted)
            }
            BatchOutcome::NoNewRecords => {
                "No new records; all rows matched existing entries".to_string()
            }
            BatchOutcome::CompletedWithErrors => format!(
                "Completed with errors: {} record(s) imported, {} sheet(s) failed",
                self.total_inserted,
                self.outcomes
                    .iter()
                    .filter(|o| o.status == SheetStatus::Error)
                    .count()
            ),
        }
    }
}

/// Import the selected sheets of a parsed workbook, strictly sequentially.
///
/// One sheet's store write completes (or fails) before the next begins; a
/// failed sheet is reported and the run continues. Unselected sheets stay
/// `pending` and are excluded from totals. This function itself never fails
/// on sheet-level errors - callers get the full outcome list and can re-run
/// with only the failed sheet names selected (the natural-key upsert makes
/// that safe).
pub fn import_sheets(
    db: &Database,
    organization_id: i64,
    admin_id: i64,
    kind: RecordKind,
    sheets: &[ParsedSheet],
    selected: &[String],
) -> ImportReport {
    let mut outcomes = Vec::with_capacity(sheets.len());
    let mut total_inserted = 0u64;
    let mut any_error = false;

    for sheet in sheets {
        if !selected.iter().any(|s| s == &sheet.name) {
            outcomes.push(SheetOutcome {
                name: sheet.name.clone(),
                status: SheetStatus::Pending,
                inserted_count: 0,
                error_message: None,
            });
            continue;
        }

        debug!(sheet = %sheet.name, status = ?SheetStatus::Processing, "Importing sheet");

        let outcome = match import_one_sheet(db, organization_id, admin_id, kind, sheet) {
            Ok((submitted, inserted)) => {
                info!(
                    "Sheet '{}': {} row(s) submitted, {} inserted",
                    sheet.name, submitted, inserted
                );
                total_inserted += inserted;
                SheetOutcome {
                    name: sheet.name.clone(),
                    status: SheetStatus::Completed,
                    inserted_count: inserted,
                    error_message: None,
                }
            }
            Err(e) => {
                warn!("Sheet '{}' failed: {}", sheet.name, e);
                any_error = true;
                SheetOutcome {
                    name: sheet.name.clone(),
                    status: SheetStatus::Error,
                    inserted_count: 0,
                    error_message: Some(e.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }

    let outcome = if any_error {
        BatchOutcome::CompletedWithErrors
    } else if total_inserted > 0 {
        BatchOutcome::Imported
    } else {
        BatchOutcome::NoNewRecords
    };

    ImportReport {
        outcomes,
        total_inserted,
        outcome,
    }
}

/// Map, filter and bulk-upsert one sheet. Returns (submitted, inserted).
fn import_one_sheet(
    db: &Database,
    organization_id: i64,
    admin_id: i64,
    kind: RecordKind,
    sheet: &ParsedSheet,
) -> Result<(usize, u64)> {
    match kind {
        RecordKind::Financial => {
            let records: Vec<_> = sheet
                .rows
                .iter()
                .map(map_financial_row)
                .filter(is_identifiable_financial)
                .collect();
            let inserted = db.bulk_insert_financial(organization_id, admin_id, &records)?;
            Ok((records.len(), inserted))
        }
        RecordKind::Membership => {
            let records: Vec<_> = sheet
                .rows
                .iter()
                .map(map_membership_row)
                .filter(is_identifiable_membership)
                .collect();
            let inserted = db.bulk_insert_membership(organization_id, admin_id, &records)?;
            Ok((records.len(), inserted))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn row(cells: &[(&str, CellValue)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn text_cell(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_map_financial_row_aliases() {
        let raw = row(&[
            ("NAME", text_cell("Bashir Ahmad")),
            ("CHANDA NO.", text_cell("CH-104")),
            ("RECEIPT NO", text_cell("R-0042")),
            ("SUB TOTAL", CellValue::Number(2500.0)),
            ("MOAQUE DONATION", CellValue::Number(500.0)),
            ("MONTH PAID FOR", text_cell("jan2024, feb2024")),
            ("DATE", text_cell("15/01/2024")),
        ]);

        let rec = map_financial_row(&raw);
        assert_eq!(rec.name, "Bashir Ahmad");
        assert_eq!(rec.chanda_no, "CH-104");
        assert_eq!(rec.receipt_no, "R-0042");
        assert_eq!(rec.total_ngn, 2500.0);
        assert_eq!(rec.funds.mosque_donation, 500.0);
        assert_eq!(rec.month_paid_for, "JAN2024, FEB2024");
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2024, 1, 15));
        // Absent funds default to zero
        assert_eq!(rec.funds.zakat, 0.0);
    }

    #[test]
    fn test_numeric_coercion_never_throws() {
        let raw = row(&[
            ("NAME", text_cell("Test")),
            ("CHANDA AAM", text_cell("abc")),
            ("ZAKAT", text_cell("₦1,200.50")),
            ("TOTAL (NGN)", text_cell("1,200.50")),
        ]);

        let rec = map_financial_row(&raw);
        assert_eq!(rec.funds.chanda_aam, 0.0);
        assert_eq!(rec.funds.zakat, 1200.50);
        assert_eq!(rec.total_ngn, 1200.50);
    }

    #[test]
    fn test_date_cell_and_unparsable_text() {
        let raw = row(&[(
            "DATE",
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
        )]);
        assert_eq!(
            map_financial_row(&raw).date,
            NaiveDate::from_ymd_opt(2024, 2, 1)
        );

        let raw = row(&[("DATE", text_cell("sometime in spring"))]);
        assert_eq!(map_financial_row(&raw).date, None);
    }

    #[test]
    fn test_map_membership_row() {
        let raw = row(&[
            ("S/N", CellValue::Number(7.0)),
            ("SURNAME", text_cell("Bello")),
            ("FIRST NAME", text_cell("Amina")),
            ("AUXILIARY", text_cell("lajna")),
            ("D.O.B", text_cell("02/03/1990")),
            ("GSM", text_cell("08012345678")),
        ]);

        let rec = map_membership_row(&raw);
        assert_eq!(rec.sn, "7");
        assert_eq!(rec.surname, "Bello");
        assert_eq!(rec.other_names, "Amina");
        assert_eq!(rec.majlis, "Lajna");
        assert_eq!(rec.date_of_birth, NaiveDate::from_ymd_opt(1990, 3, 2));
        assert_eq!(rec.phone, "08012345678");
        assert_eq!(rec.email, "");
    }

    #[test]
    fn test_validity_filter_drops_padding_rows() {
        // Non-zero amounts but no identifying field: a formula padding row
        let raw = row(&[("CHANDA AAM", CellValue::Number(100.0))]);
        let rec = map_financial_row(&raw);
        assert!(!is_identifiable_financial(&rec));

        let raw = row(&[("RECEIPT NO", text_cell("R-1"))]);
        assert!(is_identifiable_financial(&map_financial_row(&raw)));

        let member = map_membership_row(&row(&[("TITLE", text_cell("Alhaji"))]));
        assert!(!is_identifiable_membership(&member));
    }

    fn financial_sheet(name: &str, rows: Vec<RawRow>) -> ParsedSheet {
        ParsedSheet {
            name: name.to_string(),
            header_row: 0,
            rows,
        }
    }

    fn seeded_db() -> (Database, i64, i64) {
        let db = Database::in_memory().unwrap();
        let org_id = db.upsert_organization("Test Jamaat").unwrap();
        let admin_id = db
            .upsert_admin(org_id, "admin@example.org", "Admin", "admin")
            .unwrap();
        (db, org_id, admin_id)
    }

    fn contribution_row(receipt: &str, total: f64) -> RawRow {
        row(&[
            ("NAME", text_cell("Bashir Ahmad")),
            ("RECEIPT NO", text_cell(receipt)),
            ("TOTAL (NGN)", CellValue::Number(total)),
        ])
    }

    #[test]
    fn test_import_is_idempotent() {
        let (db, org_id, admin_id) = seeded_db();
        let sheets = vec![financial_sheet(
            "JAN",
            vec![contribution_row("R-1", 100.0), contribution_row("R-2", 200.0)],
        )];
        let selected = vec!["JAN".to_string()];

        let first = import_sheets(
            &db,
            org_id,
            admin_id,
            RecordKind::Financial,
            &sheets,
            &selected,
        );
        assert_eq!(first.total_inserted, 2);
        assert_eq!(first.outcome, BatchOutcome::Imported);

        let second = import_sheets(
            &db,
            org_id,
            admin_id,
            RecordKind::Financial,
            &sheets,
            &selected,
        );
        assert_eq!(second.total_inserted, 0);
        assert_eq!(second.outcome, BatchOutcome::NoNewRecords);
        assert_eq!(db.count_financial_records(org_id).unwrap(), 2);
    }

    #[test]
    fn test_unselected_sheets_stay_pending() {
        let (db, org_id, admin_id) = seeded_db();
        let sheets = vec![
            financial_sheet("JAN", vec![contribution_row("R-1", 100.0)]),
            financial_sheet("FEB", vec![contribution_row("R-2", 200.0)]),
        ];

        let report = import_sheets(
            &db,
            org_id,
            admin_id,
            RecordKind::Financial,
            &sheets,
            &["FEB".to_string()],
        );
        assert_eq!(report.outcomes[0].status, SheetStatus::Pending);
        assert_eq!(report.outcomes[1].status, SheetStatus::Completed);
        assert_eq!(report.total_inserted, 1);
    }

    #[test]
    fn test_sheet_failure_is_isolated() {
        let (db, org_id, admin_id) = seeded_db();
        // Sheet 2 violates the total_ngn >= 0 schema constraint, so its
        // batched write fails while sheets 1 and 3 complete.
        let sheets = vec![
            financial_sheet("JAN", vec![contribution_row("R-1", 100.0)]),
            financial_sheet("FEB", vec![contribution_row("R-2", -50.0)]),
            financial_sheet("MAR", vec![contribution_row("R-3", 300.0)]),
        ];
        let selected: Vec<String> =
            ["JAN", "FEB", "MAR"].iter().map(|s| s.to_string()).collect();

        let report = import_sheets(
            &db,
            org_id,
            admin_id,
            RecordKind::Financial,
            &sheets,
            &selected,
        );

        assert_eq!(report.outcomes[0].status, SheetStatus::Completed);
        assert_eq!(report.outcomes[0].inserted_count, 1);
        assert_eq!(report.outcomes[1].status, SheetStatus::Error);
        assert!(report.outcomes[1].error_message.is_some());
        assert_eq!(report.outcomes[2].status, SheetStatus::Completed);
        assert_eq!(report.outcomes[2].inserted_count, 1);
        assert_eq!(report.outcome, BatchOutcome::CompletedWithErrors);
        assert_eq!(report.total_inserted, 2);
    }

    #[test]
    fn test_duplicate_receipts_collapse_within_one_sheet() {
        let (db, org_id, admin_id) = seeded_db();
        // Same receipt, different amounts: natural key wins, second row no-ops
        let sheets = vec![financial_sheet(
            "JAN",
            vec![contribution_row("R-1", 100.0), contribution_row("R-1", 999.0)],
        )];

        let report = import_sheets(
            &db,
            org_id,
            admin_id,
            RecordKind::Financial,
            &sheets,
            &["JAN".to_string()],
        );
        assert_eq!(report.total_inserted, 1);
        assert_eq!(db.count_financial_records(org_id).unwrap(), 1);
    }

    #[test]
    fn test_report_message_variants() {
        let base = ImportReport {
            outcomes: vec![],
            total_inserted: 3,
            outcome: BatchOutcome::Imported,
        };
        assert!(base.message().contains("3"));

        let none = ImportReport {
            outcomes: vec![],
            total_inserted: 0,
            outcome: BatchOutcome::NoNewRecords,
        };
        assert!(none.message().contains("No new records"));
    }
}

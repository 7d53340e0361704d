//! Amanah Core Library
//!
//! Shared functionality for the Amanah organization records tool:
//! - Database access and migrations
//! - Workbook parsing with header-row auto-detection
//! - Row mapping across supplier column-label variants
//! - Idempotent bulk upserts keyed by natural-key hashes
//! - Sequential per-sheet import orchestration
//! - Month-grouped export shaping (xlsx and CSV)

pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod sheet;

pub use db::{
    AuditEntry, DashboardSummary, Database, FinancialFilter, MembershipFilter,
};
pub use error::{Error, Result};
pub use export::{
    shape_financial, shape_membership, write_csv, write_workbook, ExportCell, ExportRow,
    ExportSheet,
};
pub use import::{
    import_sheets, map_financial_row, map_membership_row, BatchOutcome, ImportReport,
    SheetOutcome, SheetStatus,
};
pub use models::{
    Admin, FinancialRecord, FundBreakdown, MembershipRecord, NewFinancialRecord,
    NewMembershipRecord, Organization, RecordKind, MAJLIS_UNITS,
};
pub use sheet::{parse_workbook, CellValue, ParsedSheet, RawRow};

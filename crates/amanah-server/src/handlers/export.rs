//! Export handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, Response, StatusCode},
};
use serde::Deserialize;
use tracing::info;

use crate::{resolve_identity, AppError, AppState};
use amanah_core::db::{FinancialFilter, MembershipFilter};
use amanah_core::export::{shape_financial, shape_membership, write_csv, write_workbook};
use amanah_core::models::RecordKind;

/// Query parameters for record export
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// "financial" or "membership"
    pub kind: String,
    /// Output format (default: xlsx)
    #[serde(default = "default_format")]
    pub format: String,
    /// Month abbreviation filter, e.g. "JAN"
    pub month: Option<String>,
    pub year: Option<i32>,
    /// Majlis filter (membership exports only)
    pub majlis: Option<String>,
    pub search: Option<String>,
    /// Comma-separated column subset (canonical display order is preserved)
    pub columns: Option<String>,
}

fn default_format() -> String {
    "xlsx".to_string()
}

/// GET /api/export/records - Export records as a spreadsheet
pub async fn export_records(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ExportQuery>,
) -> Result<Response<Body>, AppError> {
    let admin = resolve_identity(&state, &headers)?;

    let kind: RecordKind = params
        .kind
        .parse()
        .map_err(|e: String| AppError::bad_request(&e))?;

    let columns: Option<Vec<String>> = params.columns.as_deref().map(|s| {
        s.split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    });

    let sheet = match kind {
        RecordKind::Financial => {
            let filter = FinancialFilter {
                search: params.search.clone(),
                month: params.month.clone(),
                year: params.year,
            };
            let records = state
                .db
                .export_financial_records(admin.organization_id, &filter)?;
            info!("Exporting {} financial record(s)", records.len());
            shape_financial(&records, columns.as_deref())
        }
        RecordKind::Membership => {
            let filter = MembershipFilter {
                search: params.search.clone(),
                majlis: params.majlis.clone(),
            };
            let records = state
                .db
                .export_membership_records(admin.organization_id, &filter)?;
            info!("Exporting {} membership record(s)", records.len());
            shape_membership(&records, columns.as_deref())
        }
    };

    state.db.log_audit(
        &admin.email,
        "export",
        Some(kind.as_str()),
        None,
        Some(&format!(
            "format={}, month={:?}, year={:?}, majlis={:?}, rows={}",
            params.format, params.month, params.year, params.majlis, sheet.rows.len()
        )),
    )?;

    let date_stamp = chrono::Utc::now().format("%Y-%m-%d");

    match params.format.as_str() {
        "xlsx" => {
            let bytes = write_workbook(&sheet, &format!("{} records", kind))
                .map_err(|e| AppError::internal(&e.to_string()))?;

            Response::builder()
                .status(StatusCode::OK)
                .header(
                    header::CONTENT_TYPE,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                )
                .header(
                    header::CONTENT_DISPOSITION,
                    format!(
                        "attachment; filename=\"amanah-{}-{}.xlsx\"",
                        kind, date_stamp
                    ),
                )
                .body(Body::from(bytes))
                .map_err(|e| AppError::internal(&e.to_string()))
        }
        "csv" => {
            let csv = write_csv(&sheet);

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
                .header(
                    header::CONTENT_DISPOSITION,
                    format!(
                        "attachment; filename=\"amanah-{}-{}.csv\"",
                        kind, date_stamp
                    ),
                )
                .body(Body::from(csv))
                .map_err(|e| AppError::internal(&e.to_string()))
        }
        _ => Err(AppError::bad_request("Invalid format. Use 'xlsx' or 'csv'")),
    }
}

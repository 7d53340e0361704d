//! Bulk import handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::{resolve_identity, AppError, AppState, MAX_UPLOAD_SIZE};
use amanah_core::import::{import_sheets, BatchOutcome, SheetOutcome};
use amanah_core::models::RecordKind;
use amanah_core::sheet::parse_workbook;

/// Fields accepted by the import endpoints
struct UploadForm {
    file_data: Option<Vec<u8>>,
    kind: Option<String>,
    sheets: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm {
        file_data: None,
        kind: None,
        sheets: None,
    };
    let mut total_size: usize = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read file data"))?;
                total_size += bytes.len();

                // Check file size limit
                if total_size > MAX_UPLOAD_SIZE {
                    return Err(AppError::bad_request(&format!(
                        "File too large. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    )));
                }

                form.file_data = Some(bytes.to_vec());
            }
            "kind" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read kind"))?;
                if !value.is_empty() {
                    form.kind = Some(value);
                }
            }
            "sheets" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read sheets"))?;
                if !value.is_empty() {
                    form.sheets = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// One sheet as seen by the pre-import inspection
#[derive(Serialize)]
pub struct SheetInfo {
    pub name: String,
    pub header_row: usize,
    pub row_count: usize,
}

#[derive(Serialize)]
pub struct InspectResponse {
    pub sheets: Vec<SheetInfo>,
}

/// POST /api/import/inspect - List a workbook's sheets before importing
///
/// Lets the operator pick which sheets to include in the actual import.
pub async fn inspect_workbook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<InspectResponse>, AppError> {
    let admin = resolve_identity(&state, &headers)?;

    let form = read_upload_form(multipart).await?;
    let file_data = form
        .file_data
        .ok_or_else(|| AppError::bad_request("Missing file field"))?;

    let parsed = parse_workbook(&file_data)
        .map_err(|e| AppError::bad_request(&format!("Unreadable workbook: {}", e)))?;

    let sheets = parsed
        .iter()
        .map(|s| SheetInfo {
            name: s.name.clone(),
            header_row: s.header_row,
            row_count: s.rows.len(),
        })
        .collect();

    state.db.log_audit(
        &admin.email,
        "inspect",
        Some("import"),
        None,
        Some(&format!("file_size={}", file_data.len())),
    )?;

    Ok(Json(InspectResponse { sheets }))
}

/// Response for the import endpoint
#[derive(Serialize)]
pub struct ImportResponse {
    pub total_inserted: u64,
    pub outcome: BatchOutcome,
    /// End-of-batch message for the operator
    pub message: String,
    /// Per-sheet breakdown; failed sheets can be re-run by re-invoking with
    /// only their names selected
    pub sheets: Vec<SheetOutcome>,
}

/// POST /api/import - Import records from a multi-sheet workbook
///
/// Expects multipart form with:
/// - file: xlsx workbook (required, max 10MB)
/// - kind: "financial" or "membership" (required)
/// - sheets: comma-separated sheet names to process (optional, default all)
pub async fn import_workbook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    // Identity is resolved before any sheet processing; a session without an
    // organization rejects the whole call
    let admin = resolve_identity(&state, &headers)?;

    let form = read_upload_form(multipart).await?;
    let file_data = form
        .file_data
        .ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let kind: RecordKind = form
        .kind
        .ok_or_else(|| AppError::bad_request("Missing kind field"))?
        .parse()
        .map_err(|e: String| AppError::bad_request(&e))?;

    let parsed = parse_workbook(&file_data)
        .map_err(|e| AppError::bad_request(&format!("Unreadable workbook: {}", e)))?;

    let selected: Vec<String> = match form.sheets.as_deref() {
        Some(names) => names
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        // No selection means every sheet
        None => parsed.iter().map(|s| s.name.clone()).collect(),
    };

    info!(
        "Importing {} workbook: {} sheet(s), {} selected",
        kind,
        parsed.len(),
        selected.len()
    );

    let report = import_sheets(
        &state.db,
        admin.organization_id,
        admin.id,
        kind,
        &parsed,
        &selected,
    );

    state.db.log_audit(
        &admin.email,
        "import",
        Some(kind.as_str()),
        None,
        Some(&format!(
            "file_size={}, sheets={}, inserted={}, outcome={:?}",
            file_data.len(),
            selected.len(),
            report.total_inserted,
            report.outcome
        )),
    )?;

    Ok(Json(ImportResponse {
        total_inserted: report.total_inserted,
        outcome: report.outcome,
        message: report.message(),
        sheets: report.outcomes,
    }))
}

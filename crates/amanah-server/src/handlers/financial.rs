//! Financial record handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{resolve_identity, AppError, AppState, SuccessResponse, MAX_PAGE_LIMIT};
use amanah_core::db::FinancialFilter;
use amanah_core::models::{FinancialRecord, NewFinancialRecord};

/// Query parameters for listing contributions
#[derive(Debug, Deserialize)]
pub struct FinancialQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    /// Search query (name, chanda number or receipt number)
    pub search: Option<String>,
    /// Month abbreviation filter, e.g. "JAN"
    pub month: Option<String>,
    pub year: Option<i32>,
}

fn default_limit() -> i64 {
    50
}

#[derive(Serialize)]
pub struct FinancialListResponse {
    pub records: Vec<FinancialRecord>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// GET /api/financial - List contributions
pub async fn list_financial(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FinancialQuery>,
    headers: HeaderMap,
) -> Result<Json<FinancialListResponse>, AppError> {
    let admin = resolve_identity(&state, &headers)?;

    // Input validation: clamp pagination parameters
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    let filter = FinancialFilter {
        search: params.search.clone(),
        month: params.month.clone(),
        year: params.year,
    };

    let records = state
        .db
        .list_financial_records(admin.organization_id, &filter, limit, offset)?;
    let total = state
        .db
        .count_financial_filtered(admin.organization_id, &filter)?;

    state.db.log_audit(
        &admin.email,
        "list",
        Some("financial"),
        None,
        Some(&format!(
            "limit={}, offset={}, search={:?}, month={:?}, year={:?}, returned={}",
            limit,
            offset,
            params.search,
            params.month,
            params.year,
            records.len()
        )),
    )?;

    Ok(Json(FinancialListResponse {
        records,
        total,
        limit,
        offset,
    }))
}

/// GET /api/financial/:id - Fetch one contribution
pub async fn get_financial(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<FinancialRecord>, AppError> {
    let admin = resolve_identity(&state, &headers)?;
    let record = state.db.get_financial_record(admin.organization_id, id)?;
    Ok(Json(record))
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// POST /api/financial - Manual contribution entry
///
/// The caller supplies `total_ngn`; the server stores it as given.
pub async fn create_financial(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(record): Json<NewFinancialRecord>,
) -> Result<Json<CreatedResponse>, AppError> {
    let admin = resolve_identity(&state, &headers)?;

    let id = state
        .db
        .insert_financial_record(admin.organization_id, admin.id, &record)?
        .ok_or_else(|| AppError::conflict("A record with this receipt or key already exists"))?;

    state.db.log_audit(
        &admin.email,
        "create",
        Some("financial"),
        Some(id),
        Some(&format!("receipt_no={}", record.receipt_no)),
    )?;

    Ok(Json(CreatedResponse { id }))
}

/// PUT /api/financial/:id - Explicit edit action
pub async fn update_financial(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(record): Json<NewFinancialRecord>,
) -> Result<Json<SuccessResponse>, AppError> {
    let admin = resolve_identity(&state, &headers)?;

    state
        .db
        .update_financial_record(admin.organization_id, id, &record)?;

    state
        .db
        .log_audit(&admin.email, "update", Some("financial"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub ids: Vec<i64>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: usize,
}

/// POST /api/financial/delete - Delete selected contributions
pub async fn delete_financial(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>, AppError> {
    let admin = resolve_identity(&state, &headers)?;

    let deleted = state
        .db
        .delete_financial_records(admin.organization_id, &req.ids)?;

    state.db.log_audit(
        &admin.email,
        "delete",
        Some("financial"),
        None,
        Some(&format!("ids={:?}, deleted={}", req.ids, deleted)),
    )?;

    Ok(Json(DeleteResponse { deleted }))
}

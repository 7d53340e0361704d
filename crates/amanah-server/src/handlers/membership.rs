//! Membership record handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{resolve_identity, AppError, AppState, SuccessResponse, MAX_PAGE_LIMIT};
use amanah_core::db::MembershipFilter;
use amanah_core::models::{MembershipRecord, NewMembershipRecord};

use super::financial::{CreatedResponse, DeleteRequest, DeleteResponse};

/// Query parameters for listing members
#[derive(Debug, Deserialize)]
pub struct MembershipQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    /// Search query (surname, other names or chanda number)
    pub search: Option<String>,
    /// Exact majlis (auxiliary body) filter
    pub majlis: Option<String>,
}

fn default_limit() -> i64 {
    50
}

#[derive(Serialize)]
pub struct MembershipListResponse {
    pub records: Vec<MembershipRecord>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// GET /api/membership - List members
pub async fn list_membership(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MembershipQuery>,
    headers: HeaderMap,
) -> Result<Json<MembershipListResponse>, AppError> {
    let admin = resolve_identity(&state, &headers)?;

    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    let filter = MembershipFilter {
        search: params.search.clone(),
        majlis: params.majlis.clone(),
    };

    let records = state
        .db
        .list_membership_records(admin.organization_id, &filter, limit, offset)?;
    let total = state
        .db
        .count_membership_filtered(admin.organization_id, &filter)?;

    state.db.log_audit(
        &admin.email,
        "list",
        Some("membership"),
        None,
        Some(&format!(
            "limit={}, offset={}, search={:?}, majlis={:?}, returned={}",
            limit,
            offset,
            params.search,
            params.majlis,
            records.len()
        )),
    )?;

    Ok(Json(MembershipListResponse {
        records,
        total,
        limit,
        offset,
    }))
}

/// GET /api/membership/:id - Fetch one member
pub async fn get_membership(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<MembershipRecord>, AppError> {
    let admin = resolve_identity(&state, &headers)?;
    let record = state.db.get_membership_record(admin.organization_id, id)?;
    Ok(Json(record))
}

/// POST /api/membership - Manual member entry
pub async fn create_membership(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(record): Json<NewMembershipRecord>,
) -> Result<Json<CreatedResponse>, AppError> {
    let admin = resolve_identity(&state, &headers)?;

    let id = state
        .db
        .insert_membership_record(admin.organization_id, admin.id, &record)?
        .ok_or_else(|| AppError::conflict("A member with this chanda number already exists"))?;

    state.db.log_audit(
        &admin.email,
        "create",
        Some("membership"),
        Some(id),
        Some(&format!("surname={}", record.surname)),
    )?;

    Ok(Json(CreatedResponse { id }))
}

/// PUT /api/membership/:id - Explicit edit action
pub async fn update_membership(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(record): Json<NewMembershipRecord>,
) -> Result<Json<SuccessResponse>, AppError> {
    let admin = resolve_identity(&state, &headers)?;

    state
        .db
        .update_membership_record(admin.organization_id, id, &record)?;

    state
        .db
        .log_audit(&admin.email, "update", Some("membership"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/membership/delete - Delete selected members
pub async fn delete_membership(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>, AppError> {
    let admin = resolve_identity(&state, &headers)?;

    let deleted = state
        .db
        .delete_membership_records(admin.organization_id, &req.ids)?;

    state.db.log_audit(
        &admin.email,
        "delete",
        Some("membership"),
        None,
        Some(&format!("ids={:?}, deleted={}", req.ids, deleted)),
    )?;

    Ok(Json(DeleteResponse { deleted }))
}

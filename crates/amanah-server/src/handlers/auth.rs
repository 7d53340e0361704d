//! Identity handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::{resolve_identity, AppError, AppState};
use amanah_core::models::{Admin, Organization};

#[derive(Serialize)]
pub struct MeResponse {
    pub admin: Admin,
    pub organization: Organization,
}

/// GET /api/me - The authenticated admin and their organization
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, AppError> {
    let admin = resolve_identity(&state, &headers)?;
    let organization = state.db.get_organization(admin.organization_id)?;

    Ok(Json(MeResponse {
        admin,
        organization,
    }))
}

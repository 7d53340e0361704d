//! Dashboard handler

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};

use crate::{resolve_identity, AppError, AppState};
use amanah_core::db::DashboardSummary;

/// GET /api/dashboard - Headline counts and sums for the organization
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DashboardSummary>, AppError> {
    let admin = resolve_identity(&state, &headers)?;

    let summary = state.db.get_dashboard_summary(admin.organization_id)?;

    state.db.log_audit(
        &admin.email,
        "dashboard",
        None,
        None,
        Some(&format!(
            "members={}, contributions={}",
            summary.member_count, summary.contribution_count
        )),
    )?;

    Ok(Json(summary))
}

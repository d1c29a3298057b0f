//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::stats::{Dashboard, LibrarySummary},
    AppState,
};

use super::AuthenticatedUser;

/// Library summary with popular books
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Library summary", body = LibrarySummary)
    )
)]
pub async fn get_summary(State(state): State<AppState>) -> AppResult<Json<LibrarySummary>> {
    let summary = state.services.stats.summary().await?;
    Ok(Json(summary))
}

/// Administrator dashboard
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counts and full listings", body = Dashboard),
        (status = 403, description = "Administrator access required")
    )
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Dashboard>> {
    claims.require_admin()?;

    let dashboard = state.services.stats.dashboard().await?;
    Ok(Json(dashboard))
}

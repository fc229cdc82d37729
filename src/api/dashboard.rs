//! Dashboard endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::dashboard::{ActivityItem, DashboardKpis, DashboardSummary},
};

use super::AuthenticatedUser;

/// Activity feed query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

/// Dashboard KPI cards
#[utoipa::path(
    get,
    path = "/dashboard/kpis",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard KPIs", body = DashboardKpis)
    )
)]
pub async fn get_kpis(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<DashboardKpis>> {
    let kpis = state.services.dashboard.kpis().await?;
    Ok(Json(kpis))
}

/// Recent activity feed
#[utoipa::path(
    get,
    path = "/dashboard/activity",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(ActivityQuery),
    responses(
        (status = 200, description = "Recent activity", body = Vec<ActivityItem>)
    )
)]
pub async fn get_activity(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ActivityQuery>,
) -> AppResult<Json<Vec<ActivityItem>>> {
    let activity = state
        .services
        .dashboard
        .activity(query.limit.unwrap_or(10))
        .await?;
    Ok(Json(activity))
}

/// Complete dashboard summary
#[utoipa::path(
    get,
    path = "/dashboard/summary",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardSummary)
    )
)]
pub async fn get_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<DashboardSummary>> {
    let summary = state.services.dashboard.summary().await?;
    Ok(Json(summary))
}

//! Maintenance request endpoints
//!
//! Every handler resolves the acting user (role plus team memberships)
//! before touching the workflow service, so scoping and transition
//! authorization are always evaluated against fresh database state.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::request::{
        CalendarQuery, CalendarView, CreateRequest, KanbanBoard, RequestDetails, RequestHistory,
        RequestQuery, StageUpdate, UpdateRequest,
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Kanban board query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct KanbanQuery {
    /// Restrict the board to one team
    pub team_id: Option<Uuid>,
}

/// List maintenance requests visible to the current user
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "Request list", body = PaginatedResponse<RequestDetails>)
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<PaginatedResponse<RequestDetails>>> {
    let actor = state.services.auth.resolve_actor(&claims).await?;
    let (requests, total) = state.services.requests.list(&actor, &query).await?;

    Ok(Json(PaginatedResponse {
        items: requests,
        total,
        skip: query.skip.unwrap_or(0),
        limit: query.limit.unwrap_or(100),
    }))
}

/// Kanban board of requests grouped by stage
#[utoipa::path(
    get,
    path = "/requests/kanban",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(KanbanQuery),
    responses(
        (status = 200, description = "Kanban board", body = KanbanBoard)
    )
)]
pub async fn get_kanban(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<KanbanQuery>,
) -> AppResult<Json<KanbanBoard>> {
    let actor = state.services.auth.resolve_actor(&claims).await?;
    let board = state.services.requests.kanban(&actor, query.team_id).await?;
    Ok(Json(board))
}

/// Calendar of preventive requests for one month
#[utoipa::path(
    get,
    path = "/requests/calendar",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar view", body = CalendarView),
        (status = 400, description = "Invalid month or year")
    )
)]
pub async fn get_calendar(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<CalendarView>> {
    let actor = state.services.auth.resolve_actor(&claims).await?;
    let calendar = state
        .services
        .requests
        .calendar(&actor, query.month, query.year)
        .await?;
    Ok(Json(calendar))
}

/// Get a single request
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = RequestDetails),
        (status = 403, description = "Request outside your scope"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RequestDetails>> {
    let actor = state.services.auth.resolve_actor(&claims).await?;
    let request = state.services.requests.get(&actor, id).await?;
    Ok(Json(request))
}

/// Create a maintenance request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created", body = RequestDetails),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Preventive requests require manager role"),
        (status = 404, description = "Linked equipment not found")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<RequestDetails>)> {
    data.validate()?;

    let actor = state.services.auth.resolve_actor(&claims).await?;
    let request = state.services.requests.create(&actor, data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Update a request's editable fields (not its stage)
#[utoipa::path(
    patch,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Request updated", body = RequestDetails),
        (status = 403, description = "Request outside your scope"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn update_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateRequest>,
) -> AppResult<Json<RequestDetails>> {
    data.validate()?;

    let actor = state.services.auth.resolve_actor(&claims).await?;
    let request = state.services.requests.update(&actor, id, data).await?;
    Ok(Json(request))
}

/// Change a request's stage (Kanban drag-drop)
#[utoipa::path(
    patch,
    path = "/requests/{id}/stage",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = StageUpdate,
    responses(
        (status = 200, description = "Stage changed", body = RequestDetails),
        (status = 400, description = "Unknown stage"),
        (status = 403, description = "Transition not authorized for your role"),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Transition not allowed from the current stage")
    )
)]
pub async fn update_stage(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<StageUpdate>,
) -> AppResult<Json<RequestDetails>> {
    let actor = state.services.auth.resolve_actor(&claims).await?;
    let request = state.services.requests.change_stage(&actor, id, data).await?;
    Ok(Json(request))
}

/// Delete a request
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn delete_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let actor = state.services.auth.resolve_actor(&claims).await?;
    state.services.requests.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stage change history for a request
#[utoipa::path(
    get,
    path = "/requests/{id}/history",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Stage history", body = Vec<RequestHistory>),
        (status = 403, description = "Request outside your scope"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<RequestHistory>>> {
    let actor = state.services.auth.resolve_actor(&claims).await?;
    let history = state.services.requests.history(&actor, id).await?;
    Ok(Json(history))
}

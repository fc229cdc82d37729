//! Equipment endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::equipment::{
        CreateEquipment, EquipmentHealth, EquipmentQuery, EquipmentResponse, EquipmentScrapLog,
        UpdateEquipment,
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List equipment with filters and pagination
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment list", body = PaginatedResponse<EquipmentResponse>)
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Json<PaginatedResponse<EquipmentResponse>>> {
    let (equipment, total) = state.services.equipment.list(&query).await?;

    Ok(Json(PaginatedResponse {
        items: equipment,
        total,
        skip: query.skip.unwrap_or(0),
        limit: query.limit.unwrap_or(100),
    }))
}

/// List all equipment categories in use
#[utoipa::path(
    get,
    path = "/equipment/categories",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Categories", body = Vec<String>)
    )
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<String>>> {
    let categories = state.services.equipment.categories().await?;
    Ok(Json(categories))
}

/// List all departments in use
#[utoipa::path(
    get,
    path = "/equipment/departments",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Departments", body = Vec<String>)
    )
)]
pub async fn list_departments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<String>>> {
    let departments = state.services.equipment.departments().await?;
    Ok(Json(departments))
}

/// Equipment health summary for the dashboard
#[utoipa::path(
    get,
    path = "/equipment/health-summary",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Health summary", body = EquipmentHealth)
    )
)]
pub async fn get_health_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<EquipmentHealth>> {
    let summary = state.services.equipment.health_summary().await?;
    Ok(Json(summary))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = EquipmentResponse),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EquipmentResponse>> {
    let equipment = state.services.equipment.get_by_id(id).await?;
    Ok(Json(equipment))
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = EquipmentResponse),
        (status = 403, description = "Manager privileges required"),
        (status = 409, description = "Serial number already exists")
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<EquipmentResponse>)> {
    claims.require_manager()?;
    data.validate()?;

    let equipment = state.services.equipment.create(data).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update equipment
#[utoipa::path(
    patch,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = EquipmentResponse),
        (status = 403, description = "Manager privileges required"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateEquipment>,
) -> AppResult<Json<EquipmentResponse>> {
    claims.require_manager()?;
    data.validate()?;

    let equipment = state.services.equipment.update(id, data).await?;
    Ok(Json(equipment))
}

/// Scrap history for one equipment
#[utoipa::path(
    get,
    path = "/equipment/{id}/scrap-logs",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Scrap log entries", body = Vec<EquipmentScrapLog>),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn list_scrap_logs(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<EquipmentScrapLog>>> {
    let logs = state.services.equipment.scrap_logs(id).await?;
    Ok(Json(logs))
}

/// Retire equipment (soft delete)
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment retired"),
        (status = 403, description = "Manager privileges required"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn delete_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_manager()?;

    state.services.equipment.retire(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

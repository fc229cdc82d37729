//! Maintenance team endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::team::{
        AddTeamMember, CreateTeam, MaintenanceTeam, TeamDetail, TeamMemberInfo, TeamQuery,
        TeamSummary, UpdateTeam,
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List maintenance teams
#[utoipa::path(
    get,
    path = "/teams",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(TeamQuery),
    responses(
        (status = 200, description = "List of teams", body = PaginatedResponse<TeamSummary>)
    )
)]
pub async fn list_teams(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<TeamQuery>,
) -> AppResult<Json<PaginatedResponse<TeamSummary>>> {
    let (teams, total) = state.services.teams.list(&query).await?;

    Ok(Json(PaginatedResponse {
        items: teams,
        total,
        skip: query.skip.unwrap_or(0),
        limit: query.limit.unwrap_or(100),
    }))
}

/// Get a team with its members
#[utoipa::path(
    get,
    path = "/teams/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team details", body = TeamDetail),
        (status = 404, description = "Team not found")
    )
)]
pub async fn get_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TeamDetail>> {
    let team = state.services.teams.get_detail(id).await?;
    Ok(Json(team))
}

/// Create a maintenance team
#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    security(("bearer_auth" = [])),
    request_body = CreateTeam,
    responses(
        (status = 201, description = "Team created", body = MaintenanceTeam),
        (status = 403, description = "Manager privileges required"),
        (status = 409, description = "Team name already exists")
    )
)]
pub async fn create_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(team): Json<CreateTeam>,
) -> AppResult<(StatusCode, Json<MaintenanceTeam>)> {
    claims.require_manager()?;
    team.validate()?;

    let created = state.services.teams.create(team).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a team
#[utoipa::path(
    patch,
    path = "/teams/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Team ID")),
    request_body = UpdateTeam,
    responses(
        (status = 200, description = "Team updated", body = MaintenanceTeam),
        (status = 403, description = "Manager privileges required"),
        (status = 404, description = "Team not found")
    )
)]
pub async fn update_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(team): Json<UpdateTeam>,
) -> AppResult<Json<MaintenanceTeam>> {
    claims.require_manager()?;
    team.validate()?;

    let updated = state.services.teams.update(id, team).await?;
    Ok(Json(updated))
}

/// Delete a team
#[utoipa::path(
    delete,
    path = "/teams/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Team ID")),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Team not found")
    )
)]
pub async fn delete_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.teams.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List members of a team
#[utoipa::path(
    get,
    path = "/teams/{id}/members",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team members", body = Vec<TeamMemberInfo>),
        (status = 404, description = "Team not found")
    )
)]
pub async fn list_team_members(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<TeamMemberInfo>>> {
    let members = state.services.teams.members(id).await?;
    Ok(Json(members))
}

/// Add a member to a team
#[utoipa::path(
    post,
    path = "/teams/{id}/members",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Team ID")),
    request_body = AddTeamMember,
    responses(
        (status = 201, description = "Member added", body = TeamMemberInfo),
        (status = 403, description = "Manager privileges required"),
        (status = 404, description = "Team or user not found"),
        (status = 409, description = "Already a member")
    )
)]
pub async fn add_team_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(member): Json<AddTeamMember>,
) -> AppResult<(StatusCode, Json<TeamMemberInfo>)> {
    claims.require_manager()?;

    let added = state.services.teams.add_member(id, member).await?;
    Ok((StatusCode::CREATED, Json(added)))
}

/// Remove a member from a team
#[utoipa::path(
    delete,
    path = "/teams/{id}/members/{user_id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Team ID"),
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Manager privileges required"),
        (status = 404, description = "Team member not found")
    )
)]
pub async fn remove_team_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    claims.require_manager()?;

    state.services.teams.remove_member(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Maintenance team model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::UserRole;

/// Maintenance team from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceTeam {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Team with member count for listings
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TeamSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub member_count: i64,
}

/// Team member joined with user info
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TeamMemberInfo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_technician: bool,
    pub avatar_url: Option<String>,
}

/// Team with its members
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamDetail {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub member_count: i64,
    pub members: Vec<TeamMemberInfo>,
}

/// Team query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct TeamQuery {
    pub search: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Create team request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeam {
    #[validate(length(min = 1, max = 255, message = "Team name is required"))]
    pub name: String,
    pub description: Option<String>,
}

/// Update team request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTeam {
    #[validate(length(min = 1, max = 255, message = "Team name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Add team member request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddTeamMember {
    pub user_id: Uuid,
}

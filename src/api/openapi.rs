//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, dashboard, equipment, health, requests, teams, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GearGuard API",
        version = "1.0.0",
        description = "Maintenance Management System REST API",
        license(name = "MIT"),
        contact(name = "GearGuard Team")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        auth::logout,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Teams
        teams::list_teams,
        teams::get_team,
        teams::create_team,
        teams::update_team,
        teams::delete_team,
        teams::list_team_members,
        teams::add_team_member,
        teams::remove_team_member,
        // Equipment
        equipment::list_equipment,
        equipment::list_categories,
        equipment::list_departments,
        equipment::get_health_summary,
        equipment::get_equipment,
        equipment::list_scrap_logs,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Requests
        requests::list_requests,
        requests::get_kanban,
        requests::get_calendar,
        requests::get_request,
        requests::create_request,
        requests::update_request,
        requests::update_stage,
        requests::delete_request,
        requests::get_request_history,
        // Dashboard
        dashboard::get_kpis,
        dashboard::get_activity,
        dashboard::get_summary,
    ),
    components(
        schemas(
            // Auth
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::AuthUserResponse,
            auth::MessageResponse,
            // Enums
            crate::models::enums::RequestStatus,
            crate::models::enums::RequestType,
            crate::models::enums::UserRole,
            crate::models::enums::EquipmentStatus,
            // Users
            crate::models::user::User,
            crate::models::user::UserQuery,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Teams
            crate::models::team::MaintenanceTeam,
            crate::models::team::TeamSummary,
            crate::models::team::TeamDetail,
            crate::models::team::TeamMemberInfo,
            crate::models::team::CreateTeam,
            crate::models::team::UpdateTeam,
            crate::models::team::AddTeamMember,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentResponse,
            crate::models::equipment::EquipmentHealth,
            crate::models::equipment::EquipmentScrapLog,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            // Requests
            crate::models::request::MaintenanceRequest,
            crate::models::request::RequestDetails,
            crate::models::request::RequestHistory,
            crate::models::request::CreateRequest,
            crate::models::request::UpdateRequest,
            crate::models::request::StageUpdate,
            crate::models::request::KanbanBoard,
            crate::models::request::KanbanColumn,
            crate::models::request::KanbanCard,
            crate::models::request::CalendarView,
            crate::models::request::CalendarItem,
            // Dashboard
            crate::models::dashboard::DashboardKpis,
            crate::models::dashboard::CriticalEquipmentKpi,
            crate::models::dashboard::TechnicianLoadKpi,
            crate::models::dashboard::OpenRequestsKpi,
            crate::models::dashboard::ActivityItem,
            crate::models::dashboard::DashboardSummary,
            crate::models::dashboard::EquipmentHealthDistribution,
            crate::models::dashboard::RequestsByType,
            crate::models::dashboard::RequestsByStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "teams", description = "Maintenance team management"),
        (name = "equipment", description = "Equipment asset management"),
        (name = "requests", description = "Maintenance request workflow"),
        (name = "dashboard", description = "Dashboard KPIs and activity")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

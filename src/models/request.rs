//! Maintenance request model and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{priority_label, RequestStatus, RequestType};

/// Maintenance request from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceRequest {
    pub id: Uuid,
    /// Auto-generated reference, format MR/YYYY/XXXXX
    pub reference: Option<String>,
    pub subject: String,
    pub description: Option<String>,
    pub request_type: RequestType,
    pub status: RequestStatus,
    /// 1=Low, 2=Normal, 3=High, 4=Urgent, 5=Critical
    pub priority: i32,
    pub equipment_id: Option<Uuid>,
    /// Auto-filled from equipment
    pub category: Option<String>,
    pub maintenance_team_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub request_date: NaiveDate,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_hours: Decimal,
    pub notes: Option<String>,
    pub instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Overdue: scheduled in the past and not yet repaired or scrapped
pub fn compute_is_overdue(scheduled_date: Option<DateTime<Utc>>, status: RequestStatus) -> bool {
    match scheduled_date {
        Some(scheduled) => {
            !matches!(status, RequestStatus::Repaired | RequestStatus::Scrap)
                && scheduled < Utc::now()
        }
        None => false,
    }
}

/// Hours between two timestamps, rounded to two decimals
pub fn duration_hours_between(started: DateTime<Utc>, completed: DateTime<Utc>) -> Decimal {
    let seconds = (completed - started).num_seconds().max(0);
    (Decimal::from(seconds) / Decimal::from(3600)).round_dp(2)
}

/// Internal row structure for request queries joined with related names
#[derive(Debug, Clone, FromRow)]
pub struct RequestRow {
    pub id: Uuid,
    pub reference: Option<String>,
    pub subject: String,
    pub description: Option<String>,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub priority: i32,
    pub equipment_id: Option<Uuid>,
    pub category: Option<String>,
    pub maintenance_team_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub request_date: NaiveDate,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_hours: Decimal,
    pub notes: Option<String>,
    pub instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub equipment_name: Option<String>,
    pub team_name: Option<String>,
    pub assigned_to_name: Option<String>,
    pub created_by_name: Option<String>,
}

impl From<RequestRow> for RequestDetails {
    fn from(row: RequestRow) -> Self {
        let overdue = compute_is_overdue(row.scheduled_date, row.status);
        RequestDetails {
            id: row.id,
            reference: row.reference,
            subject: row.subject,
            description: row.description,
            request_type: row.request_type,
            status: row.status,
            stage_label: row.status.label().to_string(),
            priority: row.priority,
            priority_label: priority_label(row.priority).to_string(),
            equipment_id: row.equipment_id,
            equipment_name: row.equipment_name,
            category: row.category,
            maintenance_team_id: row.maintenance_team_id,
            team_name: row.team_name,
            assigned_to: row.assigned_to,
            assigned_to_name: row.assigned_to_name,
            created_by: row.created_by,
            created_by_name: row.created_by_name,
            request_date: row.request_date,
            scheduled_date: row.scheduled_date,
            started_at: row.started_at,
            completed_at: row.completed_at,
            duration_hours: row.duration_hours,
            notes: row.notes,
            instructions: row.instructions,
            is_overdue: overdue,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Full request representation for API responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestDetails {
    pub id: Uuid,
    pub reference: Option<String>,
    pub subject: String,
    pub description: Option<String>,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub stage_label: String,
    pub priority: i32,
    pub priority_label: String,
    pub equipment_id: Option<Uuid>,
    pub equipment_name: Option<String>,
    pub category: Option<String>,
    pub maintenance_team_id: Option<Uuid>,
    pub team_name: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub assigned_to_name: Option<String>,
    pub created_by: Uuid,
    pub created_by_name: Option<String>,
    pub request_date: NaiveDate,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_hours: Decimal,
    pub notes: Option<String>,
    pub instructions: Option<String>,
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RequestQuery {
    pub status: Option<String>,
    pub request_type: Option<String>,
    pub equipment_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    /// Search in subject
    pub search: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

fn default_request_type() -> RequestType {
    RequestType::Corrective
}

/// Create request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    #[validate(length(min = 1, max = 500, message = "Subject is required"))]
    pub subject: String,
    pub description: Option<String>,
    #[serde(default = "default_request_type")]
    pub request_type: RequestType,
    #[validate(range(min = 1, max = 5, message = "Priority must be between 1 and 5"))]
    pub priority: Option<i32>,
    pub equipment_id: Option<Uuid>,
    pub maintenance_team_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub instructions: Option<String>,
}

/// Update request payload. Status is deliberately absent: stage changes go
/// through the transition endpoint only.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRequest {
    #[validate(length(min = 1, max = 500, message = "Subject must not be empty"))]
    pub subject: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Priority must be between 1 and 5"))]
    pub priority: Option<i32>,
    pub maintenance_team_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub instructions: Option<String>,
}

/// Resolved request record ready for insertion, after auto-fill from
/// equipment and creation authorization
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub reference: String,
    pub subject: String,
    pub description: Option<String>,
    pub request_type: RequestType,
    pub priority: i32,
    pub equipment_id: Option<Uuid>,
    pub category: Option<String>,
    pub maintenance_team_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub instructions: Option<String>,
}

/// Stage transition payload (Kanban drag-drop)
#[derive(Debug, Deserialize, ToSchema)]
pub struct StageUpdate {
    /// Target stage: new, in_progress, repaired or scrap
    pub status: String,
    pub comment: Option<String>,
}

/// Stage transition audit record, append-only
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RequestHistory {
    pub id: Uuid,
    pub request_id: Uuid,
    /// Null for the initial creation entry
    pub from_stage: Option<RequestStatus>,
    pub to_stage: RequestStatus,
    pub changed_by: Option<Uuid>,
    pub comment: Option<String>,
    pub duration_at_change: Option<Decimal>,
    pub changed_at: DateTime<Utc>,
}

/// Kanban card
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KanbanCard {
    pub id: Uuid,
    pub reference: Option<String>,
    pub subject: String,
    pub priority: i32,
    pub priority_label: String,
    pub is_overdue: bool,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub equipment_name: Option<String>,
    pub assigned_to_name: Option<String>,
}

/// Kanban column for one stage
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KanbanColumn {
    pub stage: RequestStatus,
    pub stage_label: String,
    pub count: i64,
    pub cards: Vec<KanbanCard>,
}

/// Kanban board grouped by stage
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KanbanBoard {
    pub columns: Vec<KanbanColumn>,
    pub total_requests: i64,
}

/// Calendar entry for a scheduled preventive request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CalendarItem {
    pub id: Uuid,
    pub reference: Option<String>,
    pub subject: String,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub equipment_name: Option<String>,
    pub assigned_to_name: Option<String>,
    pub status: RequestStatus,
}

/// Calendar view for one month
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CalendarView {
    pub items: Vec<CalendarItem>,
    pub month: u32,
    pub year: i32,
}

/// Calendar query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CalendarQuery {
    pub month: u32,
    pub year: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duration_rounding() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        assert_eq!(duration_hours_between(start, end).to_string(), "1.50");
    }

    #[test]
    fn test_duration_never_negative() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        assert_eq!(duration_hours_between(start, end), Decimal::ZERO.round_dp(2));
    }

    #[test]
    fn test_overdue_only_while_open() {
        let past = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert!(compute_is_overdue(Some(past), RequestStatus::New));
        assert!(compute_is_overdue(Some(past), RequestStatus::InProgress));
        assert!(!compute_is_overdue(Some(past), RequestStatus::Repaired));
        assert!(!compute_is_overdue(Some(past), RequestStatus::Scrap));
        assert!(!compute_is_overdue(None, RequestStatus::New));
    }
}

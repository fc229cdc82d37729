//! Dashboard KPI and activity types

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::enums::RequestStatus;

/// Critical equipment KPI card
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CriticalEquipmentKpi {
    pub count: i64,
    pub threshold: i32,
    pub label: String,
    pub description: String,
}

/// Technician utilization KPI card
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TechnicianLoadKpi {
    pub utilization_percentage: f64,
    pub active_technicians: i64,
    pub total_technicians: i64,
    pub label: String,
    pub description: String,
}

/// Open requests KPI card
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OpenRequestsKpi {
    pub pending_count: i64,
    pub overdue_count: i64,
    pub in_progress_count: i64,
    pub label: String,
    pub description: String,
}

/// Top-level dashboard KPIs
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardKpis {
    pub critical_equipment: CriticalEquipmentKpi,
    pub technician_load: TechnicianLoadKpi,
    pub open_requests: OpenRequestsKpi,
    pub last_updated: DateTime<Utc>,
}

/// Recent activity feed entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub user_name: Option<String>,
    pub equipment_name: Option<String>,
    pub status: RequestStatus,
    pub timestamp: DateTime<Utc>,
}

/// Equipment health distribution buckets
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentHealthDistribution {
    pub critical: i64,
    pub poor: i64,
    pub fair: i64,
    pub good: i64,
    pub excellent: i64,
}

/// Request counts by type
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestsByType {
    pub corrective: i64,
    pub preventive: i64,
}

/// Request counts by stage
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestsByStatus {
    pub new: i64,
    pub in_progress: i64,
    pub repaired: i64,
    pub scrap: i64,
}

/// Complete dashboard summary
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub kpis: DashboardKpis,
    pub equipment_health: EquipmentHealthDistribution,
    pub requests_by_type: RequestsByType,
    pub requests_by_status: RequestsByStatus,
    pub recent_activity: Vec<ActivityItem>,
}

//! Equipment model and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::EquipmentStatus;

/// Health percentage below which equipment counts as critical
pub const CRITICAL_HEALTH_THRESHOLD: i32 = 30;

/// Equipment asset from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    pub serial_number: String,
    pub category: String,
    pub department: Option<String>,
    pub assigned_employee_id: Option<Uuid>,
    pub maintenance_team_id: Option<Uuid>,
    pub default_technician_id: Option<Uuid>,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_cost: Option<Decimal>,
    pub warranty_expiry: Option<NaiveDate>,
    pub warranty_info: Option<String>,
    pub health_percentage: i32,
    pub status: EquipmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Equipment {
    /// Equipment is critical when health drops below 30%
    pub fn is_critical(&self) -> bool {
        self.health_percentage < CRITICAL_HEALTH_THRESHOLD
    }

    /// Derived from `status`, which is authoritative for scrap state
    pub fn is_scrapped(&self) -> bool {
        self.status == EquipmentStatus::Scrapped
    }

    pub fn into_response(self, open_request_count: i64) -> EquipmentResponse {
        EquipmentResponse {
            is_critical: self.is_critical(),
            is_scrapped: self.is_scrapped(),
            open_request_count,
            equipment: self,
        }
    }
}

/// Equipment with derived projections for API responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentResponse {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub is_critical: bool,
    pub is_scrapped: bool,
    pub open_request_count: i64,
}

/// Equipment query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentQuery {
    pub category: Option<String>,
    pub department: Option<String>,
    pub status: Option<String>,
    pub is_critical: Option<bool>,
    /// Search by name
    pub search: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Serial number is required"))]
    pub serial_number: String,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
    pub department: Option<String>,
    pub assigned_employee_id: Option<Uuid>,
    pub maintenance_team_id: Option<Uuid>,
    pub default_technician_id: Option<Uuid>,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_cost: Option<Decimal>,
    pub warranty_expiry: Option<NaiveDate>,
    pub warranty_info: Option<String>,
    #[validate(range(min = 0, max = 100, message = "Health must be between 0 and 100"))]
    pub health_percentage: Option<i32>,
    pub notes: Option<String>,
}

/// Update equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 255, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub category: Option<String>,
    pub department: Option<String>,
    pub assigned_employee_id: Option<Uuid>,
    pub maintenance_team_id: Option<Uuid>,
    pub default_technician_id: Option<Uuid>,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_cost: Option<Decimal>,
    pub warranty_expiry: Option<NaiveDate>,
    pub warranty_info: Option<String>,
    #[validate(range(min = 0, max = 100, message = "Health must be between 0 and 100"))]
    pub health_percentage: Option<i32>,
    pub status: Option<EquipmentStatus>,
    pub notes: Option<String>,
}

/// Equipment health summary for the dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentHealth {
    pub total_equipment: i64,
    pub critical_count: i64,
    pub maintenance_count: i64,
    pub healthy_count: i64,
    pub average_health: f64,
}

/// Equipment decommissioning record, written by the workflow engine when a
/// linked request transitions into scrap. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentScrapLog {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub request_id: Option<Uuid>,
    pub scrapped_by: Option<Uuid>,
    pub reason: String,
    pub scrap_value: Option<Decimal>,
    pub disposal_method: Option<String>,
    pub scrapped_at: DateTime<Utc>,
}

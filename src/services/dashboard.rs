//! Dashboard aggregation service

use chrono::Utc;

use crate::{
    error::AppResult,
    models::{
        dashboard::{
            ActivityItem, CriticalEquipmentKpi, DashboardKpis, DashboardSummary, OpenRequestsKpi,
            RequestsByStatus, RequestsByType, TechnicianLoadKpi,
        },
        enums::{RequestStatus, RequestType},
        equipment::CRITICAL_HEALTH_THRESHOLD,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Top-level KPI cards
    pub async fn kpis(&self) -> AppResult<DashboardKpis> {
        let critical_count = self.repository.equipment.count_critical().await?;

        let total_technicians = self.repository.users.count_technicians().await?;
        let active_technicians = self.repository.requests.count_active_assignees().await?;
        let utilization = if total_technicians > 0 {
            active_technicians as f64 / total_technicians as f64 * 100.0
        } else {
            0.0
        };

        let pending_count = self
            .repository
            .requests
            .count_by_status(RequestStatus::New)
            .await?;
        let in_progress_count = self
            .repository
            .requests
            .count_by_status(RequestStatus::InProgress)
            .await?;
        let overdue_count = self.repository.requests.count_overdue().await?;

        Ok(DashboardKpis {
            critical_equipment: CriticalEquipmentKpi {
                count: critical_count,
                threshold: CRITICAL_HEALTH_THRESHOLD,
                label: "Critical Equipment".to_string(),
                description: format!(
                    "{} Units (Health < {}%)",
                    critical_count, CRITICAL_HEALTH_THRESHOLD
                ),
            },
            technician_load: TechnicianLoadKpi {
                utilization_percentage: (utilization * 10.0).round() / 10.0,
                active_technicians,
                total_technicians,
                label: "Technician Load".to_string(),
                description: format!("{}% Utilized", utilization.round()),
            },
            open_requests: OpenRequestsKpi {
                pending_count,
                overdue_count,
                in_progress_count,
                label: "Open Requests".to_string(),
                description: format!("{} Pending, {} Overdue", pending_count, overdue_count),
            },
            last_updated: Utc::now(),
        })
    }

    /// Recent activity feed
    pub async fn activity(&self, limit: i64) -> AppResult<Vec<ActivityItem>> {
        let rows = self.repository.requests.recent(limit.clamp(1, 50)).await?;

        Ok(rows
            .into_iter()
            .map(|row| ActivityItem {
                id: row.id,
                title: row.subject,
                description: format!("Status: {}", row.status),
                user_name: row.created_by_name,
                equipment_name: row.equipment_name,
                status: row.status,
                timestamp: row.updated_at,
            })
            .collect())
    }

    /// Complete dashboard summary
    pub async fn summary(&self) -> AppResult<DashboardSummary> {
        let kpis = self.kpis().await?;
        let equipment_health = self.repository.equipment.health_distribution().await?;

        let requests_by_type = RequestsByType {
            corrective: self
                .repository
                .requests
                .count_by_type(RequestType::Corrective)
                .await?,
            preventive: self
                .repository
                .requests
                .count_by_type(RequestType::Preventive)
                .await?,
        };

        let requests_by_status = RequestsByStatus {
            new: self
                .repository
                .requests
                .count_by_status(RequestStatus::New)
                .await?,
            in_progress: self
                .repository
                .requests
                .count_by_status(RequestStatus::InProgress)
                .await?,
            repaired: self
                .repository
                .requests
                .count_by_status(RequestStatus::Repaired)
                .await?,
            scrap: self
                .repository
                .requests
                .count_by_status(RequestStatus::Scrap)
                .await?,
        };

        let recent_activity = self.activity(5).await?;

        Ok(DashboardSummary {
            kpis,
            equipment_health,
            requests_by_type,
            requests_by_status,
            recent_activity,
        })
    }
}

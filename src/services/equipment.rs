//! Equipment management service
//!
//! Equipment status is mutated here only through regular CRUD and
//! retirement. Scrapping happens exclusively inside the request workflow
//! engine when a linked request transitions into scrap.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::equipment::{
        CreateEquipment, EquipmentHealth, EquipmentQuery, EquipmentResponse, EquipmentScrapLog,
        UpdateEquipment,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List equipment with open request counts
    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<(Vec<EquipmentResponse>, i64)> {
        let (equipment, total) = self.repository.equipment.list(query).await?;
        let open_counts = self.repository.equipment.open_request_counts().await?;

        let items = equipment
            .into_iter()
            .map(|eq| {
                let open = open_counts.get(&eq.id).copied().unwrap_or(0);
                eq.into_response(open)
            })
            .collect();

        Ok((items, total))
    }

    /// Get equipment by ID with open request count
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<EquipmentResponse> {
        let equipment = self.repository.equipment.get_by_id(id).await?;
        let open = self.repository.equipment.open_request_count(id).await?;
        Ok(equipment.into_response(open))
    }

    /// Create equipment
    pub async fn create(&self, data: CreateEquipment) -> AppResult<EquipmentResponse> {
        if self
            .repository
            .equipment
            .get_by_serial(&data.serial_number)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Serial number already exists".to_string(),
            ));
        }

        let equipment = self.repository.equipment.create(&data).await?;
        Ok(equipment.into_response(0))
    }

    /// Update equipment
    pub async fn update(&self, id: Uuid, data: UpdateEquipment) -> AppResult<EquipmentResponse> {
        let equipment = self.repository.equipment.update(id, &data).await?;
        let open = self.repository.equipment.open_request_count(id).await?;
        Ok(equipment.into_response(open))
    }

    /// Retire equipment (soft delete)
    pub async fn retire(&self, id: Uuid) -> AppResult<()> {
        self.repository.equipment.retire(id).await
    }

    /// Scrap history for one equipment
    pub async fn scrap_logs(&self, id: Uuid) -> AppResult<Vec<EquipmentScrapLog>> {
        // Verify equipment exists
        self.repository.equipment.get_by_id(id).await?;
        self.repository.equipment.scrap_logs(id).await
    }

    /// Distinct categories in use
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        self.repository.equipment.categories().await
    }

    /// Distinct departments in use
    pub async fn departments(&self) -> AppResult<Vec<String>> {
        self.repository.equipment.departments().await
    }

    /// Health summary for the dashboard
    pub async fn health_summary(&self) -> AppResult<EquipmentHealth> {
        self.repository.equipment.health_summary().await
    }
}

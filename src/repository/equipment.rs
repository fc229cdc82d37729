//! Equipment repository for database operations

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        dashboard::EquipmentHealthDistribution,
        enums::EquipmentStatus,
        equipment::{
            CreateEquipment, Equipment, EquipmentHealth, EquipmentQuery, UpdateEquipment,
            CRITICAL_HEALTH_THRESHOLD,
        },
    },
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List equipment with filters and pagination
    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<(Vec<Equipment>, i64)> {
        let mut conditions: Vec<String> = Vec::new();
        let mut idx = 1;

        if query.category.is_some() {
            conditions.push(format!("category = ${}", idx));
            idx += 1;
        }
        if query.department.is_some() {
            conditions.push(format!("department = ${}", idx));
            idx += 1;
        }
        if query.status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }
        if query.is_critical == Some(true) {
            conditions.push(format!("health_percentage < {}", CRITICAL_HEALTH_THRESHOLD));
        }
        if query.search.is_some() {
            conditions.push(format!("name ILIKE ${}", idx));
            idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = query.limit.unwrap_or(100).clamp(1, 100);
        let skip = query.skip.unwrap_or(0).max(0);

        let select_sql = format!(
            "SELECT * FROM equipment {} ORDER BY name LIMIT ${} OFFSET ${}",
            where_clause,
            idx,
            idx + 1
        );
        let count_sql = format!("SELECT COUNT(*) FROM equipment {}", where_clause);

        macro_rules! bind_filters {
            ($builder:expr) => {{
                let mut b = $builder;
                if let Some(ref category) = query.category {
                    b = b.bind(category);
                }
                if let Some(ref department) = query.department {
                    b = b.bind(department);
                }
                if let Some(ref status) = query.status {
                    b = b.bind(status);
                }
                if let Some(ref search) = query.search {
                    b = b.bind(format!("%{}%", search));
                }
                b
            }};
        }

        let equipment = bind_filters!(sqlx::query_as::<_, Equipment>(&select_sql))
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = bind_filters!(sqlx::query_scalar(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        Ok((equipment, total))
    }

    /// Open request counts (new or in progress) grouped by equipment
    pub async fn open_request_counts(&self) -> AppResult<HashMap<Uuid, i64>> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT equipment_id, COUNT(*)
            FROM maintenance_requests
            WHERE equipment_id IS NOT NULL AND status IN ('new', 'in_progress')
            GROUP BY equipment_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// Open request count for one equipment
    pub async fn open_request_count(&self, equipment_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM maintenance_requests
            WHERE equipment_id = $1 AND status IN ('new', 'in_progress')
            "#,
        )
        .bind(equipment_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Get equipment by serial number (for duplicate checks)
    pub async fn get_by_serial(&self, serial_number: &str) -> AppResult<Option<Equipment>> {
        let equipment =
            sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE serial_number = $1")
                .bind(serial_number)
                .fetch_optional(&self.pool)
                .await?;
        Ok(equipment)
    }

    /// Create equipment
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let equipment = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (
                name, serial_number, category, department, assigned_employee_id,
                maintenance_team_id, default_technician_id, location, purchase_date,
                purchase_cost, warranty_expiry, warranty_info, health_percentage, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.serial_number)
        .bind(&data.category)
        .bind(&data.department)
        .bind(data.assigned_employee_id)
        .bind(data.maintenance_team_id)
        .bind(data.default_technician_id)
        .bind(&data.location)
        .bind(data.purchase_date)
        .bind(data.purchase_cost)
        .bind(data.warranty_expiry)
        .bind(&data.warranty_info)
        .bind(data.health_percentage.unwrap_or(100))
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(equipment)
    }

    /// Update equipment (only provided fields)
    pub async fn update(&self, id: Uuid, data: &UpdateEquipment) -> AppResult<Equipment> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.category, "category");
        add_field!(data.department, "department");
        add_field!(data.assigned_employee_id, "assigned_employee_id");
        add_field!(data.maintenance_team_id, "maintenance_team_id");
        add_field!(data.default_technician_id, "default_technician_id");
        add_field!(data.location, "location");
        add_field!(data.purchase_date, "purchase_date");
        add_field!(data.purchase_cost, "purchase_cost");
        add_field!(data.warranty_expiry, "warranty_expiry");
        add_field!(data.warranty_info, "warranty_info");
        add_field!(data.health_percentage, "health_percentage");
        add_field!(data.status, "status");
        add_field!(data.notes, "notes");

        let query = format!(
            "UPDATE equipment SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.category);
        bind_field!(data.department);
        bind_field!(data.assigned_employee_id);
        bind_field!(data.maintenance_team_id);
        bind_field!(data.default_technician_id);
        bind_field!(data.location);
        bind_field!(data.purchase_date);
        bind_field!(data.purchase_cost);
        bind_field!(data.warranty_expiry);
        bind_field!(data.warranty_info);
        bind_field!(data.health_percentage);
        bind_field!(data.status);
        bind_field!(data.notes);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Retire equipment instead of removing the row, so history and scrap
    /// logs keep their references
    pub async fn retire(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE equipment SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(EquipmentStatus::Retired)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    /// Distinct categories in use
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        let categories: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT category FROM equipment ORDER BY category")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    /// Distinct departments in use
    pub async fn departments(&self) -> AppResult<Vec<String>> {
        let departments: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT department FROM equipment WHERE department IS NOT NULL ORDER BY department",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(departments)
    }

    /// Health summary for the dashboard
    pub async fn health_summary(&self) -> AppResult<EquipmentHealth> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM equipment")
            .fetch_one(&self.pool)
            .await?;
        let critical = self.count_critical().await?;
        let maintenance: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM equipment WHERE status = 'maintenance'")
                .fetch_one(&self.pool)
                .await?;
        let healthy: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM equipment WHERE health_percentage >= 70")
                .fetch_one(&self.pool)
                .await?;
        let average_health: Option<f64> =
            sqlx::query_scalar("SELECT AVG(health_percentage)::float8 FROM equipment")
                .fetch_one(&self.pool)
                .await?;

        Ok(EquipmentHealth {
            total_equipment: total,
            critical_count: critical,
            maintenance_count: maintenance,
            healthy_count: healthy,
            average_health: average_health.unwrap_or(0.0),
        })
    }

    /// Critical equipment count (health below threshold, not scrapped)
    pub async fn count_critical(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM equipment WHERE health_percentage < $1 AND status != 'scrapped'",
        )
        .bind(CRITICAL_HEALTH_THRESHOLD)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Scrap log entries for one equipment, newest first
    pub async fn scrap_logs(
        &self,
        equipment_id: Uuid,
    ) -> AppResult<Vec<crate::models::equipment::EquipmentScrapLog>> {
        let logs = sqlx::query_as::<_, crate::models::equipment::EquipmentScrapLog>(
            "SELECT * FROM equipment_scrap_logs WHERE equipment_id = $1 ORDER BY scrapped_at DESC",
        )
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    /// Health bucket distribution for the dashboard summary
    pub async fn health_distribution(&self) -> AppResult<EquipmentHealthDistribution> {
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE health_percentage < 30),
                COUNT(*) FILTER (WHERE health_percentage >= 30 AND health_percentage < 50),
                COUNT(*) FILTER (WHERE health_percentage >= 50 AND health_percentage < 70),
                COUNT(*) FILTER (WHERE health_percentage >= 70 AND health_percentage < 90),
                COUNT(*) FILTER (WHERE health_percentage >= 90)
            FROM equipment
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(EquipmentHealthDistribution {
            critical: row.0,
            poor: row.1,
            fair: row.2,
            good: row.3,
            excellent: row.4,
        })
    }
}

//! Maintenance requests repository for database operations
//!
//! Stage transitions run here as a single transaction: the request row is
//! locked and re-read before the legality and authorization checks, so
//! concurrent transitions cannot race past each other.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{EquipmentStatus, RequestStatus, RequestType},
        equipment::Equipment,
        request::{
            duration_hours_between, MaintenanceRequest, NewRequest, RequestHistory, RequestQuery,
            RequestRow,
        },
        user::Actor,
    },
    workflow::{self, ListScope},
};

/// Joined select used for all request read paths
const REQUEST_SELECT: &str = r#"
SELECT r.*,
       e.name AS equipment_name,
       t.name AS team_name,
       a.name AS assigned_to_name,
       c.name AS created_by_name
FROM maintenance_requests r
LEFT JOIN equipment e ON r.equipment_id = e.id
LEFT JOIN maintenance_teams t ON r.maintenance_team_id = t.id
LEFT JOIN users a ON r.assigned_to = a.id
LEFT JOIN users c ON r.created_by = c.id
"#;

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request with joined names
    pub async fn get_row(&self, id: Uuid) -> AppResult<RequestRow> {
        let sql = format!("{} WHERE r.id = $1", REQUEST_SELECT);
        sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// List requests with filters, visibility scope and pagination
    pub async fn list(
        &self,
        query: &RequestQuery,
        scope: &ListScope,
    ) -> AppResult<(Vec<RequestRow>, i64)> {
        // Technicians with no team memberships see nothing, not an error
        if matches!(scope, ListScope::Teams(teams) if teams.is_empty()) {
            return Ok((Vec::new(), 0));
        }

        let mut conditions: Vec<String> = Vec::new();
        let mut idx = 1;

        match scope {
            ListScope::All => {}
            ListScope::Teams(_) => {
                conditions.push(format!("r.maintenance_team_id = ANY(${})", idx));
                idx += 1;
            }
            ListScope::Creator(_) => {
                conditions.push(format!("r.created_by = ${}", idx));
                idx += 1;
            }
        }
        if query.status.is_some() {
            conditions.push(format!("r.status = ${}", idx));
            idx += 1;
        }
        if query.request_type.is_some() {
            conditions.push(format!("r.request_type = ${}", idx));
            idx += 1;
        }
        if query.equipment_id.is_some() {
            conditions.push(format!("r.equipment_id = ${}", idx));
            idx += 1;
        }
        if query.team_id.is_some() {
            conditions.push(format!("r.maintenance_team_id = ${}", idx));
            idx += 1;
        }
        if query.assigned_to.is_some() {
            conditions.push(format!("r.assigned_to = ${}", idx));
            idx += 1;
        }
        if query.search.is_some() {
            conditions.push(format!("r.subject ILIKE ${}", idx));
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
            "{} {} ORDER BY r.created_at DESC LIMIT ${} OFFSET ${}",
            REQUEST_SELECT,
            where_clause,
            idx,
            idx + 1
        );
        let count_sql = format!(
            "SELECT COUNT(*) FROM maintenance_requests r {}",
            where_clause
        );

        macro_rules! bind_filters {
            ($builder:expr) => {{
                let mut b = $builder;
                match scope {
                    ListScope::All => {}
                    ListScope::Teams(teams) => b = b.bind(teams.clone()),
                    ListScope::Creator(user_id) => b = b.bind(*user_id),
                }
                if let Some(ref status) = query.status {
                    b = b.bind(status);
                }
                if let Some(ref request_type) = query.request_type {
                    b = b.bind(request_type);
                }
                if let Some(equipment_id) = query.equipment_id {
                    b = b.bind(equipment_id);
                }
                if let Some(team_id) = query.team_id {
                    b = b.bind(team_id);
                }
                if let Some(assigned_to) = query.assigned_to {
                    b = b.bind(assigned_to);
                }
                if let Some(ref search) = query.search {
                    b = b.bind(format!("%{}%", search));
                }
                b
            }};
        }

        let rows = bind_filters!(sqlx::query_as::<_, RequestRow>(&select_sql))
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = bind_filters!(sqlx::query_scalar(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Requests in one Kanban stage, priority first
    pub async fn list_stage(
        &self,
        stage: RequestStatus,
        team_id: Option<Uuid>,
        scope: &ListScope,
    ) -> AppResult<Vec<RequestRow>> {
        if matches!(scope, ListScope::Teams(teams) if teams.is_empty()) {
            return Ok(Vec::new());
        }

        let mut conditions = vec!["r.status = $1".to_string()];
        let mut idx = 2;

        match scope {
            ListScope::All => {}
            ListScope::Teams(_) => {
                conditions.push(format!("r.maintenance_team_id = ANY(${})", idx));
                idx += 1;
            }
            ListScope::Creator(_) => {
                conditions.push(format!("r.created_by = ${}", idx));
                idx += 1;
            }
        }
        if team_id.is_some() {
            conditions.push(format!("r.maintenance_team_id = ${}", idx));
        }

        let sql = format!(
            "{} WHERE {} ORDER BY r.priority DESC, r.created_at DESC",
            REQUEST_SELECT,
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query_as::<_, RequestRow>(&sql).bind(stage);
        match scope {
            ListScope::All => {}
            ListScope::Teams(teams) => builder = builder.bind(teams.clone()),
            ListScope::Creator(user_id) => builder = builder.bind(*user_id),
        }
        if let Some(team_id) = team_id {
            builder = builder.bind(team_id);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Preventive requests scheduled within the given range
    pub async fn calendar_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        scope: &ListScope,
    ) -> AppResult<Vec<RequestRow>> {
        if matches!(scope, ListScope::Teams(teams) if teams.is_empty()) {
            return Ok(Vec::new());
        }

        let mut conditions = vec![
            "r.request_type = 'preventive'".to_string(),
            "r.scheduled_date >= $1".to_string(),
            "r.scheduled_date < $2".to_string(),
        ];
        match scope {
            ListScope::All => {}
            ListScope::Teams(_) => conditions.push("r.maintenance_team_id = ANY($3)".to_string()),
            ListScope::Creator(_) => conditions.push("r.created_by = $3".to_string()),
        }

        let sql = format!(
            "{} WHERE {} ORDER BY r.scheduled_date",
            REQUEST_SELECT,
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query_as::<_, RequestRow>(&sql).bind(start).bind(end);
        match scope {
            ListScope::All => {}
            ListScope::Teams(teams) => builder = builder.bind(teams.clone()),
            ListScope::Creator(user_id) => builder = builder.bind(*user_id),
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Create a request in stage `new` together with its initial history
    /// entry, atomically
    pub async fn create(&self, data: &NewRequest) -> AppResult<MaintenanceRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            INSERT INTO maintenance_requests (
                reference, subject, description, request_type, status, priority,
                equipment_id, category, maintenance_team_id, assigned_to, created_by,
                scheduled_date, notes, instructions
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(&data.reference)
        .bind(&data.subject)
        .bind(&data.description)
        .bind(data.request_type)
        .bind(RequestStatus::New)
        .bind(data.priority)
        .bind(data.equipment_id)
        .bind(&data.category)
        .bind(data.maintenance_team_id)
        .bind(data.assigned_to)
        .bind(data.created_by)
        .bind(data.scheduled_date)
        .bind(&data.notes)
        .bind(&data.instructions)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO request_history (request_id, from_stage, to_stage, changed_by, comment)
            VALUES ($1, NULL, $2, $3, $4)
            "#,
        )
        .bind(request.id)
        .bind(RequestStatus::New)
        .bind(data.created_by)
        .bind("Request created")
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(request)
    }

    /// Apply a stage transition as one atomic unit: lock and re-read the
    /// request, validate legality and authorization against the locked row,
    /// mutate the request, append the audit entry, and on scrap update the
    /// linked equipment and write the scrap log. All-or-nothing.
    ///
    /// A same-stage call is an idempotent no-op and writes no history.
    pub async fn transition(
        &self,
        id: Uuid,
        target: RequestStatus,
        actor: &Actor,
        comment: Option<&str>,
    ) -> AppResult<MaintenanceRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, MaintenanceRequest>(
            "SELECT * FROM maintenance_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))?;

        if request.status == target {
            return Ok(request);
        }

        workflow::validate_transition(request.status, target)?;
        workflow::authorize_transition(actor, request.maintenance_team_id, target)?;

        let now = Utc::now();
        let started_at = match (target, request.started_at) {
            (RequestStatus::InProgress, None) => Some(now),
            _ => request.started_at,
        };
        let completed_at = match target {
            RequestStatus::Repaired | RequestStatus::Scrap if request.completed_at.is_none() => {
                Some(now)
            }
            _ => request.completed_at,
        };
        let duration_hours = match (started_at, completed_at) {
            (Some(started), Some(completed)) => duration_hours_between(started, completed),
            _ => request.duration_hours,
        };

        let updated = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests
            SET status = $1, started_at = $2, completed_at = $3, duration_hours = $4, updated_at = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(target)
        .bind(started_at)
        .bind(completed_at)
        .bind(duration_hours)
        .bind(now)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO request_history (request_id, from_stage, to_stage, changed_by, comment, duration_at_change)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(request.status)
        .bind(target)
        .bind(actor.id)
        .bind(comment)
        .bind(duration_hours)
        .execute(&mut *tx)
        .await?;

        if target == RequestStatus::Scrap {
            if let Some(equipment_id) = request.equipment_id {
                let equipment = sqlx::query_as::<_, Equipment>(
                    "SELECT * FROM equipment WHERE id = $1 FOR UPDATE",
                )
                .bind(equipment_id)
                .fetch_optional(&mut *tx)
                .await?;

                if let Some(equipment) = equipment {
                    sqlx::query("UPDATE equipment SET status = $1, updated_at = $2 WHERE id = $3")
                        .bind(EquipmentStatus::Scrapped)
                        .bind(now)
                        .bind(equipment.id)
                        .execute(&mut *tx)
                        .await?;

                    sqlx::query(
                        r#"
                        INSERT INTO equipment_scrap_logs (equipment_id, request_id, scrapped_by, reason)
                        VALUES ($1, $2, $3, $4)
                        "#,
                    )
                    .bind(equipment.id)
                    .bind(id)
                    .bind(actor.id)
                    .bind(format!(
                        "Scrapped via maintenance request: {}",
                        request.subject
                    ))
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Update a request's editable fields (only provided ones). Status is
    /// not touched here: stage changes go through [`Self::transition`].
    pub async fn update_fields(&self, id: Uuid, data: &crate::models::request::UpdateRequest) -> AppResult<MaintenanceRequest> {
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

        add_field!(data.subject, "subject");
        add_field!(data.description, "description");
        add_field!(data.priority, "priority");
        add_field!(data.maintenance_team_id, "maintenance_team_id");
        add_field!(data.assigned_to, "assigned_to");
        add_field!(data.scheduled_date, "scheduled_date");
        add_field!(data.notes, "notes");
        add_field!(data.instructions, "instructions");

        let query = format!(
            "UPDATE maintenance_requests SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, MaintenanceRequest>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.subject);
        bind_field!(data.description);
        bind_field!(data.priority);
        bind_field!(data.maintenance_team_id);
        bind_field!(data.assigned_to);
        bind_field!(data.scheduled_date);
        bind_field!(data.notes);
        bind_field!(data.instructions);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// Stage change history for a request, newest first
    pub async fn history(&self, request_id: Uuid) -> AppResult<Vec<RequestHistory>> {
        let entries = sqlx::query_as::<_, RequestHistory>(
            "SELECT * FROM request_history WHERE request_id = $1 ORDER BY changed_at DESC",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Delete a request (history cascades)
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM maintenance_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Request {} not found", id)));
        }
        Ok(())
    }

    /// Count requests in one stage
    pub async fn count_by_status(&self, status: RequestStatus) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM maintenance_requests WHERE status = $1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count requests of one type
    pub async fn count_by_type(&self, request_type: RequestType) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM maintenance_requests WHERE request_type = $1")
                .bind(request_type)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Open requests whose scheduled date has passed
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM maintenance_requests
            WHERE scheduled_date < NOW() AND status IN ('new', 'in_progress')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Technicians currently working on at least one request
    pub async fn count_active_assignees(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT assigned_to) FROM maintenance_requests
            WHERE status = 'in_progress' AND assigned_to IS NOT NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Most recently updated requests (for the activity feed)
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<RequestRow>> {
        let sql = format!("{} ORDER BY r.updated_at DESC LIMIT $1", REQUEST_SELECT);
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

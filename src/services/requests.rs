//! Maintenance request workflow service
//!
//! Front door for everything that touches a request's lifecycle: creation,
//! stage transitions, scoped reads and the Kanban/calendar projections.
//! Authorization for stage changes lives in [`crate::workflow`] and is
//! enforced inside the repository transaction, so it holds no matter which
//! endpoint the call came through.

use chrono::{Datelike, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RequestStatus,
        request::{
            CalendarItem, CalendarView, CreateRequest, KanbanBoard, KanbanCard, KanbanColumn,
            NewRequest, RequestDetails, RequestHistory, RequestQuery, RequestRow, StageUpdate,
            UpdateRequest,
        },
        user::Actor,
    },
    repository::Repository,
    workflow,
};

/// Generate a unique reference number, format MR/YYYY/XXXXX
fn generate_reference() -> String {
    let year = Utc::now().year();
    let serial = Uuid::new_v4().as_u128() % 100_000;
    format!("MR/{}/{:05}", year, serial)
}

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List requests visible to the acting user
    pub async fn list(
        &self,
        actor: &Actor,
        query: &RequestQuery,
    ) -> AppResult<(Vec<RequestDetails>, i64)> {
        let scope = workflow::list_scope(actor);
        let (rows, total) = self.repository.requests.list(query, &scope).await?;
        Ok((rows.into_iter().map(RequestDetails::from).collect(), total))
    }

    /// Get a single request. Requests outside the actor's scope exist but
    /// are off limits, so that case is Forbidden rather than NotFound.
    pub async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<RequestDetails> {
        let row = self.repository.requests.get_row(id).await?;
        self.check_view(actor, &row)?;
        Ok(row.into())
    }

    /// Create a request in stage `new`, auto-filling team, technician and
    /// category from the linked equipment
    pub async fn create(&self, actor: &Actor, data: CreateRequest) -> AppResult<RequestDetails> {
        use crate::models::enums::{RequestType, UserRole};

        if data.request_type == RequestType::Preventive
            && !matches!(actor.role, UserRole::Admin | UserRole::Manager)
        {
            return Err(AppError::Authorization(
                "Only managers can schedule preventive maintenance".to_string(),
            ));
        }

        let mut category = None;
        let mut team_id = data.maintenance_team_id;
        let mut assigned_to = data.assigned_to;

        if let Some(equipment_id) = data.equipment_id {
            let equipment = self.repository.equipment.get_by_id(equipment_id).await?;
            category = Some(equipment.category);
            if team_id.is_none() {
                team_id = equipment.maintenance_team_id;
            }
            if assigned_to.is_none() {
                assigned_to = equipment.default_technician_id;
            }
        }

        let record = NewRequest {
            reference: generate_reference(),
            subject: data.subject,
            description: data.description,
            request_type: data.request_type,
            priority: data.priority.unwrap_or(2),
            equipment_id: data.equipment_id,
            category,
            maintenance_team_id: team_id,
            assigned_to,
            created_by: actor.id,
            scheduled_date: data.scheduled_date,
            notes: data.notes,
            instructions: data.instructions,
        };

        let request = self.repository.requests.create(&record).await?;
        tracing::info!(request_id = %request.id, reference = ?request.reference, "Maintenance request created");

        let row = self.repository.requests.get_row(request.id).await?;
        Ok(row.into())
    }

    /// Update a request's editable fields. Stage changes are rejected here;
    /// they go through [`Self::change_stage`].
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        data: UpdateRequest,
    ) -> AppResult<RequestDetails> {
        let row = self.repository.requests.get_row(id).await?;
        self.check_view(actor, &row)?;

        self.repository.requests.update_fields(id, &data).await?;
        let row = self.repository.requests.get_row(id).await?;
        Ok(row.into())
    }

    /// Apply a stage transition for the acting user
    pub async fn change_stage(
        &self,
        actor: &Actor,
        id: Uuid,
        data: StageUpdate,
    ) -> AppResult<RequestDetails> {
        let target: RequestStatus = data
            .status
            .parse()
            .map_err(AppError::InvalidStatus)?;

        let updated = self
            .repository
            .requests
            .transition(id, target, actor, data.comment.as_deref())
            .await?;

        tracing::info!(
            request_id = %updated.id,
            status = %updated.status,
            changed_by = %actor.id,
            "Request stage changed"
        );

        let row = self.repository.requests.get_row(updated.id).await?;
        Ok(row.into())
    }

    /// Delete a request (administrators only; history cascades)
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        use crate::models::enums::UserRole;

        if actor.role != UserRole::Admin {
            return Err(AppError::Authorization(
                "Only administrators can delete requests".to_string(),
            ));
        }
        self.repository.requests.delete(id).await
    }

    /// Stage change history, scoped like [`Self::get`]
    pub async fn history(&self, actor: &Actor, id: Uuid) -> AppResult<Vec<RequestHistory>> {
        let row = self.repository.requests.get_row(id).await?;
        self.check_view(actor, &row)?;
        self.repository.requests.history(id).await
    }

    /// Kanban board grouped by stage, visible to the acting user
    pub async fn kanban(&self, actor: &Actor, team_id: Option<Uuid>) -> AppResult<KanbanBoard> {
        let scope = workflow::list_scope(actor);
        let mut columns = Vec::with_capacity(RequestStatus::ALL.len());
        let mut total = 0i64;

        for stage in RequestStatus::ALL {
            let rows = self
                .repository
                .requests
                .list_stage(stage, team_id, &scope)
                .await?;

            let cards: Vec<KanbanCard> = rows
                .into_iter()
                .map(|row| {
                    let details = RequestDetails::from(row);
                    KanbanCard {
                        id: details.id,
                        reference: details.reference,
                        subject: details.subject,
                        priority: details.priority,
                        priority_label: details.priority_label,
                        is_overdue: details.is_overdue,
                        scheduled_date: details.scheduled_date,
                        equipment_name: details.equipment_name,
                        assigned_to_name: details.assigned_to_name,
                    }
                })
                .collect();

            total += cards.len() as i64;
            columns.push(KanbanColumn {
                stage,
                stage_label: stage.label().to_string(),
                count: cards.len() as i64,
                cards,
            });
        }

        Ok(KanbanBoard {
            columns,
            total_requests: total,
        })
    }

    /// Preventive requests scheduled in the given month
    pub async fn calendar(&self, actor: &Actor, month: u32, year: i32) -> AppResult<CalendarView> {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(
                "Month must be between 1 and 12".to_string(),
            ));
        }

        let start = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| AppError::Validation("Invalid month or year".to_string()))?;
        let end = if month == 12 {
            Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
        } else {
            Utc.with_ymd_and_hms(year, month + 1, 1, 0, 0, 0)
        }
        .single()
        .ok_or_else(|| AppError::Validation("Invalid month or year".to_string()))?;

        let scope = workflow::list_scope(actor);
        let rows = self
            .repository
            .requests
            .calendar_range(start, end, &scope)
            .await?;

        let items = rows
            .into_iter()
            .map(|row| CalendarItem {
                id: row.id,
                reference: row.reference,
                subject: row.subject,
                scheduled_date: row.scheduled_date,
                equipment_name: row.equipment_name,
                assigned_to_name: row.assigned_to_name,
                status: row.status,
            })
            .collect();

        Ok(CalendarView { items, month, year })
    }

    fn check_view(&self, actor: &Actor, row: &RequestRow) -> AppResult<()> {
        if workflow::can_view(actor, row.maintenance_team_id, row.created_by) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "You do not have access to this request".to_string(),
            ))
        }
    }
}

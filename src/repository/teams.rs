//! Maintenance teams repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::team::{
        CreateTeam, MaintenanceTeam, TeamMemberInfo, TeamQuery, TeamSummary, UpdateTeam,
    },
};

#[derive(Clone)]
pub struct TeamsRepository {
    pool: Pool<Postgres>,
}

impl TeamsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List teams with member counts
    pub async fn list(&self, query: &TeamQuery) -> AppResult<(Vec<TeamSummary>, i64)> {
        let limit = query.limit.unwrap_or(100).clamp(1, 100);
        let skip = query.skip.unwrap_or(0).max(0);
        let search = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s))
            .unwrap_or_else(|| "%".to_string());

        let teams = sqlx::query_as::<_, TeamSummary>(
            r#"
            SELECT t.id, t.name, t.description, t.created_at,
                   (SELECT COUNT(*) FROM team_members m WHERE m.team_id = t.id) AS member_count
            FROM maintenance_teams t
            WHERE t.name ILIKE $1
            ORDER BY t.name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&search)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM maintenance_teams WHERE name ILIKE $1")
                .bind(&search)
                .fetch_one(&self.pool)
                .await?;

        Ok((teams, total))
    }

    /// Get team by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<MaintenanceTeam> {
        sqlx::query_as::<_, MaintenanceTeam>("SELECT * FROM maintenance_teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", id)))
    }

    /// Get team by name (for duplicate checks)
    pub async fn get_by_name(&self, name: &str) -> AppResult<Option<MaintenanceTeam>> {
        let team =
            sqlx::query_as::<_, MaintenanceTeam>("SELECT * FROM maintenance_teams WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(team)
    }

    /// Create a team
    pub async fn create(&self, data: &CreateTeam) -> AppResult<MaintenanceTeam> {
        let team = sqlx::query_as::<_, MaintenanceTeam>(
            "INSERT INTO maintenance_teams (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(team)
    }

    /// Update a team (only provided fields)
    pub async fn update(&self, id: Uuid, data: &UpdateTeam) -> AppResult<MaintenanceTeam> {
        let mut sets: Vec<String> = Vec::new();
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.description, "description");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE maintenance_teams SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, MaintenanceTeam>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.description);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", id)))
    }

    /// Delete a team
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM maintenance_teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Team {} not found", id)));
        }
        Ok(())
    }

    /// List members of a team joined with user info
    pub async fn members(&self, team_id: Uuid) -> AppResult<Vec<TeamMemberInfo>> {
        let members = sqlx::query_as::<_, TeamMemberInfo>(
            r#"
            SELECT m.id, m.user_id, u.name, u.email, u.role, u.is_technician, u.avatar_url
            FROM team_members m
            JOIN users u ON m.user_id = u.id
            WHERE m.team_id = $1
            ORDER BY u.name
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    /// Whether the user already belongs to the team
    pub async fn is_member(&self, team_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM team_members WHERE team_id = $1 AND user_id = $2)",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Add a member to a team
    pub async fn add_member(&self, team_id: Uuid, user_id: Uuid) -> AppResult<TeamMemberInfo> {
        let member_id: Uuid = sqlx::query_scalar(
            "INSERT INTO team_members (team_id, user_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let member = sqlx::query_as::<_, TeamMemberInfo>(
            r#"
            SELECT m.id, m.user_id, u.name, u.email, u.role, u.is_technician, u.avatar_url
            FROM team_members m
            JOIN users u ON m.user_id = u.id
            WHERE m.id = $1
            "#,
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(member)
    }

    /// Remove a member from a team
    pub async fn remove_member(&self, team_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Team member not found".to_string()));
        }
        Ok(())
    }
}

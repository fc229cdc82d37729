//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserQuery},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Get user by email (for login and duplicate checks)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Search users with pagination
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        let mut conditions: Vec<String> = Vec::new();
        let mut idx = 1;

        if query.search.is_some() {
            conditions.push(format!("(name ILIKE ${0} OR email ILIKE ${0})", idx));
            idx += 1;
        }
        if query.role.is_some() {
            conditions.push(format!("role = ${}", idx));
            idx += 1;
        }
        if query.is_technician.is_some() {
            conditions.push(format!("is_technician = ${}", idx));
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
            "SELECT * FROM users {} ORDER BY name LIMIT ${} OFFSET ${}",
            where_clause,
            idx,
            idx + 1
        );
        let count_sql = format!("SELECT COUNT(*) FROM users {}", where_clause);

        macro_rules! bind_filters {
            ($builder:expr) => {{
                let mut b = $builder;
                if let Some(ref search) = query.search {
                    b = b.bind(format!("%{}%", search));
                }
                if let Some(ref role) = query.role {
                    b = b.bind(role);
                }
                if let Some(is_technician) = query.is_technician {
                    b = b.bind(is_technician);
                }
                b
            }};
        }

        let users = bind_filters!(sqlx::query_as::<_, User>(&select_sql))
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = bind_filters!(sqlx::query_scalar(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        Ok((users, total))
    }

    /// Create a user. The password hash is computed by the auth service.
    pub async fn create(&self, data: &CreateUser, password_hash: Option<String>) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, phone, department, job_title, role, is_technician, avatar_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(password_hash)
        .bind(&data.phone)
        .bind(&data.department)
        .bind(&data.job_title)
        .bind(data.role.unwrap_or(crate::models::enums::UserRole::User))
        .bind(data.is_technician.unwrap_or(false))
        .bind(&data.avatar_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Update a user (only provided fields)
    pub async fn update(&self, id: Uuid, data: &UpdateUser) -> AppResult<User> {
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
        add_field!(data.email, "email");
        add_field!(data.phone, "phone");
        add_field!(data.department, "department");
        add_field!(data.job_title, "job_title");
        add_field!(data.role, "role");
        add_field!(data.is_technician, "is_technician");
        add_field!(data.is_active, "is_active");
        add_field!(data.avatar_url, "avatar_url");

        let query = format!(
            "UPDATE users SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, User>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.email);
        bind_field!(data.phone);
        bind_field!(data.department);
        bind_field!(data.job_title);
        bind_field!(data.role);
        bind_field!(data.is_technician);
        bind_field!(data.is_active);
        bind_field!(data.avatar_url);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Delete a user
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    /// Maintenance teams the user belongs to
    pub async fn team_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT team_id FROM team_members WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }

    /// Count active technicians (for dashboard)
    pub async fn count_technicians(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE is_technician = TRUE AND is_active = TRUE",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

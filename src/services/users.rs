//! User management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserQuery},
    repository::Repository,
};

use super::auth::hash_password;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search users with pagination
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.search(query).await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create a new user
    pub async fn create(&self, data: CreateUser) -> AppResult<User> {
        if self
            .repository
            .users
            .get_by_email(&data.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = match data.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        self.repository.users.create(&data, password_hash).await
    }

    /// Update an existing user
    pub async fn update(&self, id: Uuid, data: UpdateUser) -> AppResult<User> {
        if let Some(ref email) = data.email {
            if let Some(existing) = self.repository.users.get_by_email(email).await? {
                if existing.id != id {
                    return Err(AppError::Conflict(
                        "An account with this email already exists".to_string(),
                    ));
                }
            }
        }

        self.repository.users.update(id, &data).await
    }

    /// Delete a user
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.users.delete(id).await
    }
}

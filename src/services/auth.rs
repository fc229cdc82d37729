//! Authentication service: registration, login, token issuance and actor
//! resolution for the workflow engine

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        enums::UserRole,
        user::{Actor, Claims, User},
    },
    repository::Repository,
};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against its Argon2 hash
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Password policy: at least 8 characters with an uppercase letter, a
/// lowercase letter and a special character
pub fn validate_password_strength(password: &str) -> AppResult<()> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AppError::Validation(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AppError::Validation(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| "!@#$%^&*(),.?\":{}|<>".contains(c)) {
        return Err(AppError::Validation(
            "Password must contain at least one special character".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account with the default `user` role
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<(User, String, i64)> {
        if self.repository.users.get_by_email(email).await?.is_some() {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        validate_password_strength(password)?;
        let password_hash = hash_password(password)?;

        let data = crate::models::user::CreateUser {
            name: name.to_string(),
            email: email.to_string(),
            password: None,
            phone: None,
            department: None,
            job_title: None,
            role: Some(UserRole::User),
            is_technician: Some(false),
            avatar_url: None,
        };
        let user = self.repository.users.create(&data, Some(password_hash)).await?;

        let (token, expires_in) = self.issue_token(&user)?;
        Ok((user, token, expires_in))
    }

    /// Authenticate with email and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(User, String, i64)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Account not found. Please check your email.".to_string())
            })?;

        let hash = user.password_hash.as_deref().ok_or_else(|| {
            AppError::Authentication("Please set a password for your account".to_string())
        })?;

        if !verify_password(password, hash)? {
            return Err(AppError::Authentication("Invalid password".to_string()));
        }

        if !user.is_active {
            return Err(AppError::Authentication(
                "Your account has been deactivated".to_string(),
            ));
        }

        let (token, expires_in) = self.issue_token(&user)?;
        Ok((user, token, expires_in))
    }

    /// Issue a signed JWT for the user. Returns the token and its lifetime
    /// in seconds.
    pub fn issue_token(&self, user: &User) -> AppResult<(String, i64)> {
        let now = Utc::now();
        let expires_in = (self.config.jwt_expiration_hours * 3600) as i64;
        let claims = Claims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp: now.timestamp() + expires_in,
            iat: now.timestamp(),
        };
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;
        Ok((token, expires_in))
    }

    /// Current user profile for the token's subject
    pub async fn me(&self, claims: &Claims) -> AppResult<User> {
        self.repository.users.get_by_id(claims.user_id).await
    }

    /// Resolve the acting user for the workflow engine: fresh role from the
    /// database plus the set of team memberships
    pub async fn resolve_actor(&self, claims: &Claims) -> AppResult<Actor> {
        let user = match self.repository.users.get_by_id(claims.user_id).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Authentication("User not found".to_string()))
            }
            Err(e) => return Err(e),
        };

        if !user.is_active {
            return Err(AppError::Authentication(
                "Your account has been deactivated".to_string(),
            ));
        }

        let team_ids = self.repository.users.team_ids(user.id).await?;
        Ok(Actor {
            id: user.id,
            role: user.role,
            team_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_strength_rules() {
        assert!(validate_password_strength("Sh0rt!").is_err());
        assert!(validate_password_strength("alllowercase!").is_err());
        assert!(validate_password_strength("ALLUPPERCASE!").is_err());
        assert!(validate_password_strength("NoSpecial1234").is_err());
        assert!(validate_password_strength("Valid-pass!X").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Valid-pass!X").unwrap();
        assert!(verify_password("Valid-pass!X", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }
}

//! Account service: registration, authentication and user administration

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{NewUser, RegisterUser, User, UserClaims, MIN_PASSWORD_LENGTH},
    repository::Repository,
};

use super::SharedClock;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    clock: SharedClock,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig, clock: SharedClock) -> Self {
        Self {
            repository,
            config,
            clock,
        }
    }

    /// Register a new active, non-admin user
    pub async fn register(&self, request: RegisterUser) -> AppResult<User> {
        if request.password != request.confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }

        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let username = request.username.trim().to_string();
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        let request = RegisterUser {
            username,
            email,
            ..request
        };
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.users.username_exists(&request.username).await? {
            tracing::debug!("Registration refused: username '{}' taken", request.username);
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                request.username
            )));
        }

        let new_user = NewUser {
            username: request.username,
            email: request.email,
            password_hash: self.hash_password(&request.password)?,
            is_admin: false,
        };

        let user = self
            .repository
            .users
            .create(&new_user, self.clock.utc())
            .await?;

        tracing::info!("Registered user '{}' (id={})", user.username, user.id);
        Ok(user)
    }

    /// Check credentials; only active users can authenticate
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Option<User>> {
        let Some(user) = self
            .repository
            .users
            .get_active_by_username(username)
            .await?
        else {
            return Ok(None);
        };

        if self.verify_password(&user, password)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Create a JWT token for a user
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        // Token expiry is checked against the system clock on decode
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            is_admin: user.is_admin,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify a password against the stored credential.
    ///
    /// Accepts Argon2 PHC strings and legacy unsalted hex SHA-256 digests.
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        if user.password_hash.starts_with('$') {
            let parsed_hash = PasswordHash::new(&user.password_hash)
                .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
            return Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok());
        }

        let digest = hex::encode(Sha256::digest(password.as_bytes()));
        Ok(digest.eq_ignore_ascii_case(&user.password_hash))
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List all users, newest first
    pub async fn list_all(&self) -> AppResult<Vec<User>> {
        self.repository.users.list_all().await
    }

    /// Deactivate a user account
    pub async fn deactivate(&self, id: i64) -> AppResult<User> {
        let user = self.repository.users.deactivate(id).await?;
        tracing::info!("Deactivated user '{}' (id={})", user.username, user.id);
        Ok(user)
    }

    /// Create an administrator unless the username is already taken
    pub async fn ensure_admin(
        &self,
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> AppResult<bool> {
        let admin = NewUser {
            username: username.to_string(),
            email: email.map(str::to_string),
            password_hash: self.hash_password(password)?,
            is_admin: true,
        };
        self.repository
            .users
            .create_if_absent(&admin, self.clock.utc())
            .await
    }
}

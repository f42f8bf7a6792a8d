//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        user::{CreateUser, UpdateUser, User, UserClaims, UserInput},
        Role,
    },
    repository::Repository,
    services::{email::EmailService, redis::RedisService},
};

pub const MIN_PASSWORD_LENGTH: usize = 8;

const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

/// Answer to a forgot-password request
#[derive(Debug, Clone)]
pub struct ResetRequested {
    pub message: String,
    /// Only set when links are exposed for development
    pub reset_link: Option<String>,
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    redis: RedisService,
    email: EmailService,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig, redis: RedisService, email: EmailService) -> Self {
        Self { repository, config, redis, email }
    }

    // ---- Authentication ----

    /// Authenticate by username and password and return a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let invalid = || AppError::Authentication("Invalid username or password".to_string());

        let user = self
            .repository
            .users_find_by_username(username)
            .await?
            .ok_or_else(invalid)?;

        if !user.is_active {
            return Err(AppError::Authentication("Account is inactive".to_string()));
        }

        if !verify_password(&user.password_hash, password)? {
            return Err(invalid());
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok((token, user))
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };
        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Start a password reset. The answer is the same whether or not the
    /// email is registered.
    pub async fn forgot_password(&self, email: &str) -> AppResult<ResetRequested> {
        let user = self.repository.users_find_by_email(email).await?;
        Ok(self.answer_reset_request(user).await)
    }

    /// Delivery failures are logged, never reported, so a registered email
    /// gets the same answer as an unknown one.
    async fn answer_reset_request(&self, user: Option<User>) -> ResetRequested {
        let mut reset_link = None;

        if let Some(user) = user {
            match self.deliver_reset_link(&user).await {
                Ok(link) if self.config.expose_reset_links => reset_link = Some(link),
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(user_id = %user.id, error = %e, "Failed to deliver password reset link")
                }
            }
        }

        ResetRequested {
            message: FORGOT_PASSWORD_MESSAGE.to_string(),
            reset_link,
        }
    }

    /// Store a fresh token and send (or log) the link
    async fn deliver_reset_link(&self, user: &User) -> AppResult<String> {
        let token = generate_reset_token();
        let ttl_minutes = self.config.password_reset_ttl_minutes;
        self.redis
            .store_reset_token(&token_digest(&token), &user.email, ttl_minutes * 60)
            .await?;

        let link = format!(
            "{}/auth/reset-password?token={}",
            self.config.app_url.trim_end_matches('/'),
            token
        );

        if self.email.is_enabled() {
            self.email.send_password_reset(&user.email, &link, ttl_minutes).await?;
        } else {
            tracing::info!(user_id = %user.id, "Password reset link: {}", link);
        }

        Ok(link)
    }

    /// Consume a reset token and set a new password
    pub async fn reset_password(&self, token: &str, password: &str) -> AppResult<()> {
        if token.is_empty() || password.is_empty() {
            return Err(AppError::Validation("Token and password are required".to_string()));
        }
        check_password_length(password)?;

        let email = self
            .redis
            .take_reset_token(&token_digest(token))
            .await?
            .ok_or_else(|| AppError::Validation("Invalid or expired reset token".to_string()))?;

        let hash = hash_password(password)?;
        self.repository.users_update_password_by_email(&email, &hash).await?;
        tracing::info!("Password reset completed");
        Ok(())
    }

    /// Create the `admin` account when no administrator exists yet
    pub async fn ensure_admin(&self, password: &str) -> AppResult<Option<User>> {
        if self.repository.users_admin_exists().await? {
            return Ok(None);
        }

        let input = UserInput {
            username: "admin".to_string(),
            email: "admin@tabetala.local".to_string(),
            full_name: "System Administrator".to_string(),
            department: None,
            role: Role::Admin,
            biometric_id: None,
        };
        let user = self.repository.users_create(&input, &hash_password(password)?).await?;
        tracing::warn!(user_id = %user.id, "Created bootstrap admin account, change its password");
        Ok(Some(user))
    }

    // ---- Users ----

    /// List users, newest first
    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users_list().await
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<User> {
        self.repository.users_get_by_id(id).await
    }

    /// Look a user up by the identifier the scanner reports
    pub async fn get_by_biometric(&self, biometric_id: &str) -> AppResult<User> {
        self.repository
            .users_find_by_biometric(biometric_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found with this biometric ID".to_string()))
    }

    /// Create a new user
    pub async fn create(&self, data: CreateUser) -> AppResult<User> {
        data.validate()?;

        let (username, email, password, full_name) =
            match (data.username, data.email, data.password, data.full_name) {
                (Some(u), Some(e), Some(p), Some(f)) if !u.is_empty() && !e.is_empty() && !p.is_empty() && !f.is_empty() => {
                    (u, e, p, f)
                }
                _ => return Err(AppError::Validation("Missing required fields".to_string())),
            };

        let input = UserInput {
            username,
            email,
            full_name,
            department: data.department.filter(|d| !d.is_empty()),
            role: data.role.unwrap_or_default(),
            biometric_id: data.biometric_id.filter(|b| !b.is_empty()),
        };
        self.ensure_unique(&input, None).await?;

        let user = self.repository.users_create(&input, &hash_password(&password)?).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Replace a user's profile; the password changes only when provided
    pub async fn update(&self, id: &str, data: UpdateUser) -> AppResult<User> {
        data.validate()?;

        let (username, email, full_name) = match (data.username, data.email, data.full_name) {
            (Some(u), Some(e), Some(f)) if !u.is_empty() && !e.is_empty() && !f.is_empty() => (u, e, f),
            _ => return Err(AppError::Validation("Missing required fields".to_string())),
        };

        // 404 before uniqueness checks
        self.repository.users_get_by_id(id).await?;

        let input = UserInput {
            username,
            email,
            full_name,
            department: data.department.filter(|d| !d.is_empty()),
            role: data.role.unwrap_or_default(),
            biometric_id: data.biometric_id.filter(|b| !b.is_empty()),
        };
        self.ensure_unique(&input, Some(id)).await?;

        let password_hash = match data.password.filter(|p| !p.is_empty()) {
            Some(password) => Some(hash_password(&password)?),
            None => None,
        };

        let user = self
            .repository
            .users_update(id, &input, password_hash.as_deref())
            .await?;
        tracing::info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// Activate or deactivate a user. Admins cannot be deactivated.
    pub async fn set_active(&self, id: &str, is_active: bool) -> AppResult<User> {
        let user = self.repository.users_get_by_id(id).await?;
        if user.role == Role::Admin && !is_active {
            return Err(AppError::Forbidden("Cannot deactivate admin users".to_string()));
        }
        self.repository.users_set_active(id, is_active).await
    }

    /// Delete a user. Admins cannot be deleted.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let user = self.repository.users_get_by_id(id).await?;
        if user.role == Role::Admin {
            return Err(AppError::Forbidden("Cannot delete admin users".to_string()));
        }
        self.repository.users_delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn ensure_unique(&self, input: &UserInput, exclude_id: Option<&str>) -> AppResult<()> {
        if self.repository.users_username_exists(&input.username, exclude_id).await? {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
        if self.repository.users_email_exists(&input.email, exclude_id).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        Ok(())
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn check_password_length(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// 32 random bytes, hex encoded
fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Tokens are stored by digest so Redis never holds a usable token
fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

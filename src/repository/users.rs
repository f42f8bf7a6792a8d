//! Users domain methods on Repository

use chrono::Utc;

use super::{conflict_on_unique, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        new_id,
        user::{User, UserInput},
        Role,
    },
};

impl Repository {
    /// List all users, newest first
    pub async fn users_list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get user by ID
    pub async fn users_get_by_id(&self, id: &str) -> AppResult<User> {
        self.users_find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn users_find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get user by username (login)
    pub async fn users_find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn users_find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get user by the identifier reported by the fingerprint scanner
    pub async fn users_find_by_biometric(&self, biometric_id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE biometric_id = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(biometric_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Check if a username is taken by another user
    pub async fn users_username_exists(&self, username: &str, exclude_id: Option<&str>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND ($2::text IS NULL OR id != $2))",
        )
        .bind(username)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Check if an email is registered to another user
    pub async fn users_email_exists(&self, email: &str, exclude_id: Option<&str>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND ($2::text IS NULL OR id != $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn users_admin_exists(&self) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE role = $1)")
            .bind(Role::Admin)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a new active user
    pub async fn users_create(&self, data: &UserInput, password_hash: &str) -> AppResult<User> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, username, password_hash, role, full_name,
                               department, biometric_id, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9, $9)
            RETURNING *
            "#,
        )
        .bind(new_id("user"))
        .bind(&data.email)
        .bind(&data.username)
        .bind(password_hash)
        .bind(data.role)
        .bind(&data.full_name)
        .bind(&data.department)
        .bind(&data.biometric_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Username or email already in use"))
    }

    /// Replace a user's profile fields, and the password hash when given
    pub async fn users_update(
        &self,
        id: &str,
        data: &UserInput,
        password_hash: Option<&str>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                username = $2, email = $3, full_name = $4, department = $5,
                role = $6, biometric_id = $7,
                password_hash = COALESCE($8, password_hash),
                updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.full_name)
        .bind(&data.department)
        .bind(data.role)
        .bind(&data.biometric_id)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Username or email already in use"))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Set the active flag
    pub async fn users_set_active(&self, id: &str, is_active: bool) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Update the password hash of the user with the given email
    pub async fn users_update_password_by_email(&self, email: &str, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = $3 WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    /// Delete a user (cascades to schedules and attendance)
    pub async fn users_delete(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}

//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::Role;
use crate::error::AppError;

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub full_name: String,
    pub department: Option<String>,
    /// Identifier reported by the fingerprint scanner
    pub biometric_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short user representation embedded in attendance responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserShort {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserShort {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub role: Option<Role>,
    pub biometric_id: Option<String>,
}

/// Update user request. Omitted optional fields are cleared; the password is
/// only changed when provided.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub role: Option<Role>,
    pub biometric_id: Option<String>,
}

/// Validated user fields ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub department: Option<String>,
    pub role: Role,
    pub biometric_id: Option<String>,
}

/// Toggle active status request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleUser {
    pub is_active: Option<bool>,
}

/// Biometric lookup query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BiometricQuery {
    pub biometric_id: Option<String>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn user_id(&self) -> &str {
        &self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Administrator privileges required".to_string()))
        }
    }

    /// Faculty members only ever see their own records; other roles may
    /// filter freely.
    pub fn scope_user_filter(&self, requested: Option<String>) -> Option<String> {
        match self.role {
            Role::Faculty => Some(self.sub.clone()),
            Role::Admin | Role::Custodian => requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> UserClaims {
        UserClaims {
            sub: "user-1".into(),
            username: "someone".into(),
            role,
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        }
    }

    #[test]
    fn token_round_trip() {
        let original = claims(Role::Custodian);
        let token = original.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.sub, "user-1");
        assert_eq!(parsed.role, Role::Custodian);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn faculty_filter_is_forced_to_self() {
        let faculty = claims(Role::Faculty);
        assert_eq!(faculty.scope_user_filter(Some("user-9".into())), Some("user-1".into()));
        assert_eq!(faculty.scope_user_filter(None), Some("user-1".into()));

        let admin = claims(Role::Admin);
        assert_eq!(admin.scope_user_filter(Some("user-9".into())), Some("user-9".into()));
        assert_eq!(admin.scope_user_filter(None), None);
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: "user-1".into(),
            email: "a@b.c".into(),
            username: "a".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Admin,
            full_name: "A".into(),
            department: None,
            biometric_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["fullName"], "A");
    }
}

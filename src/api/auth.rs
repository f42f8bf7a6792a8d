//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::{AppError, AppResult}, models::User, AppState};

use super::{extract::AppJson, AuthenticatedUser, MessageResponse};

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login response with JWT token
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Always "Bearer"
    pub token_type: String,
    pub user: User,
}

#[derive(Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub message: String,
    /// Present only when reset links are exposed (development)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_link: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub password: Option<String>,
}

/// Authenticate with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials or inactive account", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (username, password) = match (request.username, request.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(AppError::Validation(
                "Username and password are required".to_string(),
            ))
        }
    };

    let (token, user) = state.services.users.authenticate(&username, &password).await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user,
    }))
}

/// Get the current user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_by_id(claims.user_id()).await?;
    Ok(Json(user))
}

/// Request a password reset link
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Same answer whether or not the email exists", body = ForgotPasswordResponse),
        (status = 400, description = "Email missing", body = crate::error::ErrorResponse)
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(request): AppJson<ForgotPasswordRequest>,
) -> AppResult<Json<ForgotPasswordResponse>> {
    let email = request
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Validation("Email is required".to_string()))?;

    let requested = state.services.users.forgot_password(&email).await?;

    Ok(Json(ForgotPasswordResponse {
        message: requested.message,
        reset_link: requested.reset_link,
    }))
}

/// Set a new password with a reset token
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid token or password", body = crate::error::ErrorResponse)
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(request): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .users
        .reset_password(
            request.token.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(MessageResponse::new("Password has been reset successfully")))
}

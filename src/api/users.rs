//! User management endpoints (administrators only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, ToggleUser, UpdateUser, User},
    AppState,
};

use super::{extract::AppJson, MessageResponse};

#[derive(Serialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub user: User,
}

/// A changed user with a confirmation message
#[derive(Serialize, ToSchema)]
pub struct UserMessageResponse {
    pub message: String,
    pub user: User,
}

/// List all users, newest first
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = UsersResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<UsersResponse>> {
    let users = state.services.users.list().await?;
    Ok(Json(UsersResponse { users }))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.get_by_id(&id).await?;
    Ok(Json(UserResponse { user }))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserMessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username or email already in use")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(user): AppJson<CreateUser>,
) -> AppResult<(StatusCode, Json<UserMessageResponse>)> {
    let created = state.services.users.create(user).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserMessageResponse {
            message: "User created successfully".to_string(),
            user: created,
        }),
    ))
}

/// Update an existing user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserMessageResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email already in use")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(user): AppJson<UpdateUser>,
) -> AppResult<Json<UserMessageResponse>> {
    let updated = state.services.users.update(&id, user).await?;
    Ok(Json(UserMessageResponse {
        message: "User updated successfully".to_string(),
        user: updated,
    }))
}

/// Activate or deactivate a user
#[utoipa::path(
    patch,
    path = "/users/{id}/toggle",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = ToggleUser,
    responses(
        (status = 200, description = "Status updated", body = UserMessageResponse),
        (status = 400, description = "isActive missing"),
        (status = 403, description = "Admins cannot be deactivated"),
        (status = 404, description = "User not found")
    )
)]
pub async fn toggle_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(toggle): AppJson<ToggleUser>,
) -> AppResult<Json<UserMessageResponse>> {
    let is_active = toggle
        .is_active
        .ok_or_else(|| AppError::Validation("Invalid status value".to_string()))?;

    let user = state.services.users.set_active(&id, is_active).await?;
    Ok(Json(UserMessageResponse {
        message: "User status updated successfully".to_string(),
        user,
    }))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 403, description = "Admins cannot be deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.users.delete(&id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

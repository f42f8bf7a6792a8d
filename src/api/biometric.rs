//! Biometric scanner lookup endpoint

use axum::{
    extract::State,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{user::BiometricQuery, Role, User},
    AppState,
};

use super::extract::AppQuery;

/// User as shown to the scanner
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BiometricUser {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub department: Option<String>,
    pub biometric_id: Option<String>,
    pub is_active: bool,
}

impl From<User> for BiometricUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            department: user.department,
            biometric_id: user.biometric_id,
            is_active: user.is_active,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BiometricLookupResponse {
    pub success: bool,
    pub user: BiometricUser,
    pub message: String,
}

/// Find the user registered under a biometric ID
#[utoipa::path(
    get,
    path = "/biometric",
    tag = "attendance",
    params(BiometricQuery),
    responses(
        (status = 200, description = "User found", body = BiometricLookupResponse),
        (status = 400, description = "biometricId missing"),
        (status = 404, description = "No user with this biometric ID")
    )
)]
pub async fn lookup(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BiometricQuery>,
) -> AppResult<Json<BiometricLookupResponse>> {
    let biometric_id = query
        .biometric_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Biometric ID is required".to_string()))?;

    let user = state.services.users.get_by_biometric(&biometric_id).await?;
    let message = format!("User found: {} ({})", user.full_name, user.role);

    Ok(Json(BiometricLookupResponse {
        success: true,
        user: user.into(),
        message,
    }))
}

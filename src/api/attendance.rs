//! Attendance endpoints

use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use chrono::Utc;

use crate::{
    error::AppResult,
    models::attendance::{AttendanceDetails, AttendanceQuery, AttendanceResponse, RecordAttendance},
    AppState,
};

use super::{
    extract::{AppJson, AppQuery},
    AuthenticatedUser,
};

/// Client address as reported by the proxy
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Record a biometric scan. Checks the faculty member in, or out when a
/// session is already open in the laboratory.
#[utoipa::path(
    post,
    path = "/attendance",
    tag = "attendance",
    request_body = RecordAttendance,
    responses(
        (status = 200, description = "Check-in or check-out recorded", body = AttendanceResponse),
        (status = 400, description = "biometricId or labId missing", body = crate::error::ErrorResponse),
        (status = 403, description = "Not faculty, or no class scheduled now", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown biometric ID", body = crate::error::ErrorResponse),
        (status = 409, description = "Concurrent scan already changed the session", body = crate::error::ErrorResponse)
    )
)]
pub async fn record_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(request): AppJson<RecordAttendance>,
) -> AppResult<Json<AttendanceResponse>> {
    let response = state
        .services
        .attendance
        .record(request, forwarded_for(&headers), Utc::now())
        .await?;
    Ok(Json(response))
}

/// List attendance rows, newest check-in first
#[utoipa::path(
    get,
    path = "/attendance",
    tag = "attendance",
    security(("bearer_auth" = [])),
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance rows", body = Vec<AttendanceDetails>)
    )
)]
pub async fn list_attendance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppQuery(mut query): AppQuery<AttendanceQuery>,
) -> AppResult<Json<Vec<AttendanceDetails>>> {
    query.user_id = claims.scope_user_filter(query.user_id.take());
    let rows = state.services.attendance.list(query).await?;
    Ok(Json(rows))
}

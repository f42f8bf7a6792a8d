//! Schedule endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        schedule::{Schedule, ScheduleDetails, ScheduleQuery, ScheduleRequest},
        Role,
    },
    AppState,
};

use super::{
    extract::{AppJson, AppQuery},
    AuthenticatedUser, MessageResponse,
};

/// List schedules. Faculty members only see their own.
#[utoipa::path(
    get,
    path = "/schedules",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(ScheduleQuery),
    responses(
        (status = 200, description = "Schedules, newest first", body = Vec<ScheduleDetails>)
    )
)]
pub async fn list_schedules(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppQuery(mut query): AppQuery<ScheduleQuery>,
) -> AppResult<Json<Vec<ScheduleDetails>>> {
    query.user_id = claims.scope_user_filter(query.user_id.take());
    let schedules = state.services.schedules.list(query, Utc::now()).await?;
    Ok(Json(schedules))
}

/// Get schedule by ID
#[utoipa::path(
    get,
    path = "/schedules/{id}",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Schedule", body = ScheduleDetails),
        (status = 404, description = "Schedule not found")
    )
)]
pub async fn get_schedule(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<ScheduleDetails>> {
    let schedule = state.services.schedules.get(&id).await?;

    if claims.role == Role::Faculty && schedule.schedule.user_id != claims.sub {
        return Err(AppError::NotFound("Schedule not found".to_string()));
    }

    Ok(Json(schedule))
}

/// Create schedule
#[utoipa::path(
    post,
    path = "/schedules",
    tag = "schedules",
    security(("bearer_auth" = [])),
    request_body = ScheduleRequest,
    responses(
        (status = 201, description = "Schedule created", body = Schedule),
        (status = 400, description = "Invalid schedule or teacher without biometric ID")
    )
)]
pub async fn create_schedule(
    State(state): State<AppState>,
    AppJson(request): AppJson<ScheduleRequest>,
) -> AppResult<(StatusCode, Json<Schedule>)> {
    let schedule = state.services.schedules.create(request).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// Replace schedule
#[utoipa::path(
    put,
    path = "/schedules/{id}",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Schedule ID")),
    request_body = ScheduleRequest,
    responses(
        (status = 200, description = "Schedule updated", body = Schedule),
        (status = 404, description = "Schedule not found"),
        (status = 409, description = "Overlaps another schedule in the laboratory")
    )
)]
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<ScheduleRequest>,
) -> AppResult<Json<Schedule>> {
    let schedule = state.services.schedules.update(&id, request).await?;
    Ok(Json(schedule))
}

/// Delete schedule
#[utoipa::path(
    delete,
    path = "/schedules/{id}",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Schedule deleted", body = MessageResponse),
        (status = 404, description = "Schedule not found")
    )
)]
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.schedules.delete(&id).await?;
    Ok(Json(MessageResponse::new("Schedule deleted successfully")))
}

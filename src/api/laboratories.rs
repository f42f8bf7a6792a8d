//! Laboratory endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::laboratory::{CreateLaboratory, Laboratory, UpdateLaboratory},
    AppState,
};

use super::{extract::AppJson, MessageResponse};

/// List laboratories
#[utoipa::path(
    get,
    path = "/laboratories",
    tag = "laboratories",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of laboratories", body = Vec<Laboratory>)
    )
)]
pub async fn list_laboratories(State(state): State<AppState>) -> AppResult<Json<Vec<Laboratory>>> {
    let labs = state.services.laboratories.list().await?;
    Ok(Json(labs))
}

/// Get laboratory by ID
#[utoipa::path(
    get,
    path = "/laboratories/{id}",
    tag = "laboratories",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Laboratory ID")),
    responses(
        (status = 200, description = "Laboratory", body = Laboratory),
        (status = 404, description = "Laboratory not found")
    )
)]
pub async fn get_laboratory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Laboratory>> {
    let lab = state.services.laboratories.get(&id).await?;
    Ok(Json(lab))
}

/// Create laboratory
#[utoipa::path(
    post,
    path = "/laboratories",
    tag = "laboratories",
    security(("bearer_auth" = [])),
    request_body = CreateLaboratory,
    responses(
        (status = 201, description = "Laboratory created", body = Laboratory),
        (status = 400, description = "Missing fields or invalid capacity")
    )
)]
pub async fn create_laboratory(
    State(state): State<AppState>,
    AppJson(data): AppJson<CreateLaboratory>,
) -> AppResult<(StatusCode, Json<Laboratory>)> {
    let lab = state.services.laboratories.create(data).await?;
    Ok((StatusCode::CREATED, Json(lab)))
}

/// Update laboratory
#[utoipa::path(
    put,
    path = "/laboratories/{id}",
    tag = "laboratories",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Laboratory ID")),
    request_body = UpdateLaboratory,
    responses(
        (status = 200, description = "Laboratory updated", body = Laboratory),
        (status = 404, description = "Laboratory not found")
    )
)]
pub async fn update_laboratory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(data): AppJson<UpdateLaboratory>,
) -> AppResult<Json<Laboratory>> {
    let lab = state.services.laboratories.update(&id, data).await?;
    Ok(Json(lab))
}

/// Delete laboratory
#[utoipa::path(
    delete,
    path = "/laboratories/{id}",
    tag = "laboratories",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Laboratory ID")),
    responses(
        (status = 200, description = "Laboratory deleted", body = MessageResponse),
        (status = 404, description = "Laboratory not found")
    )
)]
pub async fn delete_laboratory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.laboratories.delete(&id).await?;
    Ok(Json(MessageResponse::new("Laboratory deleted successfully")))
}

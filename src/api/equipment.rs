//! Equipment endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::equipment::{CreateEquipment, Equipment, EquipmentDetails, UpdateEquipment},
    AppState,
};

use super::{extract::AppJson, MessageResponse};

/// List equipment with laboratory names
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of equipment", body = Vec<EquipmentDetails>)
    )
)]
pub async fn list_equipment(State(state): State<AppState>) -> AppResult<Json<Vec<EquipmentDetails>>> {
    let items = state.services.equipment.list().await?;
    Ok(Json(items))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment", body = EquipmentDetails),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<EquipmentDetails>> {
    let item = state.services.equipment.get(&id).await?;
    Ok(Json(item))
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Missing fields"),
        (status = 404, description = "Laboratory not found")
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    AppJson(data): AppJson<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    let created = state.services.equipment.create(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(data): AppJson<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    let updated = state.services.equipment.update(&id, data).await?;
    Ok(Json(updated))
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment deleted", body = MessageResponse),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.equipment.delete(&id).await?;
    Ok(Json(MessageResponse::new("Equipment deleted successfully")))
}

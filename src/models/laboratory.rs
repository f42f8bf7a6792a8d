//! Laboratory model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::LabStatus;

/// Laboratory room
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Laboratory {
    pub id: String,
    pub name: String,
    pub building: String,
    pub room_number: String,
    /// Number of seats
    pub capacity: i32,
    pub status: LabStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create laboratory request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLaboratory {
    pub name: Option<String>,
    pub building: Option<String>,
    pub room_number: Option<String>,
    #[validate(range(min = 1, message = "Capacity must be a positive number"))]
    pub capacity: Option<i32>,
    pub status: Option<LabStatus>,
    pub description: Option<String>,
}

/// Update laboratory request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLaboratory {
    pub name: Option<String>,
    pub building: Option<String>,
    pub room_number: Option<String>,
    #[validate(range(min = 1, message = "Capacity must be a positive number"))]
    pub capacity: Option<i32>,
    pub status: Option<LabStatus>,
    pub description: Option<String>,
}

//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::{EquipmentStatus, EquipmentType};

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,
    pub lab_id: String,
    #[serde(rename = "type")]
    pub equipment_type: EquipmentType,
    pub serial_number: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub status: EquipmentStatus,
    /// Last time the detection sweep saw this item
    pub last_detected: Option<DateTime<Utc>>,
    /// Position on the lab floor plan
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub assigned_station: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Equipment joined with its laboratory name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub equipment: Equipment,
    pub lab_name: Option<String>,
}

/// Create equipment request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    #[serde(rename = "type")]
    pub equipment_type: Option<EquipmentType>,
    pub serial_number: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub lab_id: Option<String>,
    pub assigned_station: Option<String>,
}

/// Update equipment request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipment {
    #[serde(rename = "type")]
    pub equipment_type: Option<EquipmentType>,
    pub serial_number: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub lab_id: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub assigned_station: Option<String>,
}

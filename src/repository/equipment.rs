//! Equipment domain methods on Repository

use chrono::{DateTime, Utc};

use super::{update_assignments, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{Equipment, EquipmentDetails, UpdateEquipment},
        EquipmentType,
    },
};

/// Validated fields for a new piece of equipment
#[derive(Debug, Clone)]
pub struct NewEquipment {
    pub id: String,
    pub lab_id: String,
    pub equipment_type: EquipmentType,
    pub serial_number: String,
    pub brand: String,
    pub model: String,
    pub assigned_station: String,
    pub last_detected: DateTime<Utc>,
    pub position_x: f64,
    pub position_y: f64,
}

const DETAILS_SELECT: &str = r#"
    SELECT e.*, l.name AS lab_name
    FROM equipment e
    LEFT JOIN laboratories l ON e.lab_id = l.id
"#;

impl Repository {
    /// List all equipment with laboratory names, newest first
    pub async fn equipment_list(&self) -> AppResult<Vec<EquipmentDetails>> {
        let query = format!("{} ORDER BY e.created_at DESC", DETAILS_SELECT);
        let rows = sqlx::query_as::<_, EquipmentDetails>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn equipment_get_by_id(&self, id: &str) -> AppResult<EquipmentDetails> {
        let query = format!("{} WHERE e.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, EquipmentDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Equipment not found".to_string()))
    }

    /// Create equipment
    pub async fn equipment_create(&self, data: &NewEquipment) -> AppResult<Equipment> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (id, lab_id, equipment_type, serial_number, brand, model,
                                   status, last_detected, position_x, position_y,
                                   assigned_station, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'present', $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(&data.id)
        .bind(&data.lab_id)
        .bind(data.equipment_type)
        .bind(&data.serial_number)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(data.last_detected)
        .bind(data.position_x)
        .bind(data.position_y)
        .bind(&data.assigned_station)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update the provided equipment fields
    pub async fn equipment_update(&self, id: &str, data: &UpdateEquipment) -> AppResult<Equipment> {
        let now = Utc::now();
        let sets = update_assignments(&[
            ("equipment_type", data.equipment_type.is_some()),
            ("serial_number", data.serial_number.is_some()),
            ("brand", data.brand.is_some()),
            ("model", data.model.is_some()),
            ("lab_id", data.lab_id.is_some()),
            ("status", data.status.is_some()),
            ("assigned_station", data.assigned_station.is_some()),
        ]);

        let query = format!("UPDATE equipment SET {} WHERE id = $1 RETURNING *", sets);

        let mut builder = sqlx::query_as::<_, Equipment>(&query).bind(id).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.equipment_type);
        bind_field!(data.serial_number);
        bind_field!(data.brand);
        bind_field!(data.model);
        bind_field!(data.lab_id);
        bind_field!(data.status);
        bind_field!(data.assigned_station);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Equipment not found".to_string()))
    }

    /// Delete equipment
    pub async fn equipment_delete(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Equipment not found".to_string()));
        }
        Ok(())
    }
}

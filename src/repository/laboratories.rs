//! Laboratories domain methods on Repository

use chrono::Utc;

use super::{update_assignments, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        laboratory::{Laboratory, UpdateLaboratory},
        new_id, LabStatus,
    },
};

/// Validated fields for a new laboratory
#[derive(Debug, Clone)]
pub struct NewLaboratory {
    pub name: String,
    pub building: String,
    pub room_number: String,
    pub capacity: i32,
    pub status: LabStatus,
    pub description: Option<String>,
}

impl Repository {
    /// List all laboratories, newest first
    pub async fn laboratories_list(&self) -> AppResult<Vec<Laboratory>> {
        let rows = sqlx::query_as::<_, Laboratory>(
            "SELECT * FROM laboratories ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get laboratory by ID
    pub async fn laboratories_get_by_id(&self, id: &str) -> AppResult<Laboratory> {
        sqlx::query_as::<_, Laboratory>("SELECT * FROM laboratories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Laboratory not found".to_string()))
    }

    pub async fn laboratories_exists(&self, id: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM laboratories WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create laboratory
    pub async fn laboratories_create(&self, data: &NewLaboratory) -> AppResult<Laboratory> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Laboratory>(
            r#"
            INSERT INTO laboratories (id, name, building, room_number, capacity, status,
                                      description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(new_id("lab"))
        .bind(&data.name)
        .bind(&data.building)
        .bind(&data.room_number)
        .bind(data.capacity)
        .bind(data.status)
        .bind(&data.description)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update the provided laboratory fields
    pub async fn laboratories_update(&self, id: &str, data: &UpdateLaboratory) -> AppResult<Laboratory> {
        let now = Utc::now();
        let sets = update_assignments(&[
            ("name", data.name.is_some()),
            ("building", data.building.is_some()),
            ("room_number", data.room_number.is_some()),
            ("capacity", data.capacity.is_some()),
            ("status", data.status.is_some()),
            ("description", data.description.is_some()),
        ]);

        let query = format!("UPDATE laboratories SET {} WHERE id = $1 RETURNING *", sets);

        let mut builder = sqlx::query_as::<_, Laboratory>(&query).bind(id).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.building);
        bind_field!(data.room_number);
        bind_field!(data.capacity);
        bind_field!(data.status);
        bind_field!(data.description);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Laboratory not found".to_string()))
    }

    /// Delete a laboratory (cascades to equipment, schedules and attendance)
    pub async fn laboratories_delete(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM laboratories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Laboratory not found".to_string()));
        }
        Ok(())
    }
}

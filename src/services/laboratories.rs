//! Laboratories service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::laboratory::{CreateLaboratory, Laboratory, UpdateLaboratory},
    repository::{laboratories::NewLaboratory, Repository},
};

#[derive(Clone)]
pub struct LaboratoriesService {
    repository: Repository,
}

impl LaboratoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Laboratory>> {
        self.repository.laboratories_list().await
    }

    pub async fn get(&self, id: &str) -> AppResult<Laboratory> {
        self.repository.laboratories_get_by_id(id).await
    }

    pub async fn create(&self, data: CreateLaboratory) -> AppResult<Laboratory> {
        data.validate()?;

        let lab = match (data.name, data.building, data.room_number, data.capacity) {
            (Some(name), Some(building), Some(room_number), Some(capacity))
                if !name.is_empty() && !building.is_empty() && !room_number.is_empty() =>
            {
                NewLaboratory {
                    name,
                    building,
                    room_number,
                    capacity,
                    status: data.status.unwrap_or_default(),
                    description: data.description,
                }
            }
            _ => return Err(AppError::Validation("Missing required fields".to_string())),
        };

        let created = self.repository.laboratories_create(&lab).await?;
        tracing::info!(lab_id = %created.id, "Laboratory created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, data: UpdateLaboratory) -> AppResult<Laboratory> {
        data.validate()?;
        self.repository.laboratories_update(id, &data).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.laboratories_delete(id).await?;
        tracing::info!(lab_id = %id, "Laboratory deleted");
        Ok(())
    }
}

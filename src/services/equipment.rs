//! Equipment service

use chrono::Utc;
use rand::Rng;

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Equipment, EquipmentDetails, UpdateEquipment},
        EquipmentType,
    },
    repository::{equipment::NewEquipment, Repository},
};

/// Floor plan area used for simulated positions
const POSITION_X_RANGE: std::ops::Range<f64> = 50.0..450.0;
const POSITION_Y_RANGE: std::ops::Range<f64> = 50.0..350.0;

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List equipment with laboratory names
    pub async fn list(&self) -> AppResult<Vec<EquipmentDetails>> {
        self.repository.equipment_list().await
    }

    pub async fn get(&self, id: &str) -> AppResult<EquipmentDetails> {
        self.repository.equipment_get_by_id(id).await
    }

    /// Register equipment as present, with a simulated detection
    pub async fn create(&self, data: CreateEquipment) -> AppResult<Equipment> {
        let missing = || AppError::Validation("Missing required fields".to_string());
        let required = |value: Option<String>| value.filter(|v| !v.is_empty());

        let equipment_type = data.equipment_type.ok_or_else(missing)?;
        let lab_id = required(data.lab_id).ok_or_else(missing)?;
        let serial_number = required(data.serial_number).ok_or_else(missing)?;
        let brand = required(data.brand).ok_or_else(missing)?;
        let model = required(data.model).ok_or_else(missing)?;
        let assigned_station = required(data.assigned_station).ok_or_else(missing)?;

        if !self.repository.laboratories_exists(&lab_id).await? {
            return Err(AppError::NotFound("Laboratory not found".to_string()));
        }

        // ThreadRng must not live across an await
        let (position_x, position_y) = {
            let mut rng = rand::thread_rng();
            (rng.gen_range(POSITION_X_RANGE), rng.gen_range(POSITION_Y_RANGE))
        };

        let equipment = NewEquipment {
            id: equipment_id(equipment_type),
            lab_id,
            equipment_type,
            serial_number,
            brand,
            model,
            assigned_station,
            last_detected: Utc::now(),
            position_x,
            position_y,
        };

        let created = self.repository.equipment_create(&equipment).await?;
        tracing::info!(equipment_id = %created.id, lab_id = %created.lab_id, "Equipment created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, data: UpdateEquipment) -> AppResult<Equipment> {
        self.repository.equipment_update(id, &data).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.equipment_delete(id).await?;
        tracing::info!(equipment_id = %id, "Equipment deleted");
        Ok(())
    }
}

/// Equipment ids start with the first two letters of the type
fn equipment_id(equipment_type: EquipmentType) -> String {
    crate::models::new_id(&equipment_type.as_str()[..2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_prefixed_by_type() {
        assert!(equipment_id(EquipmentType::Keyboard).starts_with("ke-"));
        assert!(equipment_id(EquipmentType::Cpu).starts_with("cp-"));
        assert_ne!(equipment_id(EquipmentType::Mouse), equipment_id(EquipmentType::Mouse));
    }

    #[test]
    fn positions_stay_on_the_floor_plan() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let x = rng.gen_range(POSITION_X_RANGE);
            let y = rng.gen_range(POSITION_Y_RANGE);
            assert!((50.0..450.0).contains(&x));
            assert!((50.0..350.0).contains(&y));
        }
    }
}

//! Business logic services

pub mod attendance;
pub mod email;
pub mod equipment;
pub mod laboratories;
pub mod redis;
pub mod schedules;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub laboratories: laboratories::LaboratoriesService,
    pub equipment: equipment::EquipmentService,
    pub schedules: schedules::SchedulesService,
    pub attendance: attendance::AttendanceService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig, redis_service: redis::RedisService) -> AppResult<Self> {
        let email = email::EmailService::new(config.email.clone());
        let attendance = attendance::AttendanceService::new(
            Arc::new(repository.clone()),
            config.attendance.utc_offset_minutes,
        )?;
        let schedules = schedules::SchedulesService::new(
            Arc::new(repository.clone()),
            attendance.offset(),
            config.schedules.check_conflicts_on_create,
        );

        Ok(Self {
            users: users::UsersService::new(
                repository.clone(),
                config.auth.clone(),
                redis_service,
                email,
            ),
            laboratories: laboratories::LaboratoriesService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(repository.clone()),
            schedules,
            attendance,
            repository,
        })
    }

    /// Check that the database answers
    pub async fn ping_database(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

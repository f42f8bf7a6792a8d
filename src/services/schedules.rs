//! Schedules service: validation, conflict detection and listing

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        schedule::{Schedule, ScheduleDetails, ScheduleInput, ScheduleQuery, ScheduleRequest},
        User,
    },
    services::attendance::local_clock,
};

/// Storage the schedule rules need
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn find_user(&self, id: &str) -> AppResult<Option<User>>;

    async fn lab_exists(&self, lab_id: &str) -> AppResult<bool>;

    async fn get_schedule(&self, id: &str) -> AppResult<Option<ScheduleDetails>>;

    /// Schedules joined with names, newest first
    async fn list_schedules(
        &self,
        lab_id: Option<String>,
        user_id: Option<String>,
    ) -> AppResult<Vec<ScheduleDetails>>;

    async fn schedules_in_lab(&self, lab_id: &str) -> AppResult<Vec<Schedule>>;

    async fn insert_schedule(&self, input: &ScheduleInput) -> AppResult<Schedule>;

    async fn update_schedule(&self, id: &str, input: &ScheduleInput) -> AppResult<Option<Schedule>>;

    /// False when no schedule had this id
    async fn delete_schedule(&self, id: &str) -> AppResult<bool>;
}

/// First schedule in `existing` that collides with `candidate`
pub fn find_conflict<'a>(
    existing: &'a [Schedule],
    candidate: &ScheduleInput,
    candidate_id: Option<&str>,
) -> Option<&'a Schedule> {
    existing.iter().find(|s| s.conflicts_with(candidate, candidate_id))
}

#[derive(Clone)]
pub struct SchedulesService {
    store: Arc<dyn ScheduleStore>,
    offset: FixedOffset,
    check_conflicts_on_create: bool,
}

impl SchedulesService {
    pub fn new(store: Arc<dyn ScheduleStore>, offset: FixedOffset, check_conflicts_on_create: bool) -> Self {
        Self { store, offset, check_conflicts_on_create }
    }

    /// List schedules; `upcoming` keeps those that have not started at `now`
    pub async fn list(&self, query: ScheduleQuery, now: DateTime<Utc>) -> AppResult<Vec<ScheduleDetails>> {
        let rows = self.store.list_schedules(query.lab_id, query.user_id).await?;

        if !query.upcoming.unwrap_or(false) {
            return Ok(rows);
        }

        let (weekday, local_time) = local_clock(now, self.offset);
        Ok(rows
            .into_iter()
            .filter(|row| row.schedule.is_upcoming(weekday, &local_time, now))
            .collect())
    }

    pub async fn get(&self, id: &str) -> AppResult<ScheduleDetails> {
        self.store
            .get_schedule(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))
    }

    /// Create a schedule. The overlap check only runs when enabled in config.
    pub async fn create(&self, request: ScheduleRequest) -> AppResult<Schedule> {
        let input = request.into_input()?;
        self.ensure_schedulable(&input).await?;

        if self.check_conflicts_on_create {
            self.ensure_no_conflict(&input, None).await?;
        }

        let schedule = self.store.insert_schedule(&input).await?;
        tracing::info!(schedule_id = %schedule.id, lab_id = %schedule.lab_id, "Schedule created");
        Ok(schedule)
    }

    /// Replace a schedule after validation and the overlap check
    pub async fn update(&self, id: &str, request: ScheduleRequest) -> AppResult<Schedule> {
        if self.store.get_schedule(id).await?.is_none() {
            return Err(AppError::NotFound("Schedule not found".to_string()));
        }

        let input = request.into_input()?;
        self.ensure_schedulable(&input).await?;
        self.ensure_no_conflict(&input, Some(id)).await?;

        let schedule = self
            .store
            .update_schedule(id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;
        tracing::info!(schedule_id = %schedule.id, "Schedule updated");
        Ok(schedule)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.store.delete_schedule(id).await? {
            return Err(AppError::NotFound("Schedule not found".to_string()));
        }
        tracing::info!(schedule_id = %id, "Schedule deleted");
        Ok(())
    }

    /// The lab must exist and only users with a registered fingerprint can
    /// hold schedules
    async fn ensure_schedulable(&self, input: &ScheduleInput) -> AppResult<()> {
        if !self.store.lab_exists(&input.lab_id).await? {
            return Err(AppError::NotFound("Laboratory not found".to_string()));
        }

        let has_biometric = self
            .store
            .find_user(&input.user_id)
            .await?
            .and_then(|user| user.biometric_id)
            .map(|id| !id.is_empty())
            .unwrap_or(false);

        if has_biometric {
            Ok(())
        } else {
            Err(AppError::Validation(
                "Teacher must have biometric ID registered before scheduling".to_string(),
            ))
        }
    }

    async fn ensure_no_conflict(&self, input: &ScheduleInput, id: Option<&str>) -> AppResult<()> {
        let existing = self.store.schedules_in_lab(&input.lab_id).await?;
        if let Some(hit) = find_conflict(&existing, input, id) {
            tracing::debug!(conflicting_id = %hit.id, "Schedule conflict");
            return Err(AppError::Conflict(
                "Schedule conflict detected for the specified room and time".to_string(),
            ));
        }
        Ok(())
    }
}

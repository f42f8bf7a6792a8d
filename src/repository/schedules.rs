//! Schedules domain methods on Repository

use async_trait::async_trait;
use chrono::Utc;

use super::{not_found_on_foreign_key, Repository};
use crate::{
    error::AppResult,
    models::{
        new_id,
        schedule::{Schedule, ScheduleDetails, ScheduleInput},
        User,
    },
    services::schedules::ScheduleStore,
};

const DETAILS_SELECT: &str = r#"
    SELECT s.*,
           u.full_name AS user_name, u.email AS user_email, u.biometric_id AS user_biometric_id,
           l.name AS lab_name
    FROM schedules s
    LEFT JOIN users u ON s.user_id = u.id
    LEFT JOIN laboratories l ON s.lab_id = l.id
"#;

impl Repository {
    /// List schedules with user and lab names, newest first
    pub async fn schedules_list(
        &self,
        lab_id: Option<&str>,
        user_id: Option<&str>,
    ) -> AppResult<Vec<ScheduleDetails>> {
        let query = format!(
            r#"{}
            WHERE ($1::text IS NULL OR s.lab_id = $1)
              AND ($2::text IS NULL OR s.user_id = $2)
            ORDER BY s.created_at DESC
            "#,
            DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, ScheduleDetails>(&query)
            .bind(lab_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn schedules_find_by_id(&self, id: &str) -> AppResult<Option<ScheduleDetails>> {
        let query = format!("{} WHERE s.id = $1", DETAILS_SELECT);
        let row = sqlx::query_as::<_, ScheduleDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Schedules of one user in one lab, oldest first
    pub async fn schedules_for_user_in_lab(
        &self,
        user_id: &str,
        lab_id: &str,
    ) -> AppResult<Vec<ScheduleDetails>> {
        let query = format!(
            "{} WHERE s.user_id = $1 AND s.lab_id = $2 ORDER BY s.created_at, s.id",
            DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, ScheduleDetails>(&query)
            .bind(user_id)
            .bind(lab_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// All schedules booked in a lab
    pub async fn schedules_list_in_lab(&self, lab_id: &str) -> AppResult<Vec<Schedule>> {
        let rows = sqlx::query_as::<_, Schedule>("SELECT * FROM schedules WHERE lab_id = $1")
            .bind(lab_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Create a schedule
    pub async fn schedules_create(&self, data: &ScheduleInput) -> AppResult<Schedule> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Schedule>(
            r#"
            INSERT INTO schedules (id, lab_id, user_id, day_of_week, start_time, end_time,
                                   course_code, section, subject, is_recurring,
                                   start_date, end_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING *
            "#,
        )
        .bind(new_id("sched"))
        .bind(&data.lab_id)
        .bind(&data.user_id)
        .bind(data.day_of_week)
        .bind(&data.start_time)
        .bind(&data.end_time)
        .bind(&data.course_code)
        .bind(&data.section)
        .bind(&data.subject)
        .bind(data.is_recurring)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_on_foreign_key(e, "Laboratory or user not found"))?;
        Ok(row)
    }

    /// Replace every editable field of a schedule
    pub async fn schedules_replace(&self, id: &str, data: &ScheduleInput) -> AppResult<Option<Schedule>> {
        let row = sqlx::query_as::<_, Schedule>(
            r#"
            UPDATE schedules SET
                lab_id = $2, user_id = $3, day_of_week = $4, start_time = $5, end_time = $6,
                course_code = $7, section = $8, subject = $9, is_recurring = $10,
                start_date = $11, end_date = $12, updated_at = $13
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.lab_id)
        .bind(&data.user_id)
        .bind(data.day_of_week)
        .bind(&data.start_time)
        .bind(&data.end_time)
        .bind(&data.course_code)
        .bind(&data.section)
        .bind(&data.subject)
        .bind(data.is_recurring)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| not_found_on_foreign_key(e, "Laboratory or user not found"))?;
        Ok(row)
    }

    /// Delete a schedule; false when nothing matched
    pub async fn schedules_delete(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ScheduleStore for Repository {
    async fn find_user(&self, id: &str) -> AppResult<Option<User>> {
        self.users_find_by_id(id).await
    }

    async fn lab_exists(&self, lab_id: &str) -> AppResult<bool> {
        self.laboratories_exists(lab_id).await
    }

    async fn get_schedule(&self, id: &str) -> AppResult<Option<ScheduleDetails>> {
        self.schedules_find_by_id(id).await
    }

    async fn list_schedules(
        &self,
        lab_id: Option<String>,
        user_id: Option<String>,
    ) -> AppResult<Vec<ScheduleDetails>> {
        self.schedules_list(lab_id.as_deref(), user_id.as_deref()).await
    }

    async fn schedules_in_lab(&self, lab_id: &str) -> AppResult<Vec<Schedule>> {
        self.schedules_list_in_lab(lab_id).await
    }

    async fn insert_schedule(&self, input: &ScheduleInput) -> AppResult<Schedule> {
        self.schedules_create(input).await
    }

    async fn update_schedule(&self, id: &str, input: &ScheduleInput) -> AppResult<Option<Schedule>> {
        self.schedules_replace(id, input).await
    }

    async fn delete_schedule(&self, id: &str) -> AppResult<bool> {
        self.schedules_delete(id).await
    }
}

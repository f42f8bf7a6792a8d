//! Attendance domain methods on Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{conflict_on_unique, Repository};
use crate::{
    error::AppResult,
    models::{
        attendance::{AttendanceDetails, AttendanceLog, AttendanceQuery, NewAttendance},
        new_id,
        schedule::ScheduleDetails,
        User,
    },
    services::attendance::AttendanceStore,
};

impl Repository {
    /// List attendance with user and lab names, latest check-in first
    pub async fn attendance_list(&self, query: &AttendanceQuery) -> AppResult<Vec<AttendanceDetails>> {
        let rows = sqlx::query_as::<_, AttendanceDetails>(
            r#"
            SELECT a.*, u.full_name AS user_name, u.email AS user_email, l.name AS lab_name
            FROM attendance_logs a
            LEFT JOIN users u ON a.user_id = u.id
            LEFT JOIN laboratories l ON a.lab_id = l.id
            WHERE ($1::text IS NULL OR a.user_id = $1)
              AND ($2::text IS NULL OR a.lab_id = $2)
              AND (NOT $3 OR a.check_out_time IS NULL)
            ORDER BY a.check_in_time DESC
            "#,
        )
        .bind(&query.user_id)
        .bind(&query.lab_id)
        .bind(query.active.unwrap_or(false))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Open session of a user in a lab, if any
    pub async fn attendance_find_open(&self, user_id: &str, lab_id: &str) -> AppResult<Option<AttendanceLog>> {
        let row = sqlx::query_as::<_, AttendanceLog>(
            r#"
            SELECT * FROM attendance_logs
            WHERE user_id = $1 AND lab_id = $2 AND check_out_time IS NULL
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(lab_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a check-in. A second open session for the same user and lab
    /// is rejected by the partial unique index.
    pub async fn attendance_check_in(&self, data: &NewAttendance) -> AppResult<AttendanceLog> {
        sqlx::query_as::<_, AttendanceLog>(
            r#"
            INSERT INTO attendance_logs (id, user_id, lab_id, check_in_time, verification_method,
                                         biometric_data, ip_address, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $4)
            RETURNING *
            "#,
        )
        .bind(new_id("att"))
        .bind(&data.user_id)
        .bind(&data.lab_id)
        .bind(data.check_in_time)
        .bind(data.verification_method)
        .bind(&data.biometric_data)
        .bind(&data.ip_address)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "An attendance session is already open for this laboratory"))
    }

    /// Close an open session; None when it was already closed
    pub async fn attendance_check_out(&self, id: &str, at: DateTime<Utc>) -> AppResult<Option<AttendanceLog>> {
        let row = sqlx::query_as::<_, AttendanceLog>(
            r#"
            UPDATE attendance_logs SET check_out_time = $2
            WHERE id = $1 AND check_out_time IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl AttendanceStore for Repository {
    async fn find_user_by_biometric(&self, biometric_id: &str) -> AppResult<Option<User>> {
        self.users_find_by_biometric(biometric_id).await
    }

    async fn schedules_for(&self, user_id: &str, lab_id: &str) -> AppResult<Vec<ScheduleDetails>> {
        self.schedules_for_user_in_lab(user_id, lab_id).await
    }

    async fn find_open_session(&self, user_id: &str, lab_id: &str) -> AppResult<Option<AttendanceLog>> {
        self.attendance_find_open(user_id, lab_id).await
    }

    async fn open_session(&self, session: NewAttendance) -> AppResult<AttendanceLog> {
        self.attendance_check_in(&session).await
    }

    async fn close_session(&self, id: &str, at: DateTime<Utc>) -> AppResult<Option<AttendanceLog>> {
        self.attendance_check_out(id, at).await
    }

    async fn list_attendance(&self, query: AttendanceQuery) -> AppResult<Vec<AttendanceDetails>> {
        self.attendance_list(&query).await
    }
}

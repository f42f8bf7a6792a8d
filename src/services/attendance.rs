//! Attendance service: matches scanner events against schedules and toggles
//! check-in/check-out sessions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, FixedOffset, Utc};

use crate::{
    error::{AppError, AppResult, ScheduleMiss},
    models::{
        attendance::{
            AttendanceDetails, AttendanceLog, AttendanceQuery, AttendanceResponse, NewAttendance,
            RecordAttendance,
        },
        schedule::ScheduleDetails,
        AttendanceAction, Role, User, UserShort,
    },
};

/// Storage the matcher needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_user_by_biometric(&self, biometric_id: &str) -> AppResult<Option<User>>;

    /// Schedules of a user in a lab, oldest first
    async fn schedules_for(&self, user_id: &str, lab_id: &str) -> AppResult<Vec<ScheduleDetails>>;

    async fn find_open_session(&self, user_id: &str, lab_id: &str) -> AppResult<Option<AttendanceLog>>;

    async fn open_session(&self, session: NewAttendance) -> AppResult<AttendanceLog>;

    /// Close a session that is still open; None when it was closed meanwhile
    async fn close_session(&self, id: &str, at: DateTime<Utc>) -> AppResult<Option<AttendanceLog>>;

    async fn list_attendance(&self, query: AttendanceQuery) -> AppResult<Vec<AttendanceDetails>>;
}

/// Local weekday (0 = Sunday) and "HH:MM" time of an instant
pub fn local_clock(now: DateTime<Utc>, offset: FixedOffset) -> (i16, String) {
    let local = now.with_timezone(&offset);
    (
        local.weekday().num_days_from_sunday() as i16,
        local.format("%H:%M").to_string(),
    )
}

#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    offset: FixedOffset,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn AttendanceStore>, utc_offset_minutes: i32) -> AppResult<Self> {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::Internal(format!("Invalid UTC offset: {} minutes", utc_offset_minutes))
            })?;
        Ok(Self { store, offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Record a scanner event at `now`: check in when no session is open for
    /// the user in the lab, check out otherwise.
    pub async fn record(
        &self,
        request: RecordAttendance,
        ip_address: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<AttendanceResponse> {
        let (biometric_id, lab_id) = match (
            request.biometric_id.filter(|v| !v.is_empty()),
            request.lab_id.filter(|v| !v.is_empty()),
        ) {
            (Some(biometric_id), Some(lab_id)) => (biometric_id, lab_id),
            _ => {
                return Err(AppError::Validation(
                    "Missing required fields: biometricId, labId".to_string(),
                ))
            }
        };

        let user = self
            .store
            .find_user_by_biometric(&biometric_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found with provided biometric ID".to_string()))?;

        if user.role != Role::Faculty {
            return Err(AppError::Forbidden(
                "Only faculty members can record attendance".to_string(),
            ));
        }

        let (weekday, local_time) = local_clock(now, self.offset);

        let schedule = self
            .store
            .schedules_for(&user.id, &lab_id)
            .await?
            .into_iter()
            .find(|s| s.schedule.covers(weekday, &local_time, now))
            .ok_or_else(|| {
                AppError::NoScheduledClass(ScheduleMiss {
                    current_day: weekday,
                    current_time: local_time.clone(),
                    lab_id: lab_id.clone(),
                    user_id: user.id.clone(),
                })
            })?;

        let (action, attendance) = match self.store.find_open_session(&user.id, &lab_id).await? {
            Some(open) => {
                let closed = self.store.close_session(&open.id, now).await?.ok_or_else(|| {
                    AppError::Conflict("Attendance session was already closed".to_string())
                })?;
                (AttendanceAction::CheckOut, closed)
            }
            None => {
                let opened = self
                    .store
                    .open_session(NewAttendance {
                        user_id: user.id.clone(),
                        lab_id: lab_id.clone(),
                        check_in_time: now,
                        verification_method: request.verification_method.unwrap_or_default(),
                        biometric_data: biometric_id.clone(),
                        ip_address: ip_address.unwrap_or_else(|| "unknown".to_string()),
                        notes: format!(
                            "Scheduled class: {} - {}",
                            schedule.schedule.course_code.as_deref().unwrap_or("N/A"),
                            schedule.schedule.subject.as_deref().unwrap_or("N/A"),
                        ),
                    })
                    .await?;
                (AttendanceAction::CheckIn, opened)
            }
        };

        tracing::info!(
            user_id = %user.id,
            lab_id = %lab_id,
            schedule_id = %schedule.schedule.id,
            action = ?action,
            "Attendance recorded"
        );

        Ok(AttendanceResponse {
            success: true,
            action,
            user: UserShort::from(&user),
            schedule,
            attendance,
            timestamp: now.timestamp(),
        })
    }

    /// List attendance rows
    pub async fn list(&self, query: AttendanceQuery) -> AppResult<Vec<AttendanceDetails>> {
        self.store.list_attendance(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{schedule::tests::{one_time, recurring}, VerificationMethod};
    use chrono::{Duration, TimeZone};

    fn faculty(biometric_id: &str) -> User {
        User {
            id: "faculty-2".into(),
            email: "jdoe@school.edu".into(),
            username: "jdoe".into(),
            password_hash: String::new(),
            role: Role::Faculty,
            full_name: "Jane Doe".into(),
            department: Some("IT".into()),
            biometric_id: Some(biometric_id.into()),
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn details(schedule: crate::models::Schedule) -> ScheduleDetails {
        ScheduleDetails {
            schedule,
            user_name: Some("Jane Doe".into()),
            user_email: Some("jdoe@school.edu".into()),
            user_biometric_id: Some("BIO002".into()),
            lab_name: Some("Computer Lab 1".into()),
        }
    }

    fn session(open: NewAttendance) -> AttendanceLog {
        AttendanceLog {
            id: "att-1".into(),
            user_id: open.user_id,
            lab_id: open.lab_id,
            check_in_time: open.check_in_time,
            check_out_time: None,
            verification_method: open.verification_method,
            biometric_data: Some(open.biometric_data),
            ip_address: Some(open.ip_address),
            notes: Some(open.notes),
            created_at: open.check_in_time,
        }
    }

    fn scan(biometric_id: &str) -> RecordAttendance {
        RecordAttendance {
            biometric_id: Some(biometric_id.into()),
            lab_id: Some("lab-1".into()),
            verification_method: None,
        }
    }

    // Offset 0 keeps wall-clock time equal to UTC in these tests
    fn service(store: MockAttendanceStore) -> AttendanceService {
        AttendanceService::new(Arc::new(store), 0).unwrap()
    }

    /// Monday 2025-06-02 at the given UTC time
    fn monday(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn checks_in_then_out_during_a_recurring_class() {
        let check_in_at = monday(8, 0);
        let check_out_at = monday(8, 30);

        // First scan: no open session
        let mut store = MockAttendanceStore::new();
        store
            .expect_find_user_by_biometric()
            .withf(|id: &str| id == "BIO002")
            .returning(|id| Ok(Some(faculty(id))));
        store
            .expect_schedules_for()
            .withf(|user_id: &str, lab_id: &str| user_id == "faculty-2" && lab_id == "lab-1")
            .returning(|_, _| Ok(vec![details(recurring("sched-1", 1, "07:30", "09:00"))]));
        store.expect_find_open_session().times(1).returning(|_, _| Ok(None));
        store
            .expect_open_session()
            .times(1)
            .withf(|s| {
                s.notes == "Scheduled class: IT 101 - Programming"
                    && s.ip_address == "10.0.0.7"
                    && s.verification_method == VerificationMethod::Biometric
                    && s.biometric_data == "BIO002"
            })
            .returning(|s| Ok(session(s)));
        store.expect_close_session().never();

        let response = service(store)
            .record(scan("BIO002"), Some("10.0.0.7".into()), check_in_at)
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.action, AttendanceAction::CheckIn);
        assert_eq!(response.user.id, "faculty-2");
        assert_eq!(response.schedule.schedule.id, "sched-1");
        assert_eq!(response.timestamp, check_in_at.timestamp());

        // Second scan: the open session is closed instead of opening another
        let mut store = MockAttendanceStore::new();
        store
            .expect_find_user_by_biometric()
            .returning(|id| Ok(Some(faculty(id))));
        store
            .expect_schedules_for()
            .returning(|_, _| Ok(vec![details(recurring("sched-1", 1, "07:30", "09:00"))]));
        store.expect_find_open_session().returning(move |user_id, lab_id| {
            Ok(Some(session(NewAttendance {
                user_id: user_id.to_string(),
                lab_id: lab_id.to_string(),
                check_in_time: check_in_at,
                verification_method: VerificationMethod::Biometric,
                biometric_data: "BIO002".into(),
                ip_address: "unknown".into(),
                notes: String::new(),
            })))
        });
        store.expect_open_session().never();
        store
            .expect_close_session()
            .withf(move |id: &str, at: &DateTime<Utc>| id == "att-1" && *at == check_out_at)
            .times(1)
            .returning(move |_, at| {
                let mut log = session(NewAttendance {
                    user_id: "faculty-2".into(),
                    lab_id: "lab-1".into(),
                    check_in_time: check_in_at,
                    verification_method: VerificationMethod::Biometric,
                    biometric_data: "BIO002".into(),
                    ip_address: "unknown".into(),
                    notes: String::new(),
                });
                log.check_out_time = Some(at);
                Ok(Some(log))
            });

        let response = service(store)
            .record(scan("BIO002"), None, check_out_at)
            .await
            .unwrap();
        assert_eq!(response.action, AttendanceAction::CheckOut);
        assert_eq!(response.attendance.check_out_time, Some(check_out_at));
    }

    #[tokio::test]
    async fn outside_every_window_is_forbidden_with_details() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_find_user_by_biometric()
            .returning(|id| Ok(Some(faculty(id))));
        store
            .expect_schedules_for()
            .returning(|_, _| Ok(vec![details(recurring("sched-1", 1, "07:30", "09:00"))]));
        store.expect_find_open_session().never();
        store.expect_open_session().never();

        let err = service(store)
            .record(scan("BIO002"), None, monday(10, 15))
            .await
            .unwrap_err();
        match err {
            AppError::NoScheduledClass(miss) => {
                assert_eq!(
                    miss,
                    ScheduleMiss {
                        current_day: 1,
                        current_time: "10:15".into(),
                        lab_id: "lab-1".into(),
                        user_id: "faculty-2".into(),
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_biometric_is_not_found() {
        let mut store = MockAttendanceStore::new();
        store.expect_find_user_by_biometric().returning(|_| Ok(None));
        store.expect_schedules_for().never();

        let err = service(store)
            .record(scan("BIO404"), None, monday(8, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "User not found with provided biometric ID"));
    }

    #[tokio::test]
    async fn non_faculty_cannot_record() {
        for role in [Role::Admin, Role::Custodian] {
            let mut store = MockAttendanceStore::new();
            store.expect_find_user_by_biometric().returning(move |id| {
                let mut user = faculty(id);
                user.role = role;
                Ok(Some(user))
            });
            store.expect_schedules_for().never();

            let err = service(store)
                .record(scan("BIO001"), None, monday(8, 0))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Forbidden(_)));
        }
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_before_lookup() {
        let mut store = MockAttendanceStore::new();
        store.expect_find_user_by_biometric().never();

        let err = service(store)
            .record(
                RecordAttendance { lab_id: Some("lab-1".into()), ..Default::default() },
                None,
                monday(8, 0),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn one_time_schedule_from_yesterday_still_matches() {
        let now = monday(14, 0);
        let yesterday = now - Duration::hours(24);

        let mut store = MockAttendanceStore::new();
        store
            .expect_find_user_by_biometric()
            .returning(|id| Ok(Some(faculty(id))));
        store
            .expect_schedules_for()
            .returning(move |_, _| Ok(vec![details(one_time("sched-7", yesterday, "13:00", "15:00"))]));
        store.expect_find_open_session().returning(|_, _| Ok(None));
        store.expect_open_session().returning(|s| Ok(session(s)));

        let response = service(store).record(scan("BIO002"), None, now).await.unwrap();
        assert_eq!(response.action, AttendanceAction::CheckIn);
        assert_eq!(response.schedule.schedule.id, "sched-7");
    }

    #[tokio::test]
    async fn first_matching_schedule_wins() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_find_user_by_biometric()
            .returning(|id| Ok(Some(faculty(id))));
        store.expect_schedules_for().returning(|_, _| {
            Ok(vec![
                details(recurring("sched-tue", 2, "07:30", "09:00")),
                details(recurring("sched-a", 1, "07:00", "12:00")),
                details(recurring("sched-b", 1, "08:00", "10:00")),
            ])
        });
        store.expect_find_open_session().returning(|_, _| Ok(None));
        store.expect_open_session().returning(|s| Ok(session(s)));

        let response = service(store).record(scan("BIO002"), None, monday(8, 30)).await.unwrap();
        assert_eq!(response.schedule.schedule.id, "sched-a");
    }

    #[tokio::test]
    async fn lost_check_out_race_is_a_conflict() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_find_user_by_biometric()
            .returning(|id| Ok(Some(faculty(id))));
        store
            .expect_schedules_for()
            .returning(|_, _| Ok(vec![details(recurring("sched-1", 1, "07:30", "09:00"))]));
        store.expect_find_open_session().returning(|user_id, lab_id| {
            Ok(Some(session(NewAttendance {
                user_id: user_id.to_string(),
                lab_id: lab_id.to_string(),
                check_in_time: monday(7, 45),
                verification_method: VerificationMethod::Manual,
                biometric_data: "BIO002".into(),
                ip_address: "unknown".into(),
                notes: String::new(),
            })))
        });
        store.expect_close_session().returning(|_, _| Ok(None));

        let err = service(store).record(scan("BIO002"), None, monday(8, 0)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn out_of_range_offsets_are_rejected() {
        let store = || Arc::new(MockAttendanceStore::new());
        assert!(AttendanceService::new(store(), 8 * 60).is_ok());
        assert!(AttendanceService::new(store(), -(14 * 60)).is_ok());
        assert!(matches!(
            AttendanceService::new(store(), 25 * 60),
            Err(AppError::Internal(_))
        ));
        assert!(matches!(
            AttendanceService::new(store(), i32::MAX),
            Err(AppError::Internal(_))
        ));
        assert!(matches!(
            AttendanceService::new(store(), i32::MIN),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn local_clock_applies_the_offset() {
        // Sunday 23:30 UTC is Monday 07:30 at UTC+8
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 23, 30, 0).unwrap();
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(local_clock(now, offset), (1, "07:30".to_string()));
        assert_eq!(local_clock(now, FixedOffset::east_opt(0).unwrap()), (0, "23:30".to_string()));
    }
}

//! Schedule models (recurring and one-time lab bookings)

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

/// How far from its date a one-time schedule still matches a check-in.
///
/// The window spans a full day on either side, so a one-time booking dated
/// yesterday or tomorrow matches as long as the time-of-day test passes.
pub const ONE_TIME_MATCH_WINDOW_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// A lab booking for one faculty member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub lab_id: String,
    pub user_id: String,
    /// Day of week (0=Sunday, 6=Saturday); null for one-time schedules
    pub day_of_week: Option<i16>,
    /// Start time (HH:MM)
    pub start_time: String,
    /// End time (HH:MM)
    pub end_time: String,
    pub course_code: Option<String>,
    pub section: Option<String>,
    pub subject: Option<String>,
    pub is_recurring: bool,
    /// Date of a one-time schedule
    pub start_date: Option<DateTime<Utc>>,
    /// Optional last date of a recurring schedule
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Whether this schedule covers a check-in at `now`, given the local
    /// weekday (0=Sunday) and local "HH:MM" time derived from it.
    pub fn covers(&self, weekday: i16, local_time: &str, now: DateTime<Utc>) -> bool {
        if !self.contains_time(local_time) {
            return false;
        }

        if self.is_recurring {
            self.day_of_week == Some(weekday)
        } else {
            let window = Duration::hours(ONE_TIME_MATCH_WINDOW_HOURS);
            self.start_date
                .map(|date| date >= now - window && date <= now + window)
                .unwrap_or(false)
        }
    }

    /// Whether the schedule still lies ahead: recurring today with a start
    /// not yet passed, or one-time dated from now on.
    pub fn is_upcoming(&self, weekday: i16, local_time: &str, now: DateTime<Utc>) -> bool {
        if self.is_recurring {
            self.day_of_week == Some(weekday) && self.start_time.as_str() >= local_time
        } else {
            self.start_date.map(|date| date >= now).unwrap_or(false)
        }
    }

    /// Whether another booking in the same lab collides with `candidate`.
    ///
    /// Recurring rows collide on the same weekday, one-time rows on the
    /// identical date; both then need overlapping time intervals.
    pub fn conflicts_with(&self, candidate: &ScheduleInput, candidate_id: Option<&str>) -> bool {
        if self.lab_id != candidate.lab_id || candidate_id == Some(self.id.as_str()) {
            return false;
        }

        let same_slot = if self.is_recurring {
            self.day_of_week.is_some() && self.day_of_week == candidate.day_of_week
        } else {
            self.start_date.is_some() && self.start_date == candidate.start_date
        };

        same_slot
            && times_overlap(
                &self.start_time,
                &self.end_time,
                &candidate.start_time,
                &candidate.end_time,
            )
    }

    // HH:MM strings order the same way as the times they spell
    fn contains_time(&self, local_time: &str) -> bool {
        self.start_time.as_str() <= local_time && local_time <= self.end_time.as_str()
    }
}

/// Interval overlap between an existing booking and a candidate, bounds
/// inclusive: the candidate starts inside, ends inside, or encloses it.
pub fn times_overlap(existing_start: &str, existing_end: &str, start: &str, end: &str) -> bool {
    (existing_start <= start && existing_end >= start)
        || (existing_start <= end && existing_end >= end)
        || (existing_start >= start && existing_end <= end)
}

/// Schedule joined with user and laboratory names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub schedule: Schedule,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_biometric_id: Option<String>,
    pub lab_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Create or replace schedule request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub lab_id: Option<String>,
    pub user_id: Option<String>,
    /// Day of week (0=Sunday, 6=Saturday), required for recurring schedules
    pub day_of_week: Option<i16>,
    /// Start time (HH:MM)
    pub start_time: Option<String>,
    /// End time (HH:MM)
    pub end_time: Option<String>,
    pub course_code: Option<String>,
    pub section: Option<String>,
    pub subject: Option<String>,
    /// Defaults to true
    pub is_recurring: Option<bool>,
    /// Required for one-time schedules. RFC 3339 or unix seconds.
    #[serde(default, deserialize_with = "timestamp_or_rfc3339")]
    pub start_date: Option<DateTime<Utc>>,
    /// RFC 3339 or unix seconds
    #[serde(default, deserialize_with = "timestamp_or_rfc3339")]
    pub end_date: Option<DateTime<Utc>>,
}

/// Dates arrive either as RFC 3339 strings or as unix seconds
#[derive(Deserialize)]
#[serde(untagged)]
enum DateInput {
    Seconds(i64),
    Rfc3339(DateTime<Utc>),
}

fn timestamp_or_rfc3339<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<DateInput>::deserialize(deserializer)? {
        None => Ok(None),
        Some(DateInput::Rfc3339(date)) => Ok(Some(date)),
        Some(DateInput::Seconds(secs)) => DateTime::from_timestamp(secs, 0)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {}", secs))),
    }
}

/// Validated, normalized schedule fields ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleInput {
    pub lab_id: String,
    pub user_id: String,
    pub day_of_week: Option<i16>,
    pub start_time: String,
    pub end_time: String,
    pub course_code: Option<String>,
    pub section: Option<String>,
    pub subject: Option<String>,
    pub is_recurring: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl ScheduleRequest {
    /// Check required fields and normalize: recurring schedules drop the
    /// start date, one-time schedules drop the weekday and end date.
    pub fn into_input(self) -> AppResult<ScheduleInput> {
        let (lab_id, user_id, start_time, end_time) = match (
            non_empty(self.lab_id),
            non_empty(self.user_id),
            non_empty(self.start_time),
            non_empty(self.end_time),
        ) {
            (Some(lab), Some(user), Some(start), Some(end)) => (lab, user, start, end),
            _ => {
                return Err(AppError::Validation(
                    "Missing required fields: labId, userId, startTime, endTime".to_string(),
                ))
            }
        };

        let is_recurring = self.is_recurring.unwrap_or(true);

        if is_recurring {
            match self.day_of_week {
                None => {
                    return Err(AppError::Validation(
                        "dayOfWeek is required for recurring schedules".to_string(),
                    ))
                }
                Some(day) if !(0..=6).contains(&day) => {
                    return Err(AppError::Validation(
                        "dayOfWeek must be between 0 (Sunday) and 6 (Saturday)".to_string(),
                    ))
                }
                Some(_) => {}
            }
        } else if self.start_date.is_none() {
            return Err(AppError::Validation(
                "startDate is required for one-time schedules".to_string(),
            ));
        }

        let start = parse_hhmm(&start_time, "startTime")?;
        let end = parse_hhmm(&end_time, "endTime")?;
        if start >= end {
            return Err(AppError::Validation(
                "startTime must be before endTime".to_string(),
            ));
        }

        Ok(ScheduleInput {
            lab_id,
            user_id,
            day_of_week: if is_recurring { self.day_of_week } else { None },
            start_time,
            end_time,
            course_code: self.course_code,
            section: self.section,
            subject: self.subject,
            is_recurring,
            start_date: if is_recurring { None } else { self.start_date },
            end_date: if is_recurring { self.end_date } else { None },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a zero-padded 24h "HH:MM" time
fn parse_hhmm(value: &str, field: &str) -> AppResult<NaiveTime> {
    let invalid = || AppError::Validation(format!("Invalid {} (use HH:MM)", field));
    if value.len() != 5 || value.as_bytes()[2] != b':' {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| invalid())
}

/// Query parameters for listing schedules
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ScheduleQuery {
    pub lab_id: Option<String>,
    pub user_id: Option<String>,
    /// Only schedules that have not started yet
    pub upcoming: Option<bool>,
}

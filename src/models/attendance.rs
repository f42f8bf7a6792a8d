//! Attendance log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{AttendanceAction, VerificationMethod};
use super::schedule::ScheduleDetails;
use super::user::UserShort;

/// One check-in/check-out session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceLog {
    pub id: String,
    pub user_id: String,
    pub lab_id: String,
    pub check_in_time: DateTime<Utc>,
    /// Null while the session is open
    pub check_out_time: Option<DateTime<Utc>>,
    pub verification_method: VerificationMethod,
    /// Identifier presented at the scanner
    pub biometric_data: Option<String>,
    pub ip_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Attendance log joined with user and laboratory names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub attendance: AttendanceLog,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub lab_name: Option<String>,
}

/// Check-in/check-out event from a scanner
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendance {
    pub biometric_id: Option<String>,
    pub lab_id: Option<String>,
    /// Defaults to biometric
    pub verification_method: Option<VerificationMethod>,
}

/// Row written when a session opens
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub user_id: String,
    pub lab_id: String,
    pub check_in_time: DateTime<Utc>,
    pub verification_method: VerificationMethod,
    pub biometric_data: String,
    pub ip_address: String,
    pub notes: String,
}

/// Result of a recorded attendance event
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    pub success: bool,
    pub action: AttendanceAction,
    pub user: UserShort,
    pub schedule: ScheduleDetails,
    pub attendance: AttendanceLog,
    /// Unix seconds of the event
    pub timestamp: i64,
}

/// Query parameters for listing attendance
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    pub user_id: Option<String>,
    pub lab_id: Option<String>,
    /// Only sessions without a check-out
    pub active: Option<bool>,
}

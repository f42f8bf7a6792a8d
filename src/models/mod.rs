//! Data models for Tabetala

pub mod attendance;
pub mod enums;
pub mod equipment;
pub mod laboratory;
pub mod schedule;
pub mod user;

// Re-export commonly used types
pub use attendance::{AttendanceDetails, AttendanceLog, NewAttendance};
pub use enums::{AttendanceAction, EquipmentStatus, EquipmentType, LabStatus, Role, VerificationMethod};
pub use equipment::{Equipment, EquipmentDetails};
pub use laboratory::Laboratory;
pub use schedule::{Schedule, ScheduleDetails, ScheduleInput};
pub use user::{User, UserShort};

/// Generate an opaque text id with a kind prefix
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

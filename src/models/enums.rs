//! Shared domain enums, stored as lowercase text columns

use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgValueRef, Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Implements string conversions and the SQLx text mapping for a fieldless enum.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
    Custodian,
}

text_enum!(Role {
    Admin => "admin",
    Faculty => "faculty",
    Custodian => "custodian",
});

impl Default for Role {
    fn default() -> Self {
        Role::Faculty
    }
}

// ---------------------------------------------------------------------------
// Laboratory status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LabStatus {
    Active,
    Maintenance,
    Closed,
}

text_enum!(LabStatus {
    Active => "active",
    Maintenance => "maintenance",
    Closed => "closed",
});

impl Default for LabStatus {
    fn default() -> Self {
        LabStatus::Active
    }
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// Kind of workstation peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentType {
    Keyboard,
    Mouse,
    Monitor,
    Cpu,
    Other,
}

text_enum!(EquipmentType {
    Keyboard => "keyboard",
    Mouse => "mouse",
    Monitor => "monitor",
    Cpu => "cpu",
    Other => "other",
});

/// Last detected state of a piece of equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    Present,
    Missing,
    Damaged,
    Maintenance,
}

text_enum!(EquipmentStatus {
    Present => "present",
    Missing => "missing",
    Damaged => "damaged",
    Maintenance => "maintenance",
});

impl Default for EquipmentStatus {
    fn default() -> Self {
        EquipmentStatus::Present
    }
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

/// How an attendance event was verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    Manual,
    Biometric,
    QrCode,
}

text_enum!(VerificationMethod {
    Manual => "manual",
    Biometric => "biometric",
    QrCode => "qr_code",
});

impl Default for VerificationMethod {
    fn default() -> Self {
        VerificationMethod::Biometric
    }
}

/// Outcome of an attendance event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceAction {
    CheckIn,
    CheckOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip_matches_serde_names() {
        assert_eq!("qr_code".parse::<VerificationMethod>(), Ok(VerificationMethod::QrCode));
        assert_eq!(
            serde_json::to_value(VerificationMethod::QrCode).unwrap(),
            serde_json::json!(VerificationMethod::QrCode.as_str())
        );
        assert_eq!("Custodian".parse::<Role>(), Ok(Role::Custodian));
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn attendance_action_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(AttendanceAction::CheckOut).unwrap(),
            serde_json::json!("check_out")
        );
    }
}

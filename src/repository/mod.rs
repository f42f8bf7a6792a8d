//! Repository layer for database operations
//!
//! Each domain file adds prefixed methods to [`Repository`]; the attendance
//! and schedule files also implement the store traits the services use.

pub mod attendance;
pub mod equipment;
pub mod laboratories;
pub mod schedules;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::error::AppError;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Round-trip to the database, used by readiness checks
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map a unique-constraint violation to a conflict with the given message
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

/// Map a foreign-key violation (a referenced row is missing) to not found
pub(crate) fn not_found_on_foreign_key(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::NotFound(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

/// `SET` list of a partial update. `$1` is the row id and `$2` the new
/// `updated_at`; present columns take `$3` onwards in the order given.
pub(crate) fn update_assignments(columns: &[(&str, bool)]) -> String {
    let mut sets = vec!["updated_at = $2".to_string()];
    for (name, _) in columns.iter().filter(|(_, present)| *present) {
        sets.push(format!("{} = ${}", name, sets.len() + 2));
    }
    sets.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::error::Error as StdError;

    #[derive(Debug, thiserror::Error)]
    #[error("constraint violated")]
    struct ConstraintError(ErrorKind);

    impl DatabaseError for ConstraintError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn violation(kind: ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintError(kind)))
    }

    #[test]
    fn partial_update_numbers_only_present_columns() {
        assert_eq!(update_assignments(&[("name", false), ("status", false)]), "updated_at = $2");
        assert_eq!(
            update_assignments(&[("name", true), ("building", false), ("capacity", true), ("status", true)]),
            "updated_at = $2, name = $3, capacity = $4, status = $5"
        );
    }

    #[test]
    fn second_open_session_maps_to_conflict() {
        let err = conflict_on_unique(
            violation(ErrorKind::UniqueViolation),
            "An attendance session is already open for this laboratory",
        );
        assert!(matches!(
            err,
            AppError::Conflict(msg) if msg == "An attendance session is already open for this laboratory"
        ));

        let other = conflict_on_unique(violation(ErrorKind::ForeignKeyViolation), "x");
        assert!(matches!(other, AppError::Database(_)));
        assert!(matches!(
            conflict_on_unique(sqlx::Error::RowNotFound, "x"),
            AppError::Database(_)
        ));
    }

    #[test]
    fn missing_reference_maps_to_not_found() {
        let err = not_found_on_foreign_key(violation(ErrorKind::ForeignKeyViolation), "Laboratory or user not found");
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Laboratory or user not found"));

        let other = not_found_on_foreign_key(violation(ErrorKind::UniqueViolation), "x");
        assert!(matches!(other, AppError::Database(_)));
    }
}

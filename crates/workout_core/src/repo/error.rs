//! Repository error taxonomy.
//!
//! # Responsibility
//! - Give every repository operation one typed error, built per call.
//! - Classify store failures (timeout, constraint, integrity) for callers.
//! - Keep diagnostic detail out of the externally visible message.

use crate::db::DbError;
use crate::model::validation::ValidationErrors;
use crate::model::{ExerciseId, UserId, WorkoutId};
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Key of the row an operation addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey {
    Exercise(ExerciseId),
    Workout(WorkoutId),
    /// Workout addressed through its owner, as updates are.
    OwnedWorkout {
        workout_id: WorkoutId,
        user_id: UserId,
    },
    PersonalRecord {
        user_id: UserId,
        exercise_id: ExerciseId,
    },
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exercise(id) => write!(f, "exercise {id}"),
            Self::Workout(id) => write!(f, "workout {id}"),
            Self::OwnedWorkout {
                workout_id,
                user_id,
            } => write!(f, "workout {workout_id} of user {user_id}"),
            Self::PersonalRecord {
                user_id,
                exercise_id,
            } => write!(
                f,
                "personal record of user {user_id} for exercise {exercise_id}"
            ),
        }
    }
}

/// Error kinds callers map to external statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    EditConflict,
    Store,
}

/// Finer classification of [`ErrorKind::Store`] errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFailure {
    /// The busy deadline elapsed while the database was locked.
    Timeout,
    /// A schema constraint rejected the statement.
    Constraint,
    /// Persisted data or the database file is inconsistent.
    Integrity,
    /// The connection is not migrated to the expected schema.
    Schema,
    Other,
}

/// Error returned by every repository operation.
#[derive(Debug)]
pub enum RepoError {
    /// Candidate rejected before reaching the store.
    Validation(ValidationErrors),
    /// No row matched the key, or a key-scoped write matched nothing.
    NotFound(RecordKey),
    /// The row exists but its version moved past the one the caller read.
    EditConflict {
        exercise_id: ExerciseId,
        expected_version: i64,
    },
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted data cannot be decoded into a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::EditConflict { .. } => ErrorKind::EditConflict,
            Self::Db(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => ErrorKind::Store,
        }
    }

    /// Classifies store errors; `None` for the other kinds.
    pub fn store_failure(&self) -> Option<StoreFailure> {
        match self {
            Self::Validation(_) | Self::NotFound(_) | Self::EditConflict { .. } => None,
            Self::Db(DbError::Sqlite(err)) => Some(classify_sqlite(err)),
            Self::Db(DbError::UnsupportedSchemaVersion { .. }) => Some(StoreFailure::Schema),
            // r2d2 only surfaces checkout timeouts once a pool is built.
            Self::Db(DbError::Pool(_)) => Some(StoreFailure::Timeout),
            Self::Db(DbError::InvalidPoolSettings(_) | DbError::PoolRequiresFile) => {
                Some(StoreFailure::Other)
            }
            Self::InvalidData(_) => Some(StoreFailure::Integrity),
            Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => Some(StoreFailure::Schema),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.store_failure() == Some(StoreFailure::Timeout)
    }

    /// Generic message safe to show outside the service.
    ///
    /// Field-level detail for validation failures is available through the
    /// `Validation` payload; nothing else leaks.
    pub fn public_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "the submitted data failed validation",
            ErrorKind::NotFound => "the requested resource could not be found",
            ErrorKind::EditConflict => {
                "unable to update the record due to an edit conflict, please try again"
            }
            ErrorKind::Store => {
                "the server encountered a problem and could not process your request"
            }
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "{key} not found"),
            Self::EditConflict {
                exercise_id,
                expected_version,
            } => write!(
                f,
                "edit conflict on exercise {exercise_id}: version {expected_version} is stale"
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::EditConflict { .. }
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ValidationErrors> for RepoError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// True when `err` is a UNIQUE or PRIMARY KEY violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    err.sqlite_error().map_or(false, |sqlite| {
        sqlite.code == ErrorCode::ConstraintViolation
            && (sqlite.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || sqlite.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    })
}

fn classify_sqlite(err: &rusqlite::Error) -> StoreFailure {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => StoreFailure::Timeout,
        Some(ErrorCode::ConstraintViolation) => StoreFailure::Constraint,
        Some(ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase) => StoreFailure::Integrity,
        _ => StoreFailure::Other,
    }
}

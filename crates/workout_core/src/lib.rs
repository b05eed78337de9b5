//! Persistence core for the workout tracking service.
//!
//! Stores exercises, logged workouts and per-user personal records in
//! SQLite. Callers hand in decoded inputs, get typed results back and map
//! [`RepoError::kind`] to their own status codes.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::exercise::{Exercise, ExercisePatch, NewExercise, INITIAL_VERSION};
pub use model::personal_record::{
    ConsolidatedPersonalRecord, PersonalRecord, PrCheck, UpsertOutcome,
};
pub use model::validation::{ValidationErrors, Validator};
pub use model::workout::{AlignmentError, SetEntry, Workout, WorkoutDraft};
pub use model::{ExerciseId, UserId, WorkoutId};
pub use repo::error::{ErrorKind, RecordKey, RepoError, RepoResult, StoreFailure};
pub use repo::exercise_repo::{ExerciseRepository, SqliteExerciseRepository};
pub use repo::personal_record_repo::{PersonalRecordRepository, SqlitePersonalRecordRepository};
pub use repo::workout_repo::{SqliteWorkoutRepository, WorkoutRepository};
pub use service::exercise_service::ExerciseService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

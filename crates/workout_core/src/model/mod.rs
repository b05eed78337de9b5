//! Domain model for exercises, workouts and personal records.
//!
//! # Responsibility
//! - Define the records exchanged between callers and repositories.
//! - Own field-level validation so invalid candidates never reach SQL.
//!
//! # Invariants
//! - Identifiers are store-assigned positive integers.
//! - Workout sets are held as ordered `(reps, weight)` pairs; the parallel
//!   array form exists only at the wire and storage boundaries.

pub mod exercise;
pub mod personal_record;
pub mod validation;
pub mod workout;

/// Store-assigned exercise identifier.
pub type ExerciseId = i64;
/// Store-assigned workout identifier.
pub type WorkoutId = i64;
/// User identifier owned by an external identity service.
pub type UserId = i64;

//! Logged workout records.
//!
//! # Responsibility
//! - Accept the parallel `reps`/`weights` arrays callers send and validate
//!   them before any write.
//! - Hold persisted workouts as ordered per-set pairs so the arrays cannot
//!   drift out of alignment once loaded.
//!
//! # Invariants
//! - `len(reps) == len(weights) == sets` for every draft that passes
//!   validation and for every decoded row.
//! - `entries[i]` describes set `i`; order is the order the caller logged.

use crate::model::validation::{ValidationErrors, Validator};
use crate::model::{ExerciseId, UserId, WorkoutId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One performed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetEntry {
    pub reps: i64,
    pub weight: i64,
}

impl SetEntry {
    pub fn new(reps: i64, weight: i64) -> Self {
        Self { reps, weight }
    }
}

/// Parallel arrays that disagree on the number of sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentError {
    pub sets: i64,
    pub reps: usize,
    pub weights: usize,
}

impl Display for AlignmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sets={} but reps has {} entries and weights has {}",
            self.sets, self.reps, self.weights
        )
    }
}

impl Error for AlignmentError {}

/// Zips index-aligned `reps` and `weights` into per-set entries.
///
/// Fails instead of truncating when either array disagrees with `sets`.
pub fn zip_sets(
    sets: i64,
    reps: Vec<i64>,
    weights: Vec<i64>,
) -> Result<Vec<SetEntry>, AlignmentError> {
    let aligned = reps.len() == weights.len()
        && usize::try_from(sets).map_or(false, |count| count == reps.len());
    if !aligned {
        return Err(AlignmentError {
            sets,
            reps: reps.len(),
            weights: weights.len(),
        });
    }

    Ok(reps
        .into_iter()
        .zip(weights)
        .map(|(reps, weight)| SetEntry { reps, weight })
        .collect())
}

/// Untrusted workout input in the parallel-array shape callers submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDraft {
    pub user_id: UserId,
    pub exercise_id: ExerciseId,
    /// Unit is decided by the caller.
    pub duration: i64,
    pub sets: i64,
    pub reps: Vec<i64>,
    pub weights: Vec<i64>,
}

impl WorkoutDraft {
    /// Builds an already-aligned draft from per-set entries.
    pub fn from_entries(
        user_id: UserId,
        exercise_id: ExerciseId,
        duration: i64,
        entries: &[SetEntry],
    ) -> Self {
        Self {
            user_id,
            exercise_id,
            duration,
            sets: entries.len() as i64,
            reps: entries.iter().map(|entry| entry.reps).collect(),
            weights: entries.iter().map(|entry| entry.weight).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut validator = Validator::new();
        validator.check(self.user_id > 0, "user_id", "must be greater than zero");
        validator.check(
            self.exercise_id > 0,
            "exercise_id",
            "must be greater than zero",
        );
        validator.check(self.duration > 0, "duration", "must be greater than zero");
        validator.check(self.sets > 0, "sets", "must be greater than zero");
        validator.check(
            self.weights.len() == self.reps.len(),
            "weights",
            "must have one entry per rep count",
        );
        validator.check(
            usize::try_from(self.sets).map_or(false, |sets| sets == self.reps.len()),
            "reps",
            "must have one entry per set",
        );
        validator.check(
            self.reps.iter().all(|reps| *reps > 0),
            "reps",
            "every set needs at least one rep",
        );
        validator.check(
            self.weights.iter().all(|weight| *weight >= 0),
            "weights",
            "must not be negative",
        );
        validator.finish()
    }

    /// Validates and returns the per-set view of this draft.
    pub fn entries(&self) -> Result<Vec<SetEntry>, ValidationErrors> {
        self.validate()?;
        Ok(self
            .reps
            .iter()
            .zip(&self.weights)
            .map(|(reps, weight)| SetEntry::new(*reps, *weight))
            .collect())
    }
}

/// Persisted workout row.
///
/// Serializes to the parallel-array wire shape and refuses to deserialize
/// misaligned arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WorkoutWire", try_from = "WorkoutWire")]
pub struct Workout {
    pub workout_id: WorkoutId,
    pub user_id: UserId,
    pub exercise_id: ExerciseId,
    pub duration: i64,
    pub entries: Vec<SetEntry>,
    /// Epoch milliseconds, assigned by the store.
    pub created_at: i64,
}

impl Workout {
    pub fn sets(&self) -> usize {
        self.entries.len()
    }

    pub fn reps(&self) -> Vec<i64> {
        self.entries.iter().map(|entry| entry.reps).collect()
    }

    pub fn weights(&self) -> Vec<i64> {
        self.entries.iter().map(|entry| entry.weight).collect()
    }

    /// Returns the mutable fields as a draft, e.g. to edit and write back.
    pub fn to_draft(&self) -> WorkoutDraft {
        WorkoutDraft::from_entries(self.user_id, self.exercise_id, self.duration, &self.entries)
    }
}

#[derive(Serialize, Deserialize)]
struct WorkoutWire {
    workout_id: WorkoutId,
    user_id: UserId,
    exercise_id: ExerciseId,
    duration: i64,
    sets: i64,
    reps: Vec<i64>,
    weights: Vec<i64>,
    created_at: i64,
}

impl From<Workout> for WorkoutWire {
    fn from(value: Workout) -> Self {
        Self {
            workout_id: value.workout_id,
            user_id: value.user_id,
            exercise_id: value.exercise_id,
            duration: value.duration,
            sets: value.entries.len() as i64,
            reps: value.reps(),
            weights: value.weights(),
            created_at: value.created_at,
        }
    }
}

impl TryFrom<WorkoutWire> for Workout {
    type Error = AlignmentError;

    fn try_from(value: WorkoutWire) -> Result<Self, Self::Error> {
        let entries = zip_sets(value.sets, value.reps, value.weights)?;
        Ok(Self {
            workout_id: value.workout_id,
            user_id: value.user_id,
            exercise_id: value.exercise_id,
            duration: value.duration,
            entries,
            created_at: value.created_at,
        })
    }
}

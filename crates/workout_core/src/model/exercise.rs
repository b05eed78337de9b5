//! Exercise reference records.
//!
//! # Invariants
//! - `name` and `description` are never blank.
//! - `version` starts at 0 and grows by exactly one per successful update;
//!   callers echo the version they read so stale writes can be rejected.

use crate::model::validation::{is_present, ValidationErrors, Validator};
use crate::model::ExerciseId;
use serde::{Deserialize, Serialize};

/// Version assigned to a freshly inserted exercise.
pub const INITIAL_VERSION: i64 = 0;

/// Insert candidate for an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExercise {
    #[serde(rename = "exercise_name")]
    pub name: String,
    #[serde(rename = "exercise_description")]
    pub description: String,
}

impl NewExercise {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_exercise_fields(&self.name, &self.description)
    }
}

/// Persisted exercise row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub exercise_id: ExerciseId,
    #[serde(rename = "exercise_name")]
    pub name: String,
    #[serde(rename = "exercise_description")]
    pub description: String,
    /// Optimistic concurrency token. Not part of the public wire shape.
    #[serde(skip)]
    pub version: i64,
}

impl Exercise {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_exercise_fields(&self.name, &self.description)
    }
}

/// Partial edit applied through a read-modify-write cycle.
///
/// Absent fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExercisePatch {
    pub exercise_id: ExerciseId,
    #[serde(default, rename = "exercise_name")]
    pub name: Option<String>,
    #[serde(default, rename = "exercise_description")]
    pub description: Option<String>,
}

impl ExercisePatch {
    /// Overlays the present fields onto `exercise`, keeping its version.
    pub fn apply_to(&self, exercise: &mut Exercise) {
        if let Some(name) = &self.name {
            exercise.name = name.clone();
        }
        if let Some(description) = &self.description {
            exercise.description = description.clone();
        }
    }
}

fn validate_exercise_fields(name: &str, description: &str) -> Result<(), ValidationErrors> {
    let mut validator = Validator::new();
    validator.check(is_present(name), "exercise_name", "must not be empty");
    validator.check(
        is_present(description),
        "exercise_description",
        "must not be empty",
    );
    validator.finish()
}

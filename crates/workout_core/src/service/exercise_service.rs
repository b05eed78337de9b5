//! Exercise use-case service.
//!
//! # Responsibility
//! - Offer create/read/list/delete entry points for exercise callers.
//! - Run the read-modify-write cycle for partial edits.
//!
//! # Invariants
//! - Edits always carry the version observed by the preceding read.
//! - An `EditConflict` is returned to the caller unchanged; this layer never
//!   retries.

use crate::model::exercise::{Exercise, ExercisePatch, NewExercise};
use crate::model::ExerciseId;
use crate::repo::error::RepoResult;
use crate::repo::exercise_repo::ExerciseRepository;

/// Use-case service wrapper for exercise operations.
pub struct ExerciseService<R: ExerciseRepository> {
    repo: R,
}

impl<R: ExerciseRepository> ExerciseService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts `exercise` and returns the stored row, including its version.
    pub fn create_exercise(&self, exercise: &NewExercise) -> RepoResult<Exercise> {
        let id = self.repo.insert_exercise(exercise)?;
        self.repo.select_exercise(id)
    }

    pub fn get_exercise(&self, id: ExerciseId) -> RepoResult<Exercise> {
        self.repo.select_exercise(id)
    }

    pub fn list_exercises(&self) -> RepoResult<Vec<Exercise>> {
        self.repo.select_all_exercises()
    }

    /// Applies `patch` on top of the current row.
    ///
    /// # Contract
    /// - Reads the row, overlays present fields, writes with the read version.
    /// - Returns the row as written, carrying its new version.
    /// - Fails with `EditConflict` if another writer got in between.
    pub fn apply_patch(&self, patch: &ExercisePatch) -> RepoResult<Exercise> {
        let mut exercise = self.repo.select_exercise(patch.exercise_id)?;
        patch.apply_to(&mut exercise);
        exercise.version = self.repo.update_exercise(&exercise)?;
        Ok(exercise)
    }

    pub fn delete_exercise(&self, id: ExerciseId) -> RepoResult<()> {
        self.repo.delete_exercise(id)
    }
}

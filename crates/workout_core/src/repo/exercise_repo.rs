//! Exercise repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the versioned `exercises` table.
//! - Enforce optimistic concurrency on update.
//!
//! # Invariants
//! - Write paths validate before SQL mutations.
//! - An update only lands when the caller's version equals the stored one,
//!   and it bumps the stored version by exactly one.
//! - A stale update is reported as `EditConflict`, a missing row as
//!   `NotFound`; neither silently succeeds.

use crate::model::exercise::{Exercise, NewExercise};
use crate::model::ExerciseId;
use crate::repo::error::{RecordKey, RepoError, RepoResult};
use crate::repo::schema::{ensure_connection_ready, EXERCISES_TABLE};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};

const EXERCISE_SELECT_SQL: &str = "SELECT
    exercise_id,
    exercise_name,
    exercise_description,
    exercise_version
FROM exercises";

/// Repository interface for exercise operations.
pub trait ExerciseRepository {
    /// Inserts a validated exercise and returns its store-assigned id.
    fn insert_exercise(&self, exercise: &NewExercise) -> RepoResult<ExerciseId>;
    /// Loads one exercise. Ids below 1 are reported as `NotFound`.
    fn select_exercise(&self, id: ExerciseId) -> RepoResult<Exercise>;
    /// Writes `exercise` if its version is current and returns the new version.
    fn update_exercise(&self, exercise: &Exercise) -> RepoResult<i64>;
    /// Hard-deletes one exercise. Fails with a constraint error while
    /// workouts or personal records still reference it.
    fn delete_exercise(&self, id: ExerciseId) -> RepoResult<()>;
    /// Returns every exercise ordered by id.
    fn select_all_exercises(&self) -> RepoResult<Vec<Exercise>>;
}

/// SQLite-backed exercise repository.
pub struct SqliteExerciseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteExerciseRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[EXERCISES_TABLE])?;
        Ok(Self { conn })
    }
}

impl ExerciseRepository for SqliteExerciseRepository<'_> {
    fn insert_exercise(&self, exercise: &NewExercise) -> RepoResult<ExerciseId> {
        exercise.validate()?;

        let id = self.conn.query_row(
            "INSERT INTO exercises (exercise_name, exercise_description)
             VALUES (?1, ?2)
             RETURNING exercise_id;",
            params![exercise.name.as_str(), exercise.description.as_str()],
            |row| row.get::<_, ExerciseId>(0),
        )?;

        debug!("event=exercise_insert module=repo status=ok exercise_id={id}");
        Ok(id)
    }

    fn select_exercise(&self, id: ExerciseId) -> RepoResult<Exercise> {
        if id < 1 {
            return Err(RepoError::NotFound(RecordKey::Exercise(id)));
        }

        self.conn
            .query_row(
                &format!("{EXERCISE_SELECT_SQL} WHERE exercise_id = ?1;"),
                [id],
                parse_exercise_row,
            )
            .optional()?
            .ok_or(RepoError::NotFound(RecordKey::Exercise(id)))
    }

    fn update_exercise(&self, exercise: &Exercise) -> RepoResult<i64> {
        let id = exercise.exercise_id;
        if id < 1 {
            return Err(RepoError::NotFound(RecordKey::Exercise(id)));
        }
        exercise.validate()?;

        let changed = self.conn.execute(
            "UPDATE exercises
             SET
                exercise_name = ?1,
                exercise_description = ?2,
                exercise_version = exercise_version + 1
             WHERE exercise_id = ?3
               AND exercise_version = ?4;",
            params![
                exercise.name.as_str(),
                exercise.description.as_str(),
                id,
                exercise.version,
            ],
        )?;

        if changed == 0 {
            // Zero rows is either a missing id or a stale version; look again.
            if exercise_exists(self.conn, id)? {
                warn!(
                    "event=exercise_update module=repo status=conflict exercise_id={} expected_version={}",
                    id, exercise.version
                );
                return Err(RepoError::EditConflict {
                    exercise_id: id,
                    expected_version: exercise.version,
                });
            }
            return Err(RepoError::NotFound(RecordKey::Exercise(id)));
        }

        let new_version = exercise.version + 1;
        debug!(
            "event=exercise_update module=repo status=ok exercise_id={id} version={new_version}"
        );
        Ok(new_version)
    }

    fn delete_exercise(&self, id: ExerciseId) -> RepoResult<()> {
        if id < 1 {
            return Err(RepoError::NotFound(RecordKey::Exercise(id)));
        }

        let changed = self
            .conn
            .execute("DELETE FROM exercises WHERE exercise_id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordKey::Exercise(id)));
        }

        debug!("event=exercise_delete module=repo status=ok exercise_id={id}");
        Ok(())
    }

    fn select_all_exercises(&self) -> RepoResult<Vec<Exercise>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EXERCISE_SELECT_SQL} ORDER BY exercise_id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut exercises = Vec::new();

        while let Some(row) = rows.next()? {
            exercises.push(parse_exercise_row(row)?);
        }

        Ok(exercises)
    }
}

fn parse_exercise_row(row: &Row<'_>) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        exercise_id: row.get("exercise_id")?,
        name: row.get("exercise_name")?,
        description: row.get("exercise_description")?,
        version: row.get("exercise_version")?,
    })
}

fn exercise_exists(conn: &Connection, id: ExerciseId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM exercises WHERE exercise_id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

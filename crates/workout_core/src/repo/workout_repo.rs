//! Workout repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist workout log entries and their per-set payload.
//! - Serve the three lookup keys: workout id, user, user + exercise.
//!
//! # Invariants
//! - Write paths validate the draft before SQL mutations.
//! - Updates are scoped by `(workout_id, user_id)`; another user's workout
//!   is indistinguishable from a missing one.
//! - Read paths reject misaligned set arrays instead of truncating them.

use crate::model::workout::{Workout, WorkoutDraft};
use crate::model::{ExerciseId, UserId, WorkoutId};
use crate::repo::error::{RecordKey, RepoError, RepoResult};
use crate::repo::schema::{ensure_connection_ready, EXERCISES_TABLE, WORKOUTS_TABLE};
use crate::repo::set_codec::{decode_sets, encode_sets};
use log::{debug, error};
use rusqlite::{params, Connection, Params, Row};

const WORKOUT_SELECT_SQL: &str = "SELECT
    workout_id,
    user_id,
    exercise_id,
    duration,
    sets,
    reps,
    weights,
    created_at
FROM workouts_table";

/// Repository interface for workout operations.
pub trait WorkoutRepository {
    /// Inserts a validated draft and returns the new workout id.
    fn insert_workout(&self, draft: &WorkoutDraft) -> RepoResult<WorkoutId>;
    /// Replaces the mutable fields of a workout owned by `draft.user_id`.
    fn update_workout(&self, workout_id: WorkoutId, draft: &WorkoutDraft) -> RepoResult<()>;
    fn delete_workout(&self, workout_id: WorkoutId) -> RepoResult<()>;
    fn get_by_workout_id(&self, workout_id: WorkoutId) -> RepoResult<Workout>;
    fn get_by_user_id_and_exercise_id(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
    ) -> RepoResult<Vec<Workout>>;
    fn get_by_user_id(&self, user_id: UserId) -> RepoResult<Vec<Workout>>;
}

/// SQLite-backed workout repository.
pub struct SqliteWorkoutRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorkoutRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[EXERCISES_TABLE, WORKOUTS_TABLE])?;
        Ok(Self { conn })
    }

    fn query_workouts<P: Params>(&self, filter: &str, params: P) -> RepoResult<Vec<Workout>> {
        let mut stmt = self.conn.prepare(&format!(
            "{WORKOUT_SELECT_SQL} WHERE {filter} ORDER BY workout_id ASC;"
        ))?;
        let mut rows = stmt.query(params)?;
        let mut workouts = Vec::new();

        while let Some(row) = rows.next()? {
            workouts.push(parse_workout_row(row)?);
        }

        Ok(workouts)
    }
}

impl WorkoutRepository for SqliteWorkoutRepository<'_> {
    fn insert_workout(&self, draft: &WorkoutDraft) -> RepoResult<WorkoutId> {
        let entries = draft.entries()?;
        let (reps, weights) = encode_sets(&entries)?;

        let id = self.conn.query_row(
            "INSERT INTO workouts_table (
                user_id,
                exercise_id,
                duration,
                sets,
                reps,
                weights
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING workout_id;",
            params![
                draft.user_id,
                draft.exercise_id,
                draft.duration,
                entries.len() as i64,
                reps,
                weights,
            ],
            |row| row.get::<_, WorkoutId>(0),
        )?;

        debug!(
            "event=workout_insert module=repo status=ok workout_id={} sets={}",
            id,
            entries.len()
        );
        Ok(id)
    }

    fn update_workout(&self, workout_id: WorkoutId, draft: &WorkoutDraft) -> RepoResult<()> {
        let key = RecordKey::OwnedWorkout {
            workout_id,
            user_id: draft.user_id,
        };
        if workout_id < 1 {
            return Err(RepoError::NotFound(key));
        }
        let entries = draft.entries()?;
        let (reps, weights) = encode_sets(&entries)?;

        let changed = self.conn.execute(
            "UPDATE workouts_table
             SET
                exercise_id = ?1,
                duration = ?2,
                sets = ?3,
                reps = ?4,
                weights = ?5
             WHERE workout_id = ?6
               AND user_id = ?7;",
            params![
                draft.exercise_id,
                draft.duration,
                entries.len() as i64,
                reps,
                weights,
                workout_id,
                draft.user_id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(key));
        }

        debug!("event=workout_update module=repo status=ok workout_id={workout_id}");
        Ok(())
    }

    fn delete_workout(&self, workout_id: WorkoutId) -> RepoResult<()> {
        if workout_id < 1 {
            return Err(RepoError::NotFound(RecordKey::Workout(workout_id)));
        }

        let changed = self.conn.execute(
            "DELETE FROM workouts_table WHERE workout_id = ?1;",
            [workout_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordKey::Workout(workout_id)));
        }

        debug!("event=workout_delete module=repo status=ok workout_id={workout_id}");
        Ok(())
    }

    fn get_by_workout_id(&self, workout_id: WorkoutId) -> RepoResult<Workout> {
        if workout_id < 1 {
            return Err(RepoError::NotFound(RecordKey::Workout(workout_id)));
        }

        self.query_workouts("workout_id = ?1", [workout_id])?
            .into_iter()
            .next()
            .ok_or(RepoError::NotFound(RecordKey::Workout(workout_id)))
    }

    fn get_by_user_id_and_exercise_id(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
    ) -> RepoResult<Vec<Workout>> {
        self.query_workouts(
            "user_id = ?1 AND exercise_id = ?2",
            params![user_id, exercise_id],
        )
    }

    fn get_by_user_id(&self, user_id: UserId) -> RepoResult<Vec<Workout>> {
        self.query_workouts("user_id = ?1", [user_id])
    }
}

fn parse_workout_row(row: &Row<'_>) -> RepoResult<Workout> {
    let workout_id: WorkoutId = row.get("workout_id")?;
    let sets: i64 = row.get("sets")?;
    let reps: String = row.get("reps")?;
    let weights: String = row.get("weights")?;

    let entries = decode_sets(sets, &reps, &weights).map_err(|err| {
        error!(
            "event=workout_decode module=repo status=error workout_id={workout_id} error_code=set_arrays_invalid"
        );
        err
    })?;

    Ok(Workout {
        workout_id,
        user_id: row.get("user_id")?,
        exercise_id: row.get("exercise_id")?,
        duration: row.get("duration")?,
        entries,
        created_at: row.get("created_at")?,
    })
}

use rusqlite::Connection;
use std::cell::Cell;
use workout_core::db::open_db_in_memory;
use workout_core::{
    ErrorKind, Exercise, ExerciseId, ExercisePatch, ExerciseRepository, ExerciseService,
    NewExercise, RepoError, RepoResult, SqliteExerciseRepository,
};

fn service(conn: &Connection) -> ExerciseService<SqliteExerciseRepository<'_>> {
    ExerciseService::new(SqliteExerciseRepository::try_new(conn).unwrap())
}

/// Lets another writer commit right after the service's read.
struct InterleavingRepo<'conn> {
    inner: SqliteExerciseRepository<'conn>,
    interleave: Cell<bool>,
}

impl ExerciseRepository for InterleavingRepo<'_> {
    fn insert_exercise(&self, exercise: &NewExercise) -> RepoResult<ExerciseId> {
        self.inner.insert_exercise(exercise)
    }

    fn select_exercise(&self, id: ExerciseId) -> RepoResult<Exercise> {
        let exercise = self.inner.select_exercise(id)?;
        if self.interleave.replace(false) {
            let mut concurrent = exercise.clone();
            concurrent.description = "edited by another writer".to_string();
            self.inner.update_exercise(&concurrent)?;
        }
        Ok(exercise)
    }

    fn update_exercise(&self, exercise: &Exercise) -> RepoResult<i64> {
        self.inner.update_exercise(exercise)
    }

    fn delete_exercise(&self, id: ExerciseId) -> RepoResult<()> {
        self.inner.delete_exercise(id)
    }

    fn select_all_exercises(&self) -> RepoResult<Vec<Exercise>> {
        self.inner.select_all_exercises()
    }
}

#[test]
fn create_returns_stored_row_at_initial_version() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create_exercise(&NewExercise::new("Bench Press", "Flat barbell bench"))
        .unwrap();

    assert!(created.exercise_id >= 1);
    assert_eq!(created.version, 0);
    assert_eq!(service.get_exercise(created.exercise_id).unwrap(), created);
}

#[test]
fn patch_overlays_present_fields_and_bumps_version() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service
        .create_exercise(&NewExercise::new("Bench Press", "Flat barbell bench"))
        .unwrap();

    let patched = service
        .apply_patch(&ExercisePatch {
            exercise_id: created.exercise_id,
            name: None,
            description: Some("Paused flat bench".to_string()),
        })
        .unwrap();

    assert_eq!(patched.name, "Bench Press");
    assert_eq!(patched.description, "Paused flat bench");
    assert_eq!(patched.version, 1);
    assert_eq!(service.get_exercise(created.exercise_id).unwrap(), patched);
}

#[test]
fn patch_with_blank_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service
        .create_exercise(&NewExercise::new("Bench Press", "Flat barbell bench"))
        .unwrap();

    let err = service
        .apply_patch(&ExercisePatch {
            exercise_id: created.exercise_id,
            name: Some("   ".to_string()),
            description: None,
        })
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(service.get_exercise(created.exercise_id).unwrap().version, 0);
}

#[test]
fn interleaved_writer_turns_patch_into_edit_conflict() {
    let conn = open_db_in_memory().unwrap();
    let inner = SqliteExerciseRepository::try_new(&conn).unwrap();
    let id = inner
        .insert_exercise(&NewExercise::new("Bench Press", "Flat barbell bench"))
        .unwrap();
    let service = ExerciseService::new(InterleavingRepo {
        inner,
        interleave: Cell::new(true),
    });

    let err = service
        .apply_patch(&ExercisePatch {
            exercise_id: id,
            name: Some("Incline Press".to_string()),
            description: None,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::EditConflict {
            exercise_id,
            expected_version: 0,
        } if exercise_id == id
    ));

    let stored = service.get_exercise(id).unwrap();
    assert_eq!(stored.name, "Bench Press");
    assert_eq!(stored.description, "edited by another writer");
    assert_eq!(stored.version, 1);
}

#[test]
fn patch_and_delete_of_missing_exercise_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .apply_patch(&ExercisePatch {
            exercise_id: 7,
            ..ExercisePatch::default()
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(service.delete_exercise(7).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn list_returns_all_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let first = service
        .create_exercise(&NewExercise::new("Squat", "Back squat"))
        .unwrap();
    let second = service
        .create_exercise(&NewExercise::new("Deadlift", "Conventional"))
        .unwrap();

    assert_eq!(service.list_exercises().unwrap(), vec![first, second]);
}

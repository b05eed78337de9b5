use rusqlite::{params, Connection};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use workout_core::db::open_db_in_memory;
use workout_core::{
    ErrorKind, ExerciseId, ExerciseRepository, NewExercise, RecordKey, RepoError, SetEntry,
    SqliteExerciseRepository, SqliteWorkoutRepository, StoreFailure, Workout, WorkoutDraft,
    WorkoutRepository,
};

fn seed_exercise(conn: &Connection, name: &str) -> ExerciseId {
    SqliteExerciseRepository::try_new(conn)
        .unwrap()
        .insert_exercise(&NewExercise::new(name, "seeded for workout tests"))
        .unwrap()
}

fn bench_draft(user_id: i64, exercise_id: ExerciseId) -> WorkoutDraft {
    WorkoutDraft {
        user_id,
        exercise_id,
        duration: 600,
        sets: 3,
        reps: vec![10, 8, 6],
        weights: vec![100, 110, 120],
    }
}

fn workout_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM workouts_table;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn insert_and_get_preserves_set_order() {
    let conn = open_db_in_memory().unwrap();
    let exercise_id = seed_exercise(&conn, "Bench Press");
    let repo = SqliteWorkoutRepository::try_new(&conn).unwrap();

    let id = repo.insert_workout(&bench_draft(1, exercise_id)).unwrap();
    let loaded = repo.get_by_workout_id(id).unwrap();

    assert_eq!(loaded.workout_id, id);
    assert_eq!(loaded.user_id, 1);
    assert_eq!(loaded.exercise_id, exercise_id);
    assert_eq!(loaded.duration, 600);
    assert_eq!(loaded.sets(), 3);
    assert_eq!(loaded.reps(), vec![10, 8, 6]);
    assert_eq!(loaded.weights(), vec![100, 110, 120]);
    assert_eq!(loaded.entries[2], SetEntry::new(6, 120));
    assert!(loaded.created_at > 0);
}

#[test]
fn misaligned_draft_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let exercise_id = seed_exercise(&conn, "Bench Press");
    let repo = SqliteWorkoutRepository::try_new(&conn).unwrap();

    let mut draft = bench_draft(1, exercise_id);
    draft.weights.pop();

    let err = repo.insert_workout(&draft).unwrap_err();
    assert!(matches!(err, RepoError::Validation(ref errors) if errors.contains("weights")));
    assert_eq!(workout_count(&conn), 0);
}

#[test]
fn update_replaces_mutable_fields_for_owner() {
    let conn = open_db_in_memory().unwrap();
    let bench = seed_exercise(&conn, "Bench Press");
    let incline = seed_exercise(&conn, "Incline Press");
    let repo = SqliteWorkoutRepository::try_new(&conn).unwrap();

    let id = repo.insert_workout(&bench_draft(1, bench)).unwrap();
    let created_at = repo.get_by_workout_id(id).unwrap().created_at;

    let replacement = WorkoutDraft::from_entries(
        1,
        incline,
        900,
        &[SetEntry::new(12, 60), SetEntry::new(12, 60)],
    );
    repo.update_workout(id, &replacement).unwrap();

    let loaded = repo.get_by_workout_id(id).unwrap();
    assert_eq!(loaded.exercise_id, incline);
    assert_eq!(loaded.duration, 900);
    assert_eq!(loaded.reps(), vec![12, 12]);
    assert_eq!(loaded.weights(), vec![60, 60]);
    assert_eq!(loaded.created_at, created_at);
}

#[test]
fn update_by_another_user_is_not_found_and_leaves_row_intact() {
    let conn = open_db_in_memory().unwrap();
    let exercise_id = seed_exercise(&conn, "Bench Press");
    let repo = SqliteWorkoutRepository::try_new(&conn).unwrap();

    let id = repo.insert_workout(&bench_draft(1, exercise_id)).unwrap();
    let before = repo.get_by_workout_id(id).unwrap();

    let mut tampered = before.to_draft();
    tampered.user_id = 2;
    tampered.duration = 1;
    let err = repo.update_workout(id, &tampered).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound(RecordKey::OwnedWorkout {
            workout_id,
            user_id: 2,
        }) if workout_id == id
    ));

    assert_eq!(repo.get_by_workout_id(id).unwrap(), before);
}

#[test]
fn delete_removes_row_and_reports_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let exercise_id = seed_exercise(&conn, "Bench Press");
    let repo = SqliteWorkoutRepository::try_new(&conn).unwrap();

    let id = repo.insert_workout(&bench_draft(1, exercise_id)).unwrap();
    repo.delete_workout(id).unwrap();

    assert_eq!(
        repo.get_by_workout_id(id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(repo.delete_workout(id).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(repo.delete_workout(0).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn lookups_by_user_and_exercise_filter_rows() {
    let conn = open_db_in_memory().unwrap();
    let bench = seed_exercise(&conn, "Bench Press");
    let squat = seed_exercise(&conn, "Squat");
    let repo = SqliteWorkoutRepository::try_new(&conn).unwrap();

    let first = repo.insert_workout(&bench_draft(1, bench)).unwrap();
    let second = repo.insert_workout(&bench_draft(1, squat)).unwrap();
    let third = repo.insert_workout(&bench_draft(1, bench)).unwrap();
    repo.insert_workout(&bench_draft(2, bench)).unwrap();

    let ids = |workouts: Vec<Workout>| -> Vec<i64> {
        workouts.into_iter().map(|workout| workout.workout_id).collect()
    };

    assert_eq!(ids(repo.get_by_user_id(1).unwrap()), vec![first, second, third]);
    assert_eq!(
        ids(repo.get_by_user_id_and_exercise_id(1, bench).unwrap()),
        vec![first, third]
    );
    assert!(repo.get_by_user_id(3).unwrap().is_empty());
    assert!(repo
        .get_by_user_id_and_exercise_id(2, squat)
        .unwrap()
        .is_empty());
}

#[test]
fn corrupted_set_arrays_surface_as_integrity_errors() {
    let conn = open_db_in_memory().unwrap();
    let exercise_id = seed_exercise(&conn, "Bench Press");
    let repo = SqliteWorkoutRepository::try_new(&conn).unwrap();

    let id = repo.insert_workout(&bench_draft(1, exercise_id)).unwrap();
    conn.execute(
        "UPDATE workouts_table SET weights = ?1 WHERE workout_id = ?2;",
        params!["[100,110]", id],
    )
    .unwrap();

    let err = repo.get_by_workout_id(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert_eq!(err.kind(), ErrorKind::Store);
    assert_eq!(err.store_failure(), Some(StoreFailure::Integrity));

    let err = repo.get_by_user_id(1).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn unknown_exercise_is_a_constraint_failure() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWorkoutRepository::try_new(&conn).unwrap();

    let err = repo.insert_workout(&bench_draft(1, 404)).unwrap_err();
    assert_eq!(err.store_failure(), Some(StoreFailure::Constraint));
    assert_eq!(workout_count(&conn), 0);
}

#[test]
fn referenced_exercise_cannot_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    let exercise_id = seed_exercise(&conn, "Bench Press");
    let repo = SqliteWorkoutRepository::try_new(&conn).unwrap();
    let id = repo.insert_workout(&bench_draft(1, exercise_id)).unwrap();
    let exercises = SqliteExerciseRepository::try_new(&conn).unwrap();

    let err = exercises.delete_exercise(exercise_id).unwrap_err();
    assert_eq!(err.store_failure(), Some(StoreFailure::Constraint));
    assert_eq!(workout_count(&conn), 1);

    repo.delete_workout(id).unwrap();
    exercises.delete_exercise(exercise_id).unwrap();
}

#[test]
fn created_at_has_millisecond_resolution() {
    let conn = open_db_in_memory().unwrap();
    let exercise_id = seed_exercise(&conn, "Bench Press");
    let repo = SqliteWorkoutRepository::try_new(&conn).unwrap();
    let now_ms = || {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64
    };

    let before = now_ms();
    let mut stamps = Vec::new();
    for _ in 0..5 {
        let id = repo.insert_workout(&bench_draft(1, exercise_id)).unwrap();
        stamps.push(repo.get_by_workout_id(id).unwrap().created_at);
        std::thread::sleep(Duration::from_millis(3));
    }
    let after = now_ms();

    assert!(stamps.iter().all(|stamp| (before..=after).contains(stamp)));
    assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(stamps.iter().any(|stamp| stamp % 1000 != 0));
}

#[test]
fn workout_serializes_as_parallel_arrays() {
    let conn = open_db_in_memory().unwrap();
    let exercise_id = seed_exercise(&conn, "Bench Press");
    let repo = SqliteWorkoutRepository::try_new(&conn).unwrap();
    let id = repo.insert_workout(&bench_draft(1, exercise_id)).unwrap();
    let workout = repo.get_by_workout_id(id).unwrap();

    let json = serde_json::to_value(&workout).unwrap();
    assert_eq!(json["sets"], 3);
    assert_eq!(json["reps"], serde_json::json!([10, 8, 6]));
    assert_eq!(json["weights"], serde_json::json!([100, 110, 120]));
    assert!(json.get("entries").is_none());

    let decoded: Workout = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(decoded, workout);

    let mut broken = json;
    broken["weights"] = serde_json::json!([100]);
    assert!(serde_json::from_value::<Workout>(broken).is_err());
}

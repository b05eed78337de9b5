//! Personal-record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Keep exactly one `exercise_prs` row per `(user_id, exercise_id)`.
//! - Serve records joined with their exercise for presentation.
//!
//! # Invariants
//! - Upsert reads, then inserts or updates. The read alone does not protect
//!   against concurrent writers: the `UNIQUE (user_id, exercise_id)`
//!   constraint does, and a losing insert is turned into an update.
//! - Once a key exists its value is replaced unconditionally; this layer
//!   does not compare against the previous best.

use crate::model::personal_record::{
    ConsolidatedPersonalRecord, PersonalRecord, PrCheck, UpsertOutcome,
};
use crate::model::{ExerciseId, UserId};
use crate::repo::error::{is_unique_violation, RecordKey, RepoError, RepoResult};
use crate::repo::schema::{ensure_connection_ready, EXERCISES_TABLE, PRS_TABLE};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const CONSOLIDATED_SELECT_SQL: &str = "SELECT
    p.user_id AS user_id,
    p.exercise_id AS exercise_id,
    e.exercise_name AS exercise_name,
    e.exercise_description AS exercise_description,
    p.pr AS pr
FROM exercise_prs p
INNER JOIN exercises e ON e.exercise_id = p.exercise_id";

/// Repository interface for personal-record operations.
pub trait PersonalRecordRepository {
    /// Creates the record for a new key or replaces the value of an existing one.
    fn upsert_personal_record(&self, record: &PersonalRecord) -> RepoResult<UpsertOutcome>;
    /// Replaces the value of an existing record.
    fn update_personal_record(&self, record: &PersonalRecord) -> RepoResult<()>;
    /// Deletes the record addressed by `record`'s key; the value is ignored.
    fn delete_personal_record(&self, record: &PersonalRecord) -> RepoResult<()>;
    fn get_personal_record(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
    ) -> RepoResult<ConsolidatedPersonalRecord>;
    /// Returns every record of `user_id`, ordered by exercise id.
    fn get_all_personal_records(&self, user_id: UserId)
        -> RepoResult<Vec<ConsolidatedPersonalRecord>>;
}

/// SQLite-backed personal-record repository.
pub struct SqlitePersonalRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonalRecordRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[EXERCISES_TABLE, PRS_TABLE])?;
        Ok(Self { conn })
    }

    fn insert_row(&self, record: &PersonalRecord) -> rusqlite::Result<usize> {
        self.conn.execute(
            "INSERT INTO exercise_prs (user_id, exercise_id, pr) VALUES (?1, ?2, ?3);",
            params![record.user_id, record.exercise_id, record.value],
        )
    }

    fn update_row(&self, record: &PersonalRecord) -> rusqlite::Result<usize> {
        self.conn.execute(
            "UPDATE exercise_prs
             SET pr = ?1
             WHERE user_id = ?2
               AND exercise_id = ?3;",
            params![record.value, record.user_id, record.exercise_id],
        )
    }

    fn current_value(&self, record: &PersonalRecord) -> RepoResult<Option<i64>> {
        let value = self
            .conn
            .query_row(
                "SELECT pr FROM exercise_prs WHERE user_id = ?1 AND exercise_id = ?2;",
                params![record.user_id, record.exercise_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl PersonalRecordRepository for SqlitePersonalRecordRepository<'_> {
    fn upsert_personal_record(&self, record: &PersonalRecord) -> RepoResult<UpsertOutcome> {
        record.validate(PrCheck::WithValue)?;

        let outcome = match self.current_value(record)? {
            None => match self.insert_row(record) {
                Ok(_) => UpsertOutcome::Inserted,
                Err(err) if is_unique_violation(&err) => {
                    debug!(
                        "event=pr_upsert module=repo status=insert_race user_id={} exercise_id={}",
                        record.user_id, record.exercise_id
                    );
                    if self.update_row(record)? == 0 {
                        return Err(err.into());
                    }
                    UpsertOutcome::Updated
                }
                Err(err) => return Err(err.into()),
            },
            Some(_) => {
                if self.update_row(record)? > 0 {
                    UpsertOutcome::Updated
                } else {
                    // Deleted between the read and the update.
                    self.insert_row(record)?;
                    UpsertOutcome::Inserted
                }
            }
        };

        debug!(
            "event=pr_upsert module=repo status=ok outcome={:?} user_id={} exercise_id={}",
            outcome, record.user_id, record.exercise_id
        );
        Ok(outcome)
    }

    fn update_personal_record(&self, record: &PersonalRecord) -> RepoResult<()> {
        record.validate(PrCheck::WithValue)?;

        if self.update_row(record)? == 0 {
            return Err(RepoError::NotFound(pr_key(record)));
        }
        Ok(())
    }

    fn delete_personal_record(&self, record: &PersonalRecord) -> RepoResult<()> {
        record.validate(PrCheck::KeyOnly)?;

        let changed = self.conn.execute(
            "DELETE FROM exercise_prs WHERE user_id = ?1 AND exercise_id = ?2;",
            params![record.user_id, record.exercise_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(pr_key(record)));
        }

        debug!(
            "event=pr_delete module=repo status=ok user_id={} exercise_id={}",
            record.user_id, record.exercise_id
        );
        Ok(())
    }

    fn get_personal_record(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
    ) -> RepoResult<ConsolidatedPersonalRecord> {
        let key = RecordKey::PersonalRecord {
            user_id,
            exercise_id,
        };
        if user_id < 1 || exercise_id < 1 {
            return Err(RepoError::NotFound(key));
        }

        self.conn
            .query_row(
                &format!("{CONSOLIDATED_SELECT_SQL} WHERE p.user_id = ?1 AND p.exercise_id = ?2;"),
                params![user_id, exercise_id],
                parse_consolidated_row,
            )
            .optional()?
            .ok_or(RepoError::NotFound(key))
    }

    fn get_all_personal_records(
        &self,
        user_id: UserId,
    ) -> RepoResult<Vec<ConsolidatedPersonalRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONSOLIDATED_SELECT_SQL} WHERE p.user_id = ?1 ORDER BY p.exercise_id ASC;"
        ))?;
        let mut rows = stmt.query([user_id])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_consolidated_row(row)?);
        }

        Ok(records)
    }
}

fn pr_key(record: &PersonalRecord) -> RecordKey {
    RecordKey::PersonalRecord {
        user_id: record.user_id,
        exercise_id: record.exercise_id,
    }
}

fn parse_consolidated_row(row: &Row<'_>) -> rusqlite::Result<ConsolidatedPersonalRecord> {
    Ok(ConsolidatedPersonalRecord {
        user_id: row.get("user_id")?,
        exercise_id: row.get("exercise_id")?,
        exercise_name: row.get("exercise_name")?,
        exercise_description: row.get("exercise_description")?,
        value: row.get("pr")?,
    })
}

//! Personal-record aggregate and its read projection.
//!
//! # Invariants
//! - At most one record exists per `(user_id, exercise_id)`.
//! - A stored value is always greater than zero.

use crate::model::validation::{ValidationErrors, Validator};
use crate::model::{ExerciseId, UserId};
use serde::{Deserialize, Serialize};

/// Current best result of one user on one exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub user_id: UserId,
    pub exercise_id: ExerciseId,
    #[serde(rename = "personal_record")]
    pub value: i64,
}

/// Which fields an operation needs from a [`PersonalRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrCheck {
    /// Writes that set a value.
    WithValue,
    /// Operations addressed by key alone, such as delete.
    KeyOnly,
}

impl PersonalRecord {
    pub fn new(user_id: UserId, exercise_id: ExerciseId, value: i64) -> Self {
        Self {
            user_id,
            exercise_id,
            value,
        }
    }

    /// Key-only handle; `value` is ignored by [`PrCheck::KeyOnly`] operations.
    pub fn key(user_id: UserId, exercise_id: ExerciseId) -> Self {
        Self::new(user_id, exercise_id, 0)
    }

    pub fn validate(&self, check: PrCheck) -> Result<(), ValidationErrors> {
        let mut validator = Validator::new();
        validator.check(self.user_id >= 1, "user_id", "must be >= 1");
        validator.check(self.exercise_id >= 1, "exercise_id", "must be >= 1");
        if check == PrCheck::WithValue {
            validator.check(self.value > 0, "personal_record", "must be > 0");
        }
        validator.finish()
    }
}

/// A personal record joined with its exercise for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedPersonalRecord {
    pub user_id: UserId,
    pub exercise_id: ExerciseId,
    pub exercise_name: String,
    pub exercise_description: String,
    #[serde(rename = "personal_record")]
    pub value: i64,
}

/// Branch taken by an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

#[cfg(test)]
mod tests {
    use super::{PersonalRecord, PrCheck};

    #[test]
    fn key_only_check_ignores_value() {
        let key = PersonalRecord::key(1, 2);
        assert!(key.validate(PrCheck::KeyOnly).is_ok());

        let errors = key.validate(PrCheck::WithValue).unwrap_err();
        assert_eq!(errors.get("personal_record"), Some("must be > 0"));
    }

    #[test]
    fn ids_must_be_positive() {
        let errors = PersonalRecord::new(0, -1, 100)
            .validate(PrCheck::WithValue)
            .unwrap_err();
        assert!(errors.contains("user_id"));
        assert!(errors.contains("exercise_id"));
        assert!(!errors.contains("personal_record"));
    }

    #[test]
    fn value_serializes_as_personal_record() {
        let json = serde_json::to_value(PersonalRecord::new(1, 2, 120)).unwrap();
        assert_eq!(json["personal_record"], 120);
        assert!(json.get("value").is_none());
    }
}

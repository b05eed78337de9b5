//! Storage codec for workout sets.
//!
//! Sets leave the repository as two JSON integer arrays (`reps`, `weights`)
//! and come back through [`decode_sets`], which re-zips them by index and
//! treats any disagreement with the stored `sets` count as corruption.

use crate::model::workout::{zip_sets, SetEntry};
use crate::repo::error::{RepoError, RepoResult};

/// Splits entries into the `(reps, weights)` column values.
pub(crate) fn encode_sets(entries: &[SetEntry]) -> RepoResult<(String, String)> {
    let reps: Vec<i64> = entries.iter().map(|entry| entry.reps).collect();
    let weights: Vec<i64> = entries.iter().map(|entry| entry.weight).collect();
    Ok((encode_column(&reps, "reps")?, encode_column(&weights, "weights")?))
}

/// Rebuilds ordered entries from the stored column values.
pub(crate) fn decode_sets(sets: i64, reps: &str, weights: &str) -> RepoResult<Vec<SetEntry>> {
    let reps = decode_column(reps, "reps")?;
    let weights = decode_column(weights, "weights")?;
    zip_sets(sets, reps, weights).map_err(|err| {
        RepoError::InvalidData(format!("misaligned set arrays in workouts_table: {err}"))
    })
}

fn encode_column(values: &[i64], column: &str) -> RepoResult<String> {
    serde_json::to_string(values).map_err(|err| {
        RepoError::InvalidData(format!("cannot encode workouts_table.{column}: {err}"))
    })
}

fn decode_column(text: &str, column: &str) -> RepoResult<Vec<i64>> {
    serde_json::from_str(text).map_err(|err| {
        RepoError::InvalidData(format!("invalid integer array in workouts_table.{column}: {err}"))
    })
}

//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define one data-access contract per aggregate.
//! - Isolate SQL details from callers.
//!
//! # Invariants
//! - Write paths validate candidates before persistence.
//! - Repositories hold only a borrowed connection and never retry.
//!   Concurrency is coordinated by conditional writes and store constraints.
//! - Semantic errors (`NotFound`, `EditConflict`) are distinct from store
//!   transport errors.

pub mod error;
pub mod exercise_repo;
pub mod personal_record_repo;
mod schema;
mod set_codec;
pub mod workout_repo;

//! Use-case services on top of repository contracts.
//!
//! # Responsibility
//! - Compose repository calls into caller-facing flows.
//! - Stay storage-agnostic by depending on repository traits only.

pub mod exercise_service;

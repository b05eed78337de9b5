//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections and pools for the workout store.
//! - Apply schema migrations in deterministic order.
//! - Provide the startup ping used by callers before serving traffic.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Repositories must not touch application tables before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod pool;

pub use open::{
    health_check, open_configured, open_db, open_db_in_memory, open_db_with_timeout,
    DEFAULT_BUSY_TIMEOUT,
};
pub use pool::{
    health_check_pool, open_configured_pool, open_pool, DbPool, PoolSettings,
};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Pool build failed or a checkout timed out.
    Pool(r2d2::Error),
    InvalidPoolSettings(&'static str),
    /// Pools are file-backed; no database path was configured.
    PoolRequiresFile,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Pool(err) => write!(f, "connection pool error: {err}"),
            Self::InvalidPoolSettings(reason) => write!(f, "invalid pool settings: {reason}"),
            Self::PoolRequiresFile => write!(f, "connection pool requires a database path"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Pool(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::InvalidPoolSettings(_)
            | Self::PoolRequiresFile => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<r2d2::Error> for DbError {
    fn from(value: r2d2::Error) -> Self {
        Self::Pool(value)
    }
}

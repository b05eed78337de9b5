//! Pooled SQLite connections for callers serving concurrent requests.
//!
//! # Responsibility
//! - Migrate the database file once, then hand out bounded-lifetime
//!   connections that share it.
//! - Apply the same pragmas and busy deadline as single-connection opens.
//!
//! # Invariants
//! - A pool is always file-backed; each in-memory connection would be its
//!   own database.
//! - Checkout waits at most `acquire_timeout` and then fails.

use super::open::{configure_connection, health_check, open_db_with_timeout};
use super::{DbError, DbResult};
use crate::config::CoreConfig;
use log::{error, info};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::{Duration, Instant};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Sizing and lifetime limits for a [`DbPool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Upper bound on open connections.
    pub max_open: u32,
    /// Connections kept open while idle; never above `max_open`.
    pub min_idle: u32,
    /// Idle connections above `min_idle` are closed after this long.
    pub idle_timeout: Duration,
    /// Any connection is closed once it reaches this age.
    pub max_lifetime: Duration,
    /// How long a checkout may wait for a free connection.
    pub acquire_timeout: Duration,
}

impl PoolSettings {
    /// Rejects limits the pool builder cannot honor.
    pub fn check(&self) -> Result<(), &'static str> {
        if self.max_open == 0 {
            return Err("max_open must be at least 1");
        }
        if self.min_idle > self.max_open {
            return Err("min_idle must not exceed max_open");
        }
        if self.acquire_timeout.is_zero() {
            return Err("acquire_timeout must be positive");
        }
        if self.idle_timeout.is_zero() || self.max_lifetime.is_zero() {
            return Err("idle_timeout and max_lifetime must be positive");
        }
        Ok(())
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_open: 25,
            min_idle: 2,
            idle_timeout: Duration::from_secs(15 * 60),
            max_lifetime: Duration::from_secs(30 * 60),
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Migrates `path` and builds a pool over it.
pub fn open_pool(
    path: impl AsRef<Path>,
    busy_timeout: Duration,
    settings: &PoolSettings,
) -> DbResult<DbPool> {
    let path = path.as_ref();
    let started_at = Instant::now();
    settings.check().map_err(DbError::InvalidPoolSettings)?;

    // Migrations need one exclusive pass before connections fan out.
    drop(open_db_with_timeout(path, busy_timeout)?);

    let manager = SqliteConnectionManager::file(path)
        .with_init(move |conn| configure_connection(conn, busy_timeout));
    let pool = Pool::builder()
        .max_size(settings.max_open)
        .min_idle(Some(settings.min_idle))
        .idle_timeout(Some(settings.idle_timeout))
        .max_lifetime(Some(settings.max_lifetime))
        .connection_timeout(settings.acquire_timeout)
        .build(manager)
        .map_err(|err| {
            error!(
                "event=db_pool module=db status=error duration_ms={} error_code=db_pool_build_failed",
                started_at.elapsed().as_millis()
            );
            DbError::Pool(err)
        })?;

    info!(
        "event=db_pool module=db status=ok max_open={} min_idle={} duration_ms={}",
        settings.max_open,
        settings.min_idle,
        started_at.elapsed().as_millis()
    );
    Ok(pool)
}

/// Builds the pool described by `config`. Requires a database path.
pub fn open_configured_pool(config: &CoreConfig) -> DbResult<DbPool> {
    let path = config.db_path.as_deref().ok_or(DbError::PoolRequiresFile)?;
    open_pool(path, config.busy_timeout, &config.pool)
}

/// Checks out one connection and pings it.
pub fn health_check_pool(pool: &DbPool) -> DbResult<()> {
    let conn = pool.get()?;
    health_check(&conn)
}

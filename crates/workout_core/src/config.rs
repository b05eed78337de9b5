//! Runtime configuration for the workout store.
//!
//! # Responsibility
//! - Collect database, pool and logging settings from the process environment.
//! - Reject values that would break the per-operation deadline contract.
//!
//! # Invariants
//! - `busy_timeout` is always between 1 ms and 9 999 ms.
//! - `pool` always passes [`PoolSettings::check`].
//! - Missing variables fall back to defaults; malformed ones are errors.

use crate::db::{PoolSettings, DEFAULT_BUSY_TIMEOUT};
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "WORKOUT_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "WORKOUT_DB_BUSY_TIMEOUT_MS";
pub const ENV_MAX_OPEN_CONNS: &str = "WORKOUT_DB_MAX_OPEN_CONNS";
pub const ENV_MIN_IDLE_CONNS: &str = "WORKOUT_DB_MIN_IDLE_CONNS";
pub const ENV_MAX_IDLE_TIME_SECS: &str = "WORKOUT_DB_MAX_IDLE_TIME_SECS";
pub const ENV_MAX_LIFETIME_SECS: &str = "WORKOUT_DB_MAX_LIFETIME_SECS";
pub const ENV_LOG_LEVEL: &str = "WORKOUT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "WORKOUT_LOG_DIR";

const MAX_BUSY_TIMEOUT_MS: u64 = 9_999;

/// Errors produced while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but cannot be parsed.
    InvalidValue { key: &'static str, value: String },
    /// Busy deadline outside the accepted window.
    BusyTimeoutOutOfRange(u64),
    /// Pool limits that contradict each other.
    InvalidPoolSettings(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
            Self::BusyTimeoutOutOfRange(ms) => write!(
                f,
                "busy timeout {ms}ms is outside 1..={MAX_BUSY_TIMEOUT_MS}ms"
            ),
            Self::InvalidPoolSettings(reason) => write!(f, "invalid pool settings: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings consumed by [`crate::db::open_configured`] and
/// [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file path. `None` selects an in-memory database.
    pub db_path: Option<PathBuf>,
    /// How long one statement may wait on a locked database.
    pub busy_timeout: Duration,
    /// Limits for [`crate::db::open_configured_pool`].
    pub pool: PoolSettings,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Rolling log directory. `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            pool: PoolSettings::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value when set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = non_blank(lookup(ENV_DB_PATH)) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = non_blank(lookup(ENV_BUSY_TIMEOUT_MS)) {
            let ms = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_BUSY_TIMEOUT_MS,
                value: raw.clone(),
            })?;
            if ms == 0 || ms > MAX_BUSY_TIMEOUT_MS {
                return Err(ConfigError::BusyTimeoutOutOfRange(ms));
            }
            config.busy_timeout = Duration::from_millis(ms);
        }

        if let Some(max_open) = parse_u64(&lookup, ENV_MAX_OPEN_CONNS)? {
            config.pool.max_open = to_u32(max_open, ENV_MAX_OPEN_CONNS)?;
        }
        if let Some(min_idle) = parse_u64(&lookup, ENV_MIN_IDLE_CONNS)? {
            config.pool.min_idle = to_u32(min_idle, ENV_MIN_IDLE_CONNS)?;
        }
        if let Some(secs) = parse_u64(&lookup, ENV_MAX_IDLE_TIME_SECS)? {
            config.pool.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_u64(&lookup, ENV_MAX_LIFETIME_SECS)? {
            config.pool.max_lifetime = Duration::from_secs(secs);
        }
        config
            .pool
            .check()
            .map_err(ConfigError::InvalidPoolSettings)?;

        if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
            config.log_level = level;
        }

        if let Some(dir) = non_blank(lookup(ENV_LOG_DIR)) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }
}

fn parse_u64<F>(lookup: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match non_blank(lookup(key)) {
        Some(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}

fn to_u32(value: u64, key: &'static str) -> Result<u32, ConfigError> {
    u32::try_from(value).map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

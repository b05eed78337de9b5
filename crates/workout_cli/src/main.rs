//! Store health-check entry point.
//!
//! # Responsibility
//! - Load configuration from the environment and start logging.
//! - Open (and migrate) the configured database, then ping it. A file
//!   database is checked through the connection pool callers would use.
//! - Exit non-zero with a one-line reason when any step fails.

use log::error;
use std::process::ExitCode;
use workout_core::db::{
    health_check, migrations::current_user_version, open_configured, open_configured_pool,
};
use workout_core::{core_version, init_logging, CoreConfig};

fn main() -> ExitCode {
    match run() {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!("event=healthcheck module=cli status=error");
            eprintln!("workout_core healthcheck failed: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<String, String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    let (target, schema_version) = match config.db_path.as_ref() {
        Some(path) => {
            let pool = open_configured_pool(&config).map_err(|err| err.to_string())?;
            let conn = pool.get().map_err(|err| err.to_string())?;
            health_check(&conn).map_err(|err| err.to_string())?;
            let version = current_user_version(&conn).map_err(|err| err.to_string())?;
            (path.display().to_string(), version)
        }
        None => {
            let conn = open_configured(&config).map_err(|err| err.to_string())?;
            health_check(&conn).map_err(|err| err.to_string())?;
            let version = current_user_version(&conn).map_err(|err| err.to_string())?;
            (":memory:".to_string(), version)
        }
    };

    Ok(format!(
        "workout_core version={} db={} schema_version={} pool_max_open={} status=ok",
        core_version(),
        target,
        schema_version,
        config.pool.max_open
    ))
}

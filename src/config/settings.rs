//! Application settings read from environment variables.
//!
//! `main` loads `.env` through `dotenvy` first, so every value here can come
//! from either the process environment or that file.

use crate::config::database;
use crate::errors::{Error, Result};
use std::path::PathBuf;

/// Forward weeks of schedules generated when `SCHEDULE_WEEKS` is unset.
pub const DEFAULT_SCHEDULE_WEEKS: u32 = 4;

/// Largest accepted `SCHEDULE_WEEKS` value (one academic year).
pub const MAX_SCHEDULE_WEEKS: u32 = 52;

/// Runtime configuration for the attendance binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Session database URL (`DATABASE_URL`)
    pub database_url: String,
    /// Optional replacement fixture file (`FIXTURES_PATH`)
    pub fixtures_path: Option<PathBuf>,
    /// Seed for venue assignment (`SCHEDULE_SEED`); random when unset
    pub schedule_seed: Option<u64>,
    /// Number of forward weeks to generate (`SCHEDULE_WEEKS`)
    pub schedule_weeks: u32,
}

/// Builds the configuration from the current environment.
///
/// # Errors
/// Returns `Error::Config` when `SCHEDULE_SEED` or `SCHEDULE_WEEKS` is set but
/// not a valid number, or when `SCHEDULE_WEEKS` falls outside
/// `1..=MAX_SCHEDULE_WEEKS`.
pub fn load_app_configuration() -> Result<AppConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Builds the configuration from an arbitrary key lookup.
fn from_lookup<F>(lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let database_url = lookup("DATABASE_URL")
        .unwrap_or_else(|| database::DEFAULT_DATABASE_URL.to_string());
    let fixtures_path = lookup("FIXTURES_PATH")
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let schedule_seed = lookup("SCHEDULE_SEED")
        .map(|raw| parse_number::<u64>("SCHEDULE_SEED", &raw))
        .transpose()?;
    let schedule_weeks = lookup("SCHEDULE_WEEKS")
        .map(|raw| parse_number::<u32>("SCHEDULE_WEEKS", &raw))
        .transpose()?
        .unwrap_or(DEFAULT_SCHEDULE_WEEKS);
    if !(1..=MAX_SCHEDULE_WEEKS).contains(&schedule_weeks) {
        return Err(Error::Config {
            message: format!(
                "SCHEDULE_WEEKS must be between 1 and {MAX_SCHEDULE_WEEKS}, got {schedule_weeks}"
            ),
        });
    }

    tracing::debug!(
        ?fixtures_path,
        ?schedule_seed,
        schedule_weeks,
        "Loaded application configuration"
    );

    Ok(AppConfig {
        database_url,
        fixtures_path,
        schedule_seed,
        schedule_weeks,
    })
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| Error::Config {
        message: format!("{key} must be a number, got '{raw}': {e}"),
    })
}

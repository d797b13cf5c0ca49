//! Shared test utilities for the attendance core.
//!
//! Stores built here use a fixed date and seed so generated schedules, venues,
//! and timestamps are identical on every run.

use crate::{
    config::fixtures::{Fixtures, default_fixtures},
    core::store::EntityStore,
    errors::Result,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rand::{SeedableRng, rngs::StdRng};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Seed used for venue assignment in tests.
pub const TEST_SEED: u64 = 2026;

/// Weeks generated in tests, matching the application default.
pub const TEST_WEEKS: u32 = 4;

/// A Saturday, so the first week's classes are already past.
#[must_use]
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap_or_default()
}

/// Build time stamped on fixture attendance rows.
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 8, 30, 0)
        .single()
        .unwrap_or_default()
}

/// Builds a store from the given fixtures with the fixed test date and seed.
pub fn build_store(fixtures: Fixtures) -> Result<EntityStore> {
    let mut rng = StdRng::seed_from_u64(TEST_SEED);
    EntityStore::build(fixtures, test_today(), TEST_WEEKS, test_now(), &mut rng)
}

/// Store built from the embedded default fixtures.
#[must_use]
pub fn sample_store() -> EntityStore {
    default_fixtures()
        .and_then(build_store)
        .unwrap_or_else(|e| panic!("default fixtures must build: {e}"))
}

/// Creates an in-memory `SQLite` database with the session table created.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    crate::config::database::create_connection("sqlite::memory:").await
}

/// Routes tracing output through the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

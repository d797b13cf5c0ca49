//! Core domain logic - the entity store, schedule generation, and the
//! queries the presentation layer calls. Everything except the session slot
//! in [`auth`] is synchronous and works on a borrowed [`store::EntityStore`].

/// Attendance listings, rates, rosters, and marking
pub mod attendance;
/// Email sign-in stub and the persisted session slot
pub mod auth;
/// Course and user lookups
pub mod course;
/// Per-role dashboard statistics
pub mod dashboard;
/// Schedule generation and date-based schedule queries
pub mod schedule;
/// The in-memory entity store
pub mod store;

use chrono::{NaiveDate, Utc};

/// Current calendar date (UTC) from the wall clock.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

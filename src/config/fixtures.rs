//! Fixture loading from a TOML seed file
//!
//! The campus store is built from a fixture set: users, courses, and the
//! attendance rows recorded against generated class schedules. A default set
//! is embedded in the binary; `FIXTURES_PATH` can point at a replacement.

use crate::errors::{Error, Result};
use crate::models::{AttendanceStatus, Course, MarkedBy, Role, User};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_FIXTURES: &str = include_str!("../../fixtures.toml");

/// Structure of a whole fixture file
#[derive(Debug, Deserialize, Clone)]
pub struct Fixtures {
    /// Registered users
    #[serde(default)]
    pub users: Vec<UserFixture>,
    /// Course definitions (schedules are generated, not listed)
    #[serde(default)]
    pub courses: Vec<CourseFixture>,
    /// Attendance rows referencing generated schedule ids
    #[serde(default)]
    pub attendance: Vec<AttendanceFixture>,
}

/// Seed entry for a single user
#[derive(Debug, Deserialize, Clone)]
pub struct UserFixture {
    /// Unique user id
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Student or lecturer
    pub role: Role,
    /// Optional profile image reference
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Seed entry for a single course
#[derive(Debug, Deserialize, Clone)]
pub struct CourseFixture {
    /// Unique course id
    pub id: String,
    /// Short course code
    pub course_code: String,
    /// Full course title
    pub course_name: String,
    /// Id of a registered lecturer
    pub lecturer_id: String,
}

/// Seed entry for a single attendance record
#[derive(Debug, Deserialize, Clone)]
pub struct AttendanceFixture {
    /// Unique record id, `attNNN` by convention
    pub id: String,
    /// Generated schedule the record belongs to
    pub class_schedule_id: String,
    /// Registered student the record is for
    pub student_id: String,
    /// Defaults to the store build time when absent
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Recorded status
    pub status: AttendanceStatus,
    /// Who recorded it
    pub marked_by: MarkedBy,
}

impl From<UserFixture> for User {
    fn from(fixture: UserFixture) -> Self {
        Self {
            id: fixture.id,
            name: fixture.name,
            email: fixture.email,
            role: fixture.role,
            profile_image: fixture.profile_image,
        }
    }
}

impl From<CourseFixture> for Course {
    fn from(fixture: CourseFixture) -> Self {
        Self {
            id: fixture.id,
            course_code: fixture.course_code,
            course_name: fixture.course_name,
            lecturer_id: fixture.lecturer_id,
            schedule_ids: Vec::new(),
        }
    }
}

/// Parses a fixture set from TOML text.
///
/// # Errors
/// Returns `Error::Config` if the TOML syntax is invalid or required fields
/// are missing.
pub fn parse_fixtures(contents: &str) -> Result<Fixtures> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse fixtures: {e}"),
    })
}

/// Loads a fixture set from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or does not parse.
pub fn load_fixtures<P: AsRef<Path>>(path: P) -> Result<Fixtures> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading fixtures from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read fixtures file {}: {e}", path_ref.display()),
    })?;
    parse_fixtures(&contents)
}

/// Returns the fixture set compiled into the binary.
///
/// # Errors
/// Only fails if the embedded file is itself malformed.
pub fn default_fixtures() -> Result<Fixtures> {
    parse_fixtures(DEFAULT_FIXTURES)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_default_fixtures_match_seed_data() {
        let fixtures = default_fixtures().unwrap();
        assert_eq!(fixtures.users.len(), 5);
        assert_eq!(fixtures.courses.len(), 3);
        assert_eq!(fixtures.attendance.len(), 5);

        let alice = &fixtures.users[2];
        assert_eq!(alice.name, "Alice Wanjiku");
        assert_eq!(alice.role, Role::Student);
        assert_eq!(fixtures.courses[2].course_code, "MATH101");
        assert_eq!(fixtures.attendance[3].status, AttendanceStatus::Late);
        assert_eq!(fixtures.attendance[3].marked_by, MarkedBy::Lecturer);
    }

    #[test]
    fn test_parse_fixture_with_timestamp() {
        let toml_str = r#"
            [[users]]
            id = "s009"
            name = "Dan Otieno"
            email = "dotieno@students.laikipia.ac.ke"
            role = "student"

            [[attendance]]
            id = "att100"
            class_schedule_id = "sch-c001-mon-1"
            student_id = "s009"
            timestamp = "2026-10-19T09:05:00Z"
            status = "present"
            marked_by = "student"
        "#;

        let fixtures = parse_fixtures(toml_str).unwrap();
        assert!(fixtures.courses.is_empty());
        assert!(fixtures.users[0].profile_image.is_none());
        assert!(fixtures.attendance[0].timestamp.is_some());
    }

    #[test]
    fn test_parse_rejects_unknown_role() {
        let toml_str = r#"
            [[users]]
            id = "x1"
            name = "Guest"
            email = "guest@laikipia.ac.ke"
            role = "visitor"
        "#;

        let err = parse_fixtures(toml_str).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}

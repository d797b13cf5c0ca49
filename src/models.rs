//! Domain records held by the entity store.
//!
//! These are plain serde structs rather than `SeaORM` entities: the campus data
//! lives in memory for the lifetime of the process. Field names serialize in
//! camelCase so a stored session record keeps the shape the web client used.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a user signs in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Attends classes and self-reports attendance
    Student,
    /// Owns courses and reviews attendance
    Lecturer,
}

/// A registered campus user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (e.g. `"s001"`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email, unique across users
    pub email: String,
    /// Student or lecturer
    pub role: Role,
    /// Optional profile image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl User {
    /// Returns true when this user signs in as a lecturer.
    #[must_use]
    pub fn is_lecturer(&self) -> bool {
        self.role == Role::Lecturer
    }

    /// First word of the display name, used for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// A course and the ids of its generated class meetings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique identifier (e.g. `"c001"`)
    pub id: String,
    /// Short code such as `"CS101"`
    pub course_code: String,
    /// Full course title
    pub course_name: String,
    /// Id of the lecturer who teaches the course
    pub lecturer_id: String,
    /// Schedule ids in generation order
    #[serde(default)]
    pub schedule_ids: Vec<String>,
}

/// One concrete meeting of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSchedule {
    /// Unique id such as `"sch-c001-mon-0"`
    pub id: String,
    /// Course this meeting belongs to
    pub course_id: String,
    /// Calendar day of the meeting
    pub date: NaiveDate,
    /// Start time
    pub start_time: NaiveTime,
    /// End time
    pub end_time: NaiveTime,
    /// Room where the class meets
    pub venue: String,
    /// Token a student presents to check in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

impl ClassSchedule {
    /// Formats the meeting time as `HH:MM - HH:MM`.
    #[must_use]
    pub fn time_range(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Attendance outcome for one student at one meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    /// Attended on time
    Present,
    /// Did not attend
    Absent,
    /// Attended after the start time
    Late,
}

impl AttendanceStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 3] = [Self::Present, Self::Absent, Self::Late];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown attendance status '{s}'"))
    }
}

/// Who produced an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkedBy {
    /// Self-reported by the student (QR check-in)
    Student,
    /// Entered by the lecturer
    Lecturer,
}

impl MarkedBy {
    /// Label shown next to a record: students see "Self".
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Student => "Self",
            Self::Lecturer => "Lecturer",
        }
    }
}

/// One student's recorded status for one class meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Unique id such as `"att001"`
    pub id: String,
    /// Meeting the record belongs to
    pub class_schedule_id: String,
    /// Student the record is for
    pub student_id: String,
    /// When the status was last set
    pub timestamp: DateTime<Utc>,
    /// Recorded status
    pub status: AttendanceStatus,
    /// Who set the status
    pub marked_by: MarkedBy,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_status_parses_case_insensitively() {
        assert_eq!(
            "Present".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::Present
        );
        assert_eq!(
            " late ".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::Late
        );
        assert!("excused".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let user = User {
            id: "s001".to_string(),
            name: "Alice Wanjiku".to_string(),
            email: "awanjiku@students.laikipia.ac.ke".to_string(),
            role: Role::Student,
            profile_image: Some("/placeholder.svg".to_string()),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"profileImage\":\"/placeholder.svg\""));
        assert!(json.contains("\"role\":\"student\""));

        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
        assert_eq!(back.first_name(), "Alice");
    }

    #[test]
    fn test_time_range_uses_hours_and_minutes() {
        let schedule = ClassSchedule {
            id: "sch-c001-mon-0".to_string(),
            course_id: "c001".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            venue: "Room 301".to_string(),
            qr_code: None,
        };
        assert_eq!(schedule.time_range(), "09:00 - 11:00");
    }
}

//! Attendance queries, aggregation, and marking.
//!
//! Rates follow one rule: a student's rate in a course is the number of
//! `present` records over the number of schedules the course has. Late,
//! absent, and not-yet-recorded meetings all count against the student.

use crate::{
    core::{course, schedule, store::EntityStore},
    errors::{Error, Result},
    models::{AttendanceRecord, AttendanceStatus, ClassSchedule, Course, MarkedBy, User},
};
use chrono::{DateTime, Utc};
use tracing::info;

/// All records for one class meeting, in store order.
#[must_use]
pub fn get_attendance_for_schedule<'a>(
    store: &'a EntityStore,
    schedule_id: &str,
) -> Vec<&'a AttendanceRecord> {
    store
        .attendance()
        .iter()
        .filter(|r| r.class_schedule_id == schedule_id)
        .collect()
}

/// All records for one student, in store order.
#[must_use]
pub fn get_attendance_for_student<'a>(
    store: &'a EntityStore,
    student_id: &str,
) -> Vec<&'a AttendanceRecord> {
    store
        .attendance()
        .iter()
        .filter(|r| r.student_id == student_id)
        .collect()
}

/// Percentage of a course's meetings the student attended as `present`.
///
/// Returns 0 when the course has no schedules (or does not exist).
#[must_use]
pub fn calculate_attendance_rate(store: &EntityStore, student_id: &str, course_id: &str) -> f64 {
    let course_schedules = schedule::get_schedules_for_course(store, course_id);
    if course_schedules.is_empty() {
        return 0.0;
    }

    let present = store
        .attendance()
        .iter()
        .filter(|r| r.student_id == student_id && r.status == AttendanceStatus::Present)
        .filter(|r| course_schedules.iter().any(|s| s.id == r.class_schedule_id))
        .count();

    #[allow(clippy::cast_precision_loss)]
    let rate = present as f64 / course_schedules.len() as f64 * 100.0;
    rate
}

/// Mean of the student's per-course rates across every course.
///
/// Returns 0 when there are no courses.
#[must_use]
pub fn calculate_overall_attendance_rate(store: &EntityStore, student_id: &str) -> f64 {
    let courses = store.courses();
    if courses.is_empty() {
        return 0.0;
    }

    let total: f64 = courses
        .iter()
        .map(|c| calculate_attendance_rate(store, student_id, &c.id))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = total / courses.len() as f64;
    mean
}

/// Counts of each status over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceSummary {
    /// Records marked present
    pub present: usize,
    /// Records marked absent
    pub absent: usize,
    /// Records marked late
    pub late: usize,
}

impl AttendanceSummary {
    /// Total number of records counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.present + self.absent + self.late
    }

    /// Share of counted records marked present, as a whole percentage.
    ///
    /// Returns 0 when nothing was counted.
    #[must_use]
    pub fn rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = (self.present as f64 / total as f64 * 100.0).round();
        rate
    }
}

/// Tallies records by status.
#[must_use]
pub fn summarize<'a, I>(records: I) -> AttendanceSummary
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    records
        .into_iter()
        .fold(AttendanceSummary::default(), |mut summary, record| {
            match record.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::Late => summary.late += 1,
            }
            summary
        })
}

/// Optional filters applied to an attendance listing.
#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    /// Only records for this course
    pub course_id: Option<String>,
    /// Only records with this status
    pub status: Option<AttendanceStatus>,
    /// Case-insensitive match on course name, code, or venue
    pub search: Option<String>,
}

/// One row of an attendance listing with its schedule and course resolved.
#[derive(Debug, Clone)]
pub struct AttendanceEntry<'a> {
    /// The listed record
    pub record: &'a AttendanceRecord,
    /// Meeting the record belongs to
    pub schedule: &'a ClassSchedule,
    /// Course of that meeting
    pub course: &'a Course,
    /// Student display name; `None` if the student is not registered
    pub student_name: Option<&'a str>,
}

/// Lists the records a viewer may see, narrowed by `filter`.
///
/// Students only see their own records; lecturers see everything. Records
/// whose schedule or course cannot be resolved are skipped.
#[must_use]
pub fn list_attendance<'a>(
    store: &'a EntityStore,
    viewer: &User,
    filter: &AttendanceFilter,
) -> Vec<AttendanceEntry<'a>> {
    store
        .attendance()
        .iter()
        .filter(|r| viewer.is_lecturer() || r.student_id == viewer.id)
        .filter(|r| filter.status.is_none_or(|status| r.status == status))
        .filter_map(|record| {
            let schedule = schedule::get_schedule_by_id(store, &record.class_schedule_id)?;
            let course = course::get_course_by_id(store, &schedule.course_id)?;
            Some(AttendanceEntry {
                record,
                schedule,
                course,
                student_name: course::get_user_by_id(store, &record.student_id)
                    .map(|u| u.name.as_str()),
            })
        })
        .filter(|entry| {
            filter
                .course_id
                .as_deref()
                .is_none_or(|id| entry.course.id == id)
        })
        .filter(|entry| {
            filter
                .search
                .as_deref()
                .is_none_or(|term| schedule::matches_search(store, entry.schedule, term))
        })
        .collect()
}

/// A student's standing for one class meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry<'a> {
    /// Enrolled student
    pub student: &'a User,
    /// Recorded status, or `absent` when nothing is recorded
    pub status: AttendanceStatus,
    /// Who set the status
    pub marked_by: MarkedBy,
    /// Whether a stored record backs this entry
    pub recorded: bool,
}

/// Every student with their status for a class meeting.
///
/// Students without a record default to `absent`, marked by the lecturer.
#[must_use]
pub fn get_class_roster<'a>(store: &'a EntityStore, schedule_id: &str) -> Vec<RosterEntry<'a>> {
    let records = get_attendance_for_schedule(store, schedule_id);
    course::get_students(store)
        .into_iter()
        .map(|student| {
            let record = records.iter().find(|r| r.student_id == student.id);
            RosterEntry {
                student,
                status: record.map_or(AttendanceStatus::Absent, |r| r.status),
                marked_by: record.map_or(MarkedBy::Lecturer, |r| r.marked_by),
                recorded: record.is_some(),
            }
        })
        .collect()
}

/// Lecturer write-back of a student's status for a class.
///
/// # Errors
/// Propagates the reference errors from [`EntityStore::record_attendance`].
pub fn mark_attendance<'a>(
    store: &'a mut EntityStore,
    schedule_id: &str,
    student_id: &str,
    status: AttendanceStatus,
    at: DateTime<Utc>,
) -> Result<&'a AttendanceRecord> {
    let record = store.record_attendance(schedule_id, student_id, status, MarkedBy::Lecturer, at)?;
    info!(
        schedule = schedule_id,
        student = student_id,
        %status,
        "Lecturer marked attendance"
    );
    Ok(record)
}

/// Student self check-in with the QR token shown in class.
///
/// # Errors
/// Returns `Error::InvalidQrToken` for an unknown token, or a reference error
/// if `student_id` is not a registered student.
pub fn check_in_with_qr<'a>(
    store: &'a mut EntityStore,
    student_id: &str,
    token: &str,
    at: DateTime<Utc>,
) -> Result<&'a AttendanceRecord> {
    let schedule_id = schedule::get_schedule_by_qr_code(store, token)
        .map(|s| s.id.clone())
        .ok_or_else(|| Error::InvalidQrToken {
            token: token.to_string(),
        })?;

    let record = store.record_attendance(
        &schedule_id,
        student_id,
        AttendanceStatus::Present,
        MarkedBy::Student,
        at,
    )?;
    info!(
        schedule = %schedule_id,
        student = student_id,
        "Student checked in with QR token"
    );
    Ok(record)
}

//! The in-memory entity store.
//!
//! One `EntityStore` is built at startup and handed by reference to every
//! query. Building it runs the schedule generator and validates the fixture
//! attendance rows: every row must point at a generated schedule and a
//! registered student, and no (student, schedule) pair may appear twice.
//! The same rules guard [`EntityStore::record_attendance`], the only write path.

use crate::{
    config::fixtures::Fixtures,
    core::schedule,
    errors::{Error, Result},
    models::{AttendanceRecord, AttendanceStatus, ClassSchedule, Course, MarkedBy, Role, User},
};
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info};

/// Canonical collections of users, courses, schedules, and attendance.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    users: Vec<User>,
    courses: Vec<Course>,
    schedules: Vec<ClassSchedule>,
    attendance: Vec<AttendanceRecord>,
}

impl EntityStore {
    /// Builds the store from fixtures, generating `weeks` weeks of schedules
    /// around `today`.
    ///
    /// Fixture attendance rows without a timestamp are stamped with `built_at`.
    ///
    /// # Errors
    /// Returns `Error::InvalidFixture` for duplicate user ids or emails,
    /// duplicate course or attendance ids, courses owned by an unknown
    /// lecturer, or attendance rows that break the reference rules.
    pub fn build<R: Rng + ?Sized>(
        fixtures: Fixtures,
        today: NaiveDate,
        weeks: u32,
        built_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self> {
        let users: Vec<User> = fixtures.users.into_iter().map(User::from).collect();
        ensure_unique(users.iter().map(|u| u.id.as_str()), "user id")?;
        ensure_unique(users.iter().map(|u| u.email.as_str()), "user email")?;

        let mut courses: Vec<Course> = fixtures.courses.into_iter().map(Course::from).collect();
        ensure_unique(courses.iter().map(|c| c.id.as_str()), "course id")?;
        for course in &courses {
            let owner = users.iter().find(|u| u.id == course.lecturer_id);
            if !owner.is_some_and(User::is_lecturer) {
                return Err(Error::InvalidFixture {
                    message: format!(
                        "course {} is taught by unknown lecturer {}",
                        course.id, course.lecturer_id
                    ),
                });
            }
        }

        let schedules = schedule::generate_schedules(&mut courses, today, weeks, rng);

        let mut store = Self {
            users,
            courses,
            schedules,
            attendance: Vec::new(),
        };

        ensure_unique(
            fixtures.attendance.iter().map(|a| a.id.as_str()),
            "attendance id",
        )?;
        for row in fixtures.attendance {
            store
                .check_references(&row.class_schedule_id, &row.student_id)
                .map_err(|e| Error::InvalidFixture {
                    message: format!("attendance {}: {e}", row.id),
                })?;
            if store
                .find_record(&row.class_schedule_id, &row.student_id)
                .is_some()
            {
                return Err(Error::InvalidFixture {
                    message: format!(
                        "attendance {} duplicates student {} at {}",
                        row.id, row.student_id, row.class_schedule_id
                    ),
                });
            }
            store.attendance.push(AttendanceRecord {
                id: row.id,
                class_schedule_id: row.class_schedule_id,
                student_id: row.student_id,
                timestamp: row.timestamp.unwrap_or(built_at),
                status: row.status,
                marked_by: row.marked_by,
            });
        }

        info!(
            users = store.users.len(),
            courses = store.courses.len(),
            schedules = store.schedules.len(),
            attendance = store.attendance.len(),
            "Entity store built"
        );
        Ok(store)
    }

    /// All registered users.
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// All courses, each with its generated schedule ids.
    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// All generated class schedules.
    #[must_use]
    pub fn schedules(&self) -> &[ClassSchedule] {
        &self.schedules
    }

    /// All attendance records.
    #[must_use]
    pub fn attendance(&self) -> &[AttendanceRecord] {
        &self.attendance
    }

    /// Records a student's status for a class, creating or updating the single
    /// record held for that (student, schedule) pair.
    ///
    /// # Errors
    /// Returns `Error::ScheduleNotFound`, `Error::UserNotFound`, or
    /// `Error::NotAStudent` when the references do not resolve, and
    /// `Error::AttendanceIdsExhausted` when no new record id is left.
    pub fn record_attendance(
        &mut self,
        schedule_id: &str,
        student_id: &str,
        status: AttendanceStatus,
        marked_by: MarkedBy,
        at: DateTime<Utc>,
    ) -> Result<&AttendanceRecord> {
        self.check_references(schedule_id, student_id)?;

        let index = if let Some(index) = self.find_record(schedule_id, student_id) {
            let record = &mut self.attendance[index];
            debug!(
                record = %record.id,
                from = %record.status,
                to = %status,
                "Updating attendance record"
            );
            record.status = status;
            record.marked_by = marked_by;
            record.timestamp = at;
            index
        } else {
            let id = self.next_attendance_id()?;
            debug!(record = %id, %status, "Creating attendance record");
            self.attendance.push(AttendanceRecord {
                id,
                class_schedule_id: schedule_id.to_string(),
                student_id: student_id.to_string(),
                timestamp: at,
                status,
                marked_by,
            });
            self.attendance.len() - 1
        };

        Ok(&self.attendance[index])
    }

    fn check_references(&self, schedule_id: &str, student_id: &str) -> Result<()> {
        if !self.schedules.iter().any(|s| s.id == schedule_id) {
            return Err(Error::ScheduleNotFound {
                id: schedule_id.to_string(),
            });
        }
        let student = self
            .users
            .iter()
            .find(|u| u.id == student_id)
            .ok_or_else(|| Error::UserNotFound {
                id: student_id.to_string(),
            })?;
        if student.role != Role::Student {
            return Err(Error::NotAStudent {
                id: student_id.to_string(),
            });
        }
        Ok(())
    }

    fn find_record(&self, schedule_id: &str, student_id: &str) -> Option<usize> {
        self.attendance
            .iter()
            .position(|r| r.class_schedule_id == schedule_id && r.student_id == student_id)
    }

    /// Next `attNNN` id above every numeric id already in use.
    fn next_attendance_id(&self) -> Result<String> {
        let highest = self
            .attendance
            .iter()
            .filter_map(|r| r.id.strip_prefix("att")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        let next = highest
            .checked_add(1)
            .ok_or(Error::AttendanceIdsExhausted { highest })?;
        Ok(format!("att{next:03}"))
    }
}

fn ensure_unique<'a, I>(values: I, what: &str) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(Error::InvalidFixture {
                message: format!("duplicate {what} '{value}'"),
            });
        }
    }
    Ok(())
}

//! Dashboard statistics for the signed-in user.
//!
//! Builds the numbers shown on the landing page. All values are derived from
//! the store; nothing here is persisted.

use crate::{
    core::{attendance, course, schedule, store::EntityStore},
    models::{ClassSchedule, User},
};
use chrono::NaiveDate;

/// Headline figures that depend on the viewer's role.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleStats {
    /// Student view
    Student {
        /// Mean attendance rate over all courses (0-100)
        attendance_rate: f64,
        /// Number of courses on offer
        total_courses: usize,
    },
    /// Lecturer view
    Lecturer {
        /// Registered students
        total_students: usize,
        /// Mean of every student's overall rate (0-100)
        average_attendance: f64,
        /// Courses this lecturer teaches
        courses_taught: usize,
    },
}

/// Everything the dashboard shows for one user on one day.
#[derive(Debug, Clone)]
pub struct DashboardSummary<'a> {
    /// First name used in the welcome line
    pub greeting_name: &'a str,
    /// Classes relevant to the user that meet today
    pub todays_classes: Vec<&'a ClassSchedule>,
    /// First class of the day, if there is one
    pub next_class: Option<&'a ClassSchedule>,
    /// Next few classes from today on
    pub upcoming: Vec<&'a ClassSchedule>,
    /// Status counts over the records the user can see
    pub attendance: attendance::AttendanceSummary,
    /// Role-specific figures
    pub stats: RoleStats,
}

/// Builds the dashboard for `user` as of `today`.
#[must_use]
pub fn build_dashboard<'a>(
    store: &'a EntityStore,
    user: &'a User,
    today: NaiveDate,
) -> DashboardSummary<'a> {
    let todays_classes = schedule::get_todays_schedules(store, today);
    let next_class = todays_classes.first().copied();

    let (attendance, stats) = if user.is_lecturer() {
        let students = course::get_students(store);
        let average_attendance = if students.is_empty() {
            0.0
        } else {
            let total: f64 = students
                .iter()
                .map(|s| attendance::calculate_overall_attendance_rate(store, &s.id))
                .sum();
            #[allow(clippy::cast_precision_loss)]
            let mean = total / students.len() as f64;
            mean
        };
        (
            attendance::summarize(store.attendance()),
            RoleStats::Lecturer {
                total_students: students.len(),
                average_attendance,
                courses_taught: course::get_courses_for_lecturer(store, &user.id).len(),
            },
        )
    } else {
        (
            attendance::summarize(attendance::get_attendance_for_student(store, &user.id)),
            RoleStats::Student {
                attendance_rate: attendance::calculate_overall_attendance_rate(store, &user.id),
                total_courses: store.courses().len(),
            },
        )
    };

    DashboardSummary {
        greeting_name: user.first_name(),
        todays_classes,
        next_class,
        upcoming: schedule::get_upcoming_schedules(store, today),
        attendance,
        stats,
    }
}

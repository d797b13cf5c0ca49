//! Course and user lookups.

use crate::{
    core::store::EntityStore,
    models::{Course, Role, User},
};

/// Finds a course by id.
#[must_use]
pub fn get_course_by_id<'a>(store: &'a EntityStore, course_id: &str) -> Option<&'a Course> {
    store.courses().iter().find(|c| c.id == course_id)
}

/// Courses taught by the given lecturer, in store order.
#[must_use]
pub fn get_courses_for_lecturer<'a>(store: &'a EntityStore, lecturer_id: &str) -> Vec<&'a Course> {
    store
        .courses()
        .iter()
        .filter(|c| c.lecturer_id == lecturer_id)
        .collect()
}

/// Finds a user by id.
#[must_use]
pub fn get_user_by_id<'a>(store: &'a EntityStore, user_id: &str) -> Option<&'a User> {
    store.users().iter().find(|u| u.id == user_id)
}

/// Every user with the student role.
#[must_use]
pub fn get_students(store: &EntityStore) -> Vec<&User> {
    store
        .users()
        .iter()
        .filter(|u| u.role == Role::Student)
        .collect()
}

//! Class schedule generation and schedule queries.
//!
//! Every course meets twice a week. Starting from the Sunday-based week that
//! contains `today`, the generator lays out those meetings for a fixed number
//! of weeks and appends each schedule id to its course. Venue assignment draws
//! from an injected random source so a seeded run is reproducible.

use crate::{
    core::{course, store::EntityStore},
    models::{ClassSchedule, Course},
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use rand::Rng;
use std::collections::BTreeMap;

/// Maximum number of schedules returned by [`get_upcoming_schedules`].
pub const UPCOMING_LIMIT: usize = 5;

/// A weekly meeting slot shared by every course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingSlot {
    /// Short label used in schedule ids and QR tokens
    pub label: &'static str,
    /// Day of week counted from Sunday = 0
    pub weekday_offset: i64,
    /// Start time as (hour, minute)
    pub start: (u32, u32),
    /// End time as (hour, minute)
    pub end: (u32, u32),
}

/// Monday morning and Thursday afternoon.
pub const WEEKLY_SLOTS: [MeetingSlot; 2] = [
    MeetingSlot {
        label: "mon",
        weekday_offset: 1,
        start: (9, 0),
        end: (11, 0),
    },
    MeetingSlot {
        label: "thu",
        weekday_offset: 4,
        start: (14, 0),
        end: (16, 0),
    },
];

/// Generates two meetings per week for each course over `weeks` weeks.
///
/// Output order is course, then week, then slot. Each generated id is also
/// appended to the owning course's `schedule_ids`. For `N` courses the result
/// holds exactly `N * weeks * 2` schedules.
pub fn generate_schedules<R: Rng + ?Sized>(
    courses: &mut [Course],
    today: NaiveDate,
    weeks: u32,
    rng: &mut R,
) -> Vec<ClassSchedule> {
    let week_start_offset = i64::from(today.weekday().num_days_from_sunday());
    let mut schedules = Vec::with_capacity(courses.len() * weeks as usize * WEEKLY_SLOTS.len());

    for course in courses.iter_mut() {
        for week in 0..weeks {
            for slot in &WEEKLY_SLOTS {
                let offset = i64::from(week) * 7 + slot.weekday_offset - week_start_offset;
                let schedule = ClassSchedule {
                    id: format!("sch-{}-{}-{week}", course.id, slot.label),
                    course_id: course.id.clone(),
                    date: today + Duration::days(offset),
                    start_time: slot_time(slot.start),
                    end_time: slot_time(slot.end),
                    venue: format!("Room {}01", rng.gen_range(1..=10)),
                    qr_code: Some(format!("qr-{}-{}-{week}", course.id, slot.label)),
                };
                course.schedule_ids.push(schedule.id.clone());
                schedules.push(schedule);
            }
        }
    }

    tracing::debug!(
        courses = courses.len(),
        weeks,
        generated = schedules.len(),
        "Generated class schedules"
    );
    schedules
}

fn slot_time((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Finds a class schedule by id.
#[must_use]
pub fn get_schedule_by_id<'a>(store: &'a EntityStore, schedule_id: &str) -> Option<&'a ClassSchedule> {
    store.schedules().iter().find(|s| s.id == schedule_id)
}

/// Finds the schedule a QR token was printed for.
#[must_use]
pub fn get_schedule_by_qr_code<'a>(store: &'a EntityStore, token: &str) -> Option<&'a ClassSchedule> {
    store
        .schedules()
        .iter()
        .find(|s| s.qr_code.as_deref() == Some(token))
}

/// Schedules that meet on `today`, in store order.
#[must_use]
pub fn get_todays_schedules(store: &EntityStore, today: NaiveDate) -> Vec<&ClassSchedule> {
    store.schedules().iter().filter(|s| s.date == today).collect()
}

/// The next few schedules strictly after `today`, earliest first.
///
/// Ties keep store order. At most [`UPCOMING_LIMIT`] entries are returned.
#[must_use]
pub fn get_upcoming_schedules(store: &EntityStore, today: NaiveDate) -> Vec<&ClassSchedule> {
    let mut upcoming: Vec<&ClassSchedule> =
        store.schedules().iter().filter(|s| s.date > today).collect();
    upcoming.sort_by_key(|s| s.date);
    upcoming.truncate(UPCOMING_LIMIT);
    upcoming
}

/// All schedules of a course, in generation order.
#[must_use]
pub fn get_schedules_for_course<'a>(store: &'a EntityStore, course_id: &str) -> Vec<&'a ClassSchedule> {
    store
        .schedules()
        .iter()
        .filter(|s| s.course_id == course_id)
        .collect()
}

/// Schedules split around `today`.
#[derive(Debug, Clone, Default)]
pub struct SchedulePartition<'a> {
    /// Meetings on or after today
    pub upcoming: Vec<&'a ClassSchedule>,
    /// Meetings before today
    pub past: Vec<&'a ClassSchedule>,
}

/// Splits every schedule into upcoming (on or after `today`) and past.
#[must_use]
pub fn partition_schedules(store: &EntityStore, today: NaiveDate) -> SchedulePartition<'_> {
    let (upcoming, past): (Vec<_>, Vec<_>) = store.schedules().iter().partition(|s| s.date >= today);
    SchedulePartition { upcoming, past }
}

/// Groups schedules by meeting date, earliest date first.
#[must_use]
pub fn group_by_date<'a>(
    schedules: &[&'a ClassSchedule],
) -> BTreeMap<NaiveDate, Vec<&'a ClassSchedule>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&ClassSchedule>> = BTreeMap::new();
    for &schedule in schedules {
        grouped.entry(schedule.date).or_default().push(schedule);
    }
    grouped
}

/// Case-insensitive match of `term` against course name, course code, or venue.
///
/// An empty term matches everything. A schedule whose course is unknown only
/// matches on venue.
#[must_use]
pub fn matches_search(store: &EntityStore, schedule: &ClassSchedule, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let course_matches = course::get_course_by_id(store, &schedule.course_id).is_some_and(|c| {
        c.course_name.to_lowercase().contains(&needle)
            || c.course_code.to_lowercase().contains(&needle)
    });
    course_matches || schedule.venue.to_lowercase().contains(&needle)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{sample_store, test_today};
    use chrono::Weekday;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    fn course(id: &str) -> Course {
        Course {
            id: id.to_string(),
            course_code: id.to_uppercase(),
            course_name: format!("Course {id}"),
            lecturer_id: "l001".to_string(),
            schedule_ids: Vec::new(),
        }
    }

    #[test]
    fn test_generates_two_meetings_per_week_per_course() {
        let mut courses = vec![course("c001"), course("c002"), course("c003")];
        let mut rng = StdRng::seed_from_u64(7);

        let schedules = generate_schedules(&mut courses, test_today(), 4, &mut rng);

        assert_eq!(schedules.len(), 3 * 4 * 2);
        let ids: HashSet<&str> = schedules.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), schedules.len());
        for c in &courses {
            assert_eq!(c.schedule_ids.len(), 8);
        }
        assert_eq!(courses[0].schedule_ids[0], "sch-c001-mon-0");
        assert_eq!(courses[0].schedule_ids[1], "sch-c001-thu-0");
        assert_eq!(courses[0].schedule_ids[7], "sch-c001-thu-3");
    }

    #[test]
    fn test_empty_course_list_generates_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_schedules(&mut [], test_today(), 4, &mut rng).is_empty());
    }

    #[test]
    fn test_slot_dates_follow_the_current_week() {
        // 2026-10-17 is a Saturday, so week 0 starts Sunday 2026-10-11.
        let today = test_today();
        let mut courses = vec![course("c001")];
        let mut rng = StdRng::seed_from_u64(3);

        let schedules = generate_schedules(&mut courses, today, 2, &mut rng);

        let by_id = |id: &str| schedules.iter().find(|s| s.id == id).unwrap();
        let mon0 = by_id("sch-c001-mon-0");
        let thu0 = by_id("sch-c001-thu-0");
        let mon1 = by_id("sch-c001-mon-1");

        assert_eq!(mon0.date, NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
        assert_eq!(thu0.date, NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        assert_eq!(mon1.date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(mon1.date.weekday(), Weekday::Mon);
        assert_eq!(thu0.date.weekday(), Weekday::Thu);
        assert_eq!(thu0.time_range(), "14:00 - 16:00");
        assert_eq!(thu0.qr_code.as_deref(), Some("qr-c001-thu-0"));
    }

    #[test]
    fn test_sunday_today_places_monday_tomorrow() {
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let mut courses = vec![course("c001")];
        let mut rng = StdRng::seed_from_u64(3);

        let schedules = generate_schedules(&mut courses, sunday, 1, &mut rng);
        assert_eq!(schedules[0].date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    }

    #[test]
    fn test_venues_are_reproducible_for_a_seed() {
        let mut first = vec![course("c001"), course("c002")];
        let mut second = first.clone();

        let a = generate_schedules(&mut first, test_today(), 4, &mut StdRng::seed_from_u64(99));
        let b = generate_schedules(&mut second, test_today(), 4, &mut StdRng::seed_from_u64(99));

        assert_eq!(a, b);
        for schedule in &a {
            let room: u32 = schedule
                .venue
                .strip_prefix("Room ")
                .and_then(|r| r.strip_suffix("01"))
                .unwrap()
                .parse()
                .unwrap();
            assert!((1..=10).contains(&room), "venue out of range: {}", schedule.venue);
        }
    }

    #[test]
    fn test_upcoming_is_capped_sorted_and_after_today() {
        let store = sample_store();
        let today = test_today();

        let upcoming = get_upcoming_schedules(&store, today);

        assert_eq!(upcoming.len(), UPCOMING_LIMIT);
        assert!(upcoming.iter().all(|s| s.date > today));
        assert!(upcoming.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_upcoming_empty_past_the_window() {
        let store = sample_store();
        let far_future = NaiveDate::from_ymd_opt(2027, 6, 1).unwrap();
        assert!(get_upcoming_schedules(&store, far_future).is_empty());
    }

    #[test]
    fn test_todays_schedules_match_date() {
        let store = sample_store();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let todays = get_todays_schedules(&store, monday);
        assert_eq!(todays.len(), 3);
        assert!(todays.iter().all(|s| s.date == monday));
        assert_eq!(todays[0].course_id, "c001");

        // The sample Saturday has no classes.
        assert!(get_todays_schedules(&store, test_today()).is_empty());
    }

    #[test]
    fn test_lookup_by_id_is_stable() {
        let store = sample_store();
        let first = get_schedule_by_id(&store, "sch-c002-thu-1").unwrap();
        let second = get_schedule_by_id(&store, "sch-c002-thu-1").unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(get_schedule_by_id(&store, "sch-c999-mon-0").is_none());
    }

    #[test]
    fn test_qr_lookup() {
        let store = sample_store();
        let schedule = get_schedule_by_qr_code(&store, "qr-c003-mon-2").unwrap();
        assert_eq!(schedule.id, "sch-c003-mon-2");
        assert!(get_schedule_by_qr_code(&store, "qr-bogus").is_none());
    }

    #[test]
    fn test_partition_and_grouping() {
        let store = sample_store();
        let today = test_today();

        let partition = partition_schedules(&store, today);
        // Week 0 Monday and Thursday are already past for every course.
        assert_eq!(partition.past.len(), 6);
        assert_eq!(partition.upcoming.len(), 18);

        let grouped = group_by_date(&partition.upcoming);
        assert_eq!(grouped.len(), 6);
        let first_day = grouped.keys().next().unwrap();
        assert_eq!(*first_day, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert!(grouped.values().all(|day| day.len() == 3));
    }

    #[test]
    fn test_search_matches_course_and_venue() {
        let store = sample_store();
        let schedule = get_schedule_by_id(&store, "sch-c003-mon-0").unwrap();

        assert!(matches_search(&store, schedule, "calculus"));
        assert!(matches_search(&store, schedule, "math1"));
        assert!(matches_search(&store, schedule, "room"));
        assert!(matches_search(&store, schedule, ""));
        assert!(!matches_search(&store, schedule, "algorithms"));
    }

    #[test]
    fn test_schedules_for_course() {
        let store = sample_store();
        let schedules = get_schedules_for_course(&store, "c002");
        assert_eq!(schedules.len(), 8);
        assert!(get_schedules_for_course(&store, "c404").is_empty());
    }
}

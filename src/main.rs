use attendance_buddy::{
    config::{
        database,
        fixtures::{self, Fixtures},
        settings::{self, AppConfig},
    },
    core::{
        self,
        attendance::{self, AttendanceFilter},
        auth, course,
        dashboard::{self, RoleStats},
        schedule,
        store::EntityStore,
    },
    errors::Result,
    models::{AttendanceStatus, ClassSchedule, User},
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use rand::{SeedableRng, rngs::StdRng};
use sea_orm::DatabaseConnection;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "attendance-buddy", about = "Class schedules and attendance tracking")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in with a registered email
    Login {
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Overview of today's classes and attendance
    Dashboard,
    /// Upcoming and past classes grouped by date
    Classes {
        #[arg(long)]
        search: Option<String>,
    },
    /// Details and roster for one class meeting
    Class { schedule_id: String },
    /// Attendance records visible to the signed-in user
    Attendance {
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        status: Option<AttendanceStatus>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Check in to a class with its QR token (students)
    CheckIn { token: String },
    /// Set a student's status for a class (lecturers)
    Mark {
        schedule_id: String,
        student_id: String,
        status: AttendanceStatus,
    },
}

impl Command {
    /// Everything except signing in and out requires a saved session.
    const fn needs_session(&self) -> bool {
        !matches!(self, Self::Login { .. } | Self::Logout | Self::Whoami)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars may also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Settings, fixtures, and the entity store
    let app_config = settings::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let fixtures = load_fixtures(&app_config)?;
    let mut store = build_store(&app_config, fixtures)?;

    // 4. Session database and saved session
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to open session database: {}", e))?;
    let session = auth::restore_session(&db).await?;

    run(cli.command, &db, &mut store, session).await
}

fn load_fixtures(app_config: &AppConfig) -> Result<Fixtures> {
    match &app_config.fixtures_path {
        Some(path) => fixtures::load_fixtures(path),
        None => fixtures::default_fixtures(),
    }
}

fn build_store(app_config: &AppConfig, fixtures: Fixtures) -> Result<EntityStore> {
    let seed = app_config.schedule_seed.unwrap_or_else(rand::random);
    info!(seed, weeks = app_config.schedule_weeks, "Generating class schedules");
    let mut rng = StdRng::seed_from_u64(seed);
    EntityStore::build(
        fixtures,
        core::today(),
        app_config.schedule_weeks,
        Utc::now(),
        &mut rng,
    )
}

async fn run(
    command: Command,
    db: &DatabaseConnection,
    store: &mut EntityStore,
    session: Option<User>,
) -> Result<()> {
    if command.needs_session() {
        let Some(user) = session else {
            println!("Please sign in first");
            return Ok(());
        };
        return run_signed_in(command, store, &user);
    }

    match command {
        Command::Login { email, password } => {
            match auth::login(db, store, &email, &password).await? {
                Some(user) => println!("Welcome back, {}!", user.name),
                None => println!("Login failed: invalid email or password"),
            }
        }
        Command::Logout => {
            auth::logout(db).await?;
            println!("You have been logged out");
        }
        Command::Whoami => match session {
            Some(user) => println!("{} <{}> ({:?})", user.name, user.email, user.role),
            None => println!("Not signed in"),
        },
        _ => {}
    }
    Ok(())
}

fn run_signed_in(command: Command, store: &mut EntityStore, user: &User) -> Result<()> {
    match command {
        Command::Dashboard => print_dashboard(store, user),
        Command::Classes { search } => print_classes(store, search.as_deref().unwrap_or("")),
        Command::Class { schedule_id } => print_class(store, user, &schedule_id),
        Command::Attendance {
            course,
            status,
            search,
        } => {
            let filter = AttendanceFilter {
                course_id: course,
                status,
                search,
            };
            print_attendance(store, user, &filter);
        }
        Command::CheckIn { token } => {
            if user.is_lecturer() {
                println!("Only students can check in");
                return Ok(());
            }
            let record = attendance::check_in_with_qr(store, &user.id, &token, Utc::now())?;
            println!("Attendance marked for {}", record.class_schedule_id);
        }
        Command::Mark {
            schedule_id,
            student_id,
            status,
        } => {
            if !user.is_lecturer() {
                println!("Only lecturers can mark attendance");
                return Ok(());
            }
            let record =
                attendance::mark_attendance(store, &schedule_id, &student_id, status, Utc::now())?;
            println!(
                "{} marked {} for {}",
                record.student_id, record.status, record.class_schedule_id
            );
        }
        _ => {}
    }
    Ok(())
}

fn describe(store: &EntityStore, schedule: &ClassSchedule) -> String {
    let code = course::get_course_by_id(store, &schedule.course_id)
        .map_or("?", |c| c.course_code.as_str());
    format!(
        "{:<16} {:<8} {} {}",
        schedule.id,
        code,
        schedule.time_range(),
        schedule.venue
    )
}

fn print_dashboard(store: &EntityStore, user: &User) {
    let summary = dashboard::build_dashboard(store, user, core::today());

    println!("Welcome back, {}", summary.greeting_name);
    match summary.stats {
        RoleStats::Student {
            attendance_rate,
            total_courses,
        } => {
            println!("Attendance rate: {attendance_rate:.0}%");
            println!("Total courses:   {total_courses}");
        }
        RoleStats::Lecturer {
            total_students,
            average_attendance,
            courses_taught,
        } => {
            println!("Total students:     {total_students}");
            println!("Average attendance: {average_attendance:.0}%");
            println!("Courses taught:     {courses_taught}");
        }
    }
    println!("Classes today:   {}", summary.todays_classes.len());
    match summary.next_class {
        Some(next) => println!(
            "Next class:      {} ({})",
            next.start_time.format("%H:%M"),
            next.venue
        ),
        None => println!("Next class:      N/A (no classes today)"),
    }
    println!(
        "Attendance:      {:.0}% (Present {} / Absent {} / Late {})",
        summary.attendance.rate(),
        summary.attendance.present,
        summary.attendance.absent,
        summary.attendance.late
    );

    println!("\nUpcoming classes:");
    for upcoming in summary.upcoming {
        println!("  {} {}", upcoming.date, describe(store, upcoming));
    }
}

fn print_classes(store: &EntityStore, search: &str) {
    let partition = schedule::partition_schedules(store, core::today());
    for (title, schedules) in [("Upcoming", partition.upcoming), ("Past", partition.past)] {
        let matching: Vec<&ClassSchedule> = schedules
            .into_iter()
            .filter(|s| schedule::matches_search(store, s, search))
            .collect();
        println!("{title} classes:");
        if matching.is_empty() {
            println!("  No classes found");
        }
        for (date, day) in schedule::group_by_date(&matching) {
            println!("  {}", date.format("%A, %B %-d, %Y"));
            for class in day {
                println!("    {}", describe(store, class));
            }
        }
    }
}

fn print_class(store: &EntityStore, viewer: &User, schedule_id: &str) {
    let Some(class) = schedule::get_schedule_by_id(store, schedule_id) else {
        println!("Class not found");
        return;
    };
    let Some(course) = course::get_course_by_id(store, &class.course_id) else {
        println!("Course not found");
        return;
    };

    println!("{} ({})", course.course_name, course.course_code);
    println!("{}", class.date.format("%A, %B %-d, %Y"));
    println!("{} at {}", class.time_range(), class.venue);

    if viewer.is_lecturer() {
        if let Some(token) = &class.qr_code {
            println!("QR token: {token}");
        }
        println!("\nRoster:");
        for entry in attendance::get_class_roster(store, schedule_id) {
            println!(
                "  {:<16} {:<8} {}",
                entry.student.name,
                entry.status,
                entry.marked_by.label()
            );
        }
    }
}

fn print_attendance(store: &EntityStore, viewer: &User, filter: &AttendanceFilter) {
    let entries = attendance::list_attendance(store, viewer, filter);
    if entries.is_empty() {
        println!("No attendance records found matching your filters");
        return;
    }
    for entry in entries {
        let student = if viewer.is_lecturer() {
            entry.student_name.unwrap_or("Unknown")
        } else {
            ""
        };
        println!(
            "{} {:<8} {} {:<9} {:<8} {:<16} {}",
            entry.schedule.date.format("%b %-d, %Y"),
            entry.course.course_code,
            entry.schedule.time_range(),
            entry.schedule.venue,
            entry.record.status,
            student,
            entry.record.marked_by.label()
        );
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("attendance-buddy").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn test_only_session_commands_run_signed_out() {
        for args in [&["login", "jsmith@laikipia.ac.ke"][..], &["logout"], &["whoami"]] {
            assert!(!parse(args).needs_session(), "{args:?}");
        }
    }

    #[test]
    fn test_class_views_need_a_session() {
        for args in [
            &["classes"][..],
            &["classes", "--search", "CS101"],
            &["class", "sch-c001-mon-0"],
            &["dashboard"],
            &["attendance", "--status", "late"],
            &["check-in", "qr-token"],
            &["mark", "sch-c001-mon-0", "s001", "present"],
        ] {
            assert!(parse(args).needs_session(), "{args:?}");
        }
    }
}

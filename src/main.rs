use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{metadata::LevelFilter, Level};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};
use uuid::Uuid;

use gpa_tracker::models::{CourseInput, LetterGrade};
use gpa_tracker::store::RecordStore;
use gpa_tracker::{db, gpa, import, report, validate};

#[derive(Parser)]
#[command(name = "gpa-tracker")]
#[command(about = "Track semesters, courses and grade-point averages", long_about = None)]
struct Cli {
    /// SQLite database holding the record
    #[arg(
        long,
        global = true,
        env = "GPA_TRACKER_DATABASE_URL",
        default_value = "sqlite://gpa-tracker.db"
    )]
    database_url: String,
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every semester and course with GPA and CGPA
    Show,
    /// List the available grading scales
    Scales,
    /// Add an empty semester
    AddSemester {
        #[arg(long, value_parser = validate::parse_name)]
        name: String,
    },
    /// Rename a semester
    RenameSemester {
        #[arg(long)]
        id: Uuid,
        #[arg(long, value_parser = validate::parse_name)]
        name: String,
    },
    /// Delete a semester and all of its courses
    DeleteSemester {
        #[arg(long)]
        id: Uuid,
    },
    /// Add a course to a semester
    AddCourse {
        #[arg(long)]
        semester: Uuid,
        #[command(flatten)]
        course: CourseArgs,
    },
    /// Replace a course's name, credit hours and grade
    UpdateCourse {
        #[arg(long)]
        semester: Uuid,
        #[arg(long)]
        course: Uuid,
        #[command(flatten)]
        fields: CourseArgs,
    },
    /// Remove a course from a semester
    DeleteCourse {
        #[arg(long)]
        semester: Uuid,
        #[arg(long)]
        course: Uuid,
    },
    /// Switch the active grading scale and recompute every GPA
    SetScale {
        #[arg(long)]
        scale: f64,
    },
    /// Import courses from a CSV file (semester,course,credit_hours,grade)
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "gpa-report.md")]
        out: PathBuf,
    },
}

#[derive(clap::Args)]
struct CourseArgs {
    #[arg(long, value_parser = validate::parse_name)]
    name: String,
    #[arg(long, value_parser = validate::parse_credit_hours)]
    credit_hours: f64,
    #[arg(long)]
    grade: LetterGrade,
}

impl From<CourseArgs> for CourseInput {
    fn from(args: CourseArgs) -> Self {
        CourseInput {
            name: args.name,
            credit_hours: args.credit_hours,
            grade: args.grade,
        }
    }
}

fn init_tracing(verbose: bool) {
    let fmt = fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr);
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(fmt)
        .with(LevelFilter::from_level(level))
        .init();
}

fn print_record(store: &RecordStore) {
    let data = store.data();
    let semesters = &data.semesters;
    println!(
        "CGPA {} on the {:.1} scale ({} semesters, {} courses, {} credit hours)",
        gpa::format_gpa(gpa::cumulative_gpa(semesters)),
        data.settings.active_grade_scale.scale,
        semesters.len(),
        gpa::course_count(semesters),
        gpa::total_credit_hours(semesters)
    );

    for semester in semesters {
        println!(
            "- {} [{}] GPA {}",
            semester.name,
            semester.id,
            gpa::format_gpa(semester.gpa)
        );
        for course in &semester.courses {
            println!(
                "    - {} [{}] {} credit hours, {} ({})",
                course.name,
                course.id,
                course.credit_hours,
                course.grade,
                gpa::format_gpa(course.grade_point)
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let storage = db::SqliteStore::connect(&cli.database_url)
        .await
        .with_context(|| format!("failed to open record database at {}", cli.database_url))?;
    let mut store = RecordStore::open(storage).await;

    match cli.command {
        Commands::Show => print_record(&store),
        Commands::Scales => {
            let active = store.data().settings.active_grade_scale.scale;
            for option in &store.data().settings.grade_scales {
                let marker = if option.scale == active { " (active)" } else { "" };
                let points = option
                    .grades
                    .iter()
                    .map(|(grade, points)| format!("{grade}={points}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{:.1}{marker}: {points}", option.scale);
            }
        }
        Commands::AddSemester { name } => {
            let id = store.add_semester(&name);
            println!("Added semester {name} [{id}].");
        }
        Commands::RenameSemester { id, name } => {
            if store.update_semester(id, &name) {
                println!("Renamed semester to {name}.");
            } else {
                println!("No semester with id {id}.");
            }
        }
        Commands::DeleteSemester { id } => {
            if store.delete_semester(id) {
                println!("Deleted semester {id}.");
            } else {
                println!("No semester with id {id}.");
            }
        }
        Commands::AddCourse { semester, course } => {
            match store.add_course(semester, course.into()) {
                Some(id) => println!("Added course [{id}]."),
                None => println!("No semester with id {semester}."),
            }
        }
        Commands::UpdateCourse {
            semester,
            course,
            fields,
        } => {
            if store.update_course(semester, course, fields.into()) {
                println!("Updated course {course}.");
            } else {
                println!("No course {course} in semester {semester}.");
            }
        }
        Commands::DeleteCourse { semester, course } => {
            if store.delete_course(semester, course) {
                println!("Deleted course {course}.");
            } else {
                println!("No course {course} in semester {semester}.");
            }
        }
        Commands::SetScale { scale } => {
            if store.set_active_grade_scale(scale) {
                println!("Active scale is now {scale:.1}.");
            } else {
                println!("Unknown scale {scale}; run `scales` to list the options.");
            }
        }
        Commands::Import { csv } => {
            let inserted = import::import_csv(&mut store, &csv)?;
            println!("Imported {inserted} courses from {}.", csv.display());
        }
        Commands::Report { out } => {
            let report = report::build_report(store.data(), Utc::now().date_naive());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    store.close().await;
    Ok(())
}

use crate::models::{Course, Semester};

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn weighted_average<'a>(courses: impl IntoIterator<Item = &'a Course>) -> f64 {
    let (points, hours) = courses
        .into_iter()
        .fold((0.0, 0.0), |(points, hours), course| {
            (
                points + course.grade_point * course.credit_hours,
                hours + course.credit_hours,
            )
        });

    if hours > 0.0 {
        round_to_hundredths(points / hours)
    } else {
        0.0
    }
}

/// Credit-hour weighted GPA of one semester, rounded to 2 decimals.
pub fn semester_gpa(courses: &[Course]) -> f64 {
    weighted_average(courses)
}

/// Credit-hour weighted GPA over every course of every semester.
///
/// Semester boundaries are ignored: a heavy semester counts for more than a
/// light one, so this is not the mean of the per-semester GPAs.
pub fn cumulative_gpa(semesters: &[Semester]) -> f64 {
    weighted_average(semesters.iter().flat_map(|semester| semester.courses.iter()))
}

/// Cumulative GPA after each semester in order.
pub fn cumulative_trend(semesters: &[Semester]) -> Vec<f64> {
    (1..=semesters.len())
        .map(|end| cumulative_gpa(&semesters[..end]))
        .collect()
}

pub fn total_credit_hours(semesters: &[Semester]) -> f64 {
    semesters
        .iter()
        .flat_map(|semester| semester.courses.iter())
        .map(|course| course.credit_hours)
        .sum()
}

pub fn course_count(semesters: &[Semester]) -> usize {
    semesters.iter().map(|semester| semester.courses.len()).sum()
}

pub fn format_gpa(value: f64) -> String {
    format!("{value:.2}")
}

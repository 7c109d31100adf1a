use std::path::Path;

use anyhow::Context;

use crate::models::{CourseInput, LetterGrade};
use crate::store::RecordStore;
use crate::validate;

#[derive(serde::Deserialize)]
struct CsvRow {
    semester: String,
    course: String,
    credit_hours: f64,
    grade: String,
}

/// Adds every row of `csv_path` as a course, creating semesters by name as
/// needed. All rows are checked first, so a bad row imports nothing.
pub fn import_csv(store: &mut RecordStore, csv_path: &Path) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let row = result.with_context(|| format!("invalid row on line {line}"))?;
        let semester = validate::parse_name(&row.semester)
            .with_context(|| format!("invalid semester on line {line}"))?;
        let course = CourseInput {
            name: validate::parse_name(&row.course)
                .with_context(|| format!("invalid course on line {line}"))?,
            credit_hours: validate::check_credit_hours(row.credit_hours)
                .with_context(|| format!("invalid credit hours on line {line}"))?,
            grade: row
                .grade
                .parse::<LetterGrade>()
                .with_context(|| format!("invalid grade on line {line}"))?,
        };
        rows.push((semester, course));
    }

    let mut inserted = 0usize;
    for (semester_name, course) in rows {
        let existing = store
            .data()
            .semesters
            .iter()
            .find(|semester| semester.name == semester_name)
            .map(|semester| semester.id);
        let semester_id = match existing {
            Some(id) => id,
            None => store.add_semester(&semester_name),
        };

        if store.add_course(semester_id, course).is_some() {
            inserted += 1;
        }
    }

    tracing::info!(inserted, path = %csv_path.display(), "imported courses");
    Ok(inserted)
}

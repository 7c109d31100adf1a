use std::fmt::Write;

use chrono::NaiveDate;

use crate::gpa::{self, format_gpa};
use crate::models::AppData;

pub fn build_report(data: &AppData, generated_on: NaiveDate) -> String {
    let semesters = &data.semesters;
    let mut output = String::new();

    let _ = writeln!(output, "# GPA Report");
    let _ = writeln!(
        output,
        "Generated on {} using the {:.1} scale",
        generated_on, data.settings.active_grade_scale.scale
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- CGPA: {}", format_gpa(gpa::cumulative_gpa(semesters)));
    let _ = writeln!(output, "- Semesters: {}", semesters.len());
    let _ = writeln!(output, "- Courses: {}", gpa::course_count(semesters));
    let _ = writeln!(output, "- Credit hours: {}", gpa::total_credit_hours(semesters));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Semesters");

    if semesters.is_empty() {
        let _ = writeln!(output, "No semesters recorded yet.");
    } else {
        for semester in semesters {
            let hours: f64 = semester.courses.iter().map(|c| c.credit_hours).sum();
            let _ = writeln!(output);
            let _ = writeln!(
                output,
                "### {} (GPA {}, {} credit hours)",
                semester.name,
                format_gpa(semester.gpa),
                hours
            );
            if semester.courses.is_empty() {
                let _ = writeln!(output, "No courses recorded.");
            }
            for course in &semester.courses {
                let _ = writeln!(
                    output,
                    "- {}: {} credit hours, {} ({})",
                    course.name,
                    course.credit_hours,
                    course.grade,
                    format_gpa(course.grade_point)
                );
            }
        }
    }

    let trend = gpa::cumulative_trend(semesters);
    if !trend.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Cumulative Trend");
        for (semester, value) in semesters.iter().zip(trend) {
            let _ = writeln!(output, "- {}: {}", semester.name, format_gpa(value));
        }
    }

    output
}

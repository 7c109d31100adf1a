//! Academic record tracking: semesters of graded courses, grading scales, and
//! credit-hour weighted GPA/CGPA, persisted as one JSON snapshot in SQLite.

pub mod db;
pub mod gpa;
pub mod import;
pub mod models;
pub mod report;
pub mod scale;
pub mod store;
pub mod validate;

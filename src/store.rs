use std::sync::Arc;

use uuid::Uuid;

use crate::db::{self, KeyValueStore, Persister};
use crate::gpa::semester_gpa;
use crate::models::{AppData, Course, CourseInput, Semester};
use crate::scale::resolve;

/// Sole owner of the academic record.
///
/// A store only exists once the saved record has been loaded, so every
/// mutation runs against loaded data. Each mutation recomputes the derived
/// grade points and GPAs before returning and hands a snapshot to the
/// background writer without waiting for it. Unknown ids make a mutation a
/// no-op: nothing changes and nothing is saved.
///
/// Call [`RecordStore::close`] before the runtime shuts down. Dropping the
/// store instead detaches the writer, and queued snapshots may never reach
/// storage.
pub struct RecordStore {
    data: AppData,
    persister: Persister,
}

impl RecordStore {
    pub async fn open<S: KeyValueStore>(storage: S) -> Self {
        let storage = Arc::new(storage);
        let data = db::load_app_data(storage.as_ref()).await;
        let persister = Persister::spawn(storage);
        Self { data, persister }
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn snapshot(&self) -> AppData {
        self.data.clone()
    }

    pub fn add_semester(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.data.semesters.push(Semester {
            id,
            name: name.to_string(),
            courses: Vec::new(),
            gpa: 0.0,
        });
        tracing::debug!(semester_id = %id, name, "added semester");
        self.persist();
        id
    }

    pub fn update_semester(&mut self, id: Uuid, name: &str) -> bool {
        let Some(semester) = self.semester_mut(id) else {
            return false;
        };
        semester.name = name.to_string();
        tracing::debug!(semester_id = %id, name, "renamed semester");
        self.persist();
        true
    }

    pub fn delete_semester(&mut self, id: Uuid) -> bool {
        let before = self.data.semesters.len();
        self.data.semesters.retain(|semester| semester.id != id);
        if self.data.semesters.len() == before {
            tracing::debug!(semester_id = %id, "delete skipped, semester not found");
            return false;
        }
        tracing::debug!(semester_id = %id, "deleted semester");
        self.persist();
        true
    }

    pub fn add_course(&mut self, semester_id: Uuid, input: CourseInput) -> Option<Uuid> {
        let grade_point = resolve(input.grade, &self.data.settings.active_grade_scale);
        let semester = self.semester_mut(semester_id)?;

        let id = Uuid::new_v4();
        semester.courses.push(Course {
            id,
            name: input.name,
            credit_hours: input.credit_hours,
            grade: input.grade,
            grade_point,
        });
        semester.gpa = semester_gpa(&semester.courses);
        tracing::debug!(%semester_id, course_id = %id, gpa = semester.gpa, "added course");
        self.persist();
        Some(id)
    }

    pub fn update_course(&mut self, semester_id: Uuid, course_id: Uuid, input: CourseInput) -> bool {
        let grade_point = resolve(input.grade, &self.data.settings.active_grade_scale);
        let Some(semester) = self.semester_mut(semester_id) else {
            return false;
        };
        let Some(course) = semester.courses.iter_mut().find(|c| c.id == course_id) else {
            tracing::debug!(%semester_id, %course_id, "update skipped, course not found");
            return false;
        };

        course.name = input.name;
        course.credit_hours = input.credit_hours;
        course.grade = input.grade;
        course.grade_point = grade_point;
        semester.gpa = semester_gpa(&semester.courses);
        tracing::debug!(%semester_id, %course_id, gpa = semester.gpa, "updated course");
        self.persist();
        true
    }

    pub fn delete_course(&mut self, semester_id: Uuid, course_id: Uuid) -> bool {
        let Some(semester) = self.semester_mut(semester_id) else {
            return false;
        };
        let before = semester.courses.len();
        semester.courses.retain(|course| course.id != course_id);
        if semester.courses.len() == before {
            tracing::debug!(%semester_id, %course_id, "delete skipped, course not found");
            return false;
        }

        semester.gpa = semester_gpa(&semester.courses);
        tracing::debug!(%semester_id, %course_id, gpa = semester.gpa, "deleted course");
        self.persist();
        true
    }

    /// Switches to the known scale whose value is `scale`, re-resolving every
    /// course. An unknown value leaves the record untouched.
    pub fn set_active_grade_scale(&mut self, scale: f64) -> bool {
        let Some(selected) = self
            .data
            .settings
            .grade_scales
            .iter()
            .find(|option| option.scale == scale)
            .cloned()
        else {
            tracing::debug!(scale, "scale change skipped, no such scale");
            return false;
        };

        for semester in &mut self.data.semesters {
            for course in &mut semester.courses {
                course.grade_point = resolve(course.grade, &selected);
            }
            semester.gpa = semester_gpa(&semester.courses);
        }
        self.data.settings.active_grade_scale = selected;
        tracing::info!(scale, "active grade scale changed");
        self.persist();
        true
    }

    /// Waits for pending saves to finish.
    pub async fn close(self) {
        self.persister.flush().await;
    }

    fn semester_mut(&mut self, id: Uuid) -> Option<&mut Semester> {
        let found = self.data.semesters.iter_mut().find(|semester| semester.id == id);
        if found.is_none() {
            tracing::debug!(semester_id = %id, "semester not found, skipping");
        }
        found
    }

    fn persist(&self) {
        self.persister.submit(self.data.clone());
    }
}

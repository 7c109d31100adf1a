use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scale;

/// Letter grades in descending order of merit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    pub const ALL: [LetterGrade; 12] = [
        LetterGrade::APlus,
        LetterGrade::A,
        LetterGrade::AMinus,
        LetterGrade::BPlus,
        LetterGrade::B,
        LetterGrade::BMinus,
        LetterGrade::CPlus,
        LetterGrade::C,
        LetterGrade::CMinus,
        LetterGrade::DPlus,
        LetterGrade::D,
        LetterGrade::F,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown letter grade `{0}` (expected one of A+, A, A-, B+, B, B-, C+, C, C-, D+, D, F)")]
pub struct ParseGradeError(pub String);

impl FromStr for LetterGrade {
    type Err = ParseGradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        LetterGrade::ALL
            .into_iter()
            .find(|grade| grade.symbol().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseGradeError(s.to_string()))
    }
}

/// A grading scale: its ceiling value plus the points each grade is worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeScale {
    pub scale: f64,
    pub grades: BTreeMap<LetterGrade, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub credit_hours: f64,
    pub grade: LetterGrade,
    /// Cached under the active scale when the grade or the scale last changed.
    pub grade_point: f64,
}

/// Caller-supplied course fields; id and grade point are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseInput {
    pub name: String,
    pub credit_hours: f64,
    pub grade: LetterGrade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Semester {
    pub id: Uuid,
    pub name: String,
    pub courses: Vec<Course>,
    pub gpa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub active_grade_scale: GradeScale,
    pub grade_scales: Vec<GradeScale>,
}

impl Default for AppSettings {
    fn default() -> Self {
        let grade_scales = scale::default_grade_scales();
        Self {
            active_grade_scale: grade_scales[0].clone(),
            grade_scales,
        }
    }
}

/// The whole academic record. This is the only thing that gets persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub semesters: Vec<Semester>,
    pub settings: AppSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_parse_from_their_symbols() {
        for grade in LetterGrade::ALL {
            assert_eq!(grade.symbol().parse::<LetterGrade>(), Ok(grade));
        }
        assert_eq!(" b+ ".parse::<LetterGrade>(), Ok(LetterGrade::BPlus));
        assert_eq!(
            "Z".parse::<LetterGrade>(),
            Err(ParseGradeError("Z".to_string()))
        );
    }

    #[test]
    fn default_record_is_empty_on_four_point_scale() {
        let data = AppData::default();
        assert!(data.semesters.is_empty());
        assert_eq!(data.settings.active_grade_scale.scale, 4.0);
        assert_eq!(data.settings.grade_scales.len(), 2);
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let semester = Semester {
            id: Uuid::new_v4(),
            name: "Fall 2025".to_string(),
            courses: vec![Course {
                id: Uuid::new_v4(),
                name: "Algorithms".to_string(),
                credit_hours: 3.0,
                grade: LetterGrade::AMinus,
                grade_point: 3.5,
            }],
            gpa: 3.5,
        };
        let data = AppData {
            semesters: vec![semester],
            settings: AppSettings::default(),
        };

        let value = serde_json::to_value(&data).unwrap();
        let course = &value["semesters"][0]["courses"][0];
        assert_eq!(course["creditHours"], 3.0);
        assert_eq!(course["gradePoint"], 3.5);
        assert_eq!(course["grade"], "A-");
        assert_eq!(value["settings"]["activeGradeScale"]["scale"], 4.0);
        assert_eq!(value["settings"]["activeGradeScale"]["grades"]["B+"], 3.25);
        assert_eq!(value["settings"]["gradeScales"][1]["scale"], 5.0);
    }

    #[test]
    fn unknown_grade_symbol_fails_to_deserialize() {
        let raw = r#"{"id":"3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2","name":"X","creditHours":3,"grade":"Z","gradePoint":0}"#;
        assert!(serde_json::from_str::<Course>(raw).is_err());
    }
}

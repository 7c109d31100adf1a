use std::collections::BTreeMap;

use crate::models::{GradeScale, LetterGrade};

const FOUR_POINT: [(LetterGrade, f64); 12] = [
    (LetterGrade::APlus, 4.0),
    (LetterGrade::A, 3.75),
    (LetterGrade::AMinus, 3.5),
    (LetterGrade::BPlus, 3.25),
    (LetterGrade::B, 3.0),
    (LetterGrade::BMinus, 2.75),
    (LetterGrade::CPlus, 2.5),
    (LetterGrade::C, 2.25),
    (LetterGrade::CMinus, 2.0),
    (LetterGrade::DPlus, 1.75),
    (LetterGrade::D, 1.5),
    (LetterGrade::F, 0.0),
];

const FIVE_POINT: [(LetterGrade, f64); 12] = [
    (LetterGrade::APlus, 5.0),
    (LetterGrade::A, 5.0),
    (LetterGrade::AMinus, 4.7),
    (LetterGrade::BPlus, 4.3),
    (LetterGrade::B, 4.0),
    (LetterGrade::BMinus, 3.7),
    (LetterGrade::CPlus, 3.3),
    (LetterGrade::C, 3.0),
    (LetterGrade::CMinus, 2.7),
    (LetterGrade::DPlus, 2.3),
    (LetterGrade::D, 2.0),
    (LetterGrade::F, 0.0),
];

fn build_scale(scale: f64, table: &[(LetterGrade, f64)]) -> GradeScale {
    GradeScale {
        scale,
        grades: table.iter().copied().collect::<BTreeMap<_, _>>(),
    }
}

/// The built-in scales, 4.0 first. The first entry is the default active scale.
pub fn default_grade_scales() -> Vec<GradeScale> {
    vec![build_scale(4.0, &FOUR_POINT), build_scale(5.0, &FIVE_POINT)]
}

/// Points for `grade` under `scale`. A grade the scale does not list is worth 0.
pub fn resolve(grade: LetterGrade, scale: &GradeScale) -> f64 {
    scale.grades.get(&grade).copied().unwrap_or(0.0)
}

/// Like [`resolve`] for raw text. Only an exact grade symbol matches, so
/// case or whitespace variants are worth 0 like any other unknown key.
pub fn resolve_symbol(symbol: &str, scale: &GradeScale) -> f64 {
    LetterGrade::ALL
        .into_iter()
        .find(|grade| grade.symbol() == symbol)
        .map(|grade| resolve(grade, scale))
        .unwrap_or(0.0)
}

//! Exam and grade models and DTOs.

use crate::ids::{EnrollmentId, ExamId, GradeId, SectionId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An assessment belonging to a class section.
///
/// `weight` is a percentage; the weights of a section's exams are meant
/// to total 100, and exam creation rejects anything that would push the
/// sum past that.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq)]
pub struct Exam {
    pub id: ExamId,
    pub class_id: SectionId,
    pub name: String,
    pub max_score: f64,
    pub weight: f64,
}

/// DTO for creating an exam.
#[derive(Deserialize, Debug, Clone)]
pub struct CreateExamDto {
    pub id: ExamId,
    pub class_id: SectionId,
    pub name: String,
    pub max_score: f64,
    pub weight: f64,
}

/// A recorded score for one enrollment on one exam.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq)]
pub struct Grade {
    pub id: GradeId,
    pub enrollment_id: EnrollmentId,
    pub exam_id: ExamId,
    pub final_score: f64,
    pub letter_score: String,
    pub notes: Option<String>,
}

/// DTO for recording a grade.
#[derive(Deserialize, Debug, Clone)]
pub struct RecordGradeDto {
    pub id: GradeId,
    pub enrollment_id: EnrollmentId,
    pub exam_id: ExamId,
    pub final_score: f64,
    pub letter_score: String,
    pub notes: Option<String>,
}

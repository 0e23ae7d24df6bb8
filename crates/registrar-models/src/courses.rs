//! Course models and DTOs.

use crate::ids::{CourseId, DepartmentId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A course in a department's catalog.
///
/// Hours are split into lecture (theory) and lab (practice) components;
/// both are plain integer hour counts.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub department_id: DepartmentId,
    pub name: String,
    pub credits: i32,
    pub theory_hours: i32,
    pub practice_hours: i32,
    pub description: String,
}

/// DTO for creating a course.
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateCourseDto {
    pub id: CourseId,
    pub department_id: DepartmentId,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1))]
    pub credits: i32,
    #[validate(range(min = 0))]
    pub theory_hours: i32,
    #[validate(range(min = 0))]
    pub practice_hours: i32,
    pub description: String,
}

//! Class section models and DTOs.
//!
//! A class section binds a course offering to a lecturer, term, and
//! room for a date range, with a fixed enrollment capacity and an
//! encoded weekly time slot.

use crate::ids::{CourseId, RoomId, SectionId, TermId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A scheduled offering of a course.
///
/// `schedule` is an opaque encoded time slot; two sections collide when
/// they carry the same slot over overlapping date ranges.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct ClassSection {
    pub id: SectionId,
    pub course_id: CourseId,
    pub lecturer_id: UserId,
    pub term_id: TermId,
    pub room_id: RoomId,
    pub max_students: i32,
    pub schedule: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// DTO for creating a class section.
///
/// The service validates the date order, the capacity, and
/// lecturer/room availability before inserting.
#[derive(Deserialize, Debug, Clone)]
pub struct CreateSectionDto {
    pub id: SectionId,
    pub course_id: CourseId,
    pub lecturer_id: UserId,
    pub term_id: TermId,
    pub room_id: RoomId,
    pub max_students: i32,
    pub schedule: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

//! # Registrar Models
//!
//! Domain models and DTOs for the Registrar service layer.
//!
//! This crate provides all data structures used throughout the
//! application: database entities, write DTOs, strongly-typed IDs, and
//! validated value types.
//!
//! # Modules
//!
//! - [`ids`]: strongly-typed ID newtypes for every entity
//! - [`value_types`]: validated value types (email addresses)
//! - [`users`]: user identity, roles, and role profiles
//! - [`departments`] / [`courses`] / [`terms`] / [`rooms`]: the
//!   organizational catalog
//! - [`sections`]: class section scheduling
//! - [`enrollments`]: enrollments and attendance
//! - [`exams`]: exams and grades
//!
//! # Example
//!
//! ```ignore
//! use registrar_models::users::{CreateUserDto, Role};
//! use registrar_models::{Email, UserId};
//!
//! let dto = CreateUserDto {
//!     id: UserId::new("lect042"),
//!     email: "ada@example.com".parse::<Email>()?,
//!     role: Role::Lecturer,
//!     full_name: "Ada Lovelace".to_string(),
//!     date_of_birth: None,
//!     password: "correct horse".to_string(),
//! };
//! ```

pub mod courses;
pub mod departments;
pub mod enrollments;
pub mod exams;
pub mod ids;
pub mod rooms;
pub mod sections;
pub mod terms;
pub mod users;
pub mod value_types;

// Re-export commonly used types at crate root for convenience
pub use ids::{
    AttendanceId, CourseId, DepartmentId, EnrollmentId, ExamId, GradeId, RoomId, SectionId,
    TermId, UserId,
};
pub use value_types::Email;

//! Feature modules.
//!
//! Every module exposes a unit-struct service whose associated
//! functions take the pool explicitly; `model.rs` files re-export the
//! corresponding types from `registrar-models`.

pub mod courses;
pub mod departments;
pub mod enrollments;
pub mod exams;
pub mod identity;
pub mod rooms;
pub mod sections;
pub mod terms;

//! Department models and DTOs.

use crate::ids::DepartmentId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A department: the organizational unit lecturers and courses belong to.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

/// DTO for creating a department.
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateDepartmentDto {
    pub id: DepartmentId,
    #[validate(length(min = 1))]
    pub name: String,
}

//! Academic term models and DTOs.

use crate::ids::TermId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// An academic term (semester) class sections are scheduled into.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: TermId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// DTO for creating a term. The service rejects `start_date >= end_date`.
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateTermDto {
    pub id: TermId,
    #[validate(length(min = 1))]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

//! Enrollment and attendance models and DTOs.

use crate::ids::{AttendanceId, EnrollmentId, SectionId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, FromRow, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;

/// Enrollment lifecycle state, stored as lowercase text.
///
/// Withdrawal is the soft-delete of this schema: withdrawn rows stay
/// behind for the attendance and grade history they anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Withdrawn,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown enrollment status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnrollmentStatusError(pub String);

impl std::error::Error for ParseEnrollmentStatusError {}

impl fmt::Display for ParseEnrollmentStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown enrollment status: {}", self.0)
    }
}

impl FromStr for EnrollmentStatus {
    type Err = ParseEnrollmentStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "withdrawn" => Ok(Self::Withdrawn),
            other => Err(ParseEnrollmentStatusError(other.to_owned())),
        }
    }
}

// SQLx Type implementation - statuses travel as text
impl Type<sqlx::Postgres> for EnrollmentStatus {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for EnrollmentStatus {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as Encode<'q, sqlx::Postgres>>::encode(self.as_str().to_owned(), buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for EnrollmentStatus {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(s.parse::<EnrollmentStatus>()?)
    }
}

impl PgHasArrayType for EnrollmentStatus {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }
}

/// A student's membership in a class section.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: UserId,
    pub class_id: SectionId,
    pub status: EnrollmentStatus,
}

/// DTO for enrolling a student into a class section.
#[derive(Deserialize, Debug, Clone)]
pub struct EnrollDto {
    pub id: EnrollmentId,
    pub student_id: UserId,
    pub class_id: SectionId,
}

/// One attendance record. `status` is true when the student was present.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Attendance {
    pub id: AttendanceId,
    pub enrollment_id: EnrollmentId,
    pub date: NaiveDate,
    pub status: bool,
}

/// DTO for recording attendance on a date.
///
/// Recording twice for the same (enrollment, date) overwrites the
/// earlier status rather than duplicating the row.
#[derive(Deserialize, Debug, Clone)]
pub struct RecordAttendanceDto {
    pub id: AttendanceId,
    pub enrollment_id: EnrollmentId,
    pub date: NaiveDate,
    pub present: bool,
}

//! User identity models and DTOs.
//!
//! A user row carries the authentication identity and a role
//! discriminator; the role-specific attributes live in one of the three
//! profile tables (admins, lecturers, students). A given user occupies
//! exactly one profile - the service layer enforces this, the schema
//! does not.

use crate::ids::{DepartmentId, UserId};
use crate::value_types::Email;
use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, FromRow, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// The role discriminator stored on every user row.
///
/// Stored as lowercase text; the set is closed by convention, not by a
/// database constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Lecturer,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Lecturer => "lecturer",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(pub String);

impl std::error::Error for ParseRoleError {}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "lecturer" => Ok(Self::Lecturer),
            "student" => Ok(Self::Student),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}

// SQLx Type implementation - roles travel as text
impl Type<sqlx::Postgres> for Role {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as Encode<'q, sqlx::Postgres>>::encode(self.as_str().to_owned(), buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for Role {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(s.parse::<Role>()?)
    }
}

impl PgHasArrayType for Role {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }
}

/// A user in the system.
///
/// This struct represents the core user entity stored in the database.
/// The password digest never leaves the identity service, so it is not
/// part of this struct.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
    pub full_name: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
}

/// DTO for creating a new user.
///
/// The id is assigned by the caller; the password arrives raw and is
/// hashed before it touches the store.
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDto {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
    #[validate(length(min = 1))]
    pub full_name: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Administrator profile row.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub user_id: UserId,
}

/// Lecturer profile row.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Lecturer {
    pub user_id: UserId,
    pub department_id: Option<DepartmentId>,
    pub position: String,
}

/// Student profile row. `status` is the active/inactive flag.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub user_id: UserId,
    pub department_id: DepartmentId,
    pub entry_year: i32,
    pub status: bool,
}

/// DTO for attaching a lecturer profile to an existing user.
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateLecturerDto {
    pub user_id: UserId,
    pub department_id: Option<DepartmentId>,
    #[validate(length(min = 1))]
    pub position: String,
}

/// DTO for attaching a student profile to an existing user.
#[derive(Deserialize, Debug, Clone)]
pub struct CreateStudentDto {
    pub user_id: UserId,
    pub department_id: DepartmentId,
    pub entry_year: i32,
    pub status: bool,
}

/// Role-specific attributes of a resolved identity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Admin,
    Lecturer {
        department_id: Option<DepartmentId>,
        position: String,
    },
    Student {
        department_id: DepartmentId,
        entry_year: i32,
        status: bool,
    },
}

/// A user together with their resolved role profile.
///
/// Callers get the tagged variant instead of issuing separate joined
/// queries against the profile tables.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: User,
    pub profile: RoleProfile,
}

/// The fixed identity of the bootstrap administrator.
///
/// `ensure_admin_exists` inserts exactly this user when no admin is
/// present. The fixed id and email double as the concurrency guard: a
/// racing invocation collides on the unique constraints and becomes a
/// no-op.
pub mod default_admin {
    pub const ID: &str = "admin01";
    pub const EMAIL: &str = "admin@example.com";
    pub const FULL_NAME: &str = "System Administrator";
    pub const PASSWORD: &str = "Admin123";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Lecturer, Role::Student] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_unknown() {
        let err = "registrar".parse::<Role>().unwrap_err();
        assert_eq!(err, ParseRoleError("registrar".to_owned()));
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Lecturer).unwrap(), r#""lecturer""#);
        let role: Role = serde_json::from_str(r#""student""#).unwrap();
        assert_eq!(role, Role::Student);
    }

    #[test]
    fn test_create_user_dto_validation() {
        let dto = CreateUserDto {
            id: UserId::new("stu0001"),
            email: Email::new("jane@example.com").unwrap(),
            role: Role::Student,
            full_name: "Jane Doe".to_string(),
            date_of_birth: None,
            password: "longenough".to_string(),
        };
        assert!(dto.validate().is_ok());

        let short_password = CreateUserDto {
            password: "short".to_string(),
            ..dto.clone()
        };
        assert!(short_password.validate().is_err());

        let empty_name = CreateUserDto {
            full_name: String::new(),
            ..dto
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_role_profile_tagged_serialization() {
        let profile = RoleProfile::Lecturer {
            department_id: Some(DepartmentId::new("dept01")),
            position: "Senior Lecturer".to_string(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["role"], "lecturer");
        assert_eq!(json["department_id"], "dept01");
    }
}

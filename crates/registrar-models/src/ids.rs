//! Strongly-typed ID newtypes for domain entities.
//!
//! This module provides newtype wrappers around the short opaque string
//! identifiers used as primary keys, preventing accidental misuse of IDs
//! (e.g., passing a `CourseId` where a `UserId` is expected).
//! Identifiers are assigned by the caller, never generated here; the
//! storage layer reserves 15 characters but no length rule is enforced
//! at this boundary.
//!
//! # Example
//!
//! ```ignore
//! use registrar_models::ids::{DepartmentId, UserId};
//!
//! fn get_user(id: &UserId) { /* ... */ }
//! fn get_department(id: &DepartmentId) { /* ... */ }
//!
//! let user_id = UserId::new("stu0042");
//! let department_id = DepartmentId::new("dept01");
//!
//! get_user(&user_id);          // OK
//! // get_user(&department_id); // Compile error! Type mismatch.
//! ```

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;

/// Macro to define a strongly-typed ID newtype.
///
/// Generates a newtype wrapper around `String` with the trait
/// implementations needed for database operations and serialization.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an ID from a caller-assigned identifier.
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner String.
            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            #[inline]
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }

        // SQLx Type implementation for Postgres
        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        // SQLx Encode implementation
        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        // SQLx Decode implementation
        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <String as Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }

        // SQLx array type support for Postgres
        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <String as PgHasArrayType>::array_type_info()
            }
        }
    };
}

// Define all entity ID types
define_id!(
    /// Strongly-typed ID for User entities (also keys the role profile
    /// tables: admins, lecturers, students).
    UserId
);

define_id!(
    /// Strongly-typed ID for Department entities.
    DepartmentId
);

define_id!(
    /// Strongly-typed ID for Course entities.
    CourseId
);

define_id!(
    /// Strongly-typed ID for Term entities.
    TermId
);

define_id!(
    /// Strongly-typed ID for Room entities.
    RoomId
);

define_id!(
    /// Strongly-typed ID for ClassSection entities.
    SectionId
);

define_id!(
    /// Strongly-typed ID for Enrollment entities.
    EnrollmentId
);

define_id!(
    /// Strongly-typed ID for Attendance entities.
    AttendanceId
);

define_id!(
    /// Strongly-typed ID for Exam entities.
    ExamId
);

define_id!(
    /// Strongly-typed ID for Grade entities.
    GradeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = UserId::new("admin01");
        assert_eq!(id.as_str(), "admin01");
    }

    #[test]
    fn test_id_equality() {
        let id1 = CourseId::new("crs001");
        let id2 = CourseId::new("crs001");
        assert_eq!(id1, id2);
        assert_ne!(id1, CourseId::new("crs002"));
    }

    #[test]
    fn test_id_inequality_same_value_different_types() {
        // Same string, different types - these must NOT be comparable.
        let _user_id = UserId::new("x01");
        let _dept_id = DepartmentId::new("x01");
        // If this compiled: assert_ne!(user_id, dept_id);
        // It won't compile because they're different types - which is the point!
    }

    #[test]
    fn test_id_debug() {
        let id = UserId::new("stu0042");
        assert_eq!(format!("{:?}", id), "UserId(stu0042)");
    }

    #[test]
    fn test_id_display() {
        let id = RoomId::new("room-a1");
        assert_eq!(format!("{}", id), "room-a1");
    }

    #[test]
    fn test_id_from_str() {
        let id: TermId = "2025-fall".parse().unwrap();
        assert_eq!(id.as_str(), "2025-fall");
    }

    #[test]
    fn test_id_conversion_roundtrip() {
        let id: SectionId = String::from("sec001").into();
        let recovered: String = id.into();
        assert_eq!(recovered, "sec001");
    }

    #[test]
    fn test_id_serialize() {
        let id = ExamId::new("exm001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""exm001""#);
    }

    #[test]
    fn test_id_deserialize() {
        let id: GradeId = serde_json::from_str(r#""grd001""#).unwrap();
        assert_eq!(id.as_str(), "grd001");
    }

    #[test]
    fn test_id_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(EnrollmentId::new("enr001"));
        set.insert(EnrollmentId::new("enr002"));
        assert_eq!(set.len(), 2);
        set.insert(EnrollmentId::new("enr001")); // Duplicate
        assert_eq!(set.len(), 2);
    }
}

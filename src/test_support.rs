//! Shared fixtures for service tests.
//!
//! Fixture rows are inserted directly so each test exercises only the
//! service under test; the password column gets a placeholder digest
//! because none of the fixtures ever log in.

use chrono::NaiveDate;
use sqlx::PgPool;

use registrar_models::ids::UserId;
use registrar_models::sections::CreateSectionDto;
use registrar_models::users::Role;

pub async fn create_test_department(pool: &PgPool, id: &str) {
    sqlx::query("INSERT INTO departments (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(format!("Department {id}"))
        .execute(pool)
        .await
        .unwrap();
}

pub async fn create_test_user(pool: &PgPool, id: &str, email: &str, role: Role) -> UserId {
    sqlx::query(
        r#"INSERT INTO users (id, email, password, role, full_name)
           VALUES ($1, $2, 'not-a-real-digest', $3, 'Test User')"#,
    )
    .bind(id)
    .bind(email)
    .bind(role)
    .execute(pool)
    .await
    .unwrap();

    UserId::new(id)
}

pub async fn create_test_lecturer(pool: &PgPool, id: &str) {
    create_test_user(pool, id, &format!("{id}@example.com"), Role::Lecturer).await;
    sqlx::query("INSERT INTO lecturers (user_id, department_id, position) VALUES ($1, 'dept01', 'Lecturer')")
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn create_test_student(pool: &PgPool, id: &str) {
    create_test_user(pool, id, &format!("{id}@example.com"), Role::Student).await;
    sqlx::query(
        "INSERT INTO students (user_id, department_id, entry_year, status) VALUES ($1, 'dept01', 2024, TRUE)",
    )
    .bind(id)
    .execute(pool)
    .await
    .unwrap();
}

/// Department, course, term, two rooms, and two lecturers - everything a
/// class section references.
pub async fn setup_catalog(pool: &PgPool) {
    create_test_department(pool, "dept01").await;

    sqlx::query(
        r#"INSERT INTO courses (id, department_id, name, credits, theory_hours, practice_hours, description)
           VALUES ('crs001', 'dept01', 'Data Structures', 3, 30, 15, 'Lists, trees, and graphs.')"#,
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO terms (id, name, start_date, end_date) VALUES ('2025-fall', 'Fall 2025', '2025-09-01', '2025-12-20')",
    )
    .execute(pool)
    .await
    .unwrap();

    for room in ["room-a1", "room-b2"] {
        sqlx::query("INSERT INTO rooms (id, name, location) VALUES ($1, $1, 'Main Building')")
            .bind(room)
            .execute(pool)
            .await
            .unwrap();
    }

    create_test_lecturer(pool, "lect001").await;
    create_test_lecturer(pool, "lect002").await;
}

/// A ready-to-insert section DTO against the `setup_catalog` fixtures.
pub fn section_dto(id: &str, max_students: i32) -> CreateSectionDto {
    CreateSectionDto {
        id: id.into(),
        course_id: "crs001".into(),
        lecturer_id: "lect001".into(),
        term_id: "2025-fall".into(),
        room_id: "room-a1".into(),
        max_students,
        schedule: 101,
        start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
    }
}

/// Insert a section row directly, sidestepping the scheduling checks so
/// fixtures can share rooms and lecturers freely.
pub async fn create_test_section(pool: &PgPool, id: &str, max_students: i32) {
    sqlx::query(
        r#"INSERT INTO class_sections
               (id, course_id, lecturer_id, term_id, room_id, max_students, schedule, start_date, end_date)
           VALUES ($1, 'crs001', 'lect001', '2025-fall', 'room-a1', $2, 101, '2025-09-01', '2025-12-20')"#,
    )
    .bind(id)
    .bind(max_students)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn create_test_enrollment(pool: &PgPool, id: &str, student_id: &str, class_id: &str) {
    sqlx::query("INSERT INTO enrollments (id, student_id, class_id, status) VALUES ($1, $2, $3, 'active')")
        .bind(id)
        .bind(student_id)
        .bind(class_id)
        .execute(pool)
        .await
        .unwrap();
}

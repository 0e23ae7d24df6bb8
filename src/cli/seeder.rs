//! Demo-data seeding.
//!
//! Generates a small, coherent campus: departments, courses, one term,
//! rooms, lecturer and student accounts, class sections, and
//! enrollments. Accounts are batch-inserted with one shared digest;
//! sections and enrollments go through the service layer so the
//! scheduling and capacity invariants hold for the seeded data too.

use chrono::NaiveDate;
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use sqlx::PgPool;
use std::time::Instant;

use registrar_core::{AppError, hash_password};
use registrar_models::ids::{CourseId, DepartmentId, RoomId, SectionId, TermId, UserId};
use registrar_models::sections::CreateSectionDto;
use registrar_models::users::Role;

use crate::modules::courses::model::CreateCourseDto;
use crate::modules::courses::service::CourseService;
use crate::modules::departments::model::CreateDepartmentDto;
use crate::modules::departments::service::DepartmentService;
use crate::modules::enrollments::model::EnrollDto;
use crate::modules::enrollments::service::EnrollmentService;
use crate::modules::rooms::model::CreateRoomDto;
use crate::modules::rooms::service::RoomService;
use crate::modules::sections::service::SectionService;
use crate::modules::terms::model::CreateTermDto;
use crate::modules::terms::service::TermService;

/// Password every seeded account starts with.
pub const SEED_PASSWORD: &str = "Password123";

const DEPARTMENT_NAMES: &[&str] = &[
    "Computer Science",
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Economics",
    "History",
    "Linguistics",
];

/// Complete configuration for demo seeding.
#[derive(Clone)]
pub struct SeedConfig {
    pub departments: usize,
    pub courses_per_department: usize,
    pub lecturers_per_department: usize,
    pub students_per_department: usize,
    pub rooms: usize,
    pub enrollments_per_section: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            departments: 3,
            courses_per_department: 2,
            lecturers_per_department: 2,
            students_per_department: 10,
            rooms: 4,
            enrollments_per_section: 5,
        }
    }
}

impl SeedConfig {
    /// Creates a new seed configuration with the specified number of
    /// departments.
    pub fn new(departments: usize) -> Self {
        Self {
            departments,
            ..Default::default()
        }
    }

    /// Total number of seeded accounts.
    pub fn total_users(&self) -> usize {
        self.departments * (self.lecturers_per_department + self.students_per_department)
    }
}

struct UserSeed {
    id: String,
    full_name: String,
    email: String,
    role: Role,
    department_id: DepartmentId,
}

fn generate_users(
    department_ids: &[DepartmentId],
    per_department: usize,
    role: Role,
    id_prefix: &str,
) -> Vec<UserSeed> {
    let mut users = Vec::with_capacity(department_ids.len() * per_department);

    for (dept_idx, department_id) in department_ids.iter().enumerate() {
        for user_idx in 0..per_department {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let serial = dept_idx * 100 + user_idx;

            users.push(UserSeed {
                id: format!("{id_prefix}{serial:04}"),
                full_name: format!("{first_name} {last_name}"),
                email: format!(
                    "{}.{}+{}{}@example.com",
                    first_name.to_lowercase(),
                    last_name.to_lowercase(),
                    id_prefix,
                    serial
                ),
                role,
                department_id: department_id.clone(),
            });
        }
    }

    users
}

/// Seeds everything in dependency order.
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), AppError> {
    let department_ids = seed_departments(db, config.departments).await?;
    let course_ids = seed_courses(db, &department_ids, config.courses_per_department).await?;
    let term_id = seed_term(db).await?;
    let room_ids = seed_rooms(db, config.rooms).await?;

    let lecturer_ids = seed_accounts(
        db,
        &department_ids,
        config.lecturers_per_department,
        Role::Lecturer,
        "lect",
    )
    .await?;
    let student_ids = seed_accounts(
        db,
        &department_ids,
        config.students_per_department,
        Role::Student,
        "stu",
    )
    .await?;

    let section_ids = seed_sections(db, &course_ids, &lecturer_ids, &term_id, &room_ids).await?;
    seed_enrollments(db, &section_ids, &student_ids, config.enrollments_per_section).await?;

    println!(
        "✅ Seeded {} departments, {} courses, {} sections, {} users",
        department_ids.len(),
        course_ids.len(),
        section_ids.len(),
        config.total_users()
    );

    Ok(())
}

async fn seed_departments(db: &PgPool, count: usize) -> Result<Vec<DepartmentId>, AppError> {
    let start_time = Instant::now();
    println!("🏛️  Seeding {} departments...", count);

    let mut ids = Vec::with_capacity(count);
    for idx in 0..count {
        let name = DEPARTMENT_NAMES
            .get(idx)
            .map(|n| n.to_string())
            .unwrap_or_else(|| format!("Department {}", idx + 1));

        let department = DepartmentService::create_department(
            db,
            CreateDepartmentDto {
                id: DepartmentId::new(format!("dept{:02}", idx + 1)),
                name,
            },
        )
        .await?;
        ids.push(department.id);
    }

    println!("   ✓ Inserted {} departments in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

async fn seed_courses(
    db: &PgPool,
    department_ids: &[DepartmentId],
    per_department: usize,
) -> Result<Vec<CourseId>, AppError> {
    let start_time = Instant::now();
    println!("📚 Seeding {} courses...", department_ids.len() * per_department);

    let mut ids = Vec::new();
    for (dept_idx, department_id) in department_ids.iter().enumerate() {
        for course_idx in 0..per_department {
            let course = CourseService::create_course(
                db,
                CreateCourseDto {
                    id: CourseId::new(format!("crs{:02}{:02}", dept_idx + 1, course_idx + 1)),
                    department_id: department_id.clone(),
                    name: format!("Course {}-{}", dept_idx + 1, course_idx + 1),
                    credits: 3,
                    theory_hours: 30,
                    practice_hours: 15,
                    description: "Seeded demo course.".to_string(),
                },
            )
            .await?;
            ids.push(course.id);
        }
    }

    println!("   ✓ Inserted {} courses in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

async fn seed_term(db: &PgPool) -> Result<TermId, AppError> {
    let term = TermService::create_term(
        db,
        CreateTermDto {
            id: TermId::new("2025-fall"),
            name: "Fall Semester 2025".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 20).expect("valid date"),
        },
    )
    .await?;

    println!("🗓️  Seeded term {}", term.id);
    Ok(term.id)
}

async fn seed_rooms(db: &PgPool, count: usize) -> Result<Vec<RoomId>, AppError> {
    let start_time = Instant::now();
    println!("🚪 Seeding {} rooms...", count);

    let mut ids = Vec::with_capacity(count);
    for idx in 0..count {
        let room = RoomService::create_room(
            db,
            CreateRoomDto {
                id: RoomId::new(format!("room{:02}", idx + 1)),
                name: format!("Room {}", idx + 1),
                location: format!("Main Building, Floor {}", idx / 10 + 1),
            },
        )
        .await?;
        ids.push(room.id);
    }

    println!("   ✓ Inserted {} rooms in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

/// Batch-inserts accounts and their role profiles.
///
/// One digest is computed and shared across the batch; hashing per
/// account would dominate the seeding time for no benefit in demo data.
async fn seed_accounts(
    db: &PgPool,
    department_ids: &[DepartmentId],
    per_department: usize,
    role: Role,
    id_prefix: &str,
) -> Result<Vec<UserId>, AppError> {
    let start_time = Instant::now();
    let users = generate_users(department_ids, per_department, role, id_prefix);
    println!("👥 Seeding {} {} accounts...", users.len(), role);

    let password_hash = hash_password(SEED_PASSWORD)?;

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(users.len());

    for user in &users {
        sqlx::query(
            r#"INSERT INTO users (id, email, password, role, full_name)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&password_hash)
        .bind(user.role)
        .bind(&user.full_name)
        .execute(&mut *tx)
        .await?;

        match role {
            Role::Lecturer => {
                sqlx::query(
                    "INSERT INTO lecturers (user_id, department_id, position) VALUES ($1, $2, 'Lecturer')",
                )
                .bind(&user.id)
                .bind(&user.department_id)
                .execute(&mut *tx)
                .await?;
            }
            Role::Student => {
                sqlx::query(
                    "INSERT INTO students (user_id, department_id, entry_year, status) VALUES ($1, $2, 2025, TRUE)",
                )
                .bind(&user.id)
                .bind(&user.department_id)
                .execute(&mut *tx)
                .await?;
            }
            Role::Admin => {
                sqlx::query("INSERT INTO admins (user_id) VALUES ($1)")
                    .bind(&user.id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        ids.push(UserId::new(user.id.clone()));
    }

    tx.commit().await?;

    println!("   ✓ Inserted {} accounts in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

/// One section per course, round-robin over lecturers and rooms, each
/// on its own schedule slot so nothing double-books.
async fn seed_sections(
    db: &PgPool,
    course_ids: &[CourseId],
    lecturer_ids: &[UserId],
    term_id: &TermId,
    room_ids: &[RoomId],
) -> Result<Vec<SectionId>, AppError> {
    let start_time = Instant::now();
    println!("🧩 Seeding {} class sections...", course_ids.len());

    let mut ids = Vec::with_capacity(course_ids.len());
    for (idx, course_id) in course_ids.iter().enumerate() {
        let section = SectionService::create_section(
            db,
            CreateSectionDto {
                id: SectionId::new(format!("sec{:03}", idx + 1)),
                course_id: course_id.clone(),
                lecturer_id: lecturer_ids[idx % lecturer_ids.len()].clone(),
                term_id: term_id.clone(),
                room_id: room_ids[idx % room_ids.len()].clone(),
                max_students: 30,
                schedule: 100 + idx as i32,
                start_date: NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date"),
                end_date: NaiveDate::from_ymd_opt(2025, 12, 20).expect("valid date"),
            },
        )
        .await?;
        ids.push(section.id);
    }

    println!("   ✓ Inserted {} sections in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

/// Enrolls students round-robin through the service layer, so the
/// capacity and duplicate checks apply to seeded data too.
async fn seed_enrollments(
    db: &PgPool,
    section_ids: &[SectionId],
    student_ids: &[UserId],
    per_section: usize,
) -> Result<(), AppError> {
    if student_ids.is_empty() || section_ids.is_empty() {
        return Ok(());
    }

    let start_time = Instant::now();
    println!("🎓 Seeding up to {} enrollments per section...", per_section);

    let mut serial = 0usize;
    for (section_idx, section_id) in section_ids.iter().enumerate() {
        for slot in 0..per_section {
            let student = &student_ids[(section_idx + slot * 7) % student_ids.len()];
            serial += 1;

            let result = EnrollmentService::enroll(
                db,
                EnrollDto {
                    id: format!("enr{serial:05}").into(),
                    student_id: student.clone(),
                    class_id: section_id.clone(),
                },
            )
            .await;

            match result {
                Ok(_) => {}
                // Round-robin may hand a section the same student twice
                Err(AppError::DuplicateEnrollment) => {}
                Err(e) => return Err(e),
            }
        }
    }

    println!("   ✓ Enrolled in {:?}", start_time.elapsed());
    Ok(())
}

use sqlx::PgPool;
use tracing::instrument;
use validator::Validate;

use registrar_core::AppError;
use registrar_models::ids::CourseId;

use crate::modules::courses::model::{Course, CreateCourseDto};

const COURSE_COLUMNS: &str =
    "id, department_id, name, credits, theory_hours, practice_hours, description";

pub struct CourseService;

impl CourseService {
    /// Create a course in a department's catalog.
    #[instrument(skip(db, dto), fields(course_id = %dto.id))]
    pub async fn create_course(db: &PgPool, dto: CreateCourseDto) -> Result<Course, AppError> {
        dto.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let course = sqlx::query_as::<_, Course>(&format!(
            r#"INSERT INTO courses (id, department_id, name, credits, theory_hours, practice_hours, description)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {COURSE_COLUMNS}"#,
        ))
        .bind(&dto.id)
        .bind(&dto.department_id)
        .bind(&dto.name)
        .bind(dto.credits)
        .bind(dto.theory_hours)
        .bind(dto.practice_hours)
        .bind(&dto.description)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::duplicate_key(format!("course id {}", dto.id));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found("department");
                }
            }
            AppError::from(e)
        })?;

        Ok(course)
    }

    /// Fetch a course by id.
    #[instrument(skip(db))]
    pub async fn get_course(db: &PgPool, id: &CourseId) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("course"))
    }
}

use sqlx::PgPool;
use tracing::instrument;
use validator::Validate;

use registrar_core::AppError;
use registrar_models::ids::DepartmentId;

use crate::modules::departments::model::{CreateDepartmentDto, Department};

pub struct DepartmentService;

impl DepartmentService {
    /// Create a department.
    #[instrument(skip(db, dto), fields(department_id = %dto.id))]
    pub async fn create_department(
        db: &PgPool,
        dto: CreateDepartmentDto,
    ) -> Result<Department, AppError> {
        dto.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let department = sqlx::query_as::<_, Department>(
            "INSERT INTO departments (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(&dto.id)
        .bind(&dto.name)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::duplicate_key(format!("department id {}", dto.id));
            }
            AppError::from(e)
        })?;

        Ok(department)
    }

    /// Fetch a department by id.
    #[instrument(skip(db))]
    pub async fn get_department(db: &PgPool, id: &DepartmentId) -> Result<Department, AppError> {
        sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("department"))
    }
}

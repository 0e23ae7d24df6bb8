use sqlx::PgPool;
use tracing::instrument;
use validator::Validate;

use registrar_core::AppError;
use registrar_models::ids::TermId;

use crate::modules::terms::model::{CreateTermDto, Term};

pub struct TermService;

impl TermService {
    /// Create an academic term.
    #[instrument(skip(db, dto), fields(term_id = %dto.id))]
    pub async fn create_term(db: &PgPool, dto: CreateTermDto) -> Result<Term, AppError> {
        dto.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        if dto.start_date >= dto.end_date {
            return Err(AppError::validation("start date must be before end date"));
        }

        let term = sqlx::query_as::<_, Term>(
            r#"INSERT INTO terms (id, name, start_date, end_date)
               VALUES ($1, $2, $3, $4)
               RETURNING id, name, start_date, end_date"#,
        )
        .bind(&dto.id)
        .bind(&dto.name)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::duplicate_key(format!("term id {}", dto.id));
            }
            AppError::from(e)
        })?;

        Ok(term)
    }

    /// Fetch a term by id.
    #[instrument(skip(db))]
    pub async fn get_term(db: &PgPool, id: &TermId) -> Result<Term, AppError> {
        sqlx::query_as::<_, Term>("SELECT id, name, start_date, end_date FROM terms WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("term"))
    }
}

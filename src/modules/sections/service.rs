use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::instrument;

use registrar_core::AppError;
use registrar_models::ids::SectionId;

use crate::modules::sections::model::{ClassSection, CreateSectionDto};

const SECTION_COLUMNS: &str = "id, course_id, lecturer_id, term_id, room_id, max_students, \
                               schedule, start_date, end_date";

pub struct SectionService;

impl SectionService {
    /// Check if two date ranges overlap.
    fn dates_overlap(
        start1: NaiveDate,
        end1: NaiveDate,
        start2: NaiveDate,
        end2: NaiveDate,
    ) -> bool {
        start1 < end2 && start2 < end1
    }

    /// Reject a section whose lecturer or room is already booked for the
    /// same time slot over an overlapping date range.
    async fn validate_no_double_booking(
        db: &PgPool,
        dto: &CreateSectionDto,
    ) -> Result<(), AppError> {
        let candidates = sqlx::query_as::<_, ClassSection>(&format!(
            r#"SELECT {SECTION_COLUMNS}
               FROM class_sections
               WHERE schedule = $1 AND (lecturer_id = $2 OR room_id = $3)"#,
        ))
        .bind(dto.schedule)
        .bind(&dto.lecturer_id)
        .bind(&dto.room_id)
        .fetch_all(db)
        .await?;

        for section in candidates {
            if !Self::dates_overlap(
                dto.start_date,
                dto.end_date,
                section.start_date,
                section.end_date,
            ) {
                continue;
            }

            if section.lecturer_id == dto.lecturer_id {
                return Err(AppError::validation(format!(
                    "lecturer {} is already booked for slot {} by section {} ({} to {})",
                    dto.lecturer_id, dto.schedule, section.id, section.start_date, section.end_date
                )));
            }
            return Err(AppError::validation(format!(
                "room {} is already booked for slot {} by section {} ({} to {})",
                dto.room_id, dto.schedule, section.id, section.start_date, section.end_date
            )));
        }

        Ok(())
    }

    /// Create a class section.
    ///
    /// Validates the date order and capacity before touching the store,
    /// then lecturer/room availability for the requested slot.
    #[instrument(skip(db, dto), fields(section_id = %dto.id))]
    pub async fn create_section(
        db: &PgPool,
        dto: CreateSectionDto,
    ) -> Result<ClassSection, AppError> {
        if dto.start_date >= dto.end_date {
            return Err(AppError::validation("start date must be before end date"));
        }
        if dto.max_students <= 0 {
            return Err(AppError::validation("max_students must be positive"));
        }

        Self::validate_no_double_booking(db, &dto).await?;

        let section = sqlx::query_as::<_, ClassSection>(&format!(
            r#"INSERT INTO class_sections
                   (id, course_id, lecturer_id, term_id, room_id, max_students, schedule, start_date, end_date)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING {SECTION_COLUMNS}"#,
        ))
        .bind(&dto.id)
        .bind(&dto.course_id)
        .bind(&dto.lecturer_id)
        .bind(&dto.term_id)
        .bind(&dto.room_id)
        .bind(dto.max_students)
        .bind(dto.schedule)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::duplicate_key(format!("section id {}", dto.id));
                }
                if db_err.is_foreign_key_violation() {
                    let referenced = if db_err.message().contains("course_id") {
                        "course"
                    } else if db_err.message().contains("lecturer_id") {
                        "lecturer"
                    } else if db_err.message().contains("term_id") {
                        "term"
                    } else {
                        "room"
                    };
                    return AppError::not_found(referenced);
                }
            }
            AppError::from(e)
        })?;

        Ok(section)
    }

    /// Fetch a class section by id.
    #[instrument(skip(db))]
    pub async fn get_section(db: &PgPool, id: &SectionId) -> Result<ClassSection, AppError> {
        sqlx::query_as::<_, ClassSection>(&format!(
            "SELECT {SECTION_COLUMNS} FROM class_sections WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("class section"))
    }
}

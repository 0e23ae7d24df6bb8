use sqlx::PgPool;
use tracing::instrument;

use registrar_core::AppError;
use registrar_models::ids::{EnrollmentId, ExamId};

use crate::modules::enrollments::service::EnrollmentService;
use crate::modules::exams::model::{CreateExamDto, Exam, Grade, RecordGradeDto};

const EXAM_COLUMNS: &str = "id, class_id, name, max_score, weight";
const GRADE_COLUMNS: &str = "id, enrollment_id, exam_id, final_score, letter_score, notes";

/// Slack for floating-point comparison of accumulated weights.
const WEIGHT_TOLERANCE: f64 = 1e-6;

pub struct ExamService;

impl ExamService {
    /// Create an exam for a class section.
    ///
    /// Weights are percentages that total 100 across a section's exams;
    /// anything pushing the sum past 100 is rejected here, at creation
    /// time, under a lock on the section row.
    #[instrument(skip(db, dto), fields(exam_id = %dto.id))]
    pub async fn create_exam(db: &PgPool, dto: CreateExamDto) -> Result<Exam, AppError> {
        if dto.max_score <= 0.0 {
            return Err(AppError::validation("max_score must be positive"));
        }
        if dto.weight <= 0.0 {
            return Err(AppError::validation("weight must be positive"));
        }

        let mut tx = db.begin().await?;

        let section_id =
            sqlx::query_scalar::<_, String>("SELECT id FROM class_sections WHERE id = $1 FOR UPDATE")
                .bind(&dto.class_id)
                .fetch_optional(&mut *tx)
                .await?;
        if section_id.is_none() {
            return Err(AppError::not_found("class section"));
        }

        let existing_weight = sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(SUM(weight), 0) FROM exams WHERE class_id = $1",
        )
        .bind(&dto.class_id)
        .fetch_one(&mut *tx)
        .await?;

        if existing_weight + dto.weight > 100.0 + WEIGHT_TOLERANCE {
            return Err(AppError::validation(format!(
                "exam weights for this class section would total {:.2}%, over 100%",
                existing_weight + dto.weight
            )));
        }

        let exam = sqlx::query_as::<_, Exam>(&format!(
            r#"INSERT INTO exams (id, class_id, name, max_score, weight)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {EXAM_COLUMNS}"#,
        ))
        .bind(&dto.id)
        .bind(&dto.class_id)
        .bind(&dto.name)
        .bind(dto.max_score)
        .bind(dto.weight)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::duplicate_key(format!("exam id {}", dto.id));
            }
            AppError::from(e)
        })?;

        tx.commit().await?;
        Ok(exam)
    }

    /// Fetch an exam by id.
    #[instrument(skip(db))]
    pub async fn get_exam(db: &PgPool, id: &ExamId) -> Result<Exam, AppError> {
        sqlx::query_as::<_, Exam>(&format!("SELECT {EXAM_COLUMNS} FROM exams WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("exam"))
    }

    /// Record a grade for an enrollment on an exam.
    ///
    /// The score must land in `[0, exam.max_score]` and the enrollment
    /// must belong to the exam's class section. One grade per
    /// (enrollment, exam); corrections are not modeled.
    #[instrument(skip(db, dto), fields(grade_id = %dto.id))]
    pub async fn record_grade(db: &PgPool, dto: RecordGradeDto) -> Result<Grade, AppError> {
        let exam = Self::get_exam(db, &dto.exam_id).await?;

        if dto.final_score < 0.0 || dto.final_score > exam.max_score {
            return Err(AppError::validation(format!(
                "score {} is outside [0, {}]",
                dto.final_score, exam.max_score
            )));
        }

        let enrollment = EnrollmentService::get_enrollment(db, &dto.enrollment_id).await?;
        if enrollment.class_id != exam.class_id {
            return Err(AppError::validation(format!(
                "enrollment {} does not belong to class section {}",
                enrollment.id, exam.class_id
            )));
        }

        let grade = sqlx::query_as::<_, Grade>(&format!(
            r#"INSERT INTO grades (id, enrollment_id, exam_id, final_score, letter_score, notes)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {GRADE_COLUMNS}"#,
        ))
        .bind(&dto.id)
        .bind(&dto.enrollment_id)
        .bind(&dto.exam_id)
        .bind(dto.final_score)
        .bind(&dto.letter_score)
        .bind(&dto.notes)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                if db_err.message().contains("unique_grade_per_exam") {
                    return AppError::duplicate_key(format!(
                        "grade for enrollment {} on exam {}",
                        dto.enrollment_id, dto.exam_id
                    ));
                }
                return AppError::duplicate_key(format!("grade id {}", dto.id));
            }
            AppError::from(e)
        })?;

        Ok(grade)
    }

    /// Compute the weighted final grade for an enrollment.
    ///
    /// `Σ(final_score × weight) / 100` across every exam of the
    /// enrollment's class section. Any exam without a recorded grade
    /// fails the computation; a section with no exams yields 0.
    #[instrument(skip(db))]
    pub async fn compute_final_grade(
        db: &PgPool,
        enrollment_id: &EnrollmentId,
    ) -> Result<f64, AppError> {
        let enrollment = EnrollmentService::get_enrollment(db, enrollment_id).await?;

        #[derive(sqlx::FromRow)]
        struct WeightedScore {
            weight: f64,
            final_score: Option<f64>,
        }

        let rows = sqlx::query_as::<_, WeightedScore>(
            r#"SELECT e.weight, g.final_score
               FROM exams e
               LEFT JOIN grades g ON g.exam_id = e.id AND g.enrollment_id = $1
               WHERE e.class_id = $2"#,
        )
        .bind(enrollment_id)
        .bind(&enrollment.class_id)
        .fetch_all(db)
        .await?;

        let mut total = 0.0;
        for row in &rows {
            let score = row.final_score.ok_or(AppError::IncompleteGrades)?;
            total += score * row.weight;
        }

        Ok(total / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        create_test_enrollment, create_test_section, create_test_student, setup_catalog,
    };
    use registrar_models::ids::{GradeId, SectionId};

    fn exam_dto(id: &str, class_id: &str, max_score: f64, weight: f64) -> CreateExamDto {
        CreateExamDto {
            id: ExamId::new(id),
            class_id: SectionId::new(class_id),
            name: format!("Exam {id}"),
            max_score,
            weight,
        }
    }

    fn grade_dto(id: &str, enrollment_id: &str, exam_id: &str, score: f64) -> RecordGradeDto {
        RecordGradeDto {
            id: GradeId::new(id),
            enrollment_id: EnrollmentId::new(enrollment_id),
            exam_id: ExamId::new(exam_id),
            final_score: score,
            letter_score: "B".to_string(),
            notes: None,
        }
    }

    async fn setup_enrollment(pool: &PgPool) {
        setup_catalog(pool).await;
        create_test_section(pool, "sec001", 30).await;
        create_test_student(pool, "stu0001").await;
        create_test_enrollment(pool, "enr001", "stu0001", "sec001").await;
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_exam_success(pool: PgPool) {
        setup_enrollment(&pool).await;

        let exam = ExamService::create_exam(&pool, exam_dto("exm001", "sec001", 100.0, 40.0))
            .await
            .unwrap();
        assert_eq!(exam.weight, 40.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_exam_weight_overflow(pool: PgPool) {
        setup_enrollment(&pool).await;

        ExamService::create_exam(&pool, exam_dto("exm001", "sec001", 100.0, 60.0))
            .await
            .unwrap();
        ExamService::create_exam(&pool, exam_dto("exm002", "sec001", 100.0, 40.0))
            .await
            .unwrap();

        // The section's weights already total 100
        let err = ExamService::create_exam(&pool, exam_dto("exm003", "sec001", 100.0, 10.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_record_grade_out_of_range(pool: PgPool) {
        setup_enrollment(&pool).await;
        ExamService::create_exam(&pool, exam_dto("exm001", "sec001", 50.0, 100.0))
            .await
            .unwrap();

        let err = ExamService::record_grade(&pool, grade_dto("grd001", "enr001", "exm001", 60.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = ExamService::record_grade(&pool, grade_dto("grd001", "enr001", "exm001", -1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_record_grade_twice_rejected(pool: PgPool) {
        setup_enrollment(&pool).await;
        ExamService::create_exam(&pool, exam_dto("exm001", "sec001", 100.0, 100.0))
            .await
            .unwrap();

        ExamService::record_grade(&pool, grade_dto("grd001", "enr001", "exm001", 80.0))
            .await
            .unwrap();
        let err = ExamService::record_grade(&pool, grade_dto("grd002", "enr001", "exm001", 85.0))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_record_grade_wrong_section(pool: PgPool) {
        setup_enrollment(&pool).await;

        // A second section with its own exam; enr001 belongs to sec001
        create_test_section(&pool, "sec002", 30).await;
        ExamService::create_exam(&pool, exam_dto("exm900", "sec002", 100.0, 100.0))
            .await
            .unwrap();

        let err = ExamService::record_grade(&pool, grade_dto("grd001", "enr001", "exm900", 80.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_compute_final_grade_weighted_sum(pool: PgPool) {
        setup_enrollment(&pool).await;

        ExamService::create_exam(&pool, exam_dto("exm001", "sec001", 100.0, 40.0))
            .await
            .unwrap();
        ExamService::create_exam(&pool, exam_dto("exm002", "sec001", 100.0, 60.0))
            .await
            .unwrap();

        ExamService::record_grade(&pool, grade_dto("grd001", "enr001", "exm001", 80.0))
            .await
            .unwrap();
        ExamService::record_grade(&pool, grade_dto("grd002", "enr001", "exm002", 70.0))
            .await
            .unwrap();

        let final_grade = ExamService::compute_final_grade(&pool, &EnrollmentId::new("enr001"))
            .await
            .unwrap();

        // 0.4 * 80 + 0.6 * 70
        assert!((final_grade - 74.0).abs() < 1e-9);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_compute_final_grade_incomplete(pool: PgPool) {
        setup_enrollment(&pool).await;

        ExamService::create_exam(&pool, exam_dto("exm001", "sec001", 100.0, 40.0))
            .await
            .unwrap();
        ExamService::create_exam(&pool, exam_dto("exm002", "sec001", 100.0, 60.0))
            .await
            .unwrap();

        ExamService::record_grade(&pool, grade_dto("grd001", "enr001", "exm001", 80.0))
            .await
            .unwrap();

        let err = ExamService::compute_final_grade(&pool, &EnrollmentId::new("enr001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IncompleteGrades));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_compute_final_grade_no_exams(pool: PgPool) {
        setup_enrollment(&pool).await;

        let final_grade = ExamService::compute_final_grade(&pool, &EnrollmentId::new("enr001"))
            .await
            .unwrap();
        assert_eq!(final_grade, 0.0);
    }
}

use sqlx::PgPool;
use tracing::instrument;

use registrar_core::AppError;
use registrar_models::ids::EnrollmentId;

use crate::modules::enrollments::model::{
    Attendance, EnrollDto, Enrollment, EnrollmentStatus, RecordAttendanceDto,
};

const ENROLLMENT_COLUMNS: &str = "id, student_id, class_id, status";

pub struct EnrollmentService;

impl EnrollmentService {
    /// Enroll a student into a class section.
    ///
    /// The section row is locked for the duration of the transaction,
    /// so concurrent enrollments against the same section serialize and
    /// the capacity check cannot be raced past.
    #[instrument(skip(db, dto), fields(enrollment_id = %dto.id))]
    pub async fn enroll(db: &PgPool, dto: EnrollDto) -> Result<Enrollment, AppError> {
        let mut tx = db.begin().await?;

        let max_students = sqlx::query_scalar::<_, i32>(
            "SELECT max_students FROM class_sections WHERE id = $1 FOR UPDATE",
        )
        .bind(&dto.class_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("class section"))?;

        let active = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments WHERE class_id = $1 AND status = $2",
        )
        .bind(&dto.class_id)
        .bind(EnrollmentStatus::Active)
        .fetch_one(&mut *tx)
        .await?;

        if active >= i64::from(max_students) {
            return Err(AppError::CapacityExceeded);
        }

        let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
            r#"INSERT INTO enrollments (id, student_id, class_id, status)
               VALUES ($1, $2, $3, $4)
               RETURNING {ENROLLMENT_COLUMNS}"#,
        ))
        .bind(&dto.id)
        .bind(&dto.student_id)
        .bind(&dto.class_id)
        .bind(EnrollmentStatus::Active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    if db_err.message().contains("unique_active_enrollment") {
                        return AppError::DuplicateEnrollment;
                    }
                    return AppError::duplicate_key(format!("enrollment id {}", dto.id));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found("student");
                }
            }
            AppError::from(e)
        })?;

        tx.commit().await?;
        Ok(enrollment)
    }

    /// Withdraw an active enrollment.
    ///
    /// Soft delete: the row stays behind with status `withdrawn` so the
    /// attendance and grade history it anchors survives, and the student
    /// may enroll again later.
    #[instrument(skip(db))]
    pub async fn withdraw(db: &PgPool, id: &EnrollmentId) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE enrollments SET status = $1 WHERE id = $2 AND status = $3")
            .bind(EnrollmentStatus::Withdrawn)
            .bind(id)
            .bind(EnrollmentStatus::Active)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("active enrollment"));
        }

        Ok(())
    }

    /// Fetch an enrollment by id.
    #[instrument(skip(db))]
    pub async fn get_enrollment(db: &PgPool, id: &EnrollmentId) -> Result<Enrollment, AppError> {
        sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("enrollment"))
    }

    /// Record attendance for an enrollment on a date.
    ///
    /// Upsert per (enrollment, date): recording twice overwrites the
    /// status instead of duplicating the row.
    #[instrument(skip(db, dto), fields(enrollment_id = %dto.enrollment_id, date = %dto.date))]
    pub async fn record_attendance(
        db: &PgPool,
        dto: RecordAttendanceDto,
    ) -> Result<Attendance, AppError> {
        let attendance = sqlx::query_as::<_, Attendance>(
            r#"INSERT INTO attendance (id, enrollment_id, date, status)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (enrollment_id, date)
               DO UPDATE SET status = EXCLUDED.status
               RETURNING id, enrollment_id, date, status"#,
        )
        .bind(&dto.id)
        .bind(&dto.enrollment_id)
        .bind(dto.date)
        .bind(dto.present)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return AppError::not_found("enrollment");
            }
            AppError::from(e)
        })?;

        Ok(attendance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        create_test_enrollment, create_test_section, create_test_student, setup_catalog,
    };
    use chrono::NaiveDate;
    use registrar_models::ids::{AttendanceId, SectionId, UserId};

    fn enroll_dto(id: &str, student_id: &str, class_id: &str) -> EnrollDto {
        EnrollDto {
            id: EnrollmentId::new(id),
            student_id: UserId::new(student_id),
            class_id: SectionId::new(class_id),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_enroll_success(pool: PgPool) {
        setup_catalog(&pool).await;
        create_test_section(&pool, "sec001", 30).await;
        create_test_student(&pool, "stu0001").await;

        let enrollment = EnrollmentService::enroll(&pool, enroll_dto("enr001", "stu0001", "sec001"))
            .await
            .unwrap();

        assert_eq!(enrollment.status, EnrollmentStatus::Active);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_enroll_duplicate_rejected(pool: PgPool) {
        setup_catalog(&pool).await;
        create_test_section(&pool, "sec001", 30).await;
        create_test_student(&pool, "stu0001").await;

        EnrollmentService::enroll(&pool, enroll_dto("enr001", "stu0001", "sec001"))
            .await
            .unwrap();

        let err = EnrollmentService::enroll(&pool, enroll_dto("enr002", "stu0001", "sec001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEnrollment));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_enroll_capacity_exceeded(pool: PgPool) {
        setup_catalog(&pool).await;
        create_test_section(&pool, "sec001", 2).await;
        for i in 1..=3 {
            create_test_student(&pool, &format!("stu000{i}")).await;
        }

        EnrollmentService::enroll(&pool, enroll_dto("enr001", "stu0001", "sec001"))
            .await
            .unwrap();
        EnrollmentService::enroll(&pool, enroll_dto("enr002", "stu0002", "sec001"))
            .await
            .unwrap();

        let err = EnrollmentService::enroll(&pool, enroll_dto("enr003", "stu0003", "sec001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_enrollment_never_overshoots(pool: PgPool) {
        setup_catalog(&pool).await;
        create_test_section(&pool, "sec001", 3).await;
        for i in 1..=6 {
            create_test_student(&pool, &format!("stu000{i}")).await;
        }

        let handles: Vec<_> = (1..=6)
            .map(|i| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    EnrollmentService::enroll(
                        &pool,
                        EnrollDto {
                            id: EnrollmentId::new(format!("enr00{i}")),
                            student_id: UserId::new(format!("stu000{i}")),
                            class_id: SectionId::new("sec001"),
                        },
                    )
                    .await
                })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 3);

        let active = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments WHERE class_id = 'sec001' AND status = 'active'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(active, 3);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_withdraw_frees_seat_and_allows_reenrollment(pool: PgPool) {
        setup_catalog(&pool).await;
        create_test_section(&pool, "sec001", 1).await;
        create_test_student(&pool, "stu0001").await;
        create_test_student(&pool, "stu0002").await;

        EnrollmentService::enroll(&pool, enroll_dto("enr001", "stu0001", "sec001"))
            .await
            .unwrap();
        EnrollmentService::withdraw(&pool, &EnrollmentId::new("enr001"))
            .await
            .unwrap();

        // Seat is free again, and the withdrawn student may come back
        EnrollmentService::enroll(&pool, enroll_dto("enr002", "stu0002", "sec001"))
            .await
            .unwrap();
        EnrollmentService::withdraw(&pool, &EnrollmentId::new("enr002"))
            .await
            .unwrap();
        EnrollmentService::enroll(&pool, enroll_dto("enr003", "stu0001", "sec001"))
            .await
            .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_withdraw_twice_fails(pool: PgPool) {
        setup_catalog(&pool).await;
        create_test_section(&pool, "sec001", 5).await;
        create_test_student(&pool, "stu0001").await;
        EnrollmentService::enroll(&pool, enroll_dto("enr001", "stu0001", "sec001"))
            .await
            .unwrap();

        EnrollmentService::withdraw(&pool, &EnrollmentId::new("enr001"))
            .await
            .unwrap();
        let err = EnrollmentService::withdraw(&pool, &EnrollmentId::new("enr001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_record_attendance_overwrites(pool: PgPool) {
        setup_catalog(&pool).await;
        create_test_section(&pool, "sec001", 5).await;
        create_test_student(&pool, "stu0001").await;
        create_test_enrollment(&pool, "enr001", "stu0001", "sec001").await;

        let date = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();

        let first = EnrollmentService::record_attendance(
            &pool,
            RecordAttendanceDto {
                id: AttendanceId::new("att001"),
                enrollment_id: EnrollmentId::new("enr001"),
                date,
                present: true,
            },
        )
        .await
        .unwrap();
        assert!(first.status);

        let second = EnrollmentService::record_attendance(
            &pool,
            RecordAttendanceDto {
                id: AttendanceId::new("att002"),
                enrollment_id: EnrollmentId::new("enr001"),
                date,
                present: false,
            },
        )
        .await
        .unwrap();
        assert!(!second.status);

        // Exactly one row for the (enrollment, date) pair, holding the
        // last recorded status
        let rows = sqlx::query_as::<_, Attendance>(
            "SELECT id, enrollment_id, date, status FROM attendance WHERE enrollment_id = 'enr001'",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].status);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_record_attendance_unknown_enrollment(pool: PgPool) {
        let err = EnrollmentService::record_attendance(
            &pool,
            RecordAttendanceDto {
                id: AttendanceId::new("att001"),
                enrollment_id: EnrollmentId::new("missing"),
                date: NaiveDate::from_ymd_opt(2025, 10, 6).unwrap(),
                present: true,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

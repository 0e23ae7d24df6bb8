use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use validator::Validate;

use registrar_core::{AppError, hash_password, verify_password};
use registrar_models::ids::UserId;
use registrar_models::value_types::Email;

use crate::modules::identity::model::{
    Admin, CreateLecturerDto, CreateStudentDto, CreateUserDto, Identity, Lecturer, Role,
    RoleProfile, Student, User, default_admin,
};

const USER_COLUMNS: &str = "id, email, role, full_name, date_of_birth";

pub struct IdentityService;

impl IdentityService {
    /// Create a user from caller-assigned id and raw password.
    ///
    /// The password is hashed before it touches the store; the returned
    /// `User` never carries the digest.
    #[instrument(skip(db, dto), fields(user_id = %dto.id))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        dto.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO users (id, email, password, role, full_name, date_of_birth)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {USER_COLUMNS}"#,
        ))
        .bind(&dto.id)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(dto.role)
        .bind(&dto.full_name)
        .bind(dto.date_of_birth)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                if db_err.message().contains("users_email_key") {
                    return AppError::duplicate_key(format!("email {}", dto.email));
                }
                return AppError::duplicate_key(format!("user id {}", dto.id));
            }
            AppError::from(e)
        })?;

        Ok(user)
    }

    /// Fetch a user by id.
    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: &UserId) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("user"))
    }

    /// Check a raw password against the stored digest for an email.
    ///
    /// An unknown email and a wrong password surface the identical
    /// error value; callers learn nothing about which half failed.
    #[instrument(skip(db, password))]
    pub async fn verify_credentials(
        db: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        #[derive(sqlx::FromRow)]
        struct UserWithPassword {
            id: UserId,
            email: Email,
            role: Role,
            full_name: String,
            date_of_birth: Option<NaiveDate>,
            password: String,
        }

        let row = sqlx::query_as::<_, UserWithPassword>(&format!(
            "SELECT {USER_COLUMNS}, password FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::Authentication)?;

        if !verify_password(password, &row.password)? {
            return Err(AppError::Authentication);
        }

        Ok(User {
            id: row.id,
            email: row.email,
            role: row.role,
            full_name: row.full_name,
            date_of_birth: row.date_of_birth,
        })
    }

    /// Attach an admin profile to an existing admin-role user.
    #[instrument(skip(db))]
    pub async fn create_admin(db: &PgPool, user_id: &UserId) -> Result<Admin, AppError> {
        let mut tx = db.begin().await?;

        Self::lock_user_for_profile(&mut tx, user_id, Role::Admin).await?;

        let admin =
            sqlx::query_as::<_, Admin>("INSERT INTO admins (user_id) VALUES ($1) RETURNING user_id")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(admin)
    }

    /// Attach a lecturer profile to an existing lecturer-role user.
    #[instrument(skip(db, dto), fields(user_id = %dto.user_id))]
    pub async fn create_lecturer(db: &PgPool, dto: CreateLecturerDto) -> Result<Lecturer, AppError> {
        dto.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let mut tx = db.begin().await?;

        Self::lock_user_for_profile(&mut tx, &dto.user_id, Role::Lecturer).await?;

        let lecturer = sqlx::query_as::<_, Lecturer>(
            r#"INSERT INTO lecturers (user_id, department_id, position)
               VALUES ($1, $2, $3)
               RETURNING user_id, department_id, position"#,
        )
        .bind(&dto.user_id)
        .bind(&dto.department_id)
        .bind(&dto.position)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return AppError::not_found("department");
            }
            AppError::from(e)
        })?;

        tx.commit().await?;
        Ok(lecturer)
    }

    /// Attach a student profile to an existing student-role user.
    #[instrument(skip(db, dto), fields(user_id = %dto.user_id))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let mut tx = db.begin().await?;

        Self::lock_user_for_profile(&mut tx, &dto.user_id, Role::Student).await?;

        let student = sqlx::query_as::<_, Student>(
            r#"INSERT INTO students (user_id, department_id, entry_year, status)
               VALUES ($1, $2, $3, $4)
               RETURNING user_id, department_id, entry_year, status"#,
        )
        .bind(&dto.user_id)
        .bind(&dto.department_id)
        .bind(dto.entry_year)
        .bind(dto.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return AppError::not_found("department");
            }
            AppError::from(e)
        })?;

        tx.commit().await?;
        Ok(student)
    }

    /// Resolve a user and their role profile into a tagged `Identity`.
    #[instrument(skip(db))]
    pub async fn fetch_identity(db: &PgPool, user_id: &UserId) -> Result<Identity, AppError> {
        let user = Self::get_user(db, user_id).await?;

        let profile = match user.role {
            Role::Admin => {
                let exists =
                    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM admins WHERE user_id = $1)")
                        .bind(user_id)
                        .fetch_one(db)
                        .await?;
                if !exists {
                    return Err(AppError::not_found("admin profile"));
                }
                RoleProfile::Admin
            }
            Role::Lecturer => {
                let lecturer = sqlx::query_as::<_, Lecturer>(
                    "SELECT user_id, department_id, position FROM lecturers WHERE user_id = $1",
                )
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found("lecturer profile"))?;

                RoleProfile::Lecturer {
                    department_id: lecturer.department_id,
                    position: lecturer.position,
                }
            }
            Role::Student => {
                let student = sqlx::query_as::<_, Student>(
                    "SELECT user_id, department_id, entry_year, status FROM students WHERE user_id = $1",
                )
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found("student profile"))?;

                RoleProfile::Student {
                    department_id: student.department_id,
                    entry_year: student.entry_year,
                    status: student.status,
                }
            }
        };

        Ok(Identity { user, profile })
    }

    /// Seed the fixed default administrator if no admin exists.
    ///
    /// Returns `true` when this invocation created the account. Safe to
    /// run repeatedly and concurrently: a racing invocation collides on
    /// the fixed id/email unique constraints, inserts nothing, and
    /// reports `false`.
    #[instrument(skip(db))]
    pub async fn ensure_admin_exists(db: &PgPool) -> Result<bool, AppError> {
        let mut tx = db.begin().await?;

        let admin_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE role = $1)")
                .bind(Role::Admin)
                .fetch_one(&mut *tx)
                .await?;

        if admin_exists {
            tx.rollback().await?;
            return Ok(false);
        }

        let hashed_password = hash_password(default_admin::PASSWORD)?;

        let inserted = sqlx::query_scalar::<_, UserId>(
            r#"INSERT INTO users (id, email, password, role, full_name)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT DO NOTHING
               RETURNING id"#,
        )
        .bind(UserId::new(default_admin::ID))
        .bind(default_admin::EMAIL)
        .bind(&hashed_password)
        .bind(Role::Admin)
        .bind(default_admin::FULL_NAME)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = inserted else {
            // Lost the race; the winner's row is the admin account.
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query("INSERT INTO admins (user_id) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(&user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, "bootstrap administrator created");
        Ok(true)
    }

    /// Lock the user row and require it to carry `expected` role with no
    /// profile attached yet in any of the three profile tables.
    ///
    /// The row lock serializes concurrent profile creation for the same
    /// user.
    async fn lock_user_for_profile(
        tx: &mut Transaction<'_, Postgres>,
        user_id: &UserId,
        expected: Role,
    ) -> Result<(), AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE",
        ))
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

        if user.role != expected {
            return Err(AppError::validation(format!(
                "user {} has role {}, expected {}",
                user_id, user.role, expected
            )));
        }

        let occupied = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM admins WHERE user_id = $1)
                   OR EXISTS(SELECT 1 FROM lecturers WHERE user_id = $1)
                   OR EXISTS(SELECT 1 FROM students WHERE user_id = $1)"#,
        )
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;

        if occupied {
            return Err(AppError::validation(format!(
                "user {} already has a role profile",
                user_id
            )));
        }

        Ok(())
    }
}

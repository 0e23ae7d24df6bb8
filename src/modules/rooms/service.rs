use sqlx::PgPool;
use tracing::instrument;
use validator::Validate;

use registrar_core::AppError;
use registrar_models::ids::RoomId;

use crate::modules::rooms::model::{CreateRoomDto, Room};

pub struct RoomService;

impl RoomService {
    /// Create a room.
    #[instrument(skip(db, dto), fields(room_id = %dto.id))]
    pub async fn create_room(db: &PgPool, dto: CreateRoomDto) -> Result<Room, AppError> {
        dto.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let room = sqlx::query_as::<_, Room>(
            r#"INSERT INTO rooms (id, name, location)
               VALUES ($1, $2, $3)
               RETURNING id, name, location"#,
        )
        .bind(&dto.id)
        .bind(&dto.name)
        .bind(&dto.location)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::duplicate_key(format!("room id {}", dto.id));
            }
            AppError::from(e)
        })?;

        Ok(room)
    }

    /// Fetch a room by id.
    #[instrument(skip(db))]
    pub async fn get_room(db: &PgPool, id: &RoomId) -> Result<Room, AppError> {
        sqlx::query_as::<_, Room>("SELECT id, name, location FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("room"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_and_get_room(pool: PgPool) {
        let created = RoomService::create_room(
            &pool,
            CreateRoomDto {
                id: RoomId::new("room-a1"),
                name: "A1".to_string(),
                location: "Main Building, Floor 1".to_string(),
            },
        )
        .await
        .unwrap();

        let fetched = RoomService::get_room(&pool, &created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_get_room_missing(pool: PgPool) {
        let err = RoomService::get_room(&pool, &RoomId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

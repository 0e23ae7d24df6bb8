//! Room models and DTOs.

use crate::ids::RoomId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A physical room sections are scheduled into.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub location: String,
}

/// DTO for creating a room.
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateRoomDto {
    pub id: RoomId,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub location: String,
}

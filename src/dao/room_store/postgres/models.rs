//! Row shapes returned by Postgres queries and their conversion into entities.

use std::time::SystemTime;

use sqlx::FromRow;
use time::OffsetDateTime;

use super::error::PgDaoError;
use crate::dao::models::{ChatLogEntity, RoomEntity, SorenaTallyEntity, UserEntity};

#[derive(Debug, FromRow)]
pub struct RoomRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub initial_question: Option<String>,
    pub conclusion: Option<String>,
}

impl TryFrom<RoomRow> for RoomEntity {
    type Error = PgDaoError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|_| PgDaoError::CorruptStatus {
                room_id: row.id.clone(),
                value: row.status.clone(),
            })?;

        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status,
            initial_question: row.initial_question,
            conclusion: row.conclusion,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: String,
    pub user_name: String,
}

impl From<UserRow> for UserEntity {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            user_name: row.user_name,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct TallyRow {
    pub user_id: String,
    pub user_name: String,
    pub count: i64,
}

impl From<TallyRow> for SorenaTallyEntity {
    fn from(row: TallyRow) -> Self {
        Self {
            user_id: row.user_id,
            user_name: row.user_name,
            count: row.count,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ChatLogRow {
    pub id: i64,
    pub room_id: String,
    pub user_id: Option<String>,
    pub message: String,
    pub is_summary: bool,
    pub created_at: OffsetDateTime,
}

impl From<ChatLogRow> for ChatLogEntity {
    fn from(row: ChatLogRow) -> Self {
        Self {
            id: row.id,
            room_id: row.room_id,
            user_id: row.user_id,
            message: row.message,
            is_summary: row.is_summary,
            created_at: SystemTime::from(row.created_at),
        }
    }
}

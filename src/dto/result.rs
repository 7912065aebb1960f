//! Aggregated view of a room returned by the result endpoint.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dao::models::{ChatLogEntity, SorenaTallyEntity},
    dto::format_system_time,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomResultResponse {
    pub room_info: ResultRoomInfo,
    pub sorena_summary: SorenaSummary,
    pub chat_logs: Vec<ChatLogDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResultRoomInfo {
    pub room_id: String,
    pub title: String,
}

/// Agreement totals for a room, highest count first.
#[derive(Debug, Serialize, ToSchema)]
pub struct SorenaSummary {
    pub total_count: i64,
    pub participants: Vec<SorenaParticipant>,
}

impl From<Vec<SorenaTallyEntity>> for SorenaSummary {
    fn from(tallies: Vec<SorenaTallyEntity>) -> Self {
        Self {
            total_count: tallies
                .iter()
                .fold(0i64, |total, tally| total.saturating_add(tally.count)),
            participants: tallies.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SorenaParticipant {
    pub user_id: String,
    pub user_name: String,
    pub count: i64,
}

impl From<SorenaTallyEntity> for SorenaParticipant {
    fn from(tally: SorenaTallyEntity) -> Self {
        Self {
            user_id: tally.user_id,
            user_name: tally.user_name,
            count: tally.count,
        }
    }
}

/// Chat log entry. `user_id` is null for generated summaries.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatLogDto {
    pub log_id: i64,
    pub user_id: Option<String>,
    pub message: String,
    pub is_summary: bool,
    /// RFC 3339 creation time.
    pub timestamp: String,
}

impl From<ChatLogEntity> for ChatLogDto {
    fn from(entry: ChatLogEntity) -> Self {
        Self {
            log_id: entry.id,
            user_id: entry.user_id,
            message: entry.message,
            is_summary: entry.is_summary,
            timestamp: format_system_time(entry.created_at),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::state::lifecycle::RoomStatus;

/// Discussion room persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomEntity {
    /// Short opaque identifier, immutable once created.
    pub id: String,
    /// Display title (never empty).
    pub title: String,
    /// Free-form description shown to participants and fed to the generator.
    pub description: String,
    /// Lifecycle status of the room.
    pub status: RoomStatus,
    /// Opening question, written together with the `InProgress` status.
    pub initial_question: Option<String>,
    /// Final written conclusion, written together with the `Concluded` status.
    pub conclusion: Option<String>,
}

impl RoomEntity {
    /// Build a room that has not been started yet.
    pub fn new(id: String, title: String, description: String) -> Self {
        Self {
            id,
            title,
            description,
            status: RoomStatus::NotStarted,
            initial_question: None,
            conclusion: None,
        }
    }
}

/// Registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Generated 8-character identifier.
    pub id: String,
    /// Display name; not unique.
    pub user_name: String,
}

/// Guarded lifecycle write: applied only while the room is still in `from`.
///
/// Status and its dependent field always travel in the same write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTransition {
    /// Room to update.
    pub room_id: String,
    /// Status the room must still have for the write to apply.
    pub from: RoomStatus,
    /// Status written on success.
    pub to: RoomStatus,
    /// Question to store; `None` keeps the current value.
    pub initial_question: Option<String>,
    /// Conclusion to store; `None` keeps the current value.
    pub conclusion: Option<String>,
}

/// Per-user agreement tally joined with the user's display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SorenaTallyEntity {
    /// User the tally belongs to.
    pub user_id: String,
    /// Display name of that user.
    pub user_name: String,
    /// Accumulated taps, never negative.
    pub count: i64,
}

/// Chat log entry to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatLog {
    /// Room the entry belongs to.
    pub room_id: String,
    /// Author; absent for generated summaries.
    pub user_id: Option<String>,
    /// Message or summary text.
    pub message: String,
    /// Whether the entry was produced by the generator.
    pub is_summary: bool,
}

/// Persisted chat log entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatLogEntity {
    /// Store-assigned identifier, increasing with insertion order.
    pub id: i64,
    /// Room the entry belongs to.
    pub room_id: String,
    /// Author; `None` for generated summaries.
    pub user_id: Option<String>,
    /// Message or summary text.
    pub message: String,
    /// Whether the entry was produced by the generator.
    pub is_summary: bool,
    /// Creation time assigned by the store.
    pub created_at: SystemTime,
}

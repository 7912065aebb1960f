//! DTOs for room creation, lifecycle actions, and the in-room feeds.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    ai::LogLine,
    dao::models::RoomEntity,
    dto::{
        participant::ParticipantDto,
        validation::{collect, validate_not_blank, validate_positive_count},
    },
    state::lifecycle::RoomStatus,
};

/// Payload creating a room.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Validate for CreateRoomRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        collect([("title", validate_not_blank(&self.title))])
    }
}

/// Projection of a room. Fields that do not apply to the current status are omitted.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: RoomStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
}

impl From<RoomEntity> for RoomResponse {
    fn from(room: RoomEntity) -> Self {
        Self {
            id: room.id,
            title: room.title,
            description: room.description,
            status: room.status,
            initial_question: room.initial_question,
            conclusion: room.conclusion,
        }
    }
}

/// Compact room header used in the start response.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomInfo {
    pub room_id: String,
    pub title: String,
    pub status: RoomStatus,
}

/// Returned once a room has been started.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartRoomResponse {
    pub initial_question: String,
    pub room_info: RoomInfo,
    pub participants: Vec<ParticipantDto>,
}

/// Written conclusion closing a room.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConclusionRequest {
    pub conclusion: String,
}

impl Validate for ConclusionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        collect([("conclusion", validate_not_blank(&self.conclusion))])
    }
}

/// Requested status change. Only `"done"` is accepted.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusRequest {
    pub status: String,
}

/// Agreement taps from one user.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SorenaRequest {
    pub user_id: String,
    /// Number of taps to add, between 1 and 1,000,000.
    #[schema(minimum = 1, maximum = 1000000)]
    pub count: i64,
}

impl Validate for SorenaRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        collect([
            ("user_id", validate_not_blank(&self.user_id)),
            ("count", validate_positive_count(self.count)),
        ])
    }
}

/// One message of a batch to summarize.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SummaryLogInput {
    pub user_id: String,
    pub message: String,
}

impl From<SummaryLogInput> for LogLine {
    fn from(input: SummaryLogInput) -> Self {
        Self {
            user_id: input.user_id,
            message: input.message,
        }
    }
}

/// Batch of recent messages to condense into a summary entry.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SummaryRequest {
    #[serde(default)]
    pub logs: Vec<SummaryLogInput>,
}

/// Chat message posted by a participant.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MessageRequest {
    pub user_id: String,
    pub message: String,
}

impl Validate for MessageRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        collect([
            ("user_id", validate_not_blank(&self.user_id)),
            ("message", validate_not_blank(&self.message)),
        ])
    }
}

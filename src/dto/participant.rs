use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::UserEntity,
    dto::validation::{collect, validate_not_blank},
};

/// Request adding a user to a room.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddParticipantRequest {
    pub room_id: String,
    pub user_id: String,
}

impl Validate for AddParticipantRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        collect([
            ("room_id", validate_not_blank(&self.room_id)),
            ("user_id", validate_not_blank(&self.user_id)),
        ])
    }
}

/// Query selecting the room whose participants are listed.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ParticipantsQuery {
    pub room_id: String,
}

/// A room member as shown in rosters.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct ParticipantDto {
    pub id: String,
    pub name: String,
}

impl From<UserEntity> for ParticipantDto {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            name: user.user_name,
        }
    }
}

/// Outcome of an add: whether a new membership row was created.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantAdded {
    pub room_id: String,
    pub user_id: String,
    pub created: bool,
}

/// Members of one room.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomParticipantsResponse {
    pub room_id: String,
    pub users: Vec<ParticipantDto>,
}

use tracing::info;

use crate::{
    dto::participant::{ParticipantAdded, RoomParticipantsResponse},
    error::ServiceError,
    state::SharedState,
};

/// Add a user to a room. Adding an existing member is a no-op reported with
/// `created == false`.
pub async fn add_participant(
    state: &SharedState,
    room_id: &str,
    user_id: &str,
) -> Result<ParticipantAdded, ServiceError> {
    // Unknown room or user surfaces as a missing reference from the store.
    let created = state
        .store()
        .add_participant(room_id.to_owned(), user_id.to_owned())
        .await?;

    if created {
        info!(room_id, user_id, "participant added");
    }

    Ok(ParticipantAdded {
        room_id: room_id.to_owned(),
        user_id: user_id.to_owned(),
        created,
    })
}

/// Members of a room, ordered by name.
pub async fn list_participants(
    state: &SharedState,
    room_id: &str,
) -> Result<RoomParticipantsResponse, ServiceError> {
    let store = state.store();
    if store.find_room(room_id.to_owned()).await?.is_none() {
        return Err(ServiceError::NotFound(format!("room `{room_id}` not found")));
    }

    let users = store.list_participants(room_id.to_owned()).await?;
    Ok(RoomParticipantsResponse {
        room_id: room_id.to_owned(),
        users: users.into_iter().map(Into::into).collect(),
    })
}

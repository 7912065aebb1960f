use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use validator::Validate;

use crate::{
    dto::participant::{
        AddParticipantRequest, ParticipantAdded, ParticipantsQuery, RoomParticipantsResponse,
    },
    error::AppError,
    routes::AppJson,
    services::participant_service,
    state::SharedState,
};

/// Room membership routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/participants", get(list_participants).post(add_participant))
}

/// Add a user to a room. Repeating the call for an existing member answers 200.
#[utoipa::path(
    post,
    path = "/participants",
    tag = "participants",
    request_body = AddParticipantRequest,
    responses(
        (status = 201, description = "Participant added", body = ParticipantAdded),
        (status = 200, description = "Already a participant", body = ParticipantAdded),
        (status = 404, description = "Unknown room or user")
    )
)]
pub async fn add_participant(
    State(state): State<SharedState>,
    AppJson(payload): AppJson<AddParticipantRequest>,
) -> Result<(StatusCode, Json<ParticipantAdded>), AppError> {
    payload.validate()?;
    let added =
        participant_service::add_participant(&state, &payload.room_id, &payload.user_id).await?;
    let status = if added.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(added)))
}

/// List the members of a room.
#[utoipa::path(
    get,
    path = "/participants",
    tag = "participants",
    params(ParticipantsQuery),
    responses(
        (status = 200, description = "Room members", body = RoomParticipantsResponse),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn list_participants(
    State(state): State<SharedState>,
    Query(query): Query<ParticipantsQuery>,
) -> Result<Json<RoomParticipantsResponse>, AppError> {
    Ok(Json(
        participant_service::list_participants(&state, &query.room_id).await?,
    ))
}

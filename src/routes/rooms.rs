use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use validator::Validate;

use crate::{
    dto::{
        result::{ChatLogDto, RoomResultResponse},
        room::{
            ConclusionRequest, CreateRoomRequest, MessageRequest, RoomResponse, SorenaRequest,
            StartRoomResponse, StatusRequest, SummaryRequest,
        },
    },
    error::AppError,
    routes::AppJson,
    services::{engagement_service, result_service, room_service},
    state::SharedState,
};

/// Room creation, lifecycle, and in-room feeds.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{id}", get(get_room))
        .route("/rooms/{id}/start", post(start_room).get(start_room))
        .route("/rooms/{id}/conclusion", post(save_conclusion))
        .route("/rooms/{id}/status", put(update_status))
        .route("/rooms/{id}/sorena", post(add_sorena))
        .route("/rooms/{id}/summary", post(record_summary))
        .route("/rooms/{id}/messages", post(post_message))
        .route("/rooms/{id}/result", get(get_result))
}

/// Create a room that has not been started yet.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = RoomResponse),
        (status = 400, description = "Blank title"),
        (status = 503, description = "No free identifier")
    )
)]
pub async fn create_room(
    State(state): State<SharedState>,
    AppJson(payload): AppJson<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), AppError> {
    payload.validate()?;
    let room = room_service::create_room(&state, payload.title, payload.description).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// List every room.
#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    responses((status = 200, description = "All rooms", body = [RoomResponse]))
)]
pub async fn list_rooms(
    State(state): State<SharedState>,
) -> Result<Json<Vec<RoomResponse>>, AppError> {
    Ok(Json(room_service::list_rooms(&state).await?))
}

/// Fetch one room.
#[utoipa::path(
    get,
    path = "/rooms/{id}",
    tag = "rooms",
    params(("id" = String, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Room", body = RoomResponse),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn get_room(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    Ok(Json(room_service::get_room(&state, &id).await?))
}

/// Generate the opening question and open the discussion. Also served on GET.
#[utoipa::path(
    post,
    path = "/rooms/{id}/start",
    tag = "rooms",
    params(("id" = String, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Room started", body = StartRoomResponse),
        (status = 400, description = "Room already started"),
        (status = 404, description = "Unknown room"),
        (status = 503, description = "Question generation failed")
    )
)]
pub async fn start_room(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<StartRoomResponse>, AppError> {
    Ok(Json(room_service::start_room(&state, &id).await?))
}

/// Store the written conclusion and close the room.
#[utoipa::path(
    post,
    path = "/rooms/{id}/conclusion",
    tag = "rooms",
    params(("id" = String, Path, description = "Room identifier")),
    request_body = ConclusionRequest,
    responses(
        (status = 200, description = "Room concluded", body = RoomResponse),
        (status = 400, description = "Empty conclusion or room not in progress"),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn save_conclusion(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ConclusionRequest>,
) -> Result<Json<RoomResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        room_service::save_conclusion(&state, &id, payload.conclusion).await?,
    ))
}

/// Close the room. Only `{"status": "done"}` is accepted.
#[utoipa::path(
    put,
    path = "/rooms/{id}/status",
    tag = "rooms",
    params(("id" = String, Path, description = "Room identifier")),
    request_body = StatusRequest,
    responses(
        (status = 204, description = "Room closed"),
        (status = 400, description = "Unsupported status or room not started"),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn update_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<StatusRequest>,
) -> Result<StatusCode, AppError> {
    room_service::mark_done(&state, &id, &payload.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add agreement taps for a user.
#[utoipa::path(
    post,
    path = "/rooms/{id}/sorena",
    tag = "rooms",
    params(("id" = String, Path, description = "Room identifier")),
    request_body = SorenaRequest,
    responses(
        (status = 204, description = "Tally updated"),
        (status = 400, description = "Count out of range or tally would overflow"),
        (status = 404, description = "Unknown room or user")
    )
)]
pub async fn add_sorena(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<SorenaRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    engagement_service::increment(&state, &id, &payload.user_id, payload.count).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Summarize a batch of recent messages into the chat log.
#[utoipa::path(
    post,
    path = "/rooms/{id}/summary",
    tag = "rooms",
    params(("id" = String, Path, description = "Room identifier")),
    request_body = SummaryRequest,
    responses(
        (status = 204, description = "Summary recorded, or empty batch ignored"),
        (status = 404, description = "Unknown room"),
        (status = 500, description = "Summary generation failed")
    )
)]
pub async fn record_summary(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<SummaryRequest>,
) -> Result<StatusCode, AppError> {
    let logs = payload.logs.into_iter().map(Into::into).collect();
    room_service::record_summary(&state, &id, logs).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Post a chat message on behalf of a user.
#[utoipa::path(
    post,
    path = "/rooms/{id}/messages",
    tag = "rooms",
    params(("id" = String, Path, description = "Room identifier")),
    request_body = MessageRequest,
    responses(
        (status = 201, description = "Message appended", body = ChatLogDto),
        (status = 400, description = "Blank message"),
        (status = 404, description = "Unknown room or user")
    )
)]
pub async fn post_message(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<MessageRequest>,
) -> Result<(StatusCode, Json<ChatLogDto>), AppError> {
    payload.validate()?;
    let entry = room_service::post_message(&state, &id, payload.user_id, payload.message).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Room title, agreement summary, and full chat log in one response.
#[utoipa::path(
    get,
    path = "/rooms/{id}/result",
    tag = "rooms",
    params(("id" = String, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Aggregated room result", body = RoomResultResponse),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn get_result(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<RoomResultResponse>, AppError> {
    Ok(Json(result_service::get_room_result(&state, &id).await?))
}

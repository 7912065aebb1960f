use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use validator::Validate;

use crate::{
    dto::user::{CreateUserRequest, UserResponse},
    error::AppError,
    routes::AppJson,
    services::user_service,
    state::SharedState,
};

/// User registration routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/users", get(list_users).post(create_user))
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Blank user name"),
        (status = 503, description = "No free identifier")
    )
)]
pub async fn create_user(
    State(state): State<SharedState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    payload.validate()?;
    let user = user_service::create_user(&state, payload.user_name).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List users ordered by name.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses((status = 200, description = "Registered users", body = [UserResponse]))
)]
pub async fn list_users(
    State(state): State<SharedState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    Ok(Json(user_service::list_users(&state).await?))
}

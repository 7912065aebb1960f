//! HTTP routes and the JSON extractor they share.

use axum::{Router, extract::FromRequest};

use crate::{error::AppError, state::SharedState};

/// Swagger UI and the OpenAPI document.
pub mod docs;
/// Liveness check.
pub mod health;
/// Room membership endpoints.
pub mod participants;
/// Room endpoints.
pub mod rooms;
/// User registration endpoints.
pub mod users;

/// JSON body extractor whose rejections use the common error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Compose all route trees and attach the shared state.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(rooms::router())
        .merge(users::router())
        .merge(participants::router())
        .merge(docs::router());

    api_router.with_state(state)
}

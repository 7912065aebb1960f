use std::time::SystemTime;

use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::format_system_time;

/// Payload of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" when the room store answered, "degraded" otherwise.
    pub status: String,
    /// RFC 3339 time of the check.
    pub checked_at: String,
}

impl HealthResponse {
    fn at(status: &str) -> Self {
        Self {
            status: status.to_string(),
            checked_at: format_system_time(SystemTime::now()),
        }
    }

    pub fn ok() -> Self {
        Self::at("ok")
    }

    pub fn degraded() -> Self {
        Self::at("degraded")
    }
}

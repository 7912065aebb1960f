use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the room store and report whether it answered.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.store().health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::canned_state;

    #[tokio::test]
    async fn memory_store_is_healthy() {
        let (state, _store) = canned_state();
        assert_eq!(health_status(&state).await.status, "ok");
    }
}

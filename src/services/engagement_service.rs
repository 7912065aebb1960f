use tracing::debug;

use crate::{dto::validation::MAX_SORENA_DELTA, error::ServiceError, state::SharedState};

/// Add `delta` agreement taps for `user_id` in `room_id` and return the new tally.
///
/// The addition is a single upsert in the store; concurrent calls never lose an update.
pub async fn increment(
    state: &SharedState,
    room_id: &str,
    user_id: &str,
    delta: i64,
) -> Result<i64, ServiceError> {
    if !(1..=MAX_SORENA_DELTA).contains(&delta) {
        return Err(ServiceError::InvalidInput(format!(
            "count must be between 1 and {MAX_SORENA_DELTA} (got {delta})"
        )));
    }

    let store = state.store();
    if store.find_room(room_id.to_owned()).await?.is_none() {
        return Err(ServiceError::NotFound(format!("room `{room_id}` not found")));
    }
    if store.find_user(user_id.to_owned()).await?.is_none() {
        return Err(ServiceError::NotFound(format!("user `{user_id}` not found")));
    }

    let count = store
        .increment_sorena(room_id.to_owned(), user_id.to_owned(), delta)
        .await?;
    debug!(room_id, user_id, delta, count, "sorena incremented");
    Ok(count)
}

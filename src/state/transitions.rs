use std::future::Future;

use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::{
    dao::models::RoomEntity,
    error::ServiceError,
    state::{
        SharedState,
        lifecycle::{Plan, RoomEvent, RoomUpdate},
    },
};

/// Load a room, plan `event` against its current status, run `work` under the
/// transition timeout, then persist the result in one guarded write.
///
/// Nothing is written when planning fails, when `work` fails or times out, or
/// when another request moved the room first.
pub async fn run_transition<F, Fut>(
    state: &SharedState,
    room_id: &str,
    event: RoomEvent,
    work: F,
) -> Result<RoomEntity, ServiceError>
where
    F: FnOnce(RoomEntity) -> Fut,
    Fut: Future<Output = Result<RoomUpdate, ServiceError>>,
{
    let store = state.store();
    let room = store
        .find_room(room_id.to_owned())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room `{room_id}` not found")))?;

    let plan = Plan::new(&room, event)?;

    let update = match timeout(state.transition_timeout(), work(room)).await {
        Ok(Ok(update)) => update,
        Ok(Err(err)) => {
            warn!(room_id, %event, error = %err, "transition aborted; room left unchanged");
            return Err(err);
        }
        Err(_) => {
            warn!(room_id, %event, "transition timed out; room left unchanged");
            return Err(ServiceError::Timeout);
        }
    };

    let planned_at = plan.planned_at;
    let (from, to) = (plan.from, plan.to);
    let write = plan.into_write(update).map_err(|err| {
        error!(room_id, %event, error = %err, "transition produced an incomplete write");
        ServiceError::Internal(err.to_string())
    })?;

    match store.apply_transition(write).await? {
        Some(updated) => {
            info!(
                room_id,
                %from,
                %to,
                elapsed_ms = planned_at.elapsed().as_millis() as u64,
                "room transition applied"
            );
            Ok(updated)
        }
        None => {
            // The guarded write matched nothing: the room vanished or moved on.
            match store.find_room(room_id.to_owned()).await? {
                None => Err(ServiceError::NotFound(format!("room `{room_id}` not found"))),
                Some(current) => Err(ServiceError::InvalidState(format!(
                    "room status changed to \"{}\" before it could {event}",
                    current.status
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        ai::canned::CannedGenerator,
        config::AppConfig,
        dao::room_store::{RoomStore, memory::MemoryRoomStore},
        state::{AppState, lifecycle::RoomStatus},
    };

    async fn state_with_room(timeout: Duration) -> (SharedState, MemoryRoomStore) {
        let store = MemoryRoomStore::default();
        store
            .insert_room(RoomEntity::new("room01".into(), "Weekly sync".into(), String::new()))
            .await
            .unwrap();
        let mut config = AppConfig::default();
        config.ai.timeout = timeout;
        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(CannedGenerator::new()),
            config,
        );
        (state, store)
    }

    #[tokio::test]
    async fn applies_work_result() {
        let (state, _store) = state_with_room(Duration::from_secs(1)).await;
        let room = run_transition(&state, "room01", RoomEvent::Start, |_room| async {
            Ok(RoomUpdate::question("Why?"))
        })
        .await
        .unwrap();

        assert_eq!(room.status, RoomStatus::InProgress);
        assert_eq!(room.initial_question.as_deref(), Some("Why?"));
    }

    #[tokio::test]
    async fn failing_work_writes_nothing() {
        let (state, store) = state_with_room(Duration::from_secs(1)).await;
        let err = run_transition(&state, "room01", RoomEvent::Start, |_room| async {
            Err(ServiceError::Unavailable("down".into()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::Unavailable(_)));
        let room = store.find_room("room01".into()).await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::NotStarted);
        assert!(room.initial_question.is_none());
    }

    #[tokio::test]
    async fn slow_work_times_out() {
        let (state, store) = state_with_room(Duration::from_millis(20)).await;
        let err = run_transition(&state, "room01", RoomEvent::Start, |_room| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(RoomUpdate::question("late"))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::Timeout));
        let room = store.find_room("room01".into()).await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::NotStarted);
    }

    #[tokio::test]
    async fn invalid_event_skips_work() {
        let (state, _store) = state_with_room(Duration::from_secs(1)).await;
        let mut ran = false;
        let err = run_transition(&state, "room01", RoomEvent::Conclude, |_room| {
            ran = true;
            async { Ok(RoomUpdate::conclusion("done")) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert!(!ran);
    }

    #[tokio::test]
    async fn losing_writer_gets_invalid_state() {
        let (state, store) = state_with_room(Duration::from_secs(1)).await;
        let err = run_transition(&state, "room01", RoomEvent::Start, |room| {
            let store = store.clone();
            async move {
                // Another request starts the room while this one is generating.
                store
                    .apply_transition(crate::dao::models::RoomTransition {
                        room_id: room.id,
                        from: RoomStatus::NotStarted,
                        to: RoomStatus::InProgress,
                        initial_question: Some("first".into()),
                        conclusion: None,
                    })
                    .await
                    .unwrap();
                Ok(RoomUpdate::question("second"))
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(
            &err,
            ServiceError::InvalidState(message)
                if message == "room status changed to \"inprogress\" before it could start"
        ));
        let room = store.find_room("room01".into()).await.unwrap().unwrap();
        assert_eq!(room.initial_question.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn missing_room_is_not_found() {
        let (state, _store) = state_with_room(Duration::from_secs(1)).await;
        let err = run_transition(&state, "nope", RoomEvent::Start, |_room| async {
            Ok(RoomUpdate::question("Why?"))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}

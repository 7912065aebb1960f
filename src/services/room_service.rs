//! Room creation and lifecycle operations. Every status change goes through
//! [`run_transition`], so the generator is only consulted once the event has been
//! validated against the room's current status.

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{
    ai::{GenerationError, LogLine, RoomTopic},
    dao::models::{NewChatLog, RoomEntity},
    dto::{
        participant::ParticipantDto,
        result::ChatLogDto,
        room::{RoomInfo, RoomResponse, StartRoomResponse},
    },
    error::ServiceError,
    ids::insert_with_fresh_id,
    state::{
        SharedState,
        lifecycle::{RoomEvent, RoomStatus, RoomUpdate},
        transitions::run_transition,
    },
};

fn room_not_found(room_id: &str) -> ServiceError {
    ServiceError::NotFound(format!("room `{room_id}` not found"))
}

fn require_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Creation and read-only projections
// ---------------------------------------------------------------------------

/// Create a room in the `not started` status under a fresh identifier.
pub async fn create_room(
    state: &SharedState,
    title: String,
    description: String,
) -> Result<RoomResponse, ServiceError> {
    require_text("title", &title)?;

    let store = state.store();
    let room = insert_with_fresh_id(state.room_ids(), |id| {
        let room = RoomEntity::new(id, title.clone(), description.clone());
        let insert = store.insert_room(room.clone());
        async move { insert.await.map(|()| room) }
    })
    .await?;

    info!(room_id = %room.id, "room created");
    Ok(room.into())
}

/// Every room, ordered by id.
pub async fn list_rooms(state: &SharedState) -> Result<Vec<RoomResponse>, ServiceError> {
    let rooms = state.store().list_rooms().await?;
    Ok(rooms.into_iter().map(Into::into).collect())
}

/// One room, or NotFound.
pub async fn get_room(state: &SharedState, room_id: &str) -> Result<RoomResponse, ServiceError> {
    state
        .store()
        .find_room(room_id.to_owned())
        .await?
        .map(Into::into)
        .ok_or_else(|| room_not_found(room_id))
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Generate the opening question and move the room to `inprogress`.
///
/// A generator failure or timeout leaves the room untouched, so the call can
/// simply be repeated.
pub async fn start_room(
    state: &SharedState,
    room_id: &str,
) -> Result<StartRoomResponse, ServiceError> {
    let generator = state.generator();
    let room = run_transition(state, room_id, RoomEvent::Start, |room| async move {
        let question = generator
            .initial_question(RoomTopic {
                title: room.title,
                description: room.description,
            })
            .await
            .map_err(ServiceError::unavailable)?;
        Ok(RoomUpdate::question(question))
    })
    .await?;

    let participants = state.store().list_participants(room.id.clone()).await?;
    info!(room_id = %room.id, participants = participants.len(), "room started");

    Ok(StartRoomResponse {
        initial_question: room.initial_question.unwrap_or_default(),
        room_info: RoomInfo {
            room_id: room.id,
            title: room.title,
            status: room.status,
        },
        participants: participants.into_iter().map(ParticipantDto::from).collect(),
    })
}

/// Store the written conclusion of a running room and close it.
pub async fn save_conclusion(
    state: &SharedState,
    room_id: &str,
    conclusion: String,
) -> Result<RoomResponse, ServiceError> {
    require_text("conclusion", &conclusion)?;

    let room = run_transition(state, room_id, RoomEvent::Conclude, |_room| async move {
        Ok(RoomUpdate::conclusion(conclusion))
    })
    .await?;

    Ok(room.into())
}

/// Close a room without writing a conclusion. Only the `"done"` status is accepted;
/// closing an already closed room succeeds without changes.
pub async fn mark_done(
    state: &SharedState,
    room_id: &str,
    status: &str,
) -> Result<RoomResponse, ServiceError> {
    match status.parse::<RoomStatus>() {
        Ok(RoomStatus::Concluded) => {}
        _ => {
            return Err(ServiceError::InvalidInput(format!(
                "status must be \"{}\" (got \"{status}\")",
                RoomStatus::Concluded
            )));
        }
    }

    let room = run_transition(state, room_id, RoomEvent::MarkDone, |_room| async {
        Ok(RoomUpdate::default())
    })
    .await?;

    Ok(room.into())
}

// ---------------------------------------------------------------------------
// Chat feed
// ---------------------------------------------------------------------------

/// Summarize a batch of messages and append the result as a summary entry.
///
/// An empty batch is accepted and ignored. Returns the appended entry, if any.
pub async fn record_summary(
    state: &SharedState,
    room_id: &str,
    logs: Vec<LogLine>,
) -> Result<Option<ChatLogDto>, ServiceError> {
    if logs.is_empty() {
        debug!(room_id, "empty summary batch ignored");
        return Ok(None);
    }

    let store = state.store();
    if store.find_room(room_id.to_owned()).await?.is_none() {
        return Err(room_not_found(room_id));
    }

    let batch = logs.len();
    let summary = match timeout(
        state.transition_timeout(),
        state.generator().summarize_logs(logs),
    )
    .await
    {
        Ok(Ok(summary)) => summary,
        Ok(Err(err)) => {
            warn!(room_id, batch, error = %err, "summary generation failed; batch dropped");
            return Err(ServiceError::generation_failed(err));
        }
        Err(_) => {
            warn!(room_id, batch, "summary generation timed out; batch dropped");
            return Err(ServiceError::generation_failed(GenerationError::Failed(
                "summary generation timed out".into(),
            )));
        }
    };

    let entry = store
        .append_chat_log(NewChatLog {
            room_id: room_id.to_owned(),
            user_id: None,
            message: summary,
            is_summary: true,
        })
        .await?;
    info!(room_id, batch, log_id = entry.id, "summary recorded");

    Ok(Some(entry.into()))
}

/// Append a participant's message to the room's chat log.
pub async fn post_message(
    state: &SharedState,
    room_id: &str,
    user_id: String,
    message: String,
) -> Result<ChatLogDto, ServiceError> {
    require_text("message", &message)?;

    let store = state.store();
    if store.find_room(room_id.to_owned()).await?.is_none() {
        return Err(room_not_found(room_id));
    }
    if store.find_user(user_id.clone()).await?.is_none() {
        return Err(ServiceError::NotFound(format!("user `{user_id}` not found")));
    }

    let entry = store
        .append_chat_log(NewChatLog {
            room_id: room_id.to_owned(),
            user_id: Some(user_id),
            message,
            is_summary: false,
        })
        .await?;

    Ok(entry.into())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        ai::canned::CannedGenerator,
        dao::room_store::RoomStore,
        services::test_support::{canned_state, seed_room, seed_user, state_over, state_with},
    };

    fn line(user_id: &str, message: &str) -> LogLine {
        LogLine {
            user_id: user_id.into(),
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn created_room_can_be_read_back() {
        let (state, _store) = canned_state();
        let created = create_room(&state, "Weekly sync".into(), "Progress".into())
            .await
            .unwrap();

        assert_eq!(created.id.len(), 6);
        assert_eq!(created.status, RoomStatus::NotStarted);

        let fetched = get_room(&state, &created.id).await.unwrap();
        assert_eq!(fetched.title, "Weekly sync");
        assert_eq!(list_rooms(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let (state, store) = canned_state();
        let err = create_room(&state, "  ".into(), String::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(store.list_rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn start_returns_question_and_roster() {
        let generator = CannedGenerator::new().with_question("What went well this week?");
        let (state, store) = state_with(generator.clone());
        seed_room(&store, "room01", "Weekly sync").await;
        seed_user(&store, "user0001", "Ann").await;
        store
            .add_participant("room01".into(), "user0001".into())
            .await
            .unwrap();

        let started = start_room(&state, "room01").await.unwrap();

        assert_eq!(started.initial_question, "What went well this week?");
        assert_eq!(started.room_info.status, RoomStatus::InProgress);
        assert_eq!(
            started.participants,
            vec![ParticipantDto {
                id: "user0001".into(),
                name: "Ann".into()
            }]
        );
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn second_start_is_rejected_without_generation() {
        let generator = CannedGenerator::new();
        let (state, store) = state_with(generator.clone());
        seed_room(&store, "room01", "Weekly sync").await;

        start_room(&state, "room01").await.unwrap();
        let err = start_room(&state, "room01").await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn concurrent_starts_succeed_at_most_once() {
        let generator = CannedGenerator::new().with_delay(Duration::from_millis(30));
        let (state, store) = state_with(generator);
        seed_room(&store, "room01", "Weekly sync").await;

        let (first, second) = tokio::join!(start_room(&state, "room01"), start_room(&state, "room01"));

        let outcomes = [first.is_ok(), second.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
        let loser = if first.is_ok() { second } else { first };
        assert!(matches!(loser, Err(ServiceError::InvalidState(_))));
    }

    #[tokio::test]
    async fn failed_generation_leaves_room_startable() {
        let (failing, store) = state_with(CannedGenerator::new().failing("quota exceeded"));
        seed_room(&store, "room01", "Weekly sync").await;

        let err = start_room(&failing, "room01").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        let room = get_room(&failing, "room01").await.unwrap();
        assert_eq!(room.status, RoomStatus::NotStarted);
        assert!(room.initial_question.is_none());

        let healthy = state_over(&store, CannedGenerator::new().with_question("Ready?"));
        let started = start_room(&healthy, "room01").await.unwrap();
        assert_eq!(started.initial_question, "Ready?");
    }

    #[tokio::test]
    async fn missing_room_cannot_start() {
        let (state, _store) = canned_state();
        let err = start_room(&state, "nope00").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_conclusion_is_rejected_without_mutation() {
        let (state, store) = canned_state();
        seed_room(&store, "room01", "Weekly sync").await;
        start_room(&state, "room01").await.unwrap();

        let err = save_conclusion(&state, "room01", " ".into()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        let room = get_room(&state, "room01").await.unwrap();
        assert_eq!(room.status, RoomStatus::InProgress);
        assert!(room.conclusion.is_none());
    }

    #[tokio::test]
    async fn conclusion_requires_running_room() {
        let (state, store) = canned_state();
        seed_room(&store, "room01", "Weekly sync").await;

        let err = save_conclusion(&state, "room01", "Ship it".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        start_room(&state, "room01").await.unwrap();
        let room = save_conclusion(&state, "room01", "Ship it".into())
            .await
            .unwrap();
        assert_eq!(room.status, RoomStatus::Concluded);
        assert_eq!(room.conclusion.as_deref(), Some("Ship it"));

        let err = save_conclusion(&state, "room01", "Again".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn mark_done_is_idempotent_and_keeps_conclusion() {
        let (state, store) = canned_state();
        seed_room(&store, "room01", "Weekly sync").await;

        let err = mark_done(&state, "room01", "done").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        start_room(&state, "room01").await.unwrap();
        save_conclusion(&state, "room01", "Ship it".into())
            .await
            .unwrap();
        let room = mark_done(&state, "room01", "done").await.unwrap();
        assert_eq!(room.status, RoomStatus::Concluded);
        assert_eq!(room.conclusion.as_deref(), Some("Ship it"));
    }

    #[tokio::test]
    async fn mark_done_only_accepts_done() {
        let (state, store) = canned_state();
        seed_room(&store, "room01", "Weekly sync").await;
        start_room(&state, "room01").await.unwrap();

        for status in ["inprogress", "finished", ""] {
            let err = mark_done(&state, "room01", status).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)));
        }
        assert_eq!(
            get_room(&state, "room01").await.unwrap().status,
            RoomStatus::InProgress
        );
    }

    #[tokio::test]
    async fn empty_summary_batch_is_a_no_op() {
        let generator = CannedGenerator::new();
        let (state, store) = state_with(generator.clone());

        let recorded = record_summary(&state, "missing", Vec::new()).await.unwrap();

        assert!(recorded.is_none());
        assert_eq!(generator.calls(), 0);
        assert!(store.list_chat_logs("missing".into()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn summary_is_appended_without_author() {
        let (state, store) = state_with(CannedGenerator::new().with_summary("Ship on Friday."));
        seed_room(&store, "room01", "Weekly sync").await;

        let entry = record_summary(&state, "room01", vec![line("u1", "ship friday?")])
            .await
            .unwrap()
            .unwrap();

        assert!(entry.is_summary);
        assert!(entry.user_id.is_none());
        assert_eq!(entry.message, "Ship on Friday.");
        assert_eq!(store.list_chat_logs("room01".into()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_summary_drops_batch() {
        let (state, store) = state_with(CannedGenerator::new().failing("boom"));
        seed_room(&store, "room01", "Weekly sync").await;

        let err = record_summary(&state, "room01", vec![line("u1", "hello")])
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Internal(_)));
        assert!(store.list_chat_logs("room01".into()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn summary_for_missing_room_is_not_found() {
        let (state, _store) = canned_state();
        let err = record_summary(&state, "nope00", vec![line("u1", "hello")])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn messages_require_known_author() {
        let (state, store) = canned_state();
        seed_room(&store, "room01", "Weekly sync").await;
        seed_user(&store, "user0001", "Ann").await;

        let err = post_message(&state, "room01", "ghost".into(), "hi".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let entry = post_message(&state, "room01", "user0001".into(), "hi".into())
            .await
            .unwrap();
        assert_eq!(entry.user_id.as_deref(), Some("user0001"));
        assert!(!entry.is_summary);
    }
}

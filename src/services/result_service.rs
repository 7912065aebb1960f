use tracing::debug;

use crate::{
    dto::result::{ResultRoomInfo, RoomResultResponse, SorenaSummary},
    error::ServiceError,
    state::SharedState,
};

/// Gather a room's title, agreement summary, and chat log.
///
/// The three reads run concurrently and are joined before anything is returned:
/// a missing room wins over other failures, and no partial result is produced.
pub async fn get_room_result(
    state: &SharedState,
    room_id: &str,
) -> Result<RoomResultResponse, ServiceError> {
    let store = state.store();
    let (room, tallies, logs) = tokio::join!(
        store.find_room(room_id.to_owned()),
        store.sorena_tallies(room_id.to_owned()),
        store.list_chat_logs(room_id.to_owned()),
    );

    let room = room?.ok_or_else(|| ServiceError::NotFound(format!("room `{room_id}` not found")))?;
    let tallies = tallies?;
    let logs = logs?;
    debug!(room_id, tallies = tallies.len(), logs = logs.len(), "room result aggregated");

    Ok(RoomResultResponse {
        room_info: ResultRoomInfo {
            room_id: room.id,
            title: room.title,
        },
        sorena_summary: SorenaSummary::from(tallies),
        chat_logs: logs.into_iter().map(Into::into).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ai::canned::CannedGenerator,
        dao::room_store::RoomStore,
        services::{
            engagement_service, participant_service, room_service,
            test_support::{canned_state, seed_room, seed_user, state_with},
        },
        state::lifecycle::RoomStatus,
    };

    #[tokio::test]
    async fn empty_room_result_is_fully_populated() {
        let (state, store) = canned_state();
        seed_room(&store, "room01", "Weekly sync").await;

        let result = get_room_result(&state, "room01").await.unwrap();

        assert_eq!(result.room_info.room_id, "room01");
        assert_eq!(result.room_info.title, "Weekly sync");
        assert_eq!(result.sorena_summary.total_count, 0);
        assert!(result.sorena_summary.participants.is_empty());
        assert!(result.chat_logs.is_empty());
    }

    #[tokio::test]
    async fn two_users_at_i64_max_still_produce_a_result() {
        let (state, store) = canned_state();
        seed_room(&store, "room01", "Weekly sync").await;
        for (id, name) in [("user0001", "Ann"), ("user0002", "Bob")] {
            seed_user(&store, id, name).await;
            store
                .increment_sorena("room01".into(), id.into(), i64::MAX)
                .await
                .unwrap();
        }

        let result = get_room_result(&state, "room01").await.unwrap();

        assert_eq!(result.sorena_summary.total_count, i64::MAX);
        assert!(
            result
                .sorena_summary
                .participants
                .iter()
                .all(|participant| participant.count == i64::MAX)
        );
    }

    #[tokio::test]
    async fn missing_room_is_not_found() {
        let (state, _store) = canned_state();
        let err = get_room_result(&state, "nope00").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn tallies_are_ordered_by_count() {
        let (state, store) = canned_state();
        seed_room(&store, "room01", "Weekly sync").await;
        seed_user(&store, "user0001", "Ann").await;
        seed_user(&store, "user0002", "Bob").await;
        engagement_service::increment(&state, "room01", "user0001", 1)
            .await
            .unwrap();
        engagement_service::increment(&state, "room01", "user0002", 4)
            .await
            .unwrap();

        let summary = get_room_result(&state, "room01").await.unwrap().sorena_summary;
        assert_eq!(summary.total_count, 5);
        let names: Vec<_> = summary
            .participants
            .iter()
            .map(|p| p.user_name.as_str())
            .collect();
        assert_eq!(names, ["Bob", "Ann"]);
    }

    #[tokio::test]
    async fn weekly_sync_end_to_end() {
        let (state, store) =
            state_with(CannedGenerator::new().with_question("What went well this week?"));

        let room = room_service::create_room(&state, "Weekly sync".into(), String::new())
            .await
            .unwrap();
        room_service::start_room(&state, &room.id).await.unwrap();

        let fetched = room_service::get_room(&state, &room.id).await.unwrap();
        assert_eq!(fetched.status, RoomStatus::InProgress);
        assert_eq!(
            fetched.initial_question.as_deref(),
            Some("What went well this week?")
        );

        seed_user(&store, "usera001", "A").await;
        participant_service::add_participant(&state, &room.id, "usera001")
            .await
            .unwrap();
        engagement_service::increment(&state, &room.id, "usera001", 3)
            .await
            .unwrap();
        engagement_service::increment(&state, &room.id, "usera001", 2)
            .await
            .unwrap();

        let result = get_room_result(&state, &room.id).await.unwrap();
        assert_eq!(result.sorena_summary.total_count, 5);
        assert_eq!(result.sorena_summary.participants.len(), 1);
        assert_eq!(result.sorena_summary.participants[0].user_id, "usera001");
        assert_eq!(result.sorena_summary.participants[0].count, 5);
    }

    #[tokio::test]
    async fn chat_log_keeps_posting_order_with_summary_last() {
        let (state, store) = state_with(CannedGenerator::new().with_summary("Wrap-up."));
        seed_room(&store, "room01", "Weekly sync").await;
        seed_user(&store, "user0001", "Ann").await;

        for message in ["first", "second", "third"] {
            room_service::post_message(&state, "room01", "user0001".into(), message.into())
                .await
                .unwrap();
        }
        room_service::record_summary(
            &state,
            "room01",
            vec![crate::ai::LogLine {
                user_id: "user0001".into(),
                message: "first".into(),
            }],
        )
        .await
        .unwrap();

        let logs = get_room_result(&state, "room01").await.unwrap().chat_logs;
        let messages: Vec<_> = logs.iter().map(|log| log.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third", "Wrap-up."]);
        assert!(logs[3].is_summary);
        assert!(logs.windows(2).all(|pair| pair[0].log_id < pair[1].log_id));
    }
}

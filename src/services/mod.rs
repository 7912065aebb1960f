//! Business operations invoked by the HTTP handlers.

/// OpenAPI documentation generation.
pub mod documentation;
/// Agreement ("sorena") tallies.
pub mod engagement_service;
/// Health check service.
pub mod health_service;
/// Room membership.
pub mod participant_service;
/// Concurrent aggregation of a room's outcome.
pub mod result_service;
/// Room creation and lifecycle operations.
pub mod room_service;
/// User registration.
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::{
        ai::{DiscussionGenerator, canned::CannedGenerator},
        config::AppConfig,
        dao::{
            models::{RoomEntity, UserEntity},
            room_store::{RoomStore, memory::MemoryRoomStore},
        },
        state::{AppState, SharedState},
    };

    /// State over a fresh in-memory store.
    pub fn state_with(generator: impl DiscussionGenerator + 'static) -> (SharedState, MemoryRoomStore) {
        let store = MemoryRoomStore::new();
        (state_over(&store, generator), store)
    }

    /// Another state sharing `store`, e.g. to swap the generator between calls.
    pub fn state_over(
        store: &MemoryRoomStore,
        generator: impl DiscussionGenerator + 'static,
    ) -> SharedState {
        AppState::new(
            Arc::new(store.clone()),
            Arc::new(generator),
            AppConfig::default(),
        )
    }

    pub fn canned_state() -> (SharedState, MemoryRoomStore) {
        state_with(CannedGenerator::new())
    }

    pub async fn seed_room(store: &MemoryRoomStore, id: &str, title: &str) {
        store
            .insert_room(RoomEntity::new(id.into(), title.into(), String::new()))
            .await
            .unwrap();
    }

    pub async fn seed_user(store: &MemoryRoomStore, id: &str, name: &str) {
        store
            .insert_user(UserEntity {
                id: id.into(),
                user_name: name.into(),
            })
            .await
            .unwrap();
    }
}

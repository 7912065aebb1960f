//! Shared application state and the room lifecycle.

/// Room statuses, events, and the transition table.
pub mod lifecycle;
/// Running a lifecycle event as one guarded write.
pub mod transitions;

use std::{sync::Arc, time::Duration};

use crate::{
    ai::DiscussionGenerator, config::AppConfig, dao::room_store::RoomStore, ids::IdPolicy,
};

/// Handle to the application state shared by every request.
pub type SharedState = Arc<AppState>;

/// Central application state: the injected store and generator plus the loaded configuration.
pub struct AppState {
    store: Arc<dyn RoomStore>,
    generator: Arc<dyn DiscussionGenerator>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        store: Arc<dyn RoomStore>,
        generator: Arc<dyn DiscussionGenerator>,
        config: AppConfig,
    ) -> SharedState {
        Arc::new(Self {
            store,
            generator,
            config,
        })
    }

    /// Handle to the room store.
    pub fn store(&self) -> Arc<dyn RoomStore> {
        self.store.clone()
    }

    /// Handle to the text generator.
    pub fn generator(&self) -> Arc<dyn DiscussionGenerator> {
        self.generator.clone()
    }

    /// Upper bound for the generation step of a room transition.
    pub fn transition_timeout(&self) -> Duration {
        self.config.ai.timeout
    }

    /// Identifier policy for new rooms.
    pub fn room_ids(&self) -> IdPolicy {
        self.config.room_ids
    }

    /// Identifier policy for new users.
    pub fn user_ids(&self) -> IdPolicy {
        self.config.user_ids
    }
}

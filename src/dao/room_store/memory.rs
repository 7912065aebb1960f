//! Process-local [`RoomStore`] used for tests and for running without a database.

use std::{sync::Arc, time::SystemTime};

use dashmap::{DashMap, DashSet, mapref::entry::Entry};
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::dao::{
    models::{
        ChatLogEntity, NewChatLog, RoomEntity, RoomTransition, SorenaTallyEntity, UserEntity,
    },
    room_store::RoomStore,
    storage::{StorageError, StorageResult},
};

/// In-memory store. Each mutation holds the per-key entry lock of its map, which
/// is what makes tally upserts and guarded transitions atomic.
#[derive(Clone, Default)]
pub struct MemoryRoomStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    rooms: DashMap<String, RoomEntity>,
    users: DashMap<String, UserEntity>,
    participants: DashSet<(String, String)>,
    sorena: DashMap<(String, String), i64>,
    chat_logs: RwLock<Vec<ChatLogEntity>>,
}

impl MemoryRoomStore {
    /// Empty store with no rooms, users or logs.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryInner {
    fn require_room(&self, room_id: &str) -> StorageResult<()> {
        if self.rooms.contains_key(room_id) {
            Ok(())
        } else {
            Err(StorageError::MissingReference { entity: "room" })
        }
    }

    fn require_user(&self, user_id: &str) -> StorageResult<()> {
        if self.users.contains_key(user_id) {
            Ok(())
        } else {
            Err(StorageError::MissingReference { entity: "user" })
        }
    }

    fn user_name(&self, user_id: &str) -> Option<String> {
        self.users.get(user_id).map(|user| user.user_name.clone())
    }
}

fn apply_to(room: &mut RoomEntity, transition: RoomTransition) {
    room.status = transition.to;
    if let Some(question) = transition.initial_question {
        room.initial_question = Some(question);
    }
    if let Some(conclusion) = transition.conclusion {
        room.conclusion = Some(conclusion);
    }
}

impl RoomStore for MemoryRoomStore {
    fn insert_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            match inner.rooms.entry(room.id.clone()) {
                Entry::Occupied(_) => Err(StorageError::UniqueViolation {
                    entity: "room",
                    key: room.id,
                }),
                Entry::Vacant(slot) => {
                    slot.insert(room);
                    Ok(())
                }
            }
        })
    }

    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut rooms: Vec<RoomEntity> =
                inner.rooms.iter().map(|room| room.value().clone()).collect();
            rooms.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(rooms)
        })
    }

    fn find_room(&self, id: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.rooms.get(&id).map(|room| room.value().clone())) })
    }

    fn apply_transition(
        &self,
        transition: RoomTransition,
    ) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let Some(mut room) = inner.rooms.get_mut(&transition.room_id) else {
                return Ok(None);
            };
            if room.status != transition.from {
                return Ok(None);
            }
            apply_to(room.value_mut(), transition);
            Ok(Some(room.value().clone()))
        })
    }

    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            match inner.users.entry(user.id.clone()) {
                Entry::Occupied(_) => Err(StorageError::UniqueViolation {
                    entity: "user",
                    key: user.id,
                }),
                Entry::Vacant(slot) => {
                    slot.insert(user);
                    Ok(())
                }
            }
        })
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut users: Vec<UserEntity> =
                inner.users.iter().map(|user| user.value().clone()).collect();
            users.sort_by(|a, b| a.user_name.cmp(&b.user_name).then(a.id.cmp(&b.id)));
            Ok(users)
        })
    }

    fn find_user(&self, id: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.users.get(&id).map(|user| user.value().clone())) })
    }

    fn add_participant(
        &self,
        room_id: String,
        user_id: String,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.require_room(&room_id)?;
            inner.require_user(&user_id)?;
            Ok(inner.participants.insert((room_id, user_id)))
        })
    }

    fn list_participants(
        &self,
        room_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut users: Vec<UserEntity> = inner
                .participants
                .iter()
                .filter(|key| key.0 == room_id)
                .filter_map(|key| inner.users.get(&key.1).map(|user| user.value().clone()))
                .collect();
            users.sort_by(|a, b| a.user_name.cmp(&b.user_name).then(a.id.cmp(&b.id)));
            Ok(users)
        })
    }

    fn increment_sorena(
        &self,
        room_id: String,
        user_id: String,
        delta: i64,
    ) -> BoxFuture<'static, StorageResult<i64>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.require_room(&room_id)?;
            inner.require_user(&user_id)?;
            let mut count = inner.sorena.entry((room_id, user_id)).or_insert(0);
            *count = count
                .checked_add(delta)
                .filter(|total| *total >= 0)
                .ok_or(StorageError::CountOverflow { entity: "sorena" })?;
            Ok(*count)
        })
    }

    fn sorena_tallies(
        &self,
        room_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<SorenaTallyEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tallies: Vec<SorenaTallyEntity> = inner
                .sorena
                .iter()
                .filter(|entry| entry.key().0 == room_id)
                .filter_map(|entry| {
                    let user_id = entry.key().1.clone();
                    inner.user_name(&user_id).map(|user_name| SorenaTallyEntity {
                        user_id,
                        user_name,
                        count: *entry.value(),
                    })
                })
                .collect();
            tallies.sort_by(|a, b| b.count.cmp(&a.count).then(a.user_id.cmp(&b.user_id)));
            Ok(tallies)
        })
    }

    fn append_chat_log(
        &self,
        entry: NewChatLog,
    ) -> BoxFuture<'static, StorageResult<ChatLogEntity>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.require_room(&entry.room_id)?;
            if let Some(user_id) = entry.user_id.as_deref() {
                inner.require_user(user_id)?;
            }

            let mut logs = inner.chat_logs.write().await;
            // Never earlier than the previous entry, even if the wall clock stepped back.
            let created_at = logs
                .last()
                .map_or_else(SystemTime::now, |last| last.created_at.max(SystemTime::now()));
            let log = ChatLogEntity {
                id: logs.len() as i64 + 1,
                room_id: entry.room_id,
                user_id: entry.user_id,
                message: entry.message,
                is_summary: entry.is_summary,
                created_at,
            };
            logs.push(log.clone());
            Ok(log)
        })
    }

    fn list_chat_logs(
        &self,
        room_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<ChatLogEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let logs = inner.chat_logs.read().await;
            let mut entries: Vec<ChatLogEntity> = logs
                .iter()
                .filter(|log| log.room_id == room_id)
                .cloned()
                .collect();
            entries.sort_by_key(|log| (log.created_at, log.id));
            Ok(entries)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

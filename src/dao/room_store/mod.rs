//! Room persistence: the [`RoomStore`] trait and its backends.

pub mod memory;
/// Postgres backend built on `sqlx`.
#[cfg(feature = "postgres-store")]
pub mod postgres;

use crate::dao::models::{
    ChatLogEntity, NewChatLog, RoomEntity, RoomTransition, SorenaTallyEntity, UserEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for rooms and everything hanging off them.
///
/// Implementations must be safe for concurrent use; every mutating method is a
/// single atomic operation on the backend.
pub trait RoomStore: Send + Sync {
    /// Insert a new room. Fails with [`UniqueViolation`] when the id is taken.
    ///
    /// [`UniqueViolation`]: crate::dao::storage::StorageError::UniqueViolation
    fn insert_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// All rooms ordered by id.
    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>>;
    /// Room by id, or `None` when it does not exist.
    fn find_room(&self, id: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    /// Apply a guarded lifecycle write. Returns the updated room, or `None` when
    /// no room with the expected status matched.
    fn apply_transition(
        &self,
        transition: RoomTransition,
    ) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;

    /// Insert a new user. Fails with a unique violation when the id is taken.
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// All users ordered by name, then id.
    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    /// User by id, or `None` when it does not exist.
    fn find_user(&self, id: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;

    /// Insert the membership if absent. Returns `true` when a row was created.
    fn add_participant(
        &self,
        room_id: String,
        user_id: String,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Members of a room ordered by name, then id.
    fn list_participants(&self, room_id: String)
    -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;

    /// Atomically add `delta` to the (room, user) tally, creating it when absent.
    /// Returns the new count, or [`CountOverflow`] when it would leave the `i64`
    /// range, in which case the stored count is unchanged.
    ///
    /// [`CountOverflow`]: crate::dao::storage::StorageError::CountOverflow
    fn increment_sorena(
        &self,
        room_id: String,
        user_id: String,
        delta: i64,
    ) -> BoxFuture<'static, StorageResult<i64>>;
    /// Tallies for a room, highest count first.
    fn sorena_tallies(
        &self,
        room_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<SorenaTallyEntity>>>;

    /// Append an entry and return it with its id and creation time.
    fn append_chat_log(&self, entry: NewChatLog) -> BoxFuture<'static, StorageResult<ChatLogEntity>>;
    /// Chat log of a room, oldest first with insertion order breaking ties.
    fn list_chat_logs(&self, room_id: String)
    -> BoxFuture<'static, StorageResult<Vec<ChatLogEntity>>>;

    /// Cheap round trip proving the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

use futures::future::BoxFuture;
use sqlx::PgPool;
use tracing::info;

use super::{
    config::PgConfig,
    connection::establish_pool,
    error::{PgDaoError, PgResult},
    models::{ChatLogRow, RoomRow, TallyRow, UserRow},
};
use crate::dao::{
    models::{
        ChatLogEntity, NewChatLog, RoomEntity, RoomTransition, SorenaTallyEntity, UserEntity,
    },
    room_store::RoomStore,
    storage::{StorageError, StorageResult},
};

/// Postgres-backed [`RoomStore`]. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct PostgresRoomStore {
    pool: PgPool,
}

impl PostgresRoomStore {
    /// Connect to Postgres and bring the schema up to date.
    pub async fn connect(config: PgConfig) -> PgResult<Self> {
        let pool = establish_pool(&config).await?;
        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|source| PgDaoError::Migrate { source })?;
        info!(max_connections = config.max_connections, "Postgres schema ready");
        Ok(Self { pool })
    }

    /// Wrap an existing pool whose schema is already migrated.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_error(operation: &'static str, source: sqlx::Error) -> StorageError {
    PgDaoError::Query { operation, source }.into()
}

/// Map constraint violations onto the storage error kinds callers act upon.
fn write_error(
    operation: &'static str,
    entity: &'static str,
    key: &str,
    source: sqlx::Error,
) -> StorageError {
    if let sqlx::Error::Database(db) = &source {
        if db.is_unique_violation() {
            return StorageError::UniqueViolation {
                entity,
                key: key.to_owned(),
            };
        }
        if db.is_foreign_key_violation() {
            let missing = match db.constraint() {
                Some(name) if name.contains("room_id") => "room",
                _ => "user",
            };
            return StorageError::MissingReference { entity: missing };
        }
        // numeric_value_out_of_range
        if db.code().as_deref() == Some("22003") {
            return StorageError::CountOverflow { entity };
        }
    }
    query_error(operation, source)
}

impl RoomStore for PostgresRoomStore {
    fn insert_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("INSERT INTO rooms (id, title, description, status) VALUES ($1, $2, $3, $4)")
                .bind(&room.id)
                .bind(&room.title)
                .bind(&room.description)
                .bind(room.status.as_str())
                .execute(&pool)
                .await
                .map_err(|source| write_error("insert_room", "room", &room.id, source))?;
            Ok(())
        })
    }

    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let rows = sqlx::query_as::<_, RoomRow>(
                "SELECT id, title, description, status, initial_question, conclusion \
                 FROM rooms ORDER BY id ASC",
            )
            .fetch_all(&pool)
            .await
            .map_err(|source| query_error("list_rooms", source))?;

            rows.into_iter()
                .map(|row| RoomEntity::try_from(row).map_err(StorageError::from))
                .collect()
        })
    }

    fn find_room(&self, id: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let row = sqlx::query_as::<_, RoomRow>(
                "SELECT id, title, description, status, initial_question, conclusion \
                 FROM rooms WHERE id = $1",
            )
            .bind(&id)
            .fetch_optional(&pool)
            .await
            .map_err(|source| query_error("find_room", source))?;

            row.map(RoomEntity::try_from)
                .transpose()
                .map_err(StorageError::from)
        })
    }

    fn apply_transition(
        &self,
        transition: RoomTransition,
    ) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            // Single guarded UPDATE: concurrent callers race on the status predicate.
            let row = sqlx::query_as::<_, RoomRow>(
                "UPDATE rooms SET status = $3, \
                     initial_question = COALESCE($4, initial_question), \
                     conclusion = COALESCE($5, conclusion) \
                 WHERE id = $1 AND status = $2 \
                 RETURNING id, title, description, status, initial_question, conclusion",
            )
            .bind(&transition.room_id)
            .bind(transition.from.as_str())
            .bind(transition.to.as_str())
            .bind(transition.initial_question.as_deref())
            .bind(transition.conclusion.as_deref())
            .fetch_optional(&pool)
            .await
            .map_err(|source| query_error("apply_transition", source))?;

            row.map(RoomEntity::try_from)
                .transpose()
                .map_err(StorageError::from)
        })
    }

    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("INSERT INTO users (id, user_name) VALUES ($1, $2)")
                .bind(&user.id)
                .bind(&user.user_name)
                .execute(&pool)
                .await
                .map_err(|source| write_error("insert_user", "user", &user.id, source))?;
            Ok(())
        })
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let rows = sqlx::query_as::<_, UserRow>(
                "SELECT id, user_name FROM users ORDER BY user_name ASC, id ASC",
            )
            .fetch_all(&pool)
            .await
            .map_err(|source| query_error("list_users", source))?;
            Ok(rows.into_iter().map(UserEntity::from).collect())
        })
    }

    fn find_user(&self, id: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let row = sqlx::query_as::<_, UserRow>("SELECT id, user_name FROM users WHERE id = $1")
                .bind(&id)
                .fetch_optional(&pool)
                .await
                .map_err(|source| query_error("find_user", source))?;
            Ok(row.map(UserEntity::from))
        })
    }

    fn add_participant(
        &self,
        room_id: String,
        user_id: String,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query(
                "INSERT INTO participants (room_id, user_id) VALUES ($1, $2) \
                 ON CONFLICT (room_id, user_id) DO NOTHING",
            )
            .bind(&room_id)
            .bind(&user_id)
            .execute(&pool)
            .await
            .map_err(|source| write_error("add_participant", "participant", &user_id, source))?;
            Ok(result.rows_affected() == 1)
        })
    }

    fn list_participants(
        &self,
        room_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let rows = sqlx::query_as::<_, UserRow>(
                "SELECT u.id, u.user_name FROM participants p \
                 JOIN users u ON p.user_id = u.id \
                 WHERE p.room_id = $1 ORDER BY u.user_name ASC, u.id ASC",
            )
            .bind(&room_id)
            .fetch_all(&pool)
            .await
            .map_err(|source| query_error("list_participants", source))?;
            Ok(rows.into_iter().map(UserEntity::from).collect())
        })
    }

    fn increment_sorena(
        &self,
        room_id: String,
        user_id: String,
        delta: i64,
    ) -> BoxFuture<'static, StorageResult<i64>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_scalar::<_, i64>(
                "INSERT INTO sorena_counts (room_id, user_id, count) VALUES ($1, $2, $3) \
                 ON CONFLICT (room_id, user_id) \
                 DO UPDATE SET count = sorena_counts.count + EXCLUDED.count \
                 RETURNING count",
            )
            .bind(&room_id)
            .bind(&user_id)
            .bind(delta)
            .fetch_one(&pool)
            .await
            .map_err(|source| write_error("increment_sorena", "sorena", &user_id, source))
        })
    }

    fn sorena_tallies(
        &self,
        room_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<SorenaTallyEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let rows = sqlx::query_as::<_, TallyRow>(
                "SELECT s.user_id, u.user_name, s.count FROM sorena_counts s \
                 JOIN users u ON s.user_id = u.id \
                 WHERE s.room_id = $1 ORDER BY s.count DESC, s.user_id ASC",
            )
            .bind(&room_id)
            .fetch_all(&pool)
            .await
            .map_err(|source| query_error("sorena_tallies", source))?;
            Ok(rows.into_iter().map(SorenaTallyEntity::from).collect())
        })
    }

    fn append_chat_log(
        &self,
        entry: NewChatLog,
    ) -> BoxFuture<'static, StorageResult<ChatLogEntity>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let row = sqlx::query_as::<_, ChatLogRow>(
                "INSERT INTO chat_logs (room_id, user_id, message, is_summary) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id, room_id, user_id, message, is_summary, created_at",
            )
            .bind(&entry.room_id)
            .bind(entry.user_id.as_deref())
            .bind(&entry.message)
            .bind(entry.is_summary)
            .fetch_one(&pool)
            .await
            .map_err(|source| write_error("append_chat_log", "chat log", &entry.room_id, source))?;
            Ok(row.into())
        })
    }

    fn list_chat_logs(
        &self,
        room_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<ChatLogEntity>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let rows = sqlx::query_as::<_, ChatLogRow>(
                "SELECT id, room_id, user_id, message, is_summary, created_at \
                 FROM chat_logs WHERE room_id = $1 ORDER BY created_at ASC, id ASC",
            )
            .bind(&room_id)
            .fetch_all(&pool)
            .await
            .map_err(|source| query_error("list_chat_logs", source))?;
            Ok(rows.into_iter().map(ChatLogEntity::from).collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&pool)
                .await
                .map_err(|source| query_error("health_check", source))?;
            Ok(())
        })
    }
}

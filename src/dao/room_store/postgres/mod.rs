mod config;
mod connection;
mod error;
mod models;
mod store;

pub use config::PgConfig;
pub use error::PgDaoError;
pub use store::PostgresRoomStore;

use crate::dao::storage::StorageError;

impl From<PgDaoError> for StorageError {
    fn from(err: PgDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

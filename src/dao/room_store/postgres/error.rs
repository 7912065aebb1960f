//! Error types shared by the Postgres storage implementation.

use thiserror::Error;

/// Convenient result alias returning [`PgDaoError`] failures.
pub type PgResult<T> = Result<T, PgDaoError>;

/// Failures that can occur while interacting with Postgres.
#[derive(Debug, Error)]
pub enum PgDaoError {
    /// Required environment variable is missing.
    #[error("missing Postgres environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// The connection string could not be parsed.
    #[error("invalid Postgres connection string")]
    InvalidUrl {
        /// Underlying failure.
        #[source]
        source: sqlx::Error,
    },
    /// Postgres never answered the startup ping.
    #[error("Postgres unreachable after {attempts} attempts")]
    InitialPing {
        /// Pings tried before giving up.
        attempts: u32,
        /// Underlying failure.
        #[source]
        source: sqlx::Error,
    },
    /// Applying the bundled migrations failed.
    #[error("failed to apply Postgres migrations")]
    Migrate {
        /// Underlying failure.
        #[source]
        source: sqlx::migrate::MigrateError,
    },
    /// A query failed for a reason the storage layer does not classify further.
    #[error("Postgres query `{operation}` failed")]
    Query {
        /// Store method that issued the query.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: sqlx::Error,
    },
    /// A row carried a status value outside the known set.
    #[error("room `{room_id}` has unknown status `{value}`")]
    CorruptStatus {
        /// Room carrying the value.
        room_id: String,
        /// The stored status text.
        value: String,
    },
}

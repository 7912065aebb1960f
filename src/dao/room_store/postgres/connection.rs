use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::time::sleep;
use tracing::debug;

use super::{
    config::PgConfig,
    error::{PgDaoError, PgResult},
};

struct RetryPolicy;

impl RetryPolicy {
    const MAX_ATTEMPTS: u32 = 10;
    const INITIAL_DELAY_MS: u64 = 250;

    fn initial_delay() -> Duration {
        Duration::from_millis(Self::INITIAL_DELAY_MS)
    }

    fn next_delay(current: Duration) -> Duration {
        (current * 2).min(Duration::from_secs(5))
    }
}

/// Build the shared pool and wait until Postgres answers a ping.
pub async fn establish_pool(config: &PgConfig) -> PgResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_lazy(&config.url)
        .map_err(|source| PgDaoError::InvalidUrl { source })?;

    let mut attempts = 0;
    let mut delay = RetryPolicy::initial_delay();

    loop {
        match sqlx::query("SELECT 1").execute(&pool).await {
            Ok(_) => break,
            Err(err) => {
                attempts += 1;
                if attempts >= RetryPolicy::MAX_ATTEMPTS {
                    return Err(PgDaoError::InitialPing {
                        attempts,
                        source: err,
                    });
                }
                debug!(attempts, error = %err, "Postgres not ready yet; retrying");
                sleep(delay).await;
                delay = RetryPolicy::next_delay(delay);
            }
        }
    }

    Ok(pool)
}

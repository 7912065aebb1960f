//! Short random identifiers for rooms and users, with bounded retry on collision.

use std::future::Future;

use rand::{Rng, rng};
use thiserror::Error;
use tracing::debug;

use crate::dao::storage::StorageError;

/// Characters identifiers are drawn from.
pub const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length and retry bound for one kind of identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPolicy {
    /// Number of characters drawn from [`ID_ALPHABET`].
    pub length: usize,
    /// Inserts tried before giving up with [`IdError::Exhausted`].
    pub max_attempts: u32,
}

impl IdPolicy {
    /// Six-character room identifiers.
    pub const ROOM: Self = Self {
        length: 6,
        max_attempts: 10,
    };
    /// Eight-character user identifiers.
    pub const USER: Self = Self {
        length: 8,
        max_attempts: 10,
    };
}

/// Failure to obtain a stored row under a fresh identifier.
#[derive(Debug, Error)]
pub enum IdError {
    /// Every generated identifier collided with an existing one.
    #[error("no free identifier after {attempts} attempts")]
    Exhausted { attempts: u32 },
    /// The insert failed for a reason other than a collision.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Draw a random identifier of `length` characters from [`ID_ALPHABET`].
pub fn generate_id(length: usize) -> String {
    let mut rng = rng();
    (0..length)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Run `insert` with fresh identifiers until it stops reporting unique violations,
/// giving up after `policy.max_attempts` tries.
pub async fn insert_with_fresh_id<T, F, Fut>(policy: IdPolicy, mut insert: F) -> Result<T, IdError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    for attempt in 1..=policy.max_attempts {
        let id = generate_id(policy.length);
        match insert(id).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_unique_violation() => {
                debug!(attempt, max = policy.max_attempts, "identifier collision; retrying");
            }
            Err(err) => return Err(IdError::Storage(err)),
        }
    }

    Err(IdError::Exhausted {
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn collision() -> StorageError {
        StorageError::UniqueViolation {
            entity: "room",
            key: "taken".into(),
        }
    }

    #[test]
    fn generated_ids_use_alphabet_and_length() {
        let id = generate_id(8);
        assert_eq!(id.len(), 8);
        assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn retries_past_collisions() {
        let calls = AtomicU32::new(0);
        let id = insert_with_fresh_id(IdPolicy::ROOM, |id| {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move { if call < 3 { Err(collision()) } else { Ok(id) } }
        })
        .await
        .unwrap();

        assert_eq!(id.len(), IdPolicy::ROOM.length);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn gives_up_with_distinct_error() {
        let policy = IdPolicy {
            length: 4,
            max_attempts: 3,
        };
        let calls = AtomicU32::new(0);
        let err = insert_with_fresh_id(policy, |_id| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(collision()) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, IdError::Exhausted { attempts: 3 }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn other_storage_failures_are_not_retried() {
        let calls = AtomicU32::new(0);
        let err = insert_with_fresh_id(IdPolicy::USER, |_id| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(StorageError::MissingReference { entity: "room" }) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, IdError::Storage(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

use tracing::info;

use crate::{
    dao::models::UserEntity,
    dto::user::UserResponse,
    error::ServiceError,
    ids::insert_with_fresh_id,
    state::SharedState,
};

/// Register a user under a fresh identifier.
pub async fn create_user(
    state: &SharedState,
    user_name: String,
) -> Result<UserResponse, ServiceError> {
    if user_name.trim().is_empty() {
        return Err(ServiceError::InvalidInput("user_name must not be empty".into()));
    }

    let store = state.store();
    let user = insert_with_fresh_id(state.user_ids(), |id| {
        let user = UserEntity {
            id,
            user_name: user_name.clone(),
        };
        let insert = store.insert_user(user.clone());
        async move { insert.await.map(|()| user) }
    })
    .await?;

    info!(user_id = %user.id, "user created");
    Ok(user.into())
}

/// All users ordered by name.
pub async fn list_users(state: &SharedState) -> Result<Vec<UserResponse>, ServiceError> {
    let users = state.store().list_users().await?;
    Ok(users.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ids::ID_ALPHABET,
        services::test_support::canned_state,
    };

    #[tokio::test]
    async fn users_get_eight_character_ids() {
        let (state, _store) = canned_state();
        let user = create_user(&state, "Ann".into()).await.unwrap();
        assert_eq!(user.id.len(), 8);
        assert!(user.id.bytes().all(|b| ID_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn users_are_listed_by_name() {
        let (state, _store) = canned_state();
        create_user(&state, "Bob".into()).await.unwrap();
        create_user(&state, "Ann".into()).await.unwrap();

        let names: Vec<_> = list_users(&state)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.user_name)
            .collect();
        assert_eq!(names, ["Ann", "Bob"]);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let (state, _store) = canned_state();
        let err = create_user(&state, "".into()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}

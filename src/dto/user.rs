use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::UserEntity,
    dto::validation::{collect, validate_not_blank},
};

/// Payload registering a user.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub user_name: String,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        collect([("user_name", validate_not_blank(&self.user_name))])
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub user_name: String,
}

impl From<UserEntity> for UserResponse {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
        }
    }
}

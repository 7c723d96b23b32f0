use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_system_time, validation::validate_username},
    state::game::User,
};

/// Payload registering a player.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Display name, 1 to 64 characters, not blank.
    #[validate(length(min = 1, max = 64), custom(function = "validate_username"))]
    pub username: String,
    /// Contact address.
    #[validate(email)]
    pub email: String,
}

/// Registered player as exposed over HTTP.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    /// User identifier.
    pub id: Uuid,
    /// Display name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// RFC 3339 registration timestamp.
    pub created_at: String,
}

impl From<User> for UserSummary {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            username: value.username,
            email: value.email,
            created_at: format_system_time(value.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.into(),
            email: email.into(),
        }
    }

    #[test]
    fn accepts_well_formed_user() {
        assert!(request("alice", "alice@example.com").validate().is_ok());
    }

    #[test]
    fn rejects_blank_username_and_bad_email() {
        assert!(request("   ", "alice@example.com").validate().is_err());
        assert!(request("", "alice@example.com").validate().is_err());
        assert!(request("alice", "not-an-email").validate().is_err());
    }
}

use tracing::info;

use crate::{
    dao::models::UserEntity,
    dto::user::{CreateUserRequest, UserSummary},
    error::ServiceError,
    state::{SharedState, game::User},
};

/// Register a new player.
pub async fn create_user(
    state: &SharedState,
    request: CreateUserRequest,
) -> Result<UserSummary, ServiceError> {
    let CreateUserRequest { username, email } = request;
    let username = username.trim().to_owned();
    if username.is_empty() {
        return Err(ServiceError::InvalidArgument(
            "username must not be empty".into(),
        ));
    }

    let store = state.require_game_store().await?;
    let user = User::new(username, email);
    store.save_user(UserEntity::from(user.clone())).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user.into())
}

/// Every registered player, most recent first.
pub async fn list_users(state: &SharedState) -> Result<Vec<UserSummary>, ServiceError> {
    let store = state.require_game_store().await?;
    Ok(store
        .list_users()
        .await?
        .into_iter()
        .map(|entity| UserSummary::from(User::from(entity)))
        .collect())
}

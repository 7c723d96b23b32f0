#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{GameEntity, UserEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for users and game sessions.
pub trait GameStore: Send + Sync {
    /// Insert or replace a user.
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a user by id.
    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Every user, most recently registered first.
    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    /// Insert or replace a game session.
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a game session by id.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Sessions owned by `user_id`, most recently created first.
    fn list_games_for_user(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Probe the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

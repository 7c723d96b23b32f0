//! Process-local storage backend, used when no database is configured and by tests.

use std::{cmp::Reverse, sync::Arc};

use dashmap::DashMap;
use futures::future::{self, BoxFuture};
use uuid::Uuid;

use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, UserEntity},
    storage::StorageResult,
};

/// [`GameStore`] keeping every entity in concurrent hash maps.
#[derive(Clone, Default)]
pub struct InMemoryGameStore {
    users: Arc<DashMap<Uuid, UserEntity>>,
    games: Arc<DashMap<Uuid, GameEntity>>,
}

impl InMemoryGameStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for InMemoryGameStore {
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.users.insert(user.id, user);
        Box::pin(future::ready(Ok(())))
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let user = self.users.get(&id).map(|entry| entry.value().clone());
        Box::pin(future::ready(Ok(user)))
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let mut users = self
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        users.sort_by_key(|user| Reverse(user.created_at));
        Box::pin(future::ready(Ok(users)))
    }

    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.games.insert(game.id, game);
        Box::pin(future::ready(Ok(())))
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let game = self.games.get(&id).map(|entry| entry.value().clone());
        Box::pin(future::ready(Ok(game)))
    }

    fn list_games_for_user(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let mut games = self
            .games
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        games.sort_by_key(|game| Reverse(game.created_at));
        Box::pin(future::ready(Ok(games)))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(Ok(())))
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(Ok(())))
    }
}

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Registered player persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Primary key of the user.
    pub id: Uuid,
    /// Display name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Registration timestamp.
    pub created_at: SystemTime,
}

/// JSON-shaped game state stored with each session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStateEntity {
    /// Face of each die, `0` when not rolled this turn.
    pub dice_values: Vec<u8>,
    /// Rolls left in the current turn.
    pub rolls_left: u8,
    /// Number of categories already scored.
    pub round: u8,
    /// Category name to score, `null` when unset.
    pub scores: IndexMap<String, Option<u32>>,
    /// Sum of every assigned score.
    pub total_score: u32,
    /// Indices kept on the last roll. Older documents may omit it.
    #[serde(default)]
    pub locked_dice: Vec<usize>,
}

/// Aggregate game session entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the session.
    pub id: Uuid,
    /// Owner of the session.
    pub user_id: Uuid,
    /// Creation timestamp, used to order a user's sessions.
    pub created_at: SystemTime,
    /// Last time the session was updated.
    pub updated_at: SystemTime,
    /// Current game state.
    pub state: GameStateEntity,
    /// Whether every category has been scored.
    pub finished: bool,
}

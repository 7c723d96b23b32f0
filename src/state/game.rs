use std::{collections::BTreeSet, time::SystemTime};

use thiserror::Error;
use uuid::Uuid;

use crate::{
    dao::models::{GameEntity, GameStateEntity, UserEntity},
    state::{
        scoring::{Category, DICE_COUNT, Dice, ScoreCard, ScoreCardError, UnknownCategory},
        state_machine::{GameState, InconsistentState},
    },
};

/// Registered player able to own game sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Registration timestamp.
    pub created_at: SystemTime,
}

impl User {
    /// Build a new user with a fresh identifier.
    pub fn new(username: String, email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            created_at: SystemTime::now(),
        }
    }
}

/// One complete game for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    /// Primary key of the session.
    pub id: Uuid,
    /// Owner of the session.
    pub user_id: Uuid,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last time the state changed.
    pub updated_at: SystemTime,
    /// Current game state.
    pub state: GameState,
}

impl GameSession {
    /// Start a fresh session for `user_id`.
    pub fn new(user_id: Uuid) -> Self {
        let timestamp = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: timestamp,
            updated_at: timestamp,
            state: GameState::new(),
        }
    }

    /// Whether every category has been scored.
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Replace the state and bump the update timestamp.
    pub fn with_state(self, state: GameState) -> Self {
        Self {
            state,
            updated_at: SystemTime::now(),
            ..self
        }
    }
}

/// Reasons a persisted session cannot be turned back into a [`GameSession`].
#[derive(Debug, Error)]
pub enum PersistedStateError {
    /// Wrong number of dice.
    #[error("expected {expected} dice, found {0}", expected = DICE_COUNT)]
    DiceCount(usize),
    /// Category name not part of the card.
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),
    /// Score card incomplete or duplicated.
    #[error(transparent)]
    ScoreCard(#[from] ScoreCardError),
    /// Counters disagree with the card.
    #[error(transparent)]
    Inconsistent(#[from] InconsistentState),
    /// The stored finished flag disagrees with the round counter.
    #[error("finished flag is {flag} but round is {round}")]
    FinishedMismatch {
        /// Stored flag.
        flag: bool,
        /// Stored round counter.
        round: u8,
    },
}

impl From<GameState> for GameStateEntity {
    fn from(value: GameState) -> Self {
        Self {
            dice_values: value.dice_values.to_vec(),
            rolls_left: value.rolls_left,
            round: value.round,
            scores: value
                .scores
                .iter()
                .map(|(category, points)| (category.as_str().to_owned(), points))
                .collect(),
            total_score: value.total_score,
            locked_dice: value.locked_dice.into_iter().collect(),
        }
    }
}

impl TryFrom<GameStateEntity> for GameState {
    type Error = PersistedStateError;

    fn try_from(value: GameStateEntity) -> Result<Self, Self::Error> {
        let dice_count = value.dice_values.len();
        let dice_values: Dice = value
            .dice_values
            .try_into()
            .map_err(|_| PersistedStateError::DiceCount(dice_count))?;

        let slots = value
            .scores
            .into_iter()
            .map(|(name, points)| name.parse::<Category>().map(|category| (category, points)))
            .collect::<Result<Vec<_>, UnknownCategory>>()?;

        let state = GameState {
            dice_values,
            locked_dice: value.locked_dice.into_iter().collect::<BTreeSet<_>>(),
            rolls_left: value.rolls_left,
            round: value.round,
            scores: ScoreCard::from_slots(slots)?,
            total_score: value.total_score,
        };
        state.check_consistency()?;
        Ok(state)
    }
}

impl From<GameSession> for GameEntity {
    fn from(value: GameSession) -> Self {
        let finished = value.is_finished();
        Self {
            id: value.id,
            user_id: value.user_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
            state: value.state.into(),
            finished,
        }
    }
}

impl TryFrom<GameEntity> for GameSession {
    type Error = PersistedStateError;

    fn try_from(value: GameEntity) -> Result<Self, Self::Error> {
        let state = GameState::try_from(value.state)?;
        if state.is_finished() != value.finished {
            return Err(PersistedStateError::FinishedMismatch {
                flag: value.finished,
                round: state.round,
            });
        }

        Ok(Self {
            id: value.id,
            user_id: value.user_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
            state,
        })
    }
}

impl From<UserEntity> for User {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id,
            username: value.username,
            email: value.email,
            created_at: value.created_at,
        }
    }
}

impl From<User> for UserEntity {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            username: value.username,
            email: value.email,
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_entity() -> GameEntity {
        GameSession::new(Uuid::new_v4()).into()
    }

    #[test]
    fn new_session_persists_every_category_unset() {
        let entity = fresh_entity();
        assert_eq!(entity.state.scores.len(), 13);
        assert!(entity.state.scores.values().all(Option::is_none));
        assert_eq!(entity.state.dice_values, vec![0; 5]);
        assert!(entity.state.locked_dice.is_empty());
        assert_eq!(entity.state.rolls_left, 3);
        assert!(!entity.finished);
    }

    #[test]
    fn persisted_layout_matches_wire_shape() {
        let entity = fresh_entity();
        let json = serde_json::to_value(&entity.state).unwrap();
        assert_eq!(json["dice_values"], serde_json::json!([0, 0, 0, 0, 0]));
        assert_eq!(json["rolls_left"], 3);
        assert_eq!(json["round"], 0);
        assert_eq!(json["total_score"], 0);
        assert_eq!(json["locked_dice"], serde_json::json!([]));
        assert!(json["scores"]["three_of_a_kind"].is_null());
    }

    #[test]
    fn entity_round_trips_into_session() {
        let session = GameSession::new(Uuid::new_v4());
        let entity: GameEntity = session.clone().into();
        assert_eq!(GameSession::try_from(entity).unwrap(), session);
    }

    #[test]
    fn missing_locked_dice_defaults_to_empty() {
        let mut json = serde_json::to_value(fresh_entity().state).unwrap();
        json.as_object_mut().unwrap().remove("locked_dice");
        let entity: GameStateEntity = serde_json::from_value(json).unwrap();
        let state = GameState::try_from(entity).unwrap();
        assert!(state.locked_dice.is_empty());
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut entity = fresh_entity();
        entity.state.scores.insert("bonus".into(), None);
        assert!(matches!(
            GameSession::try_from(entity),
            Err(PersistedStateError::UnknownCategory(_))
        ));
    }

    #[test]
    fn wrong_dice_count_is_rejected() {
        let mut entity = fresh_entity();
        entity.state.dice_values.pop();
        assert!(matches!(
            GameSession::try_from(entity),
            Err(PersistedStateError::DiceCount(4))
        ));
    }

    #[test]
    fn finished_flag_must_match_round() {
        let mut entity = fresh_entity();
        entity.finished = true;
        assert!(matches!(
            GameSession::try_from(entity),
            Err(PersistedStateError::FinishedMismatch { .. })
        ));
    }
}

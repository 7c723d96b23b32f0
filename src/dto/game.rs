use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{format_system_time, validation::validate_die_index},
    state::{game::GameSession, scoring::Category, state_machine::GameState},
};

/// Payload starting a new session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartGameRequest {
    /// Owner of the new session.
    pub user_id: Uuid,
}

/// Payload of a roll. Omitting `locked_dice` re-rolls every die.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RollRequest {
    /// Indices (0 to 4) of the dice to keep.
    #[serde(default)]
    pub locked_dice: Option<Vec<usize>>,
}

impl Validate for RollRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for &index in self.locked_dice.iter().flatten() {
            if let Err(e) = validate_die_index(index) {
                errors.add("locked_dice", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Payload assigning the current dice to a category.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChooseScoreRequest {
    /// Category name, e.g. `full_house`.
    #[validate(length(min = 1))]
    pub category: String,
}

/// Wire projection of [`GameState`].
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameStateDto {
    /// Face of each die, `0` before the first roll of a turn.
    pub dice_values: Vec<u8>,
    /// Indices kept on the last roll.
    pub locked_dice: Vec<usize>,
    /// Rolls remaining in the current turn.
    pub rolls_left: u8,
    /// Categories scored so far.
    pub round: u8,
    /// Every category in card order, `null` while unset.
    #[schema(value_type = Object)]
    pub scores: IndexMap<String, Option<u32>>,
    /// Sum of every assigned category.
    pub total_score: u32,
}

/// Session returned by every game operation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameSummary {
    /// Session identifier.
    pub id: Uuid,
    /// Owner of the session.
    pub user_id: Uuid,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last move.
    pub updated_at: String,
    /// Current game state.
    pub state: GameStateDto,
    /// True once all 13 categories are scored.
    pub finished: bool,
}

/// Points each open category would yield for the current dice.
#[derive(Debug, Serialize, ToSchema)]
pub struct PossibleScoresResponse {
    /// Session identifier.
    pub game_id: Uuid,
    /// Dice the preview was computed from.
    pub dice_values: Vec<u8>,
    /// Open category name to the points it would award.
    #[schema(value_type = Object)]
    pub scores: IndexMap<String, u32>,
}

impl From<GameState> for GameStateDto {
    fn from(value: GameState) -> Self {
        Self {
            dice_values: value.dice_values.to_vec(),
            locked_dice: value.locked_dice.into_iter().collect(),
            rolls_left: value.rolls_left,
            round: value.round,
            scores: value
                .scores
                .iter()
                .map(|(category, points)| (category.as_str().to_owned(), points))
                .collect(),
            total_score: value.total_score,
        }
    }
}

impl From<GameSession> for GameSummary {
    fn from(value: GameSession) -> Self {
        let finished = value.is_finished();
        Self {
            id: value.id,
            user_id: value.user_id,
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
            state: value.state.into(),
            finished,
        }
    }
}

impl PossibleScoresResponse {
    /// Keep only the categories still open on the card.
    pub fn new(game_id: Uuid, state: &GameState, scores: IndexMap<Category, u32>) -> Self {
        Self {
            game_id,
            dice_values: state.dice_values.to_vec(),
            scores: state
                .scores
                .open_categories()
                .filter_map(|category| {
                    let points = scores.get(&category)?;
                    Some((category.as_str().to_owned(), *points))
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roll_request_rejects_out_of_range_indices() {
        let request = RollRequest {
            locked_dice: Some(vec![0, 5]),
        };
        assert!(request.validate().is_err());

        let request = RollRequest {
            locked_dice: Some(vec![0, 4, 4]),
        };
        assert!(request.validate().is_ok());
        assert!(RollRequest::default().validate().is_ok());
    }

    #[test]
    fn empty_roll_body_means_no_locks() {
        let request: RollRequest = serde_json::from_str("{}").unwrap();
        assert!(request.locked_dice.is_none());
    }

    #[test]
    fn summary_exposes_rfc3339_timestamps_and_card_order() {
        let summary: GameSummary = GameSession::new(Uuid::new_v4()).into();
        let json = serde_json::to_value(&summary).unwrap();

        assert!(json["created_at"].as_str().unwrap().contains('T'));
        assert_eq!(json["finished"], false);

        let text = serde_json::to_string(&summary.state.scores).unwrap();
        let positions = Category::ALL
            .iter()
            .map(|category| text.find(&format!("\"{}\"", category.as_str())).unwrap())
            .collect::<Vec<_>>();
        assert!(positions.is_sorted(), "categories out of card order: {text}");
    }
}

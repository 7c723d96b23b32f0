use std::collections::BTreeSet;

use thiserror::Error;

use crate::state::{
    dice::DiceRoller,
    scoring::{Category, DICE_COUNT, Dice, MAX_FACE, ScoreCard},
};

/// Rolls available at the start of every turn.
pub const ROLLS_PER_TURN: u8 = 3;
/// Number of turns in a session, one per category.
pub const TOTAL_ROUNDS: u8 = Category::ALL.len() as u8;

/// Phase of the current turn, derived from a [`GameState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Fresh turn, dice not rolled yet.
    AwaitingRoll,
    /// Dice rolled at least once and re-rolls remain.
    Rolling {
        /// Re-rolls still available this turn.
        rolls_left: u8,
    },
    /// All rolls spent; a category must be chosen.
    MustScore,
    /// Every category is scored. Terminal.
    Finished,
}

/// Events that can be applied to a [`GameState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Roll the dice, keeping the listed indices when given.
    Roll {
        /// Indices of the dice to keep. `None` or empty re-rolls everything.
        locked: Option<Vec<usize>>,
    },
    /// Assign the current dice to a category and close the turn.
    Score(Category),
}

/// Reasons an event cannot be applied to the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The session is over.
    #[error("game is finished")]
    Finished,
    /// All rolls of the turn are spent.
    #[error("no rolls left in this turn")]
    NoRollsLeft,
    /// Scoring requires at least one roll in the current turn.
    #[error("dice have not been rolled this turn")]
    NotRolled,
    /// Dice cannot be kept before anything was rolled.
    #[error("dice cannot be locked before the first roll of a turn")]
    LockBeforeFirstRoll,
    /// Locked index outside the dice range.
    #[error("die index {0} is out of range (expected 0..{max})", max = DICE_COUNT)]
    InvalidDieIndex(usize),
    /// Category already holds a score.
    #[error("category `{0}` already scored")]
    CategoryAlreadyScored(Category),
}

/// Stored state that violates the session invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InconsistentState {
    /// Die face outside `0..=6`.
    #[error("die value {0} is out of range")]
    DieOutOfRange(u8),
    /// More rolls than a turn allows.
    #[error("rolls_left {0} exceeds {max}", max = ROLLS_PER_TURN)]
    TooManyRolls(u8),
    /// Round counter disagrees with the score card.
    #[error("round {round} does not match {scored} scored categories")]
    RoundMismatch {
        /// Stored round counter.
        round: u8,
        /// Categories holding a score.
        scored: usize,
    },
    /// Total disagrees with the score card.
    #[error("total_score {total} does not match score sum {sum}")]
    TotalMismatch {
        /// Stored total.
        total: u32,
        /// Sum of the score card.
        sum: u32,
    },
    /// Locked index outside the dice range.
    #[error("locked die index {0} is out of range")]
    LockedOutOfRange(usize),
}

/// Complete state of one game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    /// Current face of each die, `0` when not rolled this turn.
    pub dice_values: Dice,
    /// Dice kept on the last roll.
    pub locked_dice: BTreeSet<usize>,
    /// Rolls remaining in the current turn.
    pub rolls_left: u8,
    /// Number of categories scored so far.
    pub round: u8,
    /// Score card.
    pub scores: ScoreCard,
    /// Sum of every recorded score.
    pub total_score: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            dice_values: [0; DICE_COUNT],
            locked_dice: BTreeSet::new(),
            rolls_left: ROLLS_PER_TURN,
            round: 0,
            scores: ScoreCard::new(),
            total_score: 0,
        }
    }
}

impl GameState {
    /// Fresh state for a newly started session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every category has been scored.
    pub fn is_finished(&self) -> bool {
        self.round >= TOTAL_ROUNDS
    }

    /// Phase of the current turn.
    pub fn phase(&self) -> TurnPhase {
        if self.is_finished() {
            TurnPhase::Finished
        } else if self.rolls_left >= ROLLS_PER_TURN {
            TurnPhase::AwaitingRoll
        } else if self.rolls_left > 0 {
            TurnPhase::Rolling {
                rolls_left: self.rolls_left,
            }
        } else {
            TurnPhase::MustScore
        }
    }

    /// Compute the state reached by applying `event`. `self` is left untouched.
    pub fn apply(
        &self,
        event: GameEvent,
        roller: &dyn DiceRoller,
    ) -> Result<GameState, TransitionError> {
        match (self.phase(), event) {
            (TurnPhase::Finished, _) => Err(TransitionError::Finished),
            (TurnPhase::MustScore, GameEvent::Roll { .. }) => Err(TransitionError::NoRollsLeft),
            (TurnPhase::AwaitingRoll, GameEvent::Score(_)) => Err(TransitionError::NotRolled),
            (phase, GameEvent::Roll { locked }) => self.roll(phase, locked, roller),
            (_, GameEvent::Score(category)) => self.score(category),
        }
    }

    fn roll(
        &self,
        phase: TurnPhase,
        locked: Option<Vec<usize>>,
        roller: &dyn DiceRoller,
    ) -> Result<GameState, TransitionError> {
        let locked = locked.unwrap_or_default().into_iter().collect::<BTreeSet<_>>();

        if let Some(&index) = locked.iter().find(|&&index| index >= DICE_COUNT) {
            return Err(TransitionError::InvalidDieIndex(index));
        }
        if !locked.is_empty() && phase == TurnPhase::AwaitingRoll {
            return Err(TransitionError::LockBeforeFirstRoll);
        }

        let mut next = self.clone();
        for (index, face) in next.dice_values.iter_mut().enumerate() {
            if !locked.contains(&index) {
                *face = roller.roll_die();
            }
        }
        next.locked_dice = locked;
        next.rolls_left -= 1;
        Ok(next)
    }

    fn score(&self, category: Category) -> Result<GameState, TransitionError> {
        if self.scores.is_scored(category) {
            return Err(TransitionError::CategoryAlreadyScored(category));
        }

        let points = category.score(&self.dice_values);
        let mut next = self.clone();
        next.scores
            .record(category, points)
            .map_err(|_| TransitionError::CategoryAlreadyScored(category))?;
        next.total_score += points;
        next.round += 1;

        if next.is_finished() {
            next.rolls_left = 0;
        } else {
            next.rolls_left = ROLLS_PER_TURN;
            next.dice_values = [0; DICE_COUNT];
            next.locked_dice.clear();
        }

        Ok(next)
    }

    /// Check the invariants tying the counters to the score card.
    pub fn check_consistency(&self) -> Result<(), InconsistentState> {
        if let Some(&face) = self.dice_values.iter().find(|&&face| face > MAX_FACE) {
            return Err(InconsistentState::DieOutOfRange(face));
        }
        if self.rolls_left > ROLLS_PER_TURN {
            return Err(InconsistentState::TooManyRolls(self.rolls_left));
        }
        if let Some(&index) = self.locked_dice.iter().find(|&&index| index >= DICE_COUNT) {
            return Err(InconsistentState::LockedOutOfRange(index));
        }

        let scored = self.scores.scored_count();
        if usize::from(self.round) != scored {
            return Err(InconsistentState::RoundMismatch {
                round: self.round,
                scored,
            });
        }

        let sum = self.scores.total();
        if self.total_score != sum {
            return Err(InconsistentState::TotalMismatch {
                total: self.total_score,
                sum,
            });
        }

        Ok(())
    }
}

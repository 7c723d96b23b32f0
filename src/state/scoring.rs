//! Yahtzee scoring table and the per-session score card.
//!
//! Every category maps to a pure function of the five dice, dispatched over
//! [`Category`].

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Number of dice thrown each roll.
pub const DICE_COUNT: usize = 5;
/// Highest face of a die.
pub const MAX_FACE: u8 = 6;

/// Face values of the five dice. `0` marks a die not yet rolled this turn.
pub type Dice = [u8; DICE_COUNT];

type Rule = fn(&Dice) -> u32;

/// The thirteen scoring slots of a Yahtzee card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Sum of all ones.
    Ones,
    /// Sum of all twos.
    Twos,
    /// Sum of all threes.
    Threes,
    /// Sum of all fours.
    Fours,
    /// Sum of all fives.
    Fives,
    /// Sum of all sixes.
    Sixes,
    /// Sum of all dice when a face shows at least three times.
    ThreeOfAKind,
    /// 40 points when a face shows at least four times.
    FourOfAKind,
    /// 25 points for exactly a pair plus a triple.
    FullHouse,
    /// 30 points for a run of four.
    SmallStraight,
    /// 40 points for a run of five.
    LargeStraight,
    /// 50 points for five of a kind.
    Yahtzee,
    /// Sum of all dice.
    Chance,
}

impl Category {
    /// Every category in card order.
    pub const ALL: [Category; 13] = [
        Category::Ones,
        Category::Twos,
        Category::Threes,
        Category::Fours,
        Category::Fives,
        Category::Sixes,
        Category::ThreeOfAKind,
        Category::FourOfAKind,
        Category::FullHouse,
        Category::SmallStraight,
        Category::LargeStraight,
        Category::Yahtzee,
        Category::Chance,
    ];

    /// Wire name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Ones => "ones",
            Category::Twos => "twos",
            Category::Threes => "threes",
            Category::Fours => "fours",
            Category::Fives => "fives",
            Category::Sixes => "sixes",
            Category::ThreeOfAKind => "three_of_a_kind",
            Category::FourOfAKind => "four_of_a_kind",
            Category::FullHouse => "full_house",
            Category::SmallStraight => "small_straight",
            Category::LargeStraight => "large_straight",
            Category::Yahtzee => "yahtzee",
            Category::Chance => "chance",
        }
    }

    /// Points the given dice are worth in this category.
    pub fn score(self, dice: &Dice) -> u32 {
        (self.rule())(dice)
    }

    fn rule(self) -> Rule {
        match self {
            Category::Ones => upper::<1>,
            Category::Twos => upper::<2>,
            Category::Threes => upper::<3>,
            Category::Fours => upper::<4>,
            Category::Fives => upper::<5>,
            Category::Sixes => upper::<6>,
            Category::ThreeOfAKind => three_of_a_kind,
            Category::FourOfAKind => four_of_a_kind,
            Category::FullHouse => full_house,
            Category::SmallStraight => small_straight,
            Category::LargeStraight => large_straight,
            Category::Yahtzee => yahtzee,
            Category::Chance => chance,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a category name does not match any slot of the card.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| UnknownCategory(value.to_owned()))
    }
}

/// Score every category for the given dice, in card order.
pub fn possible_scores(dice: &Dice) -> IndexMap<Category, u32> {
    Category::ALL
        .into_iter()
        .map(|category| (category, category.score(dice)))
        .collect()
}

/// Occurrences of each face, indexed by face value (index 0 counts unrolled dice).
fn face_counts(dice: &Dice) -> [u8; MAX_FACE as usize + 1] {
    let mut counts = [0u8; MAX_FACE as usize + 1];
    for &face in dice {
        if let Some(slot) = counts.get_mut(face as usize) {
            *slot += 1;
        }
    }
    counts
}

fn rolled_counts(dice: &Dice) -> impl Iterator<Item = u8> {
    face_counts(dice).into_iter().skip(1)
}

fn sum(dice: &Dice) -> u32 {
    dice.iter().map(|&face| u32::from(face)).sum()
}

fn has_n_of_a_kind(dice: &Dice, n: u8) -> bool {
    rolled_counts(dice).any(|count| count >= n)
}

fn covers(dice: &Dice, run: &[u8]) -> bool {
    run.iter().all(|face| dice.contains(face))
}

fn upper<const FACE: u8>(dice: &Dice) -> u32 {
    dice.iter()
        .filter(|&&face| face == FACE)
        .map(|&face| u32::from(face))
        .sum()
}

fn three_of_a_kind(dice: &Dice) -> u32 {
    if has_n_of_a_kind(dice, 3) { sum(dice) } else { 0 }
}

fn four_of_a_kind(dice: &Dice) -> u32 {
    if has_n_of_a_kind(dice, 4) { 40 } else { 0 }
}

fn full_house(dice: &Dice) -> u32 {
    let mut counts = rolled_counts(dice)
        .filter(|&count| count > 0)
        .collect::<Vec<_>>();
    counts.sort_unstable();
    if counts == [2, 3] { 25 } else { 0 }
}

fn small_straight(dice: &Dice) -> u32 {
    const RUNS: [[u8; 4]; 3] = [[1, 2, 3, 4], [2, 3, 4, 5], [3, 4, 5, 6]];
    if RUNS.iter().any(|run| covers(dice, run)) {
        30
    } else {
        0
    }
}

fn large_straight(dice: &Dice) -> u32 {
    const RUNS: [[u8; 5]; 2] = [[1, 2, 3, 4, 5], [2, 3, 4, 5, 6]];
    if RUNS.iter().any(|run| covers(dice, run)) {
        40
    } else {
        0
    }
}

fn yahtzee(dice: &Dice) -> u32 {
    if has_n_of_a_kind(dice, 5) { 50 } else { 0 }
}

fn chance(dice: &Dice) -> u32 {
    sum(dice)
}

/// Errors raised while building or updating a [`ScoreCard`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreCardError {
    /// The slot already holds a score.
    #[error("category `{0}` already scored")]
    AlreadyScored(Category),
    /// A category appears more than once in the source data.
    #[error("category `{0}` listed twice")]
    Duplicate(Category),
    /// A category is absent from the source data.
    #[error("category `{0}` missing from score card")]
    Missing(Category),
}

/// Score card holding one optional score per category, always in card order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    slots: IndexMap<Category, Option<u32>>,
}

impl Default for ScoreCard {
    fn default() -> Self {
        Self {
            slots: Category::ALL.into_iter().map(|c| (c, None)).collect(),
        }
    }
}

impl ScoreCard {
    /// A card with every category unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a card from persisted slots. Every category must appear exactly once.
    pub fn from_slots(
        slots: impl IntoIterator<Item = (Category, Option<u32>)>,
    ) -> Result<Self, ScoreCardError> {
        let mut seen = IndexMap::new();
        for (category, points) in slots {
            if seen.insert(category, points).is_some() {
                return Err(ScoreCardError::Duplicate(category));
            }
        }

        let mut card = Self::new();
        for (category, slot) in card.slots.iter_mut() {
            *slot = seen
                .swap_remove(category)
                .ok_or(ScoreCardError::Missing(*category))?;
        }
        Ok(card)
    }

    /// Score recorded for `category`, if any.
    pub fn get(&self, category: Category) -> Option<u32> {
        self.slots.get(&category).copied().flatten()
    }

    /// Whether `category` already holds a score.
    pub fn is_scored(&self, category: Category) -> bool {
        self.get(category).is_some()
    }

    /// Record `points` for an unset category.
    pub fn record(&mut self, category: Category, points: u32) -> Result<(), ScoreCardError> {
        let slot = self.slots.entry(category).or_insert(None);
        if slot.is_some() {
            return Err(ScoreCardError::AlreadyScored(category));
        }
        *slot = Some(points);
        Ok(())
    }

    /// Number of categories holding a score.
    pub fn scored_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.is_some()).count()
    }

    /// Sum of every recorded score.
    pub fn total(&self) -> u32 {
        self.slots.values().flatten().sum()
    }

    /// Categories still open, in card order.
    pub fn open_categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_none())
            .map(|(category, _)| *category)
    }

    /// Iterate over every slot in card order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, Option<u32>)> + '_ {
        self.slots.iter().map(|(category, slot)| (*category, *slot))
    }
}

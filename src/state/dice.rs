use rand::Rng;

use crate::state::scoring::MAX_FACE;

/// Source of die faces used when rolling.
pub trait DiceRoller: Send + Sync {
    /// Draw one face uniformly in `1..=6`.
    fn roll_die(&self) -> u8;
}

/// Default roller backed by the thread-local CSPRNG (ChaCha seeded from the OS).
#[derive(Debug, Default, Clone, Copy)]
pub struct SecureDiceRoller;

impl DiceRoller for SecureDiceRoller {
    fn roll_die(&self) -> u8 {
        rand::rng().random_range(1..=MAX_FACE)
    }
}

/// Roller replaying a fixed list of faces, cycling when exhausted.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ScriptedDiceRoller {
    faces: Vec<u8>,
    cursor: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl ScriptedDiceRoller {
    pub(crate) fn new(faces: impl Into<Vec<u8>>) -> Self {
        Self {
            faces: faces.into(),
            cursor: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
impl DiceRoller for ScriptedDiceRoller {
    fn roll_die(&self) -> u8 {
        let index = self
            .cursor
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.faces[index % self.faces.len()]
    }
}

pub mod dice;
pub mod game;
pub mod scoring;
pub mod state_machine;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::game_store::GameStore,
    error::ServiceError,
    state::dice::{DiceRoller, SecureDiceRoller},
};

/// Handle to the application state shared by every request handler.
pub type SharedState = Arc<AppState>;

/// Central application state holding the storage handle and per-session gates.
pub struct AppState {
    config: AppConfig,
    game_store: RwLock<Option<Arc<dyn GameStore>>>,
    degraded: watch::Sender<bool>,
    dice: Arc<dyn DiceRoller>,
    session_gates: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_dice_roller(config, Arc::new(SecureDiceRoller))
    }

    /// Same as [`AppState::new`] with a custom dice source.
    pub fn with_dice_roller(config: AppConfig, dice: Arc<dyn DiceRoller>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            game_store: RwLock::new(None),
            degraded: degraded_tx,
            dice,
            session_gates: DashMap::new(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Dice source used by roll operations.
    pub fn dice(&self) -> &dyn DiceRoller {
        self.dice.as_ref()
    }

    /// Current game store, or [`ServiceError::Degraded`] when none is installed
    /// or the supervisor flagged it unhealthy.
    pub async fn require_game_store(&self) -> Result<Arc<dyn GameStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        let guard = self.game_store.read().await;
        guard.as_ref().cloned().ok_or(ServiceError::Degraded)
    }

    /// Install a new game store implementation and leave degraded mode.
    pub async fn set_game_store(&self, store: Arc<dyn GameStore>) {
        {
            let mut guard = self.game_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Acquire the gate serialising read-modify-write cycles on one session.
    ///
    /// The gate entry is dropped from the registry together with its last holder.
    pub async fn lock_session(&self, id: Uuid) -> SessionGuard<'_> {
        let gate = self
            .session_gates
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        SessionGuard {
            gates: &self.session_gates,
            id,
            guard: Some(gate.lock_owned().await),
        }
    }

    #[cfg(test)]
    pub(crate) fn session_gate_count(&self) -> usize {
        self.session_gates.len()
    }
}

/// Exclusive access to one session, released on drop.
pub struct SessionGuard<'a> {
    gates: &'a DashMap<Uuid, Arc<Mutex<()>>>,
    id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the registry still references the gate: nobody holds or awaits it.
        self.gates
            .remove_if(&self.id, |_, gate| Arc::strong_count(gate) == 1);
    }
}

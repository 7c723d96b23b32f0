use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::game_store::GameStore,
    dto::game::{GameSummary, PossibleScoresResponse},
    error::ServiceError,
    state::{
        SharedState,
        game::GameSession,
        scoring::{self, Category},
        state_machine::{GameEvent, TurnPhase},
    },
};

/// Open a fresh session for an existing user.
pub async fn start_game(state: &SharedState, user_id: Uuid) -> Result<GameSummary, ServiceError> {
    let store = state.require_game_store().await?;
    if store.find_user(user_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("user `{user_id}` not found")));
    }

    let session = GameSession::new(user_id);
    store.save_game(session.clone().into()).await?;

    info!(game_id = %session.id, %user_id, "game started");
    Ok(session.into())
}

/// Roll every die not listed in `locked_dice`.
pub async fn roll(
    state: &SharedState,
    id: Uuid,
    locked_dice: Option<Vec<usize>>,
) -> Result<GameSummary, ServiceError> {
    let _gate = state.lock_session(id).await;
    let store = state.require_game_store().await?;
    let session = load_session(store.as_ref(), id).await?;

    let next = session.state.apply(
        GameEvent::Roll {
            locked: locked_dice,
        },
        state.dice(),
    )?;
    let session = session.with_state(next);
    store.save_game(session.clone().into()).await?;

    debug!(
        game_id = %id,
        dice = ?session.state.dice_values,
        locked = ?session.state.locked_dice,
        rolls_left = session.state.rolls_left,
        "dice rolled"
    );
    Ok(session.into())
}

/// Assign the current dice to `category` and advance to the next turn.
pub async fn choose_score(
    state: &SharedState,
    id: Uuid,
    category: &str,
) -> Result<GameSummary, ServiceError> {
    let _gate = state.lock_session(id).await;
    let store = state.require_game_store().await?;
    let session = load_session(store.as_ref(), id).await?;
    let category = category.parse::<Category>()?;

    let next = session
        .state
        .apply(GameEvent::Score(category), state.dice())?;
    let session = session.with_state(next);
    store.save_game(session.clone().into()).await?;

    debug!(
        game_id = %id,
        %category,
        points = session.state.scores.get(category).unwrap_or_default(),
        round = session.state.round,
        "category scored"
    );
    if session.is_finished() {
        info!(
            game_id = %id,
            total_score = session.state.total_score,
            "game finished"
        );
    }
    Ok(session.into())
}

/// Fetch one session.
pub async fn get_game(state: &SharedState, id: Uuid) -> Result<GameSummary, ServiceError> {
    let store = state.require_game_store().await?;
    Ok(load_session(store.as_ref(), id).await?.into())
}

/// Sessions of `user_id`, most recent first.
pub async fn list_games(
    state: &SharedState,
    user_id: Uuid,
) -> Result<Vec<GameSummary>, ServiceError> {
    let store = state.require_game_store().await?;
    store
        .list_games_for_user(user_id)
        .await?
        .into_iter()
        .map(|entity| {
            GameSession::try_from(entity)
                .map(GameSummary::from)
                .map_err(ServiceError::from)
        })
        .collect()
}

/// Preview the points each open category would yield for the current dice.
pub async fn possible_scores(
    state: &SharedState,
    id: Uuid,
) -> Result<PossibleScoresResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let session = load_session(store.as_ref(), id).await?;

    match session.state.phase() {
        TurnPhase::Finished => Err(ServiceError::InvalidState(format!(
            "game `{id}` is finished"
        ))),
        TurnPhase::AwaitingRoll => Err(ServiceError::InvalidState(
            "dice have not been rolled this turn".into(),
        )),
        TurnPhase::Rolling { .. } | TurnPhase::MustScore => {
            let scores = scoring::possible_scores(&session.state.dice_values);
            Ok(PossibleScoresResponse::new(id, &session.state, scores))
        }
    }
}

async fn load_session(store: &dyn GameStore, id: Uuid) -> Result<GameSession, ServiceError> {
    let Some(entity) = store.find_game(id).await? else {
        return Err(ServiceError::NotFound(format!("game `{id}` not found")));
    };
    Ok(GameSession::try_from(entity)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{game_store::memory::InMemoryGameStore, models::UserEntity},
        state::{AppState, dice::ScriptedDiceRoller, game::User},
    };

    async fn setup(faces: &[u8]) -> (SharedState, InMemoryGameStore, Uuid) {
        let state = AppState::with_dice_roller(
            AppConfig::default(),
            Arc::new(ScriptedDiceRoller::new(faces.to_vec())),
        );
        let store = InMemoryGameStore::new();
        state.set_game_store(Arc::new(store.clone())).await;

        let user = User::new("alice".into(), "alice@example.com".into());
        let user_id = user.id;
        store.save_user(UserEntity::from(user)).await.unwrap();
        (state, store, user_id)
    }

    #[tokio::test]
    async fn start_requires_a_known_user() {
        let (state, _, _) = setup(&[1]).await;
        let err = start_game(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn start_persists_a_fresh_session() {
        let (state, store, user_id) = setup(&[1]).await;
        let game = start_game(&state, user_id).await.unwrap();

        assert_eq!(game.user_id, user_id);
        assert_eq!(game.state.dice_values, vec![0; 5]);
        assert_eq!(game.state.rolls_left, 3);
        assert_eq!(game.state.round, 0);
        assert!(game.state.scores.values().all(Option::is_none));
        assert!(!game.finished);
        assert!(store.find_game(game.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn roll_keep_and_score_chance() {
        let (state, _, user_id) = setup(&[2, 3, 4, 5, 6, 1, 1, 1]).await;
        let game = start_game(&state, user_id).await.unwrap();

        let first = roll(&state, game.id, None).await.unwrap();
        assert_eq!(first.state.rolls_left, 2);
        assert_eq!(first.state.dice_values, vec![2, 3, 4, 5, 6]);

        let second = roll(&state, game.id, Some(vec![0, 1])).await.unwrap();
        assert_eq!(second.state.rolls_left, 1);
        assert_eq!(second.state.dice_values, vec![2, 3, 1, 1, 1]);
        assert_eq!(second.state.locked_dice, vec![0, 1]);

        let scored = choose_score(&state, game.id, "chance").await.unwrap();
        assert_eq!(scored.state.scores["chance"], Some(8));
        assert_eq!(scored.state.total_score, 8);
        assert_eq!(scored.state.round, 1);
        assert_eq!(scored.state.rolls_left, 3);
        assert_eq!(scored.state.dice_values, vec![0; 5]);
        assert!(scored.state.locked_dice.is_empty());

        let reloaded = get_game(&state, game.id).await.unwrap();
        assert_eq!(reloaded.state.total_score, 8);
    }

    #[tokio::test]
    async fn fourth_roll_is_rejected() {
        let (state, _, user_id) = setup(&[3]).await;
        let game = start_game(&state, user_id).await.unwrap();
        for _ in 0..3 {
            roll(&state, game.id, None).await.unwrap();
        }

        let err = roll(&state, game.id, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(get_game(&state, game.id).await.unwrap().state.rolls_left, 0);
    }

    #[tokio::test]
    async fn invalid_inputs_are_reported() {
        let (state, _, user_id) = setup(&[4]).await;
        let game = start_game(&state, user_id).await.unwrap();

        assert!(matches!(
            roll(&state, Uuid::new_v4(), None).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            choose_score(&state, game.id, "chance").await,
            Err(ServiceError::InvalidState(_))
        ));

        roll(&state, game.id, None).await.unwrap();
        assert!(matches!(
            roll(&state, game.id, Some(vec![5])).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            choose_score(&state, game.id, "bonus").await,
            Err(ServiceError::InvalidArgument(_))
        ));

        choose_score(&state, game.id, "fours").await.unwrap();
        roll(&state, game.id, None).await.unwrap();
        assert!(matches!(
            choose_score(&state, game.id, "fours").await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn full_game_finishes_and_freezes() {
        let (state, _, user_id) = setup(&[6]).await;
        let game = start_game(&state, user_id).await.unwrap();

        let mut last = None;
        for category in Category::ALL {
            roll(&state, game.id, None).await.unwrap();
            last = Some(
                choose_score(&state, game.id, category.as_str())
                    .await
                    .unwrap(),
            );
        }

        let last = last.unwrap();
        assert!(last.finished);
        assert_eq!(last.state.round, 13);
        assert_eq!(last.state.rolls_left, 0);
        // sixes 30, three/four of a kind 30 + 40, yahtzee 50, chance 30
        assert_eq!(last.state.total_score, 180);

        assert!(matches!(
            roll(&state, game.id, None).await,
            Err(ServiceError::InvalidState(_))
        ));
        assert!(matches!(
            choose_score(&state, game.id, "chance").await,
            Err(ServiceError::InvalidState(_))
        ));
        assert!(matches!(
            possible_scores(&state, game.id).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn possible_scores_lists_open_categories() {
        let (state, _, user_id) = setup(&[2, 2, 3, 3, 3]).await;
        let game = start_game(&state, user_id).await.unwrap();

        assert!(matches!(
            possible_scores(&state, game.id).await,
            Err(ServiceError::InvalidState(_))
        ));

        roll(&state, game.id, None).await.unwrap();
        choose_score(&state, game.id, "chance").await.unwrap();
        roll(&state, game.id, None).await.unwrap();

        let preview = possible_scores(&state, game.id).await.unwrap();
        assert_eq!(preview.dice_values, vec![2, 2, 3, 3, 3]);
        assert_eq!(preview.scores.len(), 12);
        assert!(!preview.scores.contains_key("chance"));
        assert_eq!(preview.scores["full_house"], 25);
        assert_eq!(preview.scores["three_of_a_kind"], 13);
    }

    #[tokio::test]
    async fn lists_games_newest_first() {
        let (state, _, user_id) = setup(&[1]).await;
        let first = start_game(&state, user_id).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = start_game(&state, user_id).await.unwrap();

        let ids = list_games(&state, user_id)
            .await
            .unwrap()
            .into_iter()
            .map(|game| game.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![second.id, first.id]);
        assert!(list_games(&state, Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_rolls_do_not_lose_updates() {
        let (state, _, user_id) = setup(&[5]).await;
        let game = start_game(&state, user_id).await.unwrap();

        let (a, b) = tokio::join!(roll(&state, game.id, None), roll(&state, game.id, None));
        a.unwrap();
        b.unwrap();

        assert_eq!(get_game(&state, game.id).await.unwrap().state.rolls_left, 1);
    }

    #[tokio::test]
    async fn session_gates_are_released_after_each_call() {
        let (state, _, user_id) = setup(&[2]).await;
        for _ in 0..100 {
            assert!(matches!(
                roll(&state, Uuid::new_v4(), None).await,
                Err(ServiceError::NotFound(_))
            ));
            assert!(matches!(
                choose_score(&state, Uuid::new_v4(), "chance").await,
                Err(ServiceError::NotFound(_))
            ));
        }
        assert_eq!(state.session_gate_count(), 0);

        let game = start_game(&state, user_id).await.unwrap();
        roll(&state, game.id, None).await.unwrap();
        choose_score(&state, game.id, "twos").await.unwrap();
        assert_eq!(state.session_gate_count(), 0);
    }

    #[tokio::test]
    async fn degraded_mode_rejects_operations() {
        let (state, _, user_id) = setup(&[1]).await;
        state.update_degraded(true);
        assert!(matches!(
            start_game(&state, user_id).await,
            Err(ServiceError::Degraded)
        ));
    }
}

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::game::{
        ChooseScoreRequest, GameSummary, PossibleScoresResponse, RollRequest, StartGameRequest,
    },
    error::{AppError, ErrorBody},
    services::game_service,
    state::SharedState,
};

/// Routes driving game sessions.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/start", post(start_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/roll", post(roll))
        .route("/games/{id}/score", post(choose_score))
        .route("/games/{id}/possible-scores", get(possible_scores))
        .route("/games/user/{user_id}", get(list_games))
}

/// Start a new session for a registered user.
#[utoipa::path(
    post,
    path = "/games/start",
    tag = "game",
    request_body = StartGameRequest,
    responses(
        (status = 200, description = "Game started", body = GameSummary),
        (status = 404, description = "Unknown user", body = ErrorBody)
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Json(payload): Json<StartGameRequest>,
) -> Result<Json<GameSummary>, AppError> {
    let game = game_service::start_game(&state, payload.user_id).await?;
    Ok(Json(game))
}

/// Roll the unlocked dice. The body may be omitted to roll all five.
#[utoipa::path(
    post,
    path = "/games/{id}/roll",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = RollRequest,
    responses(
        (status = 200, description = "Dice rolled", body = GameSummary),
        (status = 400, description = "Invalid die index", body = ErrorBody),
        (status = 404, description = "Unknown game", body = ErrorBody),
        (status = 409, description = "No rolls left or game finished", body = ErrorBody)
    )
)]
pub async fn roll(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<RollRequest>>,
) -> Result<Json<GameSummary>, AppError> {
    let Json(request) = payload.unwrap_or_default();
    request.validate()?;
    let game = game_service::roll(&state, id, request.locked_dice).await?;
    Ok(Json(game))
}

/// Score the current dice in one category.
#[utoipa::path(
    post,
    path = "/games/{id}/score",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = ChooseScoreRequest,
    responses(
        (status = 200, description = "Category scored", body = GameSummary),
        (status = 400, description = "Unknown category", body = ErrorBody),
        (status = 404, description = "Unknown game", body = ErrorBody),
        (status = 409, description = "Category already used or dice not rolled", body = ErrorBody)
    )
)]
pub async fn choose_score(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<ChooseScoreRequest>>,
) -> Result<Json<GameSummary>, AppError> {
    let game = game_service::choose_score(&state, id, &payload.category).await?;
    Ok(Json(game))
}

/// Fetch one session.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Current session", body = GameSummary),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    Ok(Json(game_service::get_game(&state, id).await?))
}

/// Preview the points of every open category.
#[utoipa::path(
    get,
    path = "/games/{id}/possible-scores",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Score preview", body = PossibleScoresResponse),
        (status = 409, description = "Dice not rolled or game finished", body = ErrorBody)
    )
)]
pub async fn possible_scores(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PossibleScoresResponse>, AppError> {
    Ok(Json(game_service::possible_scores(&state, id).await?))
}

/// Sessions of one user, most recent first.
#[utoipa::path(
    get,
    path = "/games/user/{user_id}",
    tag = "game",
    params(("user_id" = Uuid, Path, description = "Owner of the sessions")),
    responses((status = 200, description = "Sessions of the user", body = [GameSummary]))
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<GameSummary>>, AppError> {
    Ok(Json(game_service::list_games(&state, user_id).await?))
}

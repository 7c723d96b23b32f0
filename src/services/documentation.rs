use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Yahtzee Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::start_game,
        crate::routes::game::roll,
        crate::routes::game::choose_score,
        crate::routes::game::get_game,
        crate::routes::game::possible_scores,
        crate::routes::game::list_games,
        crate::routes::user::create_user,
        crate::routes::user::list_users,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::game::StartGameRequest,
            crate::dto::game::RollRequest,
            crate::dto::game::ChooseScoreRequest,
            crate::dto::game::GameStateDto,
            crate::dto::game::GameSummary,
            crate::dto::game::PossibleScoresResponse,
            crate::dto::user::CreateUserRequest,
            crate::dto::user::UserSummary,
            crate::error::ErrorBody,
            crate::state::scoring::Category,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Game session lifecycle"),
        (name = "user", description = "Player registration"),
    )
)]
pub struct ApiDoc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_valid::Valid;

use crate::{
    dto::user::{CreateUserRequest, UserSummary},
    error::{AppError, ErrorBody},
    services::user_service,
    state::SharedState,
};

/// Routes managing registered players.
pub fn router() -> Router<SharedState> {
    Router::new().route("/users", get(list_users).post(create_user))
}

/// Register a player.
#[utoipa::path(
    post,
    path = "/users",
    tag = "user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserSummary),
        (status = 400, description = "Invalid username or email", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<UserSummary>), AppError> {
    let user = user_service::create_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List every player.
#[utoipa::path(
    get,
    path = "/users",
    tag = "user",
    responses((status = 200, description = "Registered users", body = [UserSummary]))
)]
pub async fn list_users(
    State(state): State<SharedState>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    Ok(Json(user_service::list_users(&state).await?))
}

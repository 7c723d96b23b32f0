//! HTTP-level tests driving the router in-process through `tower::ServiceExt::oneshot`.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use yahtzee_back::{
    config::AppConfig,
    dao::game_store::memory::InMemoryGameStore,
    routes,
    state::{AppState, dice::DiceRoller},
};

/// Rolls 1, 2, 3, 4, 5, 6, 1, ... in order.
#[derive(Default)]
struct CyclingDice(AtomicUsize);

impl DiceRoller for CyclingDice {
    fn roll_die(&self) -> u8 {
        (self.0.fetch_add(1, Ordering::Relaxed) % 6) as u8 + 1
    }
}

async fn app() -> Router {
    let state = AppState::with_dice_roller(AppConfig::default(), Arc::new(CyclingDice::default()));
    state.set_game_store(Arc::new(InMemoryGameStore::new())).await;
    routes::router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn create_user(app: &Router) -> String {
    let (status, user) = send(
        app,
        Method::POST,
        "/users",
        Some(json!({"username": "alice", "email": "alice@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    user["id"].as_str().unwrap().to_owned()
}

async fn start_game(app: &Router) -> String {
    let user_id = create_user(app).await;
    let (status, game) = send(
        app,
        Method::POST,
        "/games/start",
        Some(json!({"user_id": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    game["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn healthcheck_reports_ok_with_a_store() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn degraded_without_a_store() {
    let app = routes::router(AppState::new(AppConfig::default()));

    let (status, body) = send(&app, Method::GET, "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");

    let (status, body) = send(&app, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["message"].as_str().unwrap().contains("degraded"));
}

#[tokio::test]
async fn plays_a_turn_end_to_end() {
    let app = app().await;
    let game_id = start_game(&app).await;

    let (status, game) = send(&app, Method::POST, &format!("/games/{game_id}/roll"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["state"]["rolls_left"], 2);
    assert_eq!(game["state"]["dice_values"], json!([1, 2, 3, 4, 5]));

    let (status, game) = send(
        &app,
        Method::POST,
        &format!("/games/{game_id}/roll"),
        Some(json!({"locked_dice": [0, 1]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["state"]["rolls_left"], 1);
    assert_eq!(game["state"]["dice_values"], json!([1, 2, 6, 1, 2]));
    assert_eq!(game["state"]["locked_dice"], json!([0, 1]));

    let (status, preview) = send(
        &app,
        Method::GET,
        &format!("/games/{game_id}/possible-scores"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["scores"]["chance"], 12);
    assert_eq!(preview["scores"]["full_house"], 0);

    let (status, game) = send(
        &app,
        Method::POST,
        &format!("/games/{game_id}/score"),
        Some(json!({"category": "chance"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["state"]["scores"]["chance"], 12);
    assert_eq!(game["state"]["total_score"], 12);
    assert_eq!(game["state"]["round"], 1);
    assert_eq!(game["state"]["rolls_left"], 3);
    assert_eq!(game["state"]["dice_values"], json!([0, 0, 0, 0, 0]));
    assert_eq!(game["finished"], false);

    let (status, fetched) = send(&app, Method::GET, &format!("/games/{game_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["state"], game["state"]);

    let user_id = fetched["user_id"].as_str().unwrap();
    let (status, games) = send(&app, Method::GET, &format!("/games/user/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(games.as_array().unwrap().len(), 1);
    assert_eq!(games[0]["id"], game_id.as_str());
}

#[tokio::test]
async fn rejects_invalid_moves() {
    let app = app().await;
    let game_id = start_game(&app).await;
    let roll_uri = format!("/games/{game_id}/roll");
    let score_uri = format!("/games/{game_id}/score");

    let (status, body) = send(&app, Method::POST, &score_uri, Some(json!({"category": "chance"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, Method::POST, &roll_uri, Some(json!({"locked_dice": [0]}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, Method::POST, &roll_uri, Some(json!({"locked_dice": [7]}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("validation failed"));

    for _ in 0..3 {
        let (status, _) = send(&app, Method::POST, &roll_uri, None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = send(&app, Method::POST, &roll_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::POST, &score_uri, Some(json!({"category": "bonus"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, &score_uri, Some(json!({"category": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, &score_uri, Some(json!({"category": "yahtzee"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::POST, &roll_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::POST, &score_uri, Some(json!({"category": "yahtzee"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_resources_are_not_found() {
    let app = app().await;
    let missing = uuid::Uuid::new_v4();

    let (status, _) = send(&app, Method::GET, &format!("/games/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, &format!("/games/{missing}/roll"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/games/start",
        Some(json!({"user_id": missing})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, games) = send(&app, Method::GET, &format!("/games/user/{missing}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(games, json!([]));
}

#[tokio::test]
async fn user_registration_is_validated() {
    let app = app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"username": "bob", "email": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    create_user(&app).await;
    let (status, users) = send(&app, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users[0]["username"], "alice");
}

#[tokio::test]
async fn serves_openapi_document() {
    let app = app().await;
    let (status, doc) = send(&app, Method::GET, "/api-doc/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/games/{id}/roll"].is_object());
}

//! Yahtzee Back binary entrypoint wiring the REST layer to the configured storage backend.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yahtzee_back::{
    config::{AppConfig, StorageBackend},
    dao::game_store::memory::InMemoryGameStore,
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let port = config.port();
    let app_state = AppState::new(config);

    install_storage(&app_state).await;
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the in-memory store right away, or spawn a supervisor for a database backend.
async fn install_storage(state: &SharedState) {
    match state.config().storage() {
        StorageBackend::Memory => use_memory_store(state).await,
        StorageBackend::Mongo => spawn_mongo_supervisor(state).await,
        StorageBackend::Couch => spawn_couch_supervisor(state).await,
    }
}

async fn use_memory_store(state: &SharedState) {
    info!("using in-memory storage; data is lost on restart");
    state.set_game_store(Arc::new(InMemoryGameStore::new())).await;
}

#[cfg(feature = "mongo-store")]
async fn spawn_mongo_supervisor(state: &SharedState) {
    use yahtzee_back::dao::{
        game_store::{
            GameStore,
            mongodb::{MongoConfig, MongoGameStore},
        },
        storage::StorageError,
    };
    use yahtzee_back::services::storage_supervisor;

    tokio::spawn(storage_supervisor::run(state.clone(), || async {
        let config = MongoConfig::from_env().await?;
        let store = MongoGameStore::connect(config).await?;
        Ok::<Arc<dyn GameStore>, StorageError>(Arc::new(store))
    }));
}

#[cfg(not(feature = "mongo-store"))]
async fn spawn_mongo_supervisor(state: &SharedState) {
    warn!("MongoDB storage requested but the `mongo-store` feature is disabled");
    use_memory_store(state).await;
}

#[cfg(feature = "couch-store")]
async fn spawn_couch_supervisor(state: &SharedState) {
    use yahtzee_back::dao::{
        game_store::{
            GameStore,
            couchdb::{CouchConfig, CouchGameStore},
        },
        storage::StorageError,
    };
    use yahtzee_back::services::storage_supervisor;

    tokio::spawn(storage_supervisor::run(state.clone(), || async {
        let config = CouchConfig::from_env()?;
        let store = CouchGameStore::connect(config).await?;
        Ok::<Arc<dyn GameStore>, StorageError>(Arc::new(store))
    }));
}

#[cfg(not(feature = "couch-store"))]
async fn spawn_couch_supervisor(state: &SharedState) {
    warn!("CouchDB storage requested but the `couch-store` feature is disabled");
    use_memory_store(state).await;
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

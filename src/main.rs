//! myFlix API server.
//!
//! Wires configuration, storage, and the router together and serves until
//! killed. All tunables come from the environment (see `Config`).

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use myflix_backend::{
    api::{routes::create_router, AppState},
    auth::JwtHandler,
    config::Config,
    store::{MovieStore, UserStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let user_store = Arc::new(UserStore::new(&config.database_path)?);
    let movie_store = Arc::new(MovieStore::new(&config.database_path)?);
    let seeded = movie_store.seed_if_empty()?;
    if seeded > 0 {
        info!("🎬 Seeded {} movies into an empty catalog", seeded);
    }

    let state = AppState {
        user_store,
        movie_store,
        jwt: Arc::new(JwtHandler::new(config.jwt_secret.clone())),
    };

    let app = create_router(state, &config.cors_allowed_origins);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🚀 myFlix API listening on http://{addr}");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "myflix_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

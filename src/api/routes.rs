//! Router assembly.
//!
//! Two route groups: public (welcome, health, login, registration, static
//! docs) and protected (everything else, behind the token verifier). CORS
//! comes from the configured origin allow-list.

use axum::{
    http::HeaderValue,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
};

use crate::{
    api::{movies, users, AppState},
    auth::{self, require_auth},
    middleware::logging::request_logging,
};

/// Build the full application router.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
        .route("/login", post(auth::api::login))
        .route("/users", post(users::register));

    let protected_routes = Router::new()
        .route(
            "/users/:username",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/:username/movies/:movie_id",
            post(users::add_favorite).delete(users::remove_favorite),
        )
        .route("/movies", get(movies::list_movies))
        .route("/movies/:title", get(movies::get_movie))
        .route("/genres/:name", get(movies::get_genre))
        .route("/directors/:name", get(movies::get_director))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/documentation", ServeDir::new("public"))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// An empty allow-list means any origin; otherwise only the configured
/// origins pass the preflight.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

// ===== Public handlers =====

async fn welcome() -> &'static str {
    "🎬 Welcome to the myFlix API! See /documentation for the route list."
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

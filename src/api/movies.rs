//! Movie endpoints: catalog listing plus title, genre, and director
//! lookups. All of them sit behind the token verifier; none are self-gated
//! since movies belong to nobody.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::AppState,
    error::ApiError,
    models::{Director, Genre, Movie},
};

/// GET /movies
pub async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, ApiError> {
    let movies = state.movie_store.list()?;
    Ok(Json(movies))
}

/// GET /movies/:title (case-insensitive match)
pub async fn get_movie(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Movie>, ApiError> {
    state
        .movie_store
        .find_by_title(&title)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Movie '{title}' not found")))
}

/// GET /genres/:name
pub async fn get_genre(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Genre>, ApiError> {
    state
        .movie_store
        .find_genre(&name)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Genre '{name}' not found")))
}

/// GET /directors/:name
pub async fn get_director(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Director>, ApiError> {
    state
        .movie_store
        .find_director(&name)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Director '{name}' not found")))
}

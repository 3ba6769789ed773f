//! HTTP surface: handlers, router assembly, shared state.

pub mod movies;
pub mod routes;
pub mod users;

use std::sync::Arc;

use crate::{
    auth::JwtHandler,
    store::{MovieStore, UserStore},
};

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub user_store: Arc<UserStore>,
    pub movie_store: Arc<MovieStore>,
    pub jwt: Arc<JwtHandler>,
}

//! Login endpoint
//! Mission: verify credentials and exchange them for a bearer token.

use axum::{extract::State, Json};
use tracing::{info, warn};

use crate::{
    api::AppState,
    auth::models::{LoginRequest, LoginResponse},
    auth::password,
    error::ApiError,
    models::UserResponse,
};

/// POST /login
///
/// An unknown username and a wrong password take the same path out: same
/// status, same body. Nothing in the response says which one happened.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = payload
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::Validation("username is required".to_string()))?;
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("password is required".to_string()))?;

    let user = match state.user_store.find_by_username(username)? {
        Some(user) if password::verify(password, &user.password_hash) => user,
        _ => {
            warn!("Failed login attempt for '{}'", username);
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = state.jwt.issue(&user)?;
    info!("✅ Login successful: {}", user.username);

    Ok(Json(LoginResponse {
        user: UserResponse::from_user(&user),
        token,
    }))
}

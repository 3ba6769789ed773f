//! User endpoints: registration, profile reads and updates, account
//! deletion, and the favorites list.
//!
//! Registration is public; everything else runs behind the token verifier
//! and the self-only rule.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::{
    api::AppState,
    auth::{ensure_self, password, CurrentUser},
    error::ApiError,
    models::UserResponse,
    store::user_store::{NewUser, UserUpdate},
};

/// Registration body. Field names match the original client contract.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

/// Update body: any subset of the registration fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

/// POST /users
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let username = payload
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::Validation("Username is required".to_string()))?;
    validate_username(username)?;

    let password = payload
        .password
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Password is required".to_string()))?;
    validate_password(password)?;

    let email = payload
        .email
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Email is required".to_string()))?;
    validate_email(email)?;

    let user = state.user_store.create(NewUser {
        username: username.to_string(),
        password_hash: password::hash(password)?,
        email: email.to_string(),
        birthday: payload.birthday,
    })?;

    info!("📝 Registered new user: {}", user.username);
    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// GET /users/:username
pub async fn get_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    ensure_self(&current, &username)?;

    let user = state
        .user_store
        .find_by_username(&username)?
        .ok_or_else(|| ApiError::NotFound(format!("User '{username}' not found")))?;

    Ok(Json(UserResponse::from_user(&user)))
}

/// PUT /users/:username
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(username): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    ensure_self(&current, &username)?;

    let mut update = UserUpdate::default();

    if let Some(new_username) = payload.username.as_deref().map(str::trim) {
        validate_username(new_username)?;
        update.username = Some(new_username.to_string());
    }
    if let Some(new_password) = payload.password.as_deref() {
        validate_password(new_password)?;
        update.password_hash = Some(password::hash(new_password)?);
    }
    if let Some(new_email) = payload.email.as_deref() {
        validate_email(new_email)?;
        update.email = Some(new_email.to_string());
    }
    update.birthday = payload.birthday;

    let user = state.user_store.update(&username, update)?;
    Ok(Json(UserResponse::from_user(&user)))
}

/// DELETE /users/:username
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    ensure_self(&current, &username)?;

    state.user_store.delete(&username)?;
    Ok(Json(json!({ "message": format!("{username} was deleted") })))
}

/// POST /users/:username/movies/:movie_id
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((username, movie_id)): Path<(String, String)>,
) -> Result<Json<UserResponse>, ApiError> {
    ensure_self(&current, &username)?;
    let movie_id = parse_movie_id(&movie_id)?;

    if !state.movie_store.exists(&movie_id)? {
        return Err(ApiError::NotFound(format!("Movie '{movie_id}' not found")));
    }

    let user = state.user_store.add_favorite(&username, &movie_id)?;
    Ok(Json(UserResponse::from_user(&user)))
}

/// DELETE /users/:username/movies/:movie_id
pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((username, movie_id)): Path<(String, String)>,
) -> Result<Json<UserResponse>, ApiError> {
    ensure_self(&current, &username)?;
    let movie_id = parse_movie_id(&movie_id)?;

    let user = state.user_store.remove_favorite(&username, &movie_id)?;
    Ok(Json(UserResponse::from_user(&user)))
}

fn parse_movie_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::Validation(format!("'{raw}' is not a valid movie id")))
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::Validation("Username is required".to_string()));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::Validation(
            "Username may only contain letters and digits".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::Validation("Password is required".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if !email.contains('@') {
        return Err(ApiError::Validation(
            "Email does not appear to be valid".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_validation() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("Alice42").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("al ice").is_err());
        assert!(validate_username("alice!").is_err());
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("p1").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_register_request_uses_pascal_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"Username":"alice","Password":"password1","Email":"a@x.com","Birthday":"1990-04-01"}"#,
        )
        .unwrap();
        assert_eq!(req.username.as_deref(), Some("alice"));
        assert_eq!(req.birthday, NaiveDate::from_ymd_opt(1990, 4, 1));
    }
}

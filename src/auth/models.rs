//! Login request and response types.
//!
//! The login body uses one canonical field casing. Earlier revisions of
//! this API accepted `Username`/`username` interchangeably from body or
//! query string; that shim is gone.

use serde::{Deserialize, Serialize};

use crate::models::UserResponse;

/// Login body. Fields are optional at the serde layer so a missing field
/// becomes a 400 validation error rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

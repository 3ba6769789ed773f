//! Token Verifier
//! Mission: gate protected routes behind a valid bearer token.
//!
//! The token is only trusted for identity resolution: after signature and
//! expiry check out, the live user record is re-fetched from the store. A
//! token for a deleted account fails here, and stale profile claims can
//! never leak into authorization decisions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::{api::AppState, error::ApiError, models::User};

/// The authenticated identity for this request, resolved from the store.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware validating `Authorization: Bearer <token>` and attaching the
/// resolved [`CurrentUser`] to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req)
        .ok_or(ApiError::Unauthenticated("Missing authorization token"))?;

    let claims = state
        .jwt
        .decode(&token)
        .map_err(|_| ApiError::Unauthenticated("Invalid or expired token"))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthenticated("Invalid or expired token"))?;

    // Re-resolve the live record; a token may outlive its account.
    let user = state
        .user_store
        .find_by_id(&user_id)?
        .ok_or(ApiError::Unauthenticated("Token no longer matches an account"))?;

    debug!("Authenticated request for {}", user.username);
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Self-only rule: the resolved identity may only act on its own record.
/// Username comparison is exact and case-sensitive.
pub fn ensure_self(current: &CurrentUser, path_username: &str) -> Result<(), ApiError> {
    if current.0.username == path_username {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied)
    }
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    fn current(username: &str) -> CurrentUser {
        CurrentUser(User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            email: "t@x.com".to_string(),
            birthday: None,
            favorite_movies: vec![],
        })
    }

    #[test]
    fn test_ensure_self_accepts_own_record() {
        assert!(ensure_self(&current("alice"), "alice").is_ok());
    }

    #[test]
    fn test_ensure_self_rejects_other_users() {
        let result = ensure_self(&current("alice"), "bob");
        assert!(matches!(result, Err(ApiError::PermissionDenied)));
    }

    #[test]
    fn test_ensure_self_is_case_sensitive() {
        let result = ensure_self(&current("alice"), "Alice");
        assert!(matches!(result, Err(ApiError::PermissionDenied)));
    }

    #[test]
    fn test_bearer_token_extraction() {
        let req = HttpRequest::builder()
            .header("Authorization", "Bearer abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));

        let no_scheme = HttpRequest::builder()
            .header("Authorization", "abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert!(bearer_token(&no_scheme).is_none());

        let missing = HttpRequest::builder().body(Body::empty()).unwrap();
        assert!(bearer_token(&missing).is_none());
    }
}

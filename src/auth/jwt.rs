//! Token Issuer
//! Mission: mint and decode signed, time-limited bearer tokens.
//!
//! Tokens are stateless: validity is signature plus expiry, nothing else.
//! The verifier middleware re-resolves the live user record, so claims
//! carry identity only, never profile data.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::User;

/// Fixed validity window for issued tokens.
const TOKEN_TTL_DAYS: i64 = 7;

/// Claims bound into every token: the user id as subject, the username,
/// issuance time, and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

pub struct JwtHandler {
    secret: String,
}

impl JwtHandler {
    /// The signing secret is injected configuration; there is no default.
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Issue a token for an already-verified identity. Expiry is issuance
    /// plus seven days; tokens are not refreshable in place.
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let expiry = now
            .checked_add_signed(Duration::days(TOKEN_TTL_DAYS))
            .context("Invalid timestamp")?;

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now.timestamp() as usize,
            exp: expiry.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign token")
    }

    /// Decode and validate signature and expiry. HS256 only.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn create_test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "testuser".to_string(),
            password_hash: "hash".to_string(),
            email: "t@x.com".to_string(),
            birthday: None,
            favorite_movies: vec![],
        }
    }

    #[test]
    fn test_issue_and_decode_roundtrip() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let user = create_test_user();

        let token = handler.issue(&user).unwrap();
        assert!(!token.is_empty());

        let claims = handler.decode(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "testuser");
    }

    #[test]
    fn test_expiry_is_seven_days_out() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let token = handler.issue(&create_test_user()).unwrap();
        let claims = handler.decode(&token).unwrap();

        let window = claims.exp - claims.iat;
        assert_eq!(window, (7 * 24 * 3600) as usize);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        assert!(handler.decode("not.a.token").is_err());
        assert!(handler.decode("").is_err());
    }

    #[test]
    fn test_different_secrets_reject() {
        let issuer = JwtHandler::new("secret1".to_string());
        let verifier = JwtHandler::new("secret2".to_string());

        let token = issuer.issue(&create_test_user()).unwrap();
        assert!(verifier.decode(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let now = Utc::now().timestamp();

        // hand-craft a token that expired an hour ago, past default leeway
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "testuser".to_string(),
            iat: (now - 7200) as usize,
            exp: (now - 3600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret-key-12345".as_bytes()),
        )
        .unwrap();

        assert!(handler.decode(&token).is_err());
    }
}

//! Process configuration.
//!
//! Everything configurable is read from the environment exactly once at
//! startup and carried in a plain struct. The JWT signing secret has no
//! default: the process refuses to boot without one.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    /// Origins allowed by CORS. Empty means allow any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .context("JWT_SECRET must be set (the signing secret is never hard-coded)")?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./myflix.db".to_string());

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        Ok(Self {
            port,
            database_path,
            jwt_secret,
            cors_allowed_origins,
        })
    }
}

/// Split a comma-separated origin list. `*` collapses to the empty
/// (allow-any) list.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "*")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_list_parsing() {
        assert_eq!(
            parse_origins("http://localhost:1234, https://myflix.example.com"),
            vec![
                "http://localhost:1234".to_string(),
                "https://myflix.example.com".to_string()
            ]
        );
    }

    #[test]
    fn test_wildcard_means_allow_any() {
        assert!(parse_origins("*").is_empty());
        assert!(parse_origins("").is_empty());
    }
}

//! Configuration for the breeding tracker server
//!
//! CLI arguments with environment variable fallbacks. A `.env` file in the
//! working directory is loaded before parsing.

use anyhow::{bail, Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use std::net::SocketAddr;

/// Minimum accepted length for the token signing secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Breeding records API for rodent colonies
#[derive(Parser, Debug, Clone)]
#[command(name = "breeding-tracker")]
#[command(about = "Breeding records API for rodent colonies")]
pub struct Config {
    /// SQLite connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:breeding.db")]
    pub database_url: String,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// Comma separated list of origins allowed to call the API
    #[arg(
        long,
        env = "CORS_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:8080"
    )]
    pub cors_allowed_origins: Vec<String>,

    /// Issuer written into and required from access tokens
    #[arg(long, env = "JWT_ISSUER", default_value = "breeding-tracker")]
    pub jwt_issuer: String,

    /// Audience written into and required from access tokens
    #[arg(long, env = "JWT_AUDIENCE", default_value = "breeding-tracker-clients")]
    pub jwt_audience: String,

    /// Secret used to sign access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Load `.env` (if any) and parse arguments
    pub fn load() -> Self {
        // Missing .env is the normal case outside development
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    /// Check values clap cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!("JWT_SECRET must be at least {} characters", MIN_JWT_SECRET_LEN);
        }
        if self.jwt_expiry_seconds == 0 {
            bail!("JWT_EXPIRY_SECONDS must be positive");
        }
        self.cors_origins()?;
        Ok(())
    }

    /// Allowed CORS origins as header values
    pub fn cors_origins(&self) -> Result<Vec<HeaderValue>> {
        self.cors_allowed_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin: {}", origin))
            })
            .collect()
    }

    /// Configuration used by tests: in-memory database and a fixed secret
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            listen: SocketAddr::from(([127, 0, 0, 1], 0)),
            cors_allowed_origins: vec!["http://localhost:8080".to_string()],
            jwt_issuer: "breeding-tracker".to_string(),
            jwt_audience: "breeding-tracker-clients".to_string(),
            jwt_secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            jwt_expiry_seconds: 3600,
            log_level: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_args() {
        let config = Config::try_parse_from([
            "breeding-tracker",
            "--jwt-secret",
            "0123456789abcdef0123456789abcdef",
            "--cors-allowed-origins",
            "http://a.test,http://b.test",
            "--listen",
            "0.0.0.0:9000",
        ])
        .expect("arguments should parse");

        assert_eq!(config.listen.port(), 9000);
        assert_eq!(config.cors_allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.cors_origins().unwrap().len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = Config::for_tests();
        config.jwt_secret = "too-short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let mut config = Config::for_tests();
        config.cors_allowed_origins = vec!["http://bad\norigin".to_string()];
        assert!(config.cors_origins().is_err());
    }
}

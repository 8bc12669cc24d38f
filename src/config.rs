use std::env;
use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// Minimum length of the token-signing secret, in bytes. HS256 with anything
/// shorter is brute-forceable, so startup refuses it outright.
pub const MIN_SECRET_BYTES: usize = 32;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The URL of the Redis server.
    pub redis_url: String,
    /// The HMAC secret used to sign bearer tokens.
    pub jwt_secret: Zeroizing<String>,
    /// The issuer claim stamped into every token.
    pub jwt_issuer: String,
    /// Token lifetime in milliseconds.
    pub jwt_expiration_ms: i64,
    /// Base URL of the external video source.
    pub source_base_url: String,
    /// TTL for cached user lookups, in seconds.
    pub user_cache_ttl_secs: u64,
    /// TTL for cached video statistics, in seconds.
    pub stats_cache_ttl_secs: u64,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .context("JWT_SECRET must be set (generate with: openssl rand -base64 48)")?;

        if jwt_secret.len() < MIN_SECRET_BYTES {
            anyhow::bail!(
                "JWT_SECRET must be at least {} bytes, got {}",
                MIN_SECRET_BYTES,
                jwt_secret.len()
            );
        }

        let jwt_expiration_ms: i64 = env::var("JWT_EXPIRATION_MS")
            .unwrap_or_else(|_| "3600000".to_string())
            .parse()
            .context("Invalid JWT_EXPIRATION_MS")?;

        if jwt_expiration_ms <= 0 {
            anyhow::bail!("JWT_EXPIRATION_MS must be positive");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            jwt_secret: Zeroizing::new(jwt_secret),
            jwt_issuer: env::var("JWT_ISSUER")
                .unwrap_or_else(|_| "vidmeta".to_string()),
            jwt_expiration_ms,
            source_base_url: env::var("SOURCE_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3001".to_string()),
            user_cache_ttl_secs: env::var("USER_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("Invalid USER_CACHE_TTL_SECS")?,
            stats_cache_ttl_secs: env::var("STATS_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("Invalid STATS_CACHE_TTL_SECS")?,
        })
    }
}

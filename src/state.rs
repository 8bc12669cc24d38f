use deadpool_postgres::Pool;
use redis::aio::ConnectionManager;

use crate::config::Config;
use crate::error::Result;
use crate::integration::source::SourceClient;
use crate::security::token::TokenCodec;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: Pool,
    /// The Redis connection manager.
    pub redis: ConnectionManager,
    /// The application's configuration.
    pub config: Config,
    /// Issues and checks session tokens.
    pub token_codec: TokenCodec,
    /// The external video source client.
    pub source_client: SourceClient,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL pool initialized with deadpool-postgres");

        let redis_client = redis::Client::open(config.redis_url.as_str())?;
        let redis = ConnectionManager::new(redis_client).await?;
        tracing::info!("✅ Redis connection manager initialized (pooled)");

        let token_codec = TokenCodec::new(
            &config.jwt_secret,
            config.jwt_issuer.clone(),
            config.jwt_expiration_ms,
        );
        tracing::info!("✅ Token codec initialized (issuer: {})", config.jwt_issuer);

        let source_client = SourceClient::new(&config.source_base_url)?;
        tracing::info!(
            "✅ Source client initialized for {}",
            config.source_base_url
        );

        Ok(AppState {
            db,
            redis,
            config: config.clone(),
            token_codec,
            source_client,
        })
    }
}

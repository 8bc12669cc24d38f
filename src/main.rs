use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};

use std::net::SocketAddr;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod config;
mod db;
mod error;
mod extractors;
mod state;

mod models {
    pub mod page;
    pub mod user;
    pub mod video;
}

mod repositories {
    pub mod user;
    pub mod video;
}

mod security {
    pub mod password;
    pub mod policy;
    pub mod token;
}

mod integration {
    pub mod circuit;
    pub mod source;
}

mod services {
    pub mod identity;
    pub mod import;
    pub mod videos;
}

mod handlers {
    pub mod auth;
    pub mod health;
    pub mod videos;
}

mod middleware_layer {
    pub mod auth;
}

mod validation {
    pub mod auth;
    pub mod videos;
}

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    let app = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/whoami", get(handlers::auth::whoami))
        .route("/videos", get(handlers::videos::list_videos))
        .route("/videos/import", post(handlers::videos::import_videos))
        .route("/videos/stats", get(handlers::videos::get_video_stats))
        .route("/videos/{id}", get(handlers::videos::get_video_by_id))
        .route("/health", get(handlers::health::health))
        .layer(from_fn(middleware_layer::auth::enforce_policy))
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::authenticate_request,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .with_state(state.clone());

    tokio::spawn(services::import::run_worker(state.clone()));
    tracing::info!("✅ Background import worker started");

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("🚀 Server listening on http://{}", addr);
    tracing::info!("✅ All systems operational");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

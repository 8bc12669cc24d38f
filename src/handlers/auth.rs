use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    extractors::AppJson,
    models::user::CurrentUser,
    services::identity,
    state::AppState,
    validation::auth::validate_login,
};

/// The request payload for user login. Missing fields deserialize as empty
/// strings so they surface as field errors rather than a body rejection.
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// The response payload for a successful login.
#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
    #[serde(rename = "issuedAt")]
    pub issued_at: DateTime<Utc>,
}

/// The authenticated caller as echoed back by `GET /auth/whoami`.
#[derive(Serialize)]
pub struct WhoamiResponse {
    pub id: String,
    pub username: String,
    pub active: bool,
    pub authorities: Vec<String>,
}

/// Handles user login requests.
///
/// Verifies the credentials and issues a signed session token.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `payload` - The login request payload.
///
/// # Returns
///
/// A `Result` containing the token response, or an error if the
/// credentials are missing or wrong.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt for username: {}", payload.username);

    validate_login(&payload.username, &payload.password)?;

    let token = identity::login(&state, &payload.username, &payload.password).await?;

    let response = LoginResponse {
        token: token.token,
        expires_at: token.expires_at,
        issued_at: token.issued_at,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Returns the profile of the authenticated caller.
///
/// # Arguments
///
/// * `principal` - The authenticated user, inserted by the auth middleware.
///
/// # Returns
///
/// A `Result` containing the caller's profile.
#[axum::debug_handler]
pub async fn whoami(Extension(principal): Extension<CurrentUser>) -> Result<Response> {
    let response = WhoamiResponse {
        id: principal.id.to_string(),
        username: principal.username,
        active: principal.active,
        authorities: principal.authorities,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

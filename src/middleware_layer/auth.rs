use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    models::user::CurrentUser,
    security::policy::{self, Access},
    services::identity,
    state::AppState,
};

/// Pulls the bearer token out of the `Authorization` header.
///
/// Returns `None` for a missing header, a non-bearer scheme, or a blank
/// token; such requests proceed unauthenticated and are stopped later by
/// the policy check if the route needs an identity.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.trim().is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Folds an identity-resolution failure into the gate's rejection.
///
/// A token whose subject no longer exists must fail authentication, not
/// surface as a 404, so `NotFound` becomes an authentication failure naming
/// the subject. Infrastructure errors pass through untouched.
fn resolution_failure(username: &str, error: AppError) -> AppError {
    match error {
        AppError::NotFound(_) => {
            tracing::warn!("User not found: {}", username);
            AppError::Authentication(format!("User not found: {}", username))
        }
        other => other,
    }
}

/// Resolves the request's identity from its bearer token, if it carries one.
///
/// Requests without a token pass through untouched. A presented token must
/// be valid and resolve to a known user whose name matches its subject, or
/// the request fails here regardless of the route.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response`, or an `AppError` rendered as the uniform error body.
pub async fn authenticate_request(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // An earlier layer may already have resolved an identity.
    if request.extensions().get::<CurrentUser>().is_some() {
        return Ok(next.run(request).await);
    }

    let Some(token) = extract_bearer_token(request.headers()) else {
        return Ok(next.run(request).await);
    };

    if !state.token_codec.validate(token) {
        return Err(AppError::Authentication(
            "Invalid or expired token".to_string(),
        ));
    }

    let username = state
        .token_codec
        .extract_username(token)
        .map_err(|_| AppError::Authentication("Username not found in token".to_string()))?;

    let principal = identity::resolve_user(&state, &username)
        .await
        .map_err(|e| resolution_failure(&username, e))?;

    if principal.username != username {
        return Err(AppError::Authentication(
            "Token username mismatch".to_string(),
        ));
    }

    tracing::debug!("User {} authenticated successfully", username);
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Enforces the route policy against the resolved identity.
///
/// Public routes pass through. Every other route needs a resolved identity
/// carrying each of the route's required authority sets.
pub async fn enforce_policy(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let access = policy::requirements_for(request.method(), request.uri().path());

    let Access::Protected(required_sets) = access else {
        return Ok(next.run(request).await);
    };

    let Some(principal) = request.extensions().get::<CurrentUser>() else {
        return Err(AppError::Authentication(
            "Full authentication is required to access this resource".to_string(),
        ));
    };

    for alternatives in required_sets {
        if !principal.has_any_authority(alternatives) {
            tracing::warn!(
                "Denying {} {} for user {}",
                request.method(),
                request.uri().path(),
                principal.username
            );
            return Err(AppError::AccessDenied);
        }
    }

    Ok(next.run(request).await)
}

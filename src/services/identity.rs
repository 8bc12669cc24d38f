use crate::{
    cache,
    error::{AppError, Result},
    models::user::CurrentUser,
    repositories::user as user_repo,
    security::{password, token::TokenData},
    state::AppState,
};

/// Builds the cache key holding the resolved principal for `username`.
fn user_cache_key(username: &str) -> String {
    format!("user_details:{}", username)
}

/// Authenticates a username/password pair.
///
/// Unknown usernames and wrong passwords fail with the same error, and the
/// unknown-username branch burns a dummy verification so both failures cost
/// a comparable amount of hashing work.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `username` - The claimed username.
/// * `password_input` - The claimed password.
///
/// # Returns
///
/// A `Result` containing the authenticated principal.
pub async fn authenticate(
    state: &AppState,
    username: &str,
    password_input: &str,
) -> Result<CurrentUser> {
    tracing::debug!("🔐 Authenticating user: {}", username);

    let user = user_repo::find_by_username(&state.db, username)
        .await?
        .ok_or_else(|| {
            password::verify_dummy(password_input);
            AppError::InvalidCredentials
        })?;

    if !password::verify_password(password_input, &user.password)? {
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!("✅ User authenticated: {}", user.id);
    Ok(CurrentUser::from_user(&user))
}

/// Authenticates a user and issues a session token for them.
pub async fn login(state: &AppState, username: &str, password_input: &str) -> Result<TokenData> {
    let user = authenticate(state, username, password_input).await?;
    let token = state.token_codec.issue(&user.username)?;
    tracing::info!("🔑 Session token issued for user: {}", user.id);
    Ok(token)
}

/// Resolves a principal by username, reading through the cache.
///
/// Only successful lookups are cached, so a user created after a miss is
/// picked up on the next call rather than after the TTL.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `username` - The username to resolve.
///
/// # Returns
///
/// A `Result` containing the resolved principal, or `NotFound` when no such
/// user exists.
pub async fn resolve_user(state: &AppState, username: &str) -> Result<CurrentUser> {
    let key = user_cache_key(username);
    let mut redis = state.redis.clone();

    if let Some(cached) = cache::get_json::<CurrentUser>(&mut redis, &key).await? {
        tracing::debug!("Resolved user {} from cache", username);
        return Ok(cached);
    }

    let user = user_repo::find_by_username(&state.db, username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found: {}", username)))?;
    let principal = CurrentUser::from_user(&user);

    cache::put_json(&mut redis, &key, &principal, state.config.user_cache_ttl_secs).await?;
    Ok(principal)
}

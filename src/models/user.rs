use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a stored user account. Accounts are provisioned out of band;
/// this service only ever reads them.
#[derive(Clone, Debug)]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's username.
    pub username: String,
    /// The user's Argon2id password hash.
    pub password: String,
    /// Whether the account is active.
    pub active: bool,
    /// The user's authorities as a comma-separated string.
    pub authorities: String,
    /// The timestamp when the row was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The resolved identity attached to an authenticated request.
///
/// Carries no credential material, so it is safe to cache in Redis and to
/// hand to handlers as a request extension.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's username.
    pub username: String,
    /// Whether the account is active.
    pub active: bool,
    /// The user's authorities, in stored order.
    pub authorities: Vec<String>,
}

impl CurrentUser {
    /// Builds the principal from a stored user, splitting the comma-separated
    /// authorities column. Whitespace around entries is dropped, as are empty
    /// entries from stray commas.
    pub fn from_user(user: &User) -> Self {
        let authorities = user
            .authorities
            .split(',')
            .map(str::trim)
            .filter(|authority| !authority.is_empty())
            .map(String::from)
            .collect();

        Self {
            id: user.id,
            username: user.username.clone(),
            active: user.active,
            authorities,
        }
    }

    /// Whether the user holds at least one of the given authorities.
    pub fn has_any_authority(&self, required: &[&str]) -> bool {
        self.authorities
            .iter()
            .any(|held| required.contains(&held.as_str()))
    }
}

use deadpool_postgres::Pool;
use tokio_postgres::Row;

use crate::{error::Result, models::user::User};

/// Maps a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        active: row.try_get("active")?,
        authorities: row.try_get("authorities")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Finds a user by their username.
///
/// Inactive users are returned as well; the `active` flag travels with the
/// record and is surfaced to callers rather than filtered out here.
///
/// # Arguments
///
/// * `pool` - The database connection pool.
/// * `username` - The username to look up (case-sensitive).
///
/// # Returns
///
/// A `Result` containing an `Option<User>`.
pub async fn find_by_username(pool: &Pool, username: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, username, password, active, authorities, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
            &[&username],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

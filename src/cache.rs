//! Cache-aside helpers over Redis. Values are stored as JSON strings with a
//! TTL; callers decide what is worth caching and when to invalidate.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{AppError, Result};

/// Reads a cached JSON value.
///
/// A missing key comes back as `None`. An entry that no longer parses is
/// discarded and reported as a miss so a corrupted value cannot wedge the
/// read path.
pub async fn get_json<T: DeserializeOwned>(
    redis: &mut ConnectionManager,
    key: &str,
) -> Result<Option<T>> {
    let cached: Option<String> = redis.get(key).await?;

    match cached {
        Some(json) => match sonic_rs::from_str(&json) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("❌ Discarding unreadable cache entry {}: {}", key, e);
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

/// Stores a JSON value under `key` with the given TTL.
///
/// # Arguments
///
/// * `redis` - The Redis connection.
/// * `key` - The cache key.
/// * `value` - The value to serialize and store.
/// * `ttl_secs` - Entry lifetime in seconds.
pub async fn put_json<T: Serialize>(
    redis: &mut ConnectionManager,
    key: &str,
    value: &T,
    ttl_secs: u64,
) -> Result<()> {
    let json = sonic_rs::to_string(value)
        .map_err(|e| AppError::Internal(format!("Cache serialization failed: {}", e)))?;

    let _: () = redis.set_ex(key, &json, ttl_secs).await?;
    Ok(())
}

/// Removes a cached value. Deleting a missing key is not an error.
pub async fn delete(redis: &mut ConnectionManager, key: &str) -> Result<()> {
    let _: () = redis.del(key).await?;
    Ok(())
}

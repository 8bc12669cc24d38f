use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use uuid::Uuid;

use crate::{error::Result, services::videos, state::AppState};

/// Redis list carrying queued import jobs.
pub const IMPORT_QUEUE_KEY: &str = "video:import:queue";

/// How long each queue poll blocks before coming up empty.
const QUEUE_POLL_TIMEOUT_SECS: f64 = 5.0;
/// Pause after a queue read error, so a dead Redis does not spin the loop.
const QUEUE_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Queues an import job.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `trace_id` - Correlates the queued job with the initiating request.
pub async fn enqueue(state: &AppState, trace_id: Uuid) -> Result<()> {
    let mut redis = state.redis.clone();
    let _: () = redis.lpush(IMPORT_QUEUE_KEY, trace_id.to_string()).await?;
    Ok(())
}

/// Opens the worker's own Redis connection.
///
/// A blocking pop parks its connection until a message arrives, and every
/// clone of a `ConnectionManager` multiplexes one underlying connection.
/// Polling on the shared manager would queue request-path cache reads
/// behind the poll, so the worker gets a connection of its own and
/// `state.redis` never blocks.
async fn open_queue_connection(redis_url: &str) -> Result<ConnectionManager> {
    let client = redis::Client::open(redis_url)?;
    Ok(ConnectionManager::new(client).await?)
}

/// Consumes queued import jobs until the process exits.
///
/// Each message is one import run. A failed run is logged and dropped; the
/// next request for an import queues a fresh job, so there is no replay
/// machinery here. Malformed messages are discarded with a warning.
pub async fn run_worker(state: AppState) {
    let mut redis = loop {
        match open_queue_connection(&state.config.redis_url).await {
            Ok(connection) => break connection,
            Err(e) => {
                tracing::error!("❌ Import queue connection failed: {}", e);
                tokio::time::sleep(QUEUE_RETRY_BACKOFF).await;
            }
        }
    };
    tracing::info!("✅ Import worker listening on {}", IMPORT_QUEUE_KEY);

    loop {
        let message: redis::RedisResult<Option<(String, String)>> =
            redis.brpop(IMPORT_QUEUE_KEY, QUEUE_POLL_TIMEOUT_SECS).await;

        match message {
            Ok(Some((_, raw_trace_id))) => match Uuid::parse_str(&raw_trace_id) {
                Ok(trace_id) => {
                    if let Err(e) = videos::import_from_source(&state, trace_id).await {
                        tracing::error!("❌ Video import failed, traceId: {}: {}", trace_id, e);
                    }
                }
                Err(_) => {
                    tracing::warn!("Discarding malformed import message: {}", raw_trace_id);
                }
            },
            // An idle poll; the queue was empty for the whole timeout.
            Ok(None) => {}
            Err(e) => {
                tracing::error!("❌ Import queue read failed: {}", e);
                tokio::time::sleep(QUEUE_RETRY_BACKOFF).await;
            }
        }
    }
}

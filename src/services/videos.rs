use uuid::Uuid;

use crate::{
    cache,
    error::{AppError, Result},
    models::{
        page::{Page, PageRequest},
        video::{NewVideo, Video, VideoFilter, VideoStats},
    },
    repositories::video as video_repo,
    state::AppState,
};

/// Cache key for the per-source statistics listing.
const STATS_CACHE_KEY: &str = "video_statistics";

/// Lists a page of the catalog matching `filter`.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `filter` - The catalog filter; empty fields constrain nothing.
/// * `page` - The requested page, size, and ordering.
///
/// # Returns
///
/// A `Result` containing the requested page with its totals.
pub async fn list(state: &AppState, filter: &VideoFilter, page: &PageRequest) -> Result<Page<Video>> {
    let (content, total_elements) = video_repo::list_videos(&state.db, filter, page).await?;
    let total_pages = (total_elements + page.size - 1) / page.size;
    Ok(Page {
        page: page.page,
        size: page.size,
        total_elements,
        total_pages,
        content,
    })
}

/// Fetches a single video by its ID.
pub async fn get_by_id(state: &AppState, id: Uuid) -> Result<Video> {
    video_repo::find_by_id(&state.db, &id).await?.ok_or_else(|| {
        tracing::warn!("Could not find video with id: {}", id);
        AppError::NotFound("Video not found".to_string())
    })
}

/// Returns the per-source statistics, reading through the cache.
///
/// An empty result is never cached: statistics usually come up empty only
/// before the first import, and that state should clear as soon as videos
/// arrive rather than after the TTL.
pub async fn stats(state: &AppState) -> Result<Vec<VideoStats>> {
    let mut redis = state.redis.clone();

    if let Some(cached) = cache::get_json::<Vec<VideoStats>>(&mut redis, STATS_CACHE_KEY).await? {
        tracing::debug!("Resolved video statistics from cache");
        return Ok(cached);
    }

    let stats = video_repo::fetch_stats(&state.db).await?;
    if !stats.is_empty() {
        cache::put_json(&mut redis, STATS_CACHE_KEY, &stats, state.config.stats_cache_ttl_secs)
            .await?;
    }
    Ok(stats)
}

/// Pulls the source's full listing into the catalog.
///
/// Each listed video is upserted by URL, and the statistics cache is
/// invalidated once every row has landed. A fetch or upsert failure
/// propagates before the invalidation, leaving the cache untouched.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `trace_id` - Correlates this run with the request that queued it.
pub async fn import_from_source(state: &AppState, trace_id: Uuid) -> Result<()> {
    let videos = state.source_client.fetch_videos().await?;

    for video in videos {
        let new_video = NewVideo::from(video);
        video_repo::upsert_video(&state.db, &new_video).await?;
    }

    let mut redis = state.redis.clone();
    cache::delete(&mut redis, STATS_CACHE_KEY).await?;

    tracing::info!("Imported video from source, traceId: {}", trace_id);
    Ok(())
}

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::Result,
    extractors::{AppPath, AppQuery},
    models::{
        page::Page,
        user::CurrentUser,
        video::{Video, VideoStats},
    },
    services::{import, videos},
    state::AppState,
    validation::videos::{parse_list_query, ListVideosQuery},
};

/// A single catalog entry as returned to the caller.
#[derive(Serialize)]
pub struct VideoResponse {
    pub id: String,
    pub title: String,
    pub source: String,
    pub url: String,
    pub duration: i32,
}

impl From<&Video> for VideoResponse {
    fn from(video: &Video) -> Self {
        Self {
            id: video.id.to_string(),
            title: video.title.clone(),
            source: video.source.clone(),
            url: video.url.clone(),
            duration: video.duration,
        }
    }
}

/// A page of catalog entries plus the paging echo.
#[derive(Serialize)]
pub struct VideoPageResponse {
    pub page: i64,
    pub size: i64,
    #[serde(rename = "totalElements")]
    pub total_elements: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    pub content: Vec<VideoResponse>,
}

impl From<Page<Video>> for VideoPageResponse {
    fn from(page: Page<Video>) -> Self {
        Self {
            page: page.page,
            size: page.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
            content: page.content.iter().map(VideoResponse::from).collect(),
        }
    }
}

/// The aggregate statistics for one source.
#[derive(Serialize)]
pub struct VideoStatsResponse {
    pub source: String,
    #[serde(rename = "totalVideos")]
    pub total_videos: i64,
    #[serde(rename = "averageDuration")]
    pub average_duration: Option<f64>,
}

impl From<&VideoStats> for VideoStatsResponse {
    fn from(stats: &VideoStats) -> Self {
        Self {
            source: stats.source.clone(),
            total_videos: stats.total_videos,
            average_duration: stats.average_duration,
        }
    }
}

/// Lists the video catalog with filtering, sorting, and pagination.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `query` - The raw listing query parameters.
///
/// # Returns
///
/// A `Result` containing the requested page, or a validation error naming
/// every bad parameter.
#[axum::debug_handler]
pub async fn list_videos(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListVideosQuery>,
) -> Result<Response> {
    let (page_request, filter) = parse_list_query(query)?;

    let page = videos::list(&state, &filter, &page_request).await?;

    Ok((StatusCode::OK, Json(VideoPageResponse::from(page))).into_response())
}

/// Fetches a single video by its identifier.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `id` - The video identifier from the path.
///
/// # Returns
///
/// A `Result` containing the video, or a not-found error.
#[axum::debug_handler]
pub async fn get_video_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response> {
    let video = videos::get_by_id(&state, id).await?;

    Ok((StatusCode::OK, Json(VideoResponse::from(&video))).into_response())
}

/// Kicks off an asynchronous catalog import.
///
/// The request is acknowledged as soon as it is queued; the background
/// worker performs the actual fetch and upsert.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `principal` - The authenticated user requesting the import.
///
/// # Returns
///
/// A `Result` containing an empty 204 response.
#[axum::debug_handler]
pub async fn import_videos(
    State(state): State<AppState>,
    Extension(principal): Extension<CurrentUser>,
) -> Result<Response> {
    let trace_id = Uuid::new_v4();

    import::enqueue(&state, trace_id).await?;

    tracing::info!(
        "Video import initiated by user with ID: {}, traceId: {}",
        principal.id,
        trace_id
    );

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Returns per-source aggregate statistics for the catalog.
///
/// # Arguments
///
/// * `state` - The application state.
///
/// # Returns
///
/// A `Result` containing one entry per source.
#[axum::debug_handler]
pub async fn get_video_stats(State(state): State<AppState>) -> Result<Response> {
    let stats = videos::stats(&state).await?;

    let response: Vec<VideoStatsResponse> = stats.iter().map(VideoStatsResponse::from).collect();

    Ok((StatusCode::OK, Json(response)).into_response())
}

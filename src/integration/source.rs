use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::error;

use crate::{
    error::{AppError, Result},
    integration::circuit::CircuitBreaker,
    models::video::NewVideo,
};

const ENDPOINT_VIDEOS: &str = "/videos";

/// Number of calls tracked by the source circuit breaker.
const BREAKER_WINDOW: usize = 10;
/// Failure rate at which the circuit opens.
const BREAKER_FAILURE_RATE: f64 = 0.5;
/// How long the circuit stays open before a probe is let through.
const BREAKER_COOLDOWN: Duration = Duration::from_secs(30);
/// Connect and read timeout for source requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A video record as served by the external source.
///
/// The source also sends its own `id`; it is ignored, since imported rows
/// get identifiers from the catalog.
#[derive(Clone, Debug, Deserialize)]
pub struct SourceVideo {
    pub title: String,
    pub source: String,
    pub url: String,
    pub duration: i32,
    #[serde(rename = "uploadDate")]
    pub upload_date: NaiveDate,
}

impl From<SourceVideo> for NewVideo {
    fn from(video: SourceVideo) -> Self {
        NewVideo {
            title: video.title,
            url: video.url,
            source: video.source,
            duration: video.duration,
            upload_date: video.upload_date,
        }
    }
}

/// HTTP client for the external video source, guarded by a circuit breaker.
#[derive(Clone)]
pub struct SourceClient {
    http: reqwest::Client,
    base_url: String,
    breaker: CircuitBreaker,
}

impl SourceClient {
    /// Creates a client for the source at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build source HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            breaker: CircuitBreaker::new(BREAKER_WINDOW, BREAKER_FAILURE_RATE, BREAKER_COOLDOWN),
        })
    }

    /// Fetches the full video listing from the source.
    ///
    /// # Returns
    ///
    /// A `Result` containing the listed videos. Fails without placing a
    /// request while the circuit is open.
    pub async fn fetch_videos(&self) -> Result<Vec<SourceVideo>> {
        if !self.breaker.try_acquire().await {
            return Err(AppError::Upstream(
                "Video source is unavailable: circuit open".to_string(),
            ));
        }
        match self.request_videos().await {
            Ok(videos) => {
                self.breaker.record_success().await;
                Ok(videos)
            }
            Err(e) => {
                self.breaker.record_failure().await;
                error!("❌ Failed to fetch videos from source: {}", e);
                Err(AppError::Upstream(format!(
                    "Failed to fetch videos from source: {}",
                    e
                )))
            }
        }
    }

    async fn request_videos(&self) -> std::result::Result<Vec<SourceVideo>, reqwest::Error> {
        let url = format!("{}{}", self.base_url, ENDPOINT_VIDEOS);
        let response = self.http.get(&url).send().await?.error_for_status()?;
        response.json::<Vec<SourceVideo>>().await
    }
}

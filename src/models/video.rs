use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a cataloged video.
#[derive(Clone, Debug)]
pub struct Video {
    /// The unique identifier for the video.
    pub id: Uuid,
    /// The video's title.
    pub title: String,
    /// The video's URL. Unique across the catalog; imports upsert on it.
    pub url: String,
    /// The platform the video came from.
    pub source: String,
    /// Duration in seconds.
    pub duration: i32,
    /// The date the video was uploaded to its source.
    pub upload_date: NaiveDate,
    /// The timestamp when the row was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A video record as delivered by the external source, before it has an id.
#[derive(Clone, Debug)]
pub struct NewVideo {
    pub title: String,
    pub url: String,
    pub source: String,
    pub duration: i32,
    pub upload_date: NaiveDate,
}

/// One row of the per-source statistics view.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VideoStats {
    /// The source platform.
    pub source: String,
    /// Number of cataloged videos from this source.
    pub total_videos: i64,
    /// Average duration in seconds, absent when the source has no videos.
    pub average_duration: Option<f64>,
}

/// Optional catalog filters. An absent field constrains nothing, so the
/// empty filter matches every video.
#[derive(Clone, Debug, Default)]
pub struct VideoFilter {
    /// Case-insensitive substring match on the source.
    pub source: Option<String>,
    /// Inclusive lower bound on the upload date.
    pub upload_date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the upload date.
    pub upload_date_to: Option<NaiveDate>,
    /// Inclusive lower bound on the duration, in seconds.
    pub duration_from: Option<i32>,
    /// Inclusive upper bound on the duration, in seconds.
    pub duration_to: Option<i32>,
}

use deadpool_postgres::Pool;
use tokio_postgres::{types::ToSql, Row};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        page::PageRequest,
        video::{NewVideo, Video, VideoFilter, VideoStats},
    },
};

/// An owned query parameter, boxed so a filter can bind values of mixed types.
type SqlParam = Box<dyn ToSql + Send + Sync>;

const VIDEO_COLUMNS: &str =
    "id, title, url, source, duration, upload_date, created_at, updated_at";

/// Maps a `tokio_postgres::Row` to a `Video`.
fn row_to_video(row: &Row) -> Result<Video> {
    Ok(Video {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        source: row.try_get("source")?,
        duration: row.try_get("duration")?,
        upload_date: row.try_get("upload_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Maps a row of the statistics view to a `VideoStats`.
fn row_to_stats(row: &Row) -> Result<VideoStats> {
    Ok(VideoStats {
        source: row.try_get("source")?,
        total_videos: row.try_get("total_videos")?,
        average_duration: row.try_get("average_duration")?,
    })
}

/// Builds the `LIKE` pattern for a source filter.
///
/// Whitespace-only input constrains nothing, matching the behavior of the
/// other absent filter fields.
fn like_pattern(source: &str) -> Option<String> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("%{}%", trimmed.to_lowercase()))
    }
}

/// Composes the `WHERE` clause for a catalog filter.
///
/// Returns the SQL fragment (leading ` WHERE ` included, empty when the
/// filter is empty) and the bound parameters in positional order starting
/// at `$1`. Every fragment is a fixed string; user input only ever travels
/// through the parameter list.
fn filter_sql(filter: &VideoFilter) -> (String, Vec<SqlParam>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<SqlParam> = Vec::new();

    if let Some(pattern) = filter.source.as_deref().and_then(like_pattern) {
        params.push(Box::new(pattern));
        clauses.push(format!("LOWER(source) LIKE ${}", params.len()));
    }
    if let Some(from) = filter.upload_date_from {
        params.push(Box::new(from));
        clauses.push(format!("upload_date >= ${}", params.len()));
    }
    if let Some(to) = filter.upload_date_to {
        params.push(Box::new(to));
        clauses.push(format!("upload_date <= ${}", params.len()));
    }
    if let Some(from) = filter.duration_from {
        params.push(Box::new(from));
        clauses.push(format!("duration >= ${}", params.len()));
    }
    if let Some(to) = filter.duration_to {
        params.push(Box::new(to));
        clauses.push(format!("duration <= ${}", params.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    (where_sql, params)
}

/// Lists a page of videos matching a filter.
///
/// # Arguments
///
/// * `pool` - The database connection pool.
/// * `filter` - The catalog filter; empty fields constrain nothing.
/// * `page` - The requested page, size, and ordering.
///
/// # Returns
///
/// A `Result` containing the page's rows and the total number of matching
/// rows across all pages.
pub async fn list_videos(
    pool: &Pool,
    filter: &VideoFilter,
    page: &PageRequest,
) -> Result<(Vec<Video>, i64)> {
    let client = pool.get().await?;
    let (where_sql, params) = filter_sql(filter);

    let mut param_refs: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(params.len() + 2);
    for param in &params {
        param_refs.push(param.as_ref());
    }

    let count_sql = format!("SELECT COUNT(*) FROM videos{}", where_sql);
    let count_row = client.query_one(count_sql.as_str(), &param_refs).await?;
    let total_elements: i64 = count_row.try_get(0)?;

    // Sort column and direction come from closed enums, never from the
    // request string, so interpolating them here is safe.
    let list_sql = format!(
        "SELECT {} FROM videos{} ORDER BY {} {} LIMIT ${} OFFSET ${}",
        VIDEO_COLUMNS,
        where_sql,
        page.sort_by.as_sql(),
        page.direction.as_sql(),
        params.len() + 1,
        params.len() + 2,
    );
    let limit = page.size;
    let offset = page.offset();
    param_refs.push(&limit);
    param_refs.push(&offset);

    let rows = client.query(list_sql.as_str(), &param_refs).await?;
    let videos = rows.iter().map(row_to_video).collect::<Result<Vec<_>>>()?;
    Ok((videos, total_elements))
}

/// Finds a video by its ID.
pub async fn find_by_id(pool: &Pool, video_id: &Uuid) -> Result<Option<Video>> {
    let client = pool.get().await?;
    let sql = format!("SELECT {} FROM videos WHERE id = $1", VIDEO_COLUMNS);
    let row = client.query_opt(sql.as_str(), &[video_id]).await?;
    row.map(|r| row_to_video(&r)).transpose()
}

/// Inserts a video, or refreshes the existing row when the URL is already
/// cataloged.
///
/// The URL is the natural key for imported videos; re-importing the same
/// URL updates the metadata in place instead of duplicating the row.
pub async fn upsert_video(pool: &Pool, video: &NewVideo) -> Result<()> {
    let client = pool.get().await?;
    client
        .execute(
            r#"
            INSERT INTO videos (id, title, url, duration, source, upload_date, created_at, updated_at)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            ON CONFLICT (url)
            DO UPDATE SET
                title = EXCLUDED.title,
                duration = EXCLUDED.duration,
                source = EXCLUDED.source,
                upload_date = EXCLUDED.upload_date,
                updated_at = CURRENT_TIMESTAMP
            "#,
            &[
                &video.title,
                &video.url,
                &video.duration,
                &video.source,
                &video.upload_date,
            ],
        )
        .await?;
    Ok(())
}

/// Reads the per-source statistics view.
pub async fn fetch_stats(pool: &Pool) -> Result<Vec<VideoStats>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT source, total_videos, average_duration FROM video_stats_per_source",
            &[],
        )
        .await?;
    rows.iter().map(row_to_stats).collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn empty_filter_composes_no_where_clause() {
        let (where_sql, params) = filter_sql(&VideoFilter::default());
        assert_eq!(where_sql, "");
        assert!(params.is_empty());
    }

    #[test]
    fn full_filter_numbers_params_in_order() {
        let filter = VideoFilter {
            source: Some("YouTube".to_string()),
            upload_date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            upload_date_to: NaiveDate::from_ymd_opt(2024, 12, 31),
            duration_from: Some(60),
            duration_to: Some(600),
        };
        let (where_sql, params) = filter_sql(&filter);
        assert_eq!(
            where_sql,
            " WHERE LOWER(source) LIKE $1 AND upload_date >= $2 \
             AND upload_date <= $3 AND duration >= $4 AND duration <= $5"
        );
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn sparse_filter_keeps_numbering_dense() {
        let filter = VideoFilter {
            upload_date_to: NaiveDate::from_ymd_opt(2024, 6, 30),
            duration_to: Some(300),
            ..VideoFilter::default()
        };
        let (where_sql, params) = filter_sql(&filter);
        assert_eq!(where_sql, " WHERE upload_date <= $1 AND duration <= $2");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn like_pattern_lowercases_and_wraps() {
        assert_eq!(like_pattern("  YouTube "), Some("%youtube%".to_string()));
    }

    #[test]
    fn blank_source_constrains_nothing() {
        assert_eq!(like_pattern("   "), None);
        let filter = VideoFilter {
            source: Some("   ".to_string()),
            ..VideoFilter::default()
        };
        let (where_sql, params) = filter_sql(&filter);
        assert_eq!(where_sql, "");
        assert!(params.is_empty());
    }
}

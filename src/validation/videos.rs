use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::{
        page::{PageRequest, SortColumn, SortDirection},
        video::VideoFilter,
    },
};

/// The raw catalog listing query, captured as strings so every complaint
/// about it comes back in one field-error map instead of a transport-level
/// rejection.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListVideosQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortDirection")]
    pub sort_direction: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "uploadDateFrom")]
    pub upload_date_from: Option<String>,
    #[serde(rename = "uploadDateTo")]
    pub upload_date_to: Option<String>,
    #[serde(rename = "durationFrom")]
    pub duration_from: Option<String>,
    #[serde(rename = "durationTo")]
    pub duration_to: Option<String>,
}

const SORT_COLUMNS_HINT: &str =
    "must be one of: id, title, url, source, duration, uploadDate, createdAt, updatedAt";

/// Largest accepted page number or page size. Keeping both inside `i32`
/// keeps the row-offset arithmetic inside `i64` for every accepted request.
const MAX_COUNT: i64 = i32::MAX as i64;

/// Treats empty and whitespace-only values as absent.
fn presence(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.trim().is_empty())
}

fn parse_count(raw: Option<String>, default: i64) -> std::result::Result<i64, String> {
    let Some(raw) = presence(raw) else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(value) if value < 1 => Err("must be greater than or equal to 1".to_string()),
        Ok(value) if value > MAX_COUNT => {
            Err(format!("must be less than or equal to {}", MAX_COUNT))
        }
        Ok(value) => Ok(value),
        Err(_) => Err("must be an integer".to_string()),
    }
}

fn parse_date(raw: Option<String>) -> std::result::Result<Option<NaiveDate>, String> {
    let Some(raw) = presence(raw) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|_| "must be an ISO date (yyyy-MM-dd)".to_string())
}

fn parse_duration(raw: Option<String>) -> std::result::Result<Option<i32>, String> {
    let Some(raw) = presence(raw) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<i32>()
        .map(Some)
        .map_err(|_| "must be an integer".to_string())
}

/// Turns the raw listing query into a page request and filter.
///
/// Every invalid field is reported at once, and nothing unchecked reaches
/// the SQL layer: the sort column and direction come back as closed enums.
///
/// # Arguments
///
/// * `query` - The raw query parameters.
///
/// # Returns
///
/// A `Result` containing the page request and filter, or a `Validation`
/// error with one message per offending parameter.
pub fn parse_list_query(query: ListVideosQuery) -> Result<(PageRequest, VideoFilter)> {
    let mut field_errors: BTreeMap<String, String> = BTreeMap::new();
    let mut page_request = PageRequest::default();
    let mut filter = VideoFilter::default();

    match parse_count(query.page, page_request.page) {
        Ok(value) => page_request.page = value,
        Err(message) => {
            field_errors.insert("page".to_string(), message);
        }
    }
    match parse_count(query.size, page_request.size) {
        Ok(value) => page_request.size = value,
        Err(message) => {
            field_errors.insert("size".to_string(), message);
        }
    }
    if let Some(raw) = presence(query.sort_by) {
        match SortColumn::parse(raw.trim()) {
            Some(column) => page_request.sort_by = column,
            None => {
                field_errors.insert("sortBy".to_string(), SORT_COLUMNS_HINT.to_string());
            }
        }
    }
    if let Some(raw) = presence(query.sort_direction) {
        match SortDirection::parse(raw.trim()) {
            Some(direction) => page_request.direction = direction,
            None => {
                field_errors.insert("sortDirection".to_string(), "must be ASC or DESC".to_string());
            }
        }
    }

    filter.source = presence(query.source);
    match parse_date(query.upload_date_from) {
        Ok(value) => filter.upload_date_from = value,
        Err(message) => {
            field_errors.insert("uploadDateFrom".to_string(), message);
        }
    }
    match parse_date(query.upload_date_to) {
        Ok(value) => filter.upload_date_to = value,
        Err(message) => {
            field_errors.insert("uploadDateTo".to_string(), message);
        }
    }
    match parse_duration(query.duration_from) {
        Ok(value) => filter.duration_from = value,
        Err(message) => {
            field_errors.insert("durationFrom".to_string(), message);
        }
    }
    match parse_duration(query.duration_to) {
        Ok(value) => filter.duration_to = value,
        Err(message) => {
            field_errors.insert("durationTo".to_string(), message);
        }
    }

    if field_errors.is_empty() {
        Ok((page_request, filter))
    } else {
        Err(AppError::Validation(field_errors))
    }
}

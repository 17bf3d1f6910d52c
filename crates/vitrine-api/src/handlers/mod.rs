//! Route handlers, grouped by resource.

pub mod duplicates;
pub mod links;
pub mod media;
pub mod pillars;
pub mod posts;
pub mod seo_meta;
pub mod settings;
pub mod site;
pub mod terms;
pub mod users;

use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use vitrine_core::defaults::{PAGE_LIMIT, PAGE_LIMIT_MAX};

use crate::error::ApiError;

/// `page` / `per_page` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(PAGE_LIMIT).clamp(1, PAGE_LIMIT_MAX)
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

/// `X-WP-Total` and `X-WP-TotalPages` for a listing.
pub fn pagination_headers(total: i64, per_page: i64) -> HeaderMap {
    let pages = if total == 0 { 0 } else { (total + per_page - 1) / per_page };
    let mut headers = HeaderMap::new();
    headers.insert("x-wp-total", HeaderValue::from(total));
    headers.insert("x-wp-totalpages", HeaderValue::from(pages));
    headers
}

/// Term ids as clients send them: an array, a single number, or a
/// comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdList {
    Many(Vec<i64>),
    One(i64),
    Text(String),
}

impl IdList {
    pub fn ids(&self) -> Vec<i64> {
        match self {
            IdList::Many(ids) => ids.clone(),
            IdList::One(id) => vec![*id],
            IdList::Text(text) => parse_id_csv(text),
        }
    }
}

pub fn parse_id_csv(text: &str) -> Vec<i64> {
    text.split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

/// Parse a WordPress date: RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS`
/// (optionally with a space separator) taken as UTC.
pub fn parse_wp_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::BadRequest(format!("invalid date: {}", raw)))
}

/// Render a JSON value as stored metadata: strings as-is, the rest as JSON.
pub fn meta_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_bounds() {
        let q = PageQuery {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.per_page(), 100);
        assert_eq!(q.offset(), 0);

        let q = PageQuery {
            page: Some(3),
            per_page: None,
        };
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn test_pagination_headers() {
        let headers = pagination_headers(21, 10);
        assert_eq!(headers["x-wp-total"], "21");
        assert_eq!(headers["x-wp-totalpages"], "3");
        assert_eq!(pagination_headers(0, 10)["x-wp-totalpages"], "0");
    }

    #[test]
    fn test_id_list_forms() {
        let many: IdList = serde_json::from_str("[1, 2]").unwrap();
        let one: IdList = serde_json::from_str("4").unwrap();
        let text: IdList = serde_json::from_str("\"5, x, 6\"").unwrap();
        assert_eq!(many.ids(), vec![1, 2]);
        assert_eq!(one.ids(), vec![4]);
        assert_eq!(text.ids(), vec![5, 6]);
    }

    #[test]
    fn test_parse_wp_date() {
        let a = parse_wp_date("2026-01-02T03:04:05").unwrap();
        let b = parse_wp_date("2026-01-02T00:04:05-03:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_wp_date("ontem").is_err());
    }

    #[test]
    fn test_meta_value() {
        assert_eq!(meta_value(&serde_json::json!("x")), "x");
        assert_eq!(meta_value(&serde_json::json!([1, 2])), "[1,2]");
        assert_eq!(meta_value(&serde_json::Value::Null), "");
    }
}

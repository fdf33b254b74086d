//! Marketplace collections managed through the admin API
//!
//! Each collection is described by a [`Resource`]: where it lives, which
//! payloads create and update it, and which fields may be used as list
//! filters. [`ResourceService`] runs the CRUD for any of them.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::error::{LaunchpadError, Result};
use crate::storage::traits::{to_document, Document, Filter, SortOrder};

pub mod categories;
pub mod orders;
pub mod products;
pub mod projects;
pub mod service;
pub mod site_config;
pub mod slides;
pub mod stats;
pub mod transactions;
pub mod users;

pub use service::ResourceService;

/// Shape checks that serde alone cannot express
pub trait Validate {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// A document collection exposed through the admin API
pub trait Resource: Send + Sync + 'static {
    /// Human name used in "not found" messages
    const NAME: &'static str;
    /// URL segment under `/api/admin/`
    const PATH: &'static str;
    const COLLECTION: &'static str;
    /// Query parameters accepted as equality filters on list
    const FILTER_FIELDS: &'static [&'static str];
    const DEFAULT_SORT: (&'static str, SortOrder) = ("created_at", SortOrder::Descending);

    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Serialize + Validate + Send + 'static;

    /// Build the stored document for a new record
    fn create_document(payload: Self::Create, id: String, now: DateTime<Utc>) -> Result<Document>;

    /// Fields to `$set` for an update. Absent fields are left untouched.
    fn update_fields(
        update: Self::Update,
        _current: &Document,
        now: DateTime<Utc>,
    ) -> Result<Document> {
        let mut fields = to_document(&update)?;
        fields.retain(|_, value| !value.is_null());
        fields.insert("updated_at".to_string(), serde_json::json!(now));
        Ok(fields)
    }

    /// An entry to append to an array field in the same write as the update
    fn appended_entry(
        _update: &Self::Update,
        _current: &Document,
        _now: DateTime<Utc>,
    ) -> Result<Option<(&'static str, Value)>> {
        Ok(None)
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            limit: params.limit,
            pages: total.div_ceil(params.limit),
        }
    }
}

/// Page selection parsed from the query string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub page: u64,
    pub limit: u64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl ListParams {
    /// `page` starts at 1; `limit` is capped at the maximum page size
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self> {
        let parse = |key: &str, default: u64| -> Result<u64> {
            match query.get(key) {
                Some(raw) => raw.trim().parse::<u64>().ok().filter(|v| *v > 0).ok_or_else(|| {
                    LaunchpadError::ValidationError(format!(
                        "'{}' must be a positive integer",
                        key
                    ))
                }),
                None => Ok(default),
            }
        };

        Ok(Self {
            page: parse("page", 1)?,
            limit: parse("limit", DEFAULT_PAGE_LIMIT)?.min(MAX_PAGE_LIMIT),
        })
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Build an equality filter from the allowed query parameters.
/// `true`/`false` are matched as booleans, everything else as strings.
pub fn filter_from_query(query: &HashMap<String, String>, allowed: &[&str]) -> Filter {
    allowed.iter().fold(Filter::new(), |filter, field| match query.get(*field) {
        Some(raw) => {
            let value = match raw.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                other => Value::String(other.to_string()),
            };
            filter.eq(*field, value)
        }
        None => filter,
    })
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LaunchpadError::ValidationError(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(LaunchpadError::ValidationError(format!("{} must be greater than 0", field)));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(LaunchpadError::ValidationError(format!("{} must not be negative", field)));
    }
    Ok(())
}

/// Absolute http(s) URL
pub(crate) fn require_http_url(field: &str, value: &str) -> Result<()> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => {
            Ok(())
        }
        _ => Err(LaunchpadError::ValidationError(format!(
            "{} must be an absolute http(s) URL",
            field
        ))),
    }
}

pub(crate) fn require_optional_http_url(field: &str, value: &Option<String>) -> Result<()> {
    match value {
        Some(url) if !url.is_empty() => require_http_url(field, url),
        _ => Ok(()),
    }
}

/// Lowercase letters, digits and single dashes
pub(crate) fn require_slug(field: &str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(LaunchpadError::ValidationError(format!(
            "{} must be lowercase letters, digits and dashes",
            field
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_list_params() {
        assert_eq!(ListParams::from_query(&query(&[])).unwrap(), ListParams::default());

        let params = ListParams::from_query(&query(&[("page", "3"), ("limit", "500")])).unwrap();
        assert_eq!(params.limit, MAX_PAGE_LIMIT);
        assert_eq!(params.skip(), 2 * MAX_PAGE_LIMIT);

        assert!(ListParams::from_query(&query(&[("page", "0")])).is_err());
        assert!(ListParams::from_query(&query(&[("limit", "ten")])).is_err());
    }

    #[test]
    fn test_pages_round_up() {
        let params = ListParams { page: 1, limit: 20 };
        assert_eq!(PaginatedResponse::<()>::new(vec![], 41, &params).pages, 3);
        assert_eq!(PaginatedResponse::<()>::new(vec![], 0, &params).pages, 0);
    }

    #[test]
    fn test_filter_from_query_ignores_unknown_fields() {
        let filter = filter_from_query(
            &query(&[("status", "live"), ("featured", "true"), ("password_hash", "x")]),
            &["status", "featured"],
        );
        assert_eq!(filter, Filter::new().eq("status", "live").eq("featured", true));
    }

    #[test]
    fn test_slug_and_url_checks() {
        assert!(require_slug("slug", "lab-kits-2").is_ok());
        assert!(require_slug("slug", "Lab Kits").is_err());
        assert!(require_slug("slug", "-x").is_err());
        assert!(require_http_url("image_url", "https://cdn.example.com/a.png").is_ok());
        assert!(require_http_url("image_url", "javascript:alert(1)").is_err());
        assert!(require_http_url("image_url", "/relative.png").is_err());
    }
}

//! Product categories

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_non_empty, require_optional_http_url, require_slug, Resource, Validate};
use crate::error::Result;
use crate::storage::traits::{to_document, Document, SortOrder};

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub icon_url: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Validate for CategoryCreate {
    fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)?;
        require_slug("slug", &self.slug)?;
        require_optional_http_url("icon_url", &self.icon_url)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub icon_url: Option<String>,
    pub order: Option<i64>,
    pub active: Option<bool>,
}

impl Validate for CategoryUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(slug) = &self.slug {
            require_slug("slug", slug)?;
        }
        require_optional_http_url("icon_url", &self.icon_url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub icon_url: Option<String>,
    pub order: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct Categories;

impl Resource for Categories {
    const NAME: &'static str = "Category";
    const PATH: &'static str = "categories";
    const COLLECTION: &'static str = "categories";
    const FILTER_FIELDS: &'static [&'static str] = &["active", "parent_id"];
    const DEFAULT_SORT: (&'static str, SortOrder) = ("order", SortOrder::Ascending);

    type Create = CategoryCreate;
    type Update = CategoryUpdate;

    fn create_document(payload: CategoryCreate, id: String, now: DateTime<Utc>) -> Result<Document> {
        to_document(&Category {
            id,
            name: payload.name,
            slug: payload.slug,
            description: payload.description,
            parent_id: payload.parent_id,
            icon_url: payload.icon_url,
            order: payload.order,
            active: payload.active,
            created_at: now,
            updated_at: now,
        })
    }
}

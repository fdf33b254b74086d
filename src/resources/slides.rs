//! Homepage slideshow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_http_url, require_non_empty, Resource, Validate};
use crate::error::Result;
use crate::storage::traits::{to_document, Document, SortOrder};

#[derive(Debug, Clone, Deserialize)]
pub struct SlideCreate {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Validate for SlideCreate {
    fn validate(&self) -> Result<()> {
        require_non_empty("title", &self.title)?;
        require_http_url("image_url", &self.image_url)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlideUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    pub order: Option<i64>,
    pub active: Option<bool>,
}

impl Validate for SlideUpdate {
    fn validate(&self) -> Result<()> {
        match &self.image_url {
            Some(url) => require_http_url("image_url", url),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    pub order: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct Slides;

impl Resource for Slides {
    const NAME: &'static str = "Slide";
    const PATH: &'static str = "slides";
    const COLLECTION: &'static str = "slides";
    const FILTER_FIELDS: &'static [&'static str] = &["active"];
    const DEFAULT_SORT: (&'static str, SortOrder) = ("order", SortOrder::Ascending);

    type Create = SlideCreate;
    type Update = SlideUpdate;

    fn create_document(payload: SlideCreate, id: String, now: DateTime<Utc>) -> Result<Document> {
        to_document(&Slide {
            id,
            title: payload.title,
            subtitle: payload.subtitle,
            image_url: payload.image_url,
            cta_text: payload.cta_text,
            cta_link: payload.cta_link,
            order: payload.order,
            active: payload.active,
            created_at: now,
            updated_at: now,
        })
    }
}

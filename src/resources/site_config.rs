//! Singleton site configuration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_non_empty, Validate};
use crate::auth::admin::validate_email;
use crate::constants::{SITE_CONFIG_COLLECTION, SITE_CONFIG_ID};
use crate::error::Result;
use crate::storage::traits::{from_document, to_document};
use crate::storage::SharedDocumentStore;

pub const DEFAULT_SITE_NAME: &str = "DeSci Launchpad";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub id: String,
    pub site_name: String,
    pub contact_email: Option<String>,
    pub maintenance_mode: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            id: SITE_CONFIG_ID.to_string(),
            site_name: DEFAULT_SITE_NAME.to_string(),
            contact_email: None,
            maintenance_mode: false,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfigUpdate {
    pub site_name: String,
    pub contact_email: Option<String>,
    #[serde(default)]
    pub maintenance_mode: bool,
}

impl Validate for SiteConfigUpdate {
    fn validate(&self) -> Result<()> {
        require_non_empty("site_name", &self.site_name)?;
        match &self.contact_email {
            Some(email) => validate_email(email),
            None => Ok(()),
        }
    }
}

#[derive(Clone)]
pub struct SiteConfigService {
    store: SharedDocumentStore,
}

impl SiteConfigService {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self { store }
    }

    /// The stored configuration, or defaults when none was saved yet
    pub async fn get(&self) -> Result<SiteConfig> {
        match self.store.find_by_id(SITE_CONFIG_COLLECTION, SITE_CONFIG_ID).await? {
            Some(document) => from_document(document),
            None => Ok(SiteConfig::default()),
        }
    }

    /// Replace the whole configuration
    pub async fn put(&self, update: SiteConfigUpdate) -> Result<SiteConfig> {
        update.validate()?;
        let config = SiteConfig {
            id: SITE_CONFIG_ID.to_string(),
            site_name: update.site_name,
            contact_email: update.contact_email,
            maintenance_mode: update.maintenance_mode,
            updated_at: Some(Utc::now()),
        };
        self.store
            .upsert(SITE_CONFIG_COLLECTION, to_document(&config)?)
            .await?;
        log::info!("Site configuration updated");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::create_memory_store;

    #[tokio::test]
    async fn test_defaults_then_put() {
        let service = SiteConfigService::new(create_memory_store());
        assert_eq!(service.get().await.unwrap(), SiteConfig::default());

        let saved = service
            .put(SiteConfigUpdate {
                site_name: "DeSci Launch".to_string(),
                contact_email: Some("hello@descilaunch.xyz".to_string()),
                maintenance_mode: true,
            })
            .await
            .unwrap();
        assert_eq!(service.get().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_put_validates() {
        let service = SiteConfigService::new(create_memory_store());
        let result = service
            .put(SiteConfigUpdate {
                site_name: "  ".to_string(),
                contact_email: None,
                maintenance_mode: false,
            })
            .await;
        assert!(result.is_err());
    }
}

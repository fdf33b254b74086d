//! Shared application state, built once at startup and injected into filters

use chrono::Duration as TokenTtl;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::password::PasswordHasher;
use crate::auth::service::{AdminAuthService, SeedCredentials};
use crate::auth::token::TokenManager;
use crate::config::ServerConfig;
use crate::constants::{
    ADMIN_USERS_COLLECTION, BOOTSTRAP_MARKERS_COLLECTION, LOGIN_MIN_DURATION_MS,
    SITE_CONFIG_COLLECTION,
};
use crate::error::Result;
use crate::resources::categories::Categories;
use crate::resources::orders::Orders;
use crate::resources::products::Products;
use crate::resources::projects::Projects;
use crate::resources::site_config::SiteConfigService;
use crate::resources::slides::Slides;
use crate::resources::transactions::Transactions;
use crate::resources::users::Users;
use crate::resources::Resource;
use crate::storage::token_revocation::{create_memory_revocation_store, SharedTokenRevocationStore};
use crate::storage::{create_memory_store, SharedDocumentStore};

/// Every collection the server touches
pub const COLLECTIONS: &[&str] = &[
    ADMIN_USERS_COLLECTION,
    BOOTSTRAP_MARKERS_COLLECTION,
    SITE_CONFIG_COLLECTION,
    Users::COLLECTION,
    Projects::COLLECTION,
    Products::COLLECTION,
    Orders::COLLECTION,
    Transactions::COLLECTION,
    Categories::COLLECTION,
    Slides::COLLECTION,
];

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: SharedDocumentStore,
    pub auth: Arc<AdminAuthService>,
    pub site_config: SiteConfigService,
    pub revocation: Option<SharedTokenRevocationStore>,
}

impl AppState {
    pub fn new(config: ServerConfig, store: SharedDocumentStore) -> Result<Self> {
        Self::with_hasher(
            config,
            store,
            PasswordHasher::new(),
            Duration::from_millis(LOGIN_MIN_DURATION_MS),
        )
    }

    /// Build with explicit hashing cost and login padding
    pub fn with_hasher(
        config: ServerConfig,
        store: SharedDocumentStore,
        hasher: PasswordHasher,
        login_min_duration: Duration,
    ) -> Result<Self> {
        let revocation = config
            .enable_token_revocation
            .then(create_memory_revocation_store);

        let mut tokens = TokenManager::new(
            &config.jwt_secret,
            TokenTtl::minutes(config.jwt_expire_minutes),
        );
        if let Some(revocation) = &revocation {
            tokens = tokens.with_revocation_store(revocation.clone());
        }

        let seed = SeedCredentials {
            email: config.seed_email.clone(),
            password: config.seed_password.clone(),
        };
        let auth = AdminAuthService::new(store.clone(), Arc::new(tokens), hasher, seed)?
            .with_login_min_duration(login_min_duration);

        Ok(Self {
            config: Arc::new(config),
            site_config: SiteConfigService::new(store.clone()),
            store,
            auth: Arc::new(auth),
            revocation,
        })
    }

    /// In-memory state with cheap hashing and no login padding - only for tests
    pub fn for_testing() -> Result<Self> {
        Self::with_hasher(
            ServerConfig::for_testing(),
            create_memory_store(),
            PasswordHasher::for_testing(),
            Duration::ZERO,
        )
    }
}

/// Open the configured document store and prepare its collections
pub async fn connect_store(config: &ServerConfig) -> Result<SharedDocumentStore> {
    let store = if config.uses_memory_store() {
        log::warn!("Using the in-memory document store; data is lost on restart");
        create_memory_store()
    } else {
        open_mongo_store(config).await?
    };

    store.initialize(COLLECTIONS).await?;
    Ok(store)
}

#[cfg(feature = "mongo")]
async fn open_mongo_store(config: &ServerConfig) -> Result<SharedDocumentStore> {
    crate::storage::mongo::create_mongo_store(&config.mongo_uri, &config.db_name).await
}

#[cfg(not(feature = "mongo"))]
async fn open_mongo_store(_config: &ServerConfig) -> Result<SharedDocumentStore> {
    Err(crate::error::LaunchpadError::ConfigError(
        "MONGO_URI points at MongoDB but the server was built without the `mongo` feature"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_selected() {
        let store = connect_store(&ServerConfig::for_testing()).await.unwrap();
        assert!(store.health_check().await.unwrap());
    }

    #[test]
    fn test_revocation_follows_config() {
        let state = AppState::for_testing().unwrap();
        assert!(state.revocation.is_some());

        let mut config = ServerConfig::for_testing();
        config.enable_token_revocation = false;
        let state = AppState::with_hasher(
            config,
            create_memory_store(),
            PasswordHasher::for_testing(),
            Duration::ZERO,
        )
        .unwrap();
        assert!(state.revocation.is_none());
    }
}

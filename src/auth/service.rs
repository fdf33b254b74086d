//! Admin authentication service: login, bootstrap, and admin management
//!
//! Every operation talks to the credential store through the injected
//! `SharedDocumentStore`; nothing here holds global state.

use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::admin::{
    validate_password, AdminIdentity, AdminLogin, AdminLoginResponse, AdminRole, AdminStatus,
    AdminUserCreate, AdminUserResponse, AdminUserUpdate, PasswordChange, SeedOutcome,
};
use crate::auth::password::PasswordHasher;
use crate::auth::token::{Claims, TokenManager};
use crate::constants::{
    ADMIN_USERS_COLLECTION, BOOTSTRAP_MARKERS_COLLECTION, LOGIN_MIN_DURATION_MS,
    SUPER_ADMIN_SEED_MARKER,
};
use crate::error::{LaunchpadError, Result};
use crate::security::AuthTimer;
use crate::storage::token_revocation::RevocationReason;
use crate::storage::traits::{from_document, to_document, Document, Filter, Query, SortOrder};
use crate::storage::SharedDocumentStore;

/// Credential used by the bootstrap step
#[derive(Debug, Clone)]
pub struct SeedCredentials {
    pub email: String,
    pub password: String,
}

pub struct AdminAuthService {
    store: SharedDocumentStore,
    tokens: Arc<TokenManager>,
    hasher: PasswordHasher,
    seed: SeedCredentials,
    /// Verified against when the email is unknown, so both failure paths cost the same
    dummy_hash: String,
    login_min_duration: Duration,
}

impl AdminAuthService {
    pub fn new(
        store: SharedDocumentStore,
        tokens: Arc<TokenManager>,
        hasher: PasswordHasher,
        seed: SeedCredentials,
    ) -> Result<Self> {
        let dummy_hash = hasher.hash(&uuid::Uuid::new_v4().to_string())?;
        Ok(Self {
            store,
            tokens,
            hasher,
            seed,
            dummy_hash,
            login_min_duration: Duration::from_millis(LOGIN_MIN_DURATION_MS),
        })
    }

    /// Override the minimum wall time of a login attempt
    pub fn with_login_min_duration(mut self, duration: Duration) -> Self {
        self.login_min_duration = duration;
        self
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    async fn hash_password(&self, plaintext: &str) -> Result<String> {
        let hasher = self.hasher.clone();
        let plaintext = plaintext.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| LaunchpadError::SystemError(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, plaintext: &str, hash: &str) -> Result<bool> {
        let hasher = self.hasher.clone();
        let (plaintext, hash) = (plaintext.to_string(), hash.to_string());
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash))
            .await
            .map_err(|e| LaunchpadError::SystemError(format!("Verification task failed: {}", e)))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<AdminIdentity>> {
        self.store
            .find_one(ADMIN_USERS_COLLECTION, &Filter::new().eq("email", email))
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<AdminIdentity>> {
        self.store
            .find_by_id(ADMIN_USERS_COLLECTION, id)
            .await?
            .map(from_document)
            .transpose()
    }

    /// Exchange email + password for a token.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn login(&self, credentials: &AdminLogin) -> Result<AdminLoginResponse> {
        let timer = AuthTimer::new(self.login_min_duration);
        let result = self.check_credentials(credentials).await;
        timer.wait().await;
        result
    }

    async fn check_credentials(&self, credentials: &AdminLogin) -> Result<AdminLoginResponse> {
        let Some(mut admin) = self.find_by_email(&credentials.email).await? else {
            self.verify_password(&credentials.password, &self.dummy_hash).await?;
            log::warn!("Failed admin login: unknown email");
            return Err(LaunchpadError::InvalidCredentials);
        };

        if !self.verify_password(&credentials.password, &admin.password_hash).await? {
            log::warn!("Failed admin login for {}: wrong password", admin.id);
            return Err(LaunchpadError::InvalidCredentials);
        }

        if !admin.is_active() {
            log::warn!("Login refused for inactive admin {}", admin.id);
            return Err(LaunchpadError::AccountInactive);
        }

        let token = self.tokens.issue(&admin.id, &admin.email, admin.role)?;

        let now = Utc::now();
        admin.last_login = Some(now);
        admin.updated_at = now;
        let mut fields = Document::new();
        fields.insert("last_login".to_string(), json!(now));
        fields.insert("updated_at".to_string(), json!(now));
        self.store
            .update_by_id(ADMIN_USERS_COLLECTION, &admin.id, fields)
            .await?;

        log::info!("Admin {} logged in", admin.id);
        Ok(AdminLoginResponse {
            token,
            admin: admin.to_response(),
        })
    }

    /// Create the first super admin unless one already exists.
    ///
    /// The marker insert is the atomic step: concurrent callers race on it
    /// and only the winner creates an identity.
    pub async fn seed(&self) -> Result<SeedOutcome> {
        let existing = self
            .store
            .find_one(
                ADMIN_USERS_COLLECTION,
                &Filter::new().eq("role", AdminRole::SuperAdmin.as_str()),
            )
            .await?;
        if existing.is_some() {
            log::info!("Seed skipped: a super admin already exists");
            return Ok(SeedOutcome::AlreadyExists);
        }

        if self.find_by_email(&self.seed.email).await?.is_some() {
            log::warn!("Seed skipped: {} already belongs to a plain admin", self.seed.email);
            return Ok(SeedOutcome::EmailTaken);
        }

        let password_hash = self.hash_password(&self.seed.password).await?;

        let mut marker = Document::new();
        marker.insert("id".to_string(), json!(SUPER_ADMIN_SEED_MARKER));
        marker.insert("created_at".to_string(), json!(Utc::now()));
        if !self
            .store
            .insert_if_absent(BOOTSTRAP_MARKERS_COLLECTION, marker)
            .await?
        {
            log::info!("Seed skipped: bootstrap already claimed");
            return Ok(SeedOutcome::AlreadyExists);
        }

        let admin = AdminIdentity::new(
            self.seed.email.clone(),
            Some("Super Admin".to_string()),
            password_hash,
            AdminRole::SuperAdmin,
        );

        if let Err(e) = self
            .store
            .insert(ADMIN_USERS_COLLECTION, to_document(&admin)?)
            .await
        {
            // Release the claim so a later seed can retry
            if let Err(release) = self
                .store
                .delete_by_id(BOOTSTRAP_MARKERS_COLLECTION, SUPER_ADMIN_SEED_MARKER)
                .await
            {
                log::error!("Failed to release bootstrap marker: {}", release);
            }
            return Err(e);
        }

        log::warn!(
            "Super admin {} created with the configured seed credential, rotate the password now",
            admin.email
        );
        Ok(SeedOutcome::Created {
            email: self.seed.email.clone(),
            password: self.seed.password.clone(),
        })
    }

    /// The identity behind a token, re-read from the store
    pub async fn me(&self, claims: &Claims) -> Result<AdminUserResponse> {
        self.find_by_id(&claims.sub)
            .await?
            .map(|admin| admin.to_response())
            .ok_or_else(|| LaunchpadError::NotFound("Admin".to_string()))
    }

    /// Put the presented token on the denylist, when one is attached
    pub async fn logout(&self, claims: &Claims) -> Result<()> {
        if !self.tokens.revocation_enabled() {
            log::info!("Admin {} logged out; token stays valid until expiry", claims.sub);
            return Ok(());
        }
        self.tokens.revoke(claims, RevocationReason::UserLogout).await?;
        log::info!("Admin {} logged out", claims.sub);
        Ok(())
    }

    pub async fn change_password(&self, claims: &Claims, change: &PasswordChange) -> Result<()> {
        let admin = self
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| LaunchpadError::NotFound("Admin".to_string()))?;

        if !self
            .verify_password(&change.current_password, &admin.password_hash)
            .await?
        {
            return Err(LaunchpadError::InvalidCredentials);
        }
        validate_password(&change.new_password)?;

        let mut fields = Document::new();
        fields.insert(
            "password_hash".to_string(),
            Value::String(self.hash_password(&change.new_password).await?),
        );
        fields.insert("updated_at".to_string(), json!(Utc::now()));
        self.store
            .update_by_id(ADMIN_USERS_COLLECTION, &admin.id, fields)
            .await?;

        // The presented token stops working; other sessions run until expiry
        if self.tokens.revocation_enabled() {
            self.tokens
                .revoke(claims, RevocationReason::CredentialChange)
                .await?;
        }

        log::info!("Admin {} changed their password", admin.id);
        Ok(())
    }

    pub async fn list_admins(&self) -> Result<Vec<AdminUserResponse>> {
        let query = Query::default().sort_by("created_at", SortOrder::Ascending);
        self.store
            .find(ADMIN_USERS_COLLECTION, &query)
            .await?
            .into_iter()
            .map(|doc| from_document::<AdminIdentity>(doc).map(|admin| admin.to_response()))
            .collect()
    }

    pub async fn create_admin(&self, request: AdminUserCreate) -> Result<AdminUserResponse> {
        request.validate()?;

        if self.find_by_email(&request.email).await?.is_some() {
            return Err(LaunchpadError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hash_password(&request.password).await?;
        let admin = AdminIdentity::new(request.email, request.name, password_hash, request.role);
        self.store
            .insert(ADMIN_USERS_COLLECTION, to_document(&admin)?)
            .await?;

        log::info!("Admin {} created with role {}", admin.id, admin.role);
        Ok(admin.to_response())
    }

    pub async fn update_admin(
        &self,
        actor: &Claims,
        id: &str,
        update: AdminUserUpdate,
    ) -> Result<AdminUserResponse> {
        if actor.sub == id
            && (update.role.is_some_and(|role| role != actor.role)
                || update.status == Some(AdminStatus::Inactive))
        {
            return Err(LaunchpadError::ValidationError(
                "You cannot change your own role or deactivate yourself".to_string(),
            ));
        }

        let mut fields = Document::new();
        if let Some(name) = update.name {
            fields.insert("name".to_string(), Value::String(name));
        }
        if let Some(role) = update.role {
            fields.insert("role".to_string(), json!(role));
        }
        if let Some(status) = update.status {
            fields.insert("status".to_string(), json!(status));
        }
        fields.insert("updated_at".to_string(), json!(Utc::now()));

        if !self
            .store
            .update_by_id(ADMIN_USERS_COLLECTION, id, fields)
            .await?
        {
            return Err(LaunchpadError::NotFound("Admin".to_string()));
        }

        self.find_by_id(id)
            .await?
            .map(|admin| admin.to_response())
            .ok_or_else(|| LaunchpadError::NotFound("Admin".to_string()))
    }

    pub async fn delete_admin(&self, actor: &Claims, id: &str) -> Result<()> {
        if actor.sub == id {
            return Err(LaunchpadError::ValidationError(
                "You cannot delete your own account".to_string(),
            ));
        }
        if !self.store.delete_by_id(ADMIN_USERS_COLLECTION, id).await? {
            return Err(LaunchpadError::NotFound("Admin".to_string()));
        }
        log::info!("Admin {} deleted by {}", id, actor.sub);
        Ok(())
    }
}

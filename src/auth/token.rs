use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::admin::AdminRole;
use crate::constants::MAX_TOKEN_LENGTH;
use crate::error::{LaunchpadError, Result};
use crate::storage::token_revocation::{RevocationReason, RevokedToken, SharedTokenRevocationStore};

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (admin identity id)
    pub sub: String,
    pub email: String,
    pub role: AdminRole,
    /// Expiration time (as UTC timestamp)
    pub exp: usize,
    /// Issued at (as UTC timestamp)
    pub iat: usize,
    /// Token id, the denylist key
    pub jti: String,
}

impl Claims {
    /// Creates claims that expire `ttl` after now
    pub fn new(admin_id: String, email: String, role: AdminRole, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: admin_id,
            email,
            role,
            exp: (now + ttl).timestamp().max(0) as usize,
            iat: now.timestamp().max(0) as usize,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Issues and verifies admin bearer tokens (HS256)
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    revocation_store: Option<SharedTokenRevocationStore>,
}

impl TokenManager {
    /// Creates a new token manager with a secret and token lifetime
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            revocation_store: None,
        }
    }

    /// Attach a denylist consulted on every verification
    pub fn with_revocation_store(mut self, store: SharedTokenRevocationStore) -> Self {
        self.revocation_store = Some(store);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn revocation_enabled(&self) -> bool {
        self.revocation_store.is_some()
    }

    /// Issue a signed token for an identity
    pub fn issue(&self, admin_id: &str, email: &str, role: AdminRole) -> Result<String> {
        let claims = Claims::new(admin_id.to_string(), email.to_string(), role, self.ttl);
        self.generate_token(&claims)
    }

    /// Signs the given claims
    pub fn generate_token(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| LaunchpadError::AuthError(format!("Failed to generate token: {}", e)))
    }

    /// Signature and expiry check only. Every failure is `Unauthenticated`.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Token rejected: {}", e);
                LaunchpadError::Unauthenticated
            })
    }

    /// Full verification: `decode` plus the denylist when one is attached
    pub async fn verify(&self, token: &str) -> Result<Claims> {
        let claims = self.decode(token)?;

        if let Some(store) = &self.revocation_store {
            if store.is_token_revoked(&claims.jti).await? {
                log::debug!("Token {} has been revoked", claims.jti);
                return Err(LaunchpadError::Unauthenticated);
            }
        }

        Ok(claims)
    }

    /// Put a token's id on the denylist until the token would have expired anyway
    pub async fn revoke(&self, claims: &Claims, reason: RevocationReason) -> Result<()> {
        let store = self.revocation_store.as_ref().ok_or_else(|| {
            LaunchpadError::ValidationError("Token revocation is disabled".to_string())
        })?;

        let expires_at = Utc
            .timestamp_opt(claims.exp as i64, 0)
            .single()
            .unwrap_or_else(|| Utc::now() + self.ttl);

        store
            .revoke_token(RevokedToken {
                token_id: claims.jti.clone(),
                user_id: claims.sub.clone(),
                revoked_at: Utc::now(),
                expires_at,
                reason,
            })
            .await
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
/// Oversized or control-character tokens are treated as absent.
pub fn extract_bearer_token(auth_header: &str) -> Option<String> {
    let (scheme, token) = auth_header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() || token.len() > MAX_TOKEN_LENGTH || token.chars().any(|c| c.is_control()) {
        return None;
    }

    Some(token.to_string())
}

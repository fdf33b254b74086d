//! Server configuration module
//! Handles configuration parameters for the admin backend

use crate::constants::{
    DEFAULT_ALLOWED_ORIGINS, DEFAULT_DB_NAME, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_SUPER_ADMIN_EMAIL, DEFAULT_SUPER_ADMIN_PASSWORD, DEFAULT_TOKEN_TTL_MINUTES,
    INSECURE_DEFAULT_JWT_SECRET, MIN_PASSWORD_LENGTH, MIN_SECRET_LENGTH,
};
use crate::error::{LaunchpadError, Result};
use std::env;

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Document store endpoint. `memory://` selects the in-process store.
    pub mongo_uri: String,
    pub db_name: String,
    /// HS256 signing secret for admin tokens
    pub jwt_secret: String,
    /// Admin token lifetime in minutes
    pub jwt_expire_minutes: i64,
    /// CORS allow-list
    pub allowed_origins: Vec<String>,
    /// Keep a denylist of logged-out tokens
    pub enable_token_revocation: bool,
    /// Bootstrap super admin credential
    pub seed_email: String,
    pub seed_password: String,
    /// Refuse insecure settings instead of warning about them
    pub production: bool,
    /// TLS configuration
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
    pub enable_tls: bool,
}

impl ServerConfig {
    /// Create a test configuration - DANGEROUS: Only for testing!
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            mongo_uri: "memory://".to_string(),
            db_name: DEFAULT_DB_NAME.to_string(),
            jwt_secret: "test-jwt-key-only-for-unit-tests-never-use-in-production".to_string(),
            jwt_expire_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            enable_token_revocation: true,
            seed_email: DEFAULT_SUPER_ADMIN_EMAIL.to_string(),
            seed_password: DEFAULT_SUPER_ADMIN_PASSWORD.to_string(),
            production: false,
            tls_cert_path: None,
            tls_key_path: None,
            enable_tls: false,
        }
    }

    /// Returns true when the document store is the in-process one
    pub fn uses_memory_store(&self) -> bool {
        self.mongo_uri.starts_with("memory://")
    }

    /// Check the signing secret. Weak secrets are fatal in production and a
    /// loud warning everywhere else.
    fn validate_jwt_secret(secret: &str, production: bool) -> Result<()> {
        let problem = if secret == INSECURE_DEFAULT_JWT_SECRET {
            Some("ADMIN_JWT_SECRET is the insecure built-in placeholder".to_string())
        } else if secret.len() < MIN_SECRET_LENGTH {
            Some(format!(
                "ADMIN_JWT_SECRET must be at least {} characters long",
                MIN_SECRET_LENGTH
            ))
        } else {
            None
        };

        match problem {
            Some(msg) if production => Err(LaunchpadError::ConfigError(format!(
                "{}. Generate one with: openssl rand -base64 32",
                msg
            ))),
            Some(msg) => {
                log::warn!("SECURITY: {} (tolerated outside production)", msg);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn parse_flag(name: &str, default: bool) -> bool {
        env::var(name)
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(default)
    }

    /// Each entry must be a bare `scheme://host[:port]` origin
    fn parse_origins(raw: &str) -> Result<Vec<String>> {
        raw.split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(|origin| {
                let invalid = |reason: String| {
                    LaunchpadError::ConfigError(format!(
                        "Invalid origin '{}' in LAUNCHPAD_ALLOWED_ORIGINS: {}",
                        origin, reason
                    ))
                };
                let parsed = url::Url::parse(origin).map_err(|e| invalid(e.to_string()))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(invalid("scheme must be http or https".to_string()));
                }
                if parsed.path() != "/" || parsed.query().is_some() {
                    return Err(invalid("an origin has no path or query".to_string()));
                }
                Ok(parsed.origin().ascii_serialization())
            })
            .collect()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mongo_uri = env::var("MONGO_URI").map_err(|_| {
            LaunchpadError::ConfigError(
                "MONGO_URI environment variable not set".to_string(),
            )
        })?;

        let db_name = env::var("DB_NAME").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string());

        let host = env::var("LAUNCHPAD_HOST").unwrap_or(DEFAULT_HOST.to_string());
        let port = env::var("LAUNCHPAD_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let environment = env::var("RUST_ENV")
            .or_else(|_| env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "development".to_string());
        let production = matches!(
            environment.to_lowercase().as_str(),
            "production" | "prod" | "release"
        );

        let jwt_secret = env::var("ADMIN_JWT_SECRET")
            .unwrap_or_else(|_| INSECURE_DEFAULT_JWT_SECRET.to_string());
        Self::validate_jwt_secret(&jwt_secret, production)?;

        let jwt_expire_minutes = match env::var("ADMIN_JWT_EXPIRE_MINUTES") {
            Ok(raw) => raw.parse::<i64>().ok().filter(|m| *m > 0).ok_or_else(|| {
                LaunchpadError::ConfigError(format!(
                    "ADMIN_JWT_EXPIRE_MINUTES must be a positive integer, got '{}'",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let allowed_origins = match env::var("LAUNCHPAD_ALLOWED_ORIGINS") {
            Ok(raw) => Self::parse_origins(&raw)?,
            Err(_) => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let enable_token_revocation = Self::parse_flag("LAUNCHPAD_ENABLE_TOKEN_REVOCATION", true);

        let seed_email = env::var("LAUNCHPAD_SEED_EMAIL")
            .unwrap_or_else(|_| DEFAULT_SUPER_ADMIN_EMAIL.to_string());
        let seed_password = env::var("LAUNCHPAD_SEED_PASSWORD")
            .unwrap_or_else(|_| DEFAULT_SUPER_ADMIN_PASSWORD.to_string());
        if seed_password.len() < MIN_PASSWORD_LENGTH {
            return Err(LaunchpadError::ConfigError(format!(
                "LAUNCHPAD_SEED_PASSWORD must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }
        if seed_password == DEFAULT_SUPER_ADMIN_PASSWORD {
            log::warn!("SECURITY: bootstrap super admin uses the well-known default password, rotate it after seeding");
        }

        // TLS configuration
        let enable_tls = Self::parse_flag("LAUNCHPAD_ENABLE_TLS", false);
        let tls_cert_path = env::var("LAUNCHPAD_TLS_CERT_PATH").ok();
        let tls_key_path = env::var("LAUNCHPAD_TLS_KEY_PATH").ok();

        if enable_tls {
            match (&tls_cert_path, &tls_key_path) {
                (Some(cert_path), Some(key_path)) => {
                    if !std::path::Path::new(cert_path).exists() {
                        return Err(LaunchpadError::ConfigError(format!(
                            "TLS certificate file does not exist: {}",
                            cert_path
                        )));
                    }
                    if !std::path::Path::new(key_path).exists() {
                        return Err(LaunchpadError::ConfigError(format!(
                            "TLS private key file does not exist: {}",
                            key_path
                        )));
                    }
                }
                _ => {
                    return Err(LaunchpadError::ConfigError(
                        "TLS is enabled but LAUNCHPAD_TLS_CERT_PATH or LAUNCHPAD_TLS_KEY_PATH is not set".to_string()
                    ));
                }
            }
        }

        Ok(Self {
            host,
            port,
            mongo_uri,
            db_name,
            jwt_secret,
            jwt_expire_minutes,
            allowed_origins,
            enable_token_revocation,
            seed_email,
            seed_password,
            production,
            tls_cert_path,
            tls_key_path,
            enable_tls,
        })
    }
}

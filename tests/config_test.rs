//! Environment-driven configuration

use launchpad_admin::config::ServerConfig;
use launchpad_admin::constants::{DEFAULT_PORT, DEFAULT_TOKEN_TTL_MINUTES};
use std::env;
use std::sync::Mutex;

// Tests in this file share the process environment
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "MONGO_URI",
    "DB_NAME",
    "ADMIN_JWT_SECRET",
    "ADMIN_JWT_EXPIRE_MINUTES",
    "LAUNCHPAD_HOST",
    "LAUNCHPAD_PORT",
    "LAUNCHPAD_ALLOWED_ORIGINS",
    "LAUNCHPAD_ENABLE_TOKEN_REVOCATION",
    "LAUNCHPAD_SEED_EMAIL",
    "LAUNCHPAD_SEED_PASSWORD",
    "LAUNCHPAD_ENABLE_TLS",
    "LAUNCHPAD_TLS_CERT_PATH",
    "LAUNCHPAD_TLS_KEY_PATH",
    "RUST_ENV",
    "ENVIRONMENT",
];

/// Run `test` with exactly `vars` set, restoring the environment afterwards
fn with_env(vars: &[(&str, &str)], test: impl FnOnce()) {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let saved: Vec<(&str, Option<String>)> =
        VARS.iter().map(|name| (*name, env::var(name).ok())).collect();

    for name in VARS {
        env::remove_var(name);
    }
    for (name, value) in vars {
        env::set_var(name, value);
    }

    test();

    for (name, value) in saved {
        match value {
            Some(value) => env::set_var(name, value),
            None => env::remove_var(name),
        }
    }
}

const STRONG_SECRET: &str = "a-long-enough-signing-key-with-entropy-9f8e7d";

#[test]
fn test_defaults() {
    with_env(&[("MONGO_URI", "memory://")], || {
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.jwt_expire_minutes, DEFAULT_TOKEN_TTL_MINUTES);
        assert_eq!(config.db_name, "desci_launchpad");
        assert!(config.enable_token_revocation);
        assert!(!config.production);
        assert!(config.uses_memory_store());
    });
}

#[test]
fn test_mongo_uri_required() {
    with_env(&[], || {
        let error = ServerConfig::from_env().unwrap_err();
        assert!(error.to_string().contains("MONGO_URI"));
    });
}

#[test]
fn test_placeholder_secret_fatal_only_in_production() {
    with_env(&[("MONGO_URI", "memory://"), ("RUST_ENV", "production")], || {
        assert!(ServerConfig::from_env().is_err());
    });

    with_env(
        &[
            ("MONGO_URI", "memory://"),
            ("RUST_ENV", "production"),
            ("ADMIN_JWT_SECRET", STRONG_SECRET),
        ],
        || {
            let config = ServerConfig::from_env().unwrap();
            assert!(config.production);
            assert_eq!(config.jwt_secret, STRONG_SECRET);
        },
    );
}

#[test]
fn test_token_ttl_must_be_positive() {
    for bad in ["0", "-5", "soon"] {
        with_env(
            &[("MONGO_URI", "memory://"), ("ADMIN_JWT_EXPIRE_MINUTES", bad)],
            || assert!(ServerConfig::from_env().is_err()),
        );
    }

    with_env(
        &[("MONGO_URI", "memory://"), ("ADMIN_JWT_EXPIRE_MINUTES", "30")],
        || assert_eq!(ServerConfig::from_env().unwrap().jwt_expire_minutes, 30),
    );
}

#[test]
fn test_short_seed_password_rejected() {
    with_env(
        &[("MONGO_URI", "memory://"), ("LAUNCHPAD_SEED_PASSWORD", "short")],
        || assert!(ServerConfig::from_env().is_err()),
    );
}

#[test]
fn test_origins_and_flags() {
    with_env(
        &[
            ("MONGO_URI", "mongodb://localhost:27017"),
            ("LAUNCHPAD_ALLOWED_ORIGINS", "https://admin.example, http://localhost:5173/"),
            ("LAUNCHPAD_ENABLE_TOKEN_REVOCATION", "false"),
        ],
        || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(
                config.allowed_origins,
                vec!["https://admin.example", "http://localhost:5173"]
            );
            assert!(!config.enable_token_revocation);
            assert!(!config.uses_memory_store());
        },
    );
}

#[test]
fn test_tls_requires_paths() {
    with_env(
        &[("MONGO_URI", "memory://"), ("LAUNCHPAD_ENABLE_TLS", "true")],
        || assert!(ServerConfig::from_env().is_err()),
    );
}

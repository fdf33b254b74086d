// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8001;
pub const API_PREFIX: &str = "api";
pub const DEFAULT_DB_NAME: &str = "desci_launchpad";

// Placeholder signing secret, must be overridden in production
pub const INSECURE_DEFAULT_JWT_SECRET: &str = "changeme-jwt-secret";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 1440;
pub const MIN_SECRET_LENGTH: usize = 32;

// Well-known bootstrap credential, rotate right after the first deploy
pub const DEFAULT_SUPER_ADMIN_EMAIL: &str = "admin@descilaunch.xyz";
pub const DEFAULT_SUPER_ADMIN_PASSWORD: &str = "changeme123";
pub const SUPER_ADMIN_SEED_MARKER: &str = "super_admin_seed";

pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://www.descilaunch.xyz",
    "https://descilaunch.xyz",
    "http://localhost:3000",
];

// Collection names
pub const ADMIN_USERS_COLLECTION: &str = "admin_users";
pub const BOOTSTRAP_MARKERS_COLLECTION: &str = "bootstrap_markers";
pub const SITE_CONFIG_COLLECTION: &str = "site_config";
pub const SITE_CONFIG_ID: &str = "site_config";

// (collection, field) pairs the document stores keep unique besides `id`
pub const UNIQUE_FIELDS: &[(&str, &str)] = &[(ADMIN_USERS_COLLECTION, "email")];

// Request limits
pub const MAX_JSON_BODY_BYTES: u64 = 64 * 1024;
pub const MAX_TOKEN_LENGTH: usize = 4096;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

// Minimum wall time for a login attempt
pub const LOGIN_MIN_DURATION_MS: u64 = 100;

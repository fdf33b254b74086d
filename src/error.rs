use std::error::Error;
use std::fmt;

use warp::http::StatusCode;

#[derive(Debug)]
pub enum LaunchpadError {
    // Auth errors
    Unauthenticated,
    Forbidden,
    InvalidCredentials,
    AccountInactive,

    // Lookup errors
    NotFound(String),
    Conflict(String),

    // Validation errors
    ValidationError(String),

    // Storage errors
    StorageError(String),

    // Token/crypto failures that are the server's fault, not the caller's
    AuthError(String),

    // System errors
    SystemError(String),

    // Configuration errors
    ConfigError(String),
}

impl LaunchpadError {
    /// HTTP status the API layer answers with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidCredentials | Self::AccountInactive => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::StorageError(_)
            | Self::AuthError(_)
            | Self::SystemError(_)
            | Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to clients. Server-side failures are not echoed.
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Invalid token".to_string(),
            Self::Forbidden => "Super admin access required".to_string(),
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            Self::AccountInactive => "Account is inactive".to_string(),
            Self::NotFound(what) => format!("{} not found", what),
            Self::Conflict(msg) | Self::ValidationError(msg) => msg.clone(),
            Self::StorageError(_)
            | Self::AuthError(_)
            | Self::SystemError(_)
            | Self::ConfigError(_) => "Internal server error".to_string(),
        }
    }
}

impl fmt::Display for LaunchpadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Missing, invalid or expired token"),
            Self::Forbidden => write!(f, "Forbidden: insufficient role"),
            Self::InvalidCredentials => write!(f, "Invalid credentials"),
            Self::AccountInactive => write!(f, "Account is inactive"),
            Self::NotFound(what) => write!(f, "Not found: {}", what),
            Self::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Self::AuthError(msg) => write!(f, "Authentication error: {}", msg),
            Self::SystemError(msg) => write!(f, "System error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for LaunchpadError {}

impl warp::reject::Reject for LaunchpadError {}

impl From<serde_json::Error> for LaunchpadError {
    fn from(err: serde_json::Error) -> Self {
        LaunchpadError::ValidationError(format!("Malformed document: {}", err))
    }
}

#[cfg(feature = "mongo")]
impl From<mongodb::error::Error> for LaunchpadError {
    fn from(err: mongodb::error::Error) -> Self {
        LaunchpadError::StorageError(err.to_string())
    }
}

// Generic result type for the admin backend
pub type Result<T> = std::result::Result<T, LaunchpadError>;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::error::{LaunchpadError, Result};

/// Admin roles. A closed set: gating is by exact match, never by ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Admin,
    SuperAdmin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Admin => "admin",
            AdminRole::SuperAdmin => "super_admin",
        }
    }
}

impl Default for AdminRole {
    fn default() -> Self {
        AdminRole::Admin
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account status. Only `Active` accounts may log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    Active,
    Inactive,
}

impl AdminStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminStatus::Active => "active",
            AdminStatus::Inactive => "inactive",
        }
    }
}

impl Default for AdminStatus {
    fn default() -> Self {
        AdminStatus::Active
    }
}

/// A persisted admin identity, as stored in the `admin_users` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminIdentity {
    /// Application-assigned id, immutable
    pub id: String,
    /// Login key, unique
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    /// PHC-format hash, never leaves the service
    pub password_hash: String,
    pub role: AdminRole,
    pub status: AdminStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl AdminIdentity {
    /// Creates a new active identity with a fresh id
    pub fn new(email: String, name: Option<String>, password_hash: String, role: AdminRole) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            name,
            password_hash,
            role,
            status: AdminStatus::Active,
            created_at: now,
            updated_at: now,
            last_login: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AdminStatus::Active
    }

    /// Public-safe projection
    pub fn to_response(&self) -> AdminUserResponse {
        AdminUserResponse {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_login: self.last_login,
        }
    }
}

/// What the API returns for an admin. Has no password field by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUserResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: AdminRole,
    pub status: AdminStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminLogin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub admin: AdminUserResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminUserCreate {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub password: String,
    #[serde(default)]
    pub role: AdminRole,
}

impl AdminUserCreate {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<AdminRole>,
    #[serde(default)]
    pub status: Option<AdminStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Outcome of the bootstrap step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// A super admin was created with these credentials
    Created { email: String, password: String },
    AlreadyExists,
    /// No super admin exists, but the seed email is held by a plain admin
    EmailTaken,
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(LaunchpadError::ValidationError(format!("Invalid email address: {}", email)))
    }
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(LaunchpadError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

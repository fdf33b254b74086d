//! Marketplace user accounts (not admins)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_non_empty, Resource, Validate};
use crate::auth::admin::validate_email;
use crate::error::{LaunchpadError, Result};
use crate::storage::traits::{to_document, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    ProjectOwner,
    SuperAdmin,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Suspended,
    Banned,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletAddresses {
    pub sui: Option<String>,
    pub eth: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub id: String,
    #[serde(default)]
    pub is_default: bool,
    pub full_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl Validate for ShippingAddress {
    fn validate(&self) -> Result<()> {
        require_non_empty("full_name", &self.full_name)?;
        require_non_empty("address_line1", &self.address_line1)?;
        require_non_empty("city", &self.city)?;
        require_non_empty("postal_code", &self.postal_code)?;
        require_non_empty("country", &self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub email_marketing: bool,
    pub project_updates: bool,
    pub order_updates: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_marketing: true,
            project_updates: true,
            order_updates: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub role: UserRole,
    pub wallet_addresses: Option<WalletAddresses>,
    pub profile: Option<UserProfile>,
}

fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(3..=50).contains(&len) {
        return Err(LaunchpadError::ValidationError(
            "username must be between 3 and 50 characters".to_string(),
        ));
    }
    Ok(())
}

impl Validate for UserCreate {
    fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        validate_username(&self.username)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub role: Option<UserRole>,
    pub wallet_addresses: Option<WalletAddresses>,
    pub profile: Option<UserProfile>,
    pub shipping_addresses: Option<Vec<ShippingAddress>>,
    pub notification_preferences: Option<NotificationPreferences>,
    pub status: Option<UserStatus>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(addresses) = &self.shipping_addresses {
            addresses.iter().try_for_each(Validate::validate)?;
            if addresses.iter().filter(|a| a.is_default).count() > 1 {
                return Err(LaunchpadError::ValidationError(
                    "Only one shipping address can be the default".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Stored user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: UserRole,
    pub wallet_addresses: Option<WalletAddresses>,
    pub profile: Option<UserProfile>,
    pub shipping_addresses: Vec<ShippingAddress>,
    pub projects_owned: Vec<String>,
    pub kyc_verified: bool,
    pub email_verified: bool,
    pub notification_preferences: NotificationPreferences,
    pub total_spent: f64,
    pub total_staked: f64,
    pub loyalty_points: i64,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

pub struct Users;

impl Resource for Users {
    const NAME: &'static str = "User";
    const PATH: &'static str = "users";
    const COLLECTION: &'static str = "users";
    const FILTER_FIELDS: &'static [&'static str] = &["status", "role", "kyc_verified"];

    type Create = UserCreate;
    type Update = UserUpdate;

    fn create_document(payload: UserCreate, id: String, now: DateTime<Utc>) -> Result<Document> {
        to_document(&User {
            id,
            email: payload.email,
            username: payload.username,
            role: payload.role,
            wallet_addresses: payload.wallet_addresses,
            profile: payload.profile,
            shipping_addresses: Vec::new(),
            projects_owned: Vec::new(),
            kyc_verified: false,
            email_verified: false,
            notification_preferences: NotificationPreferences::default(),
            total_spent: 0.0,
            total_staked: 0.0,
            loyalty_points: 0,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
            last_login: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_document_defaults() {
        let payload: UserCreate =
            serde_json::from_value(json!({"email": "a@example.com", "username": "alice"})).unwrap();
        payload.validate().unwrap();
        let doc = Users::create_document(payload, "u1".to_string(), Utc::now()).unwrap();
        assert_eq!(doc["role"], "user");
        assert_eq!(doc["status"], "active");
        assert_eq!(doc["loyalty_points"], 0);
    }

    #[test]
    fn test_update_rejects_two_default_addresses() {
        let address = json!({
            "id": "a1", "is_default": true, "full_name": "A", "address_line1": "1 Main St",
            "city": "X", "state": "Y", "postal_code": "1", "country": "Z", "phone": "0"
        });
        let mut second = address.clone();
        second["id"] = json!("a2");
        let update: UserUpdate =
            serde_json::from_value(json!({"shipping_addresses": [address, second]})).unwrap();
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(serde_json::from_value::<UserUpdate>(json!({"status": "deleted"})).is_err());
    }
}

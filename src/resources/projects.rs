//! Launchpad fundraising projects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    require_non_empty, require_optional_http_url, require_positive, Resource, Validate,
};
use crate::auth::admin::validate_email;
use crate::error::{LaunchpadError, Result};
use crate::storage::traits::{to_document, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Pending,
    Approved,
    PreLaunch,
    Live,
    Completed,
    Rejected,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 6] = [
        ProjectStatus::Pending,
        ProjectStatus::Approved,
        ProjectStatus::PreLaunch,
        ProjectStatus::Live,
        ProjectStatus::Completed,
        ProjectStatus::Rejected,
    ];

    /// Statuses visible on the public launchpad
    pub const PUBLIC: [ProjectStatus; 4] = [
        ProjectStatus::Approved,
        ProjectStatus::PreLaunch,
        ProjectStatus::Live,
        ProjectStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Approved => "approved",
            ProjectStatus::PreLaunch => "pre-launch",
            ProjectStatus::Live => "live",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectCreate {
    pub project_name: String,
    pub token_symbol: String,
    pub description: String,
    pub project_type: String,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub hero_image_url: Option<String>,
    pub card_image_url: Option<String>,
    pub twitter: Option<String>,
    pub discord: Option<String>,
    pub telegram: Option<String>,
    pub token_address_sui: Option<String>,
    pub raise_object_address: Option<String>,
    #[serde(default = "default_raise_currency")]
    pub raise_currency: String,
    pub soft_cap: f64,
    pub hard_cap: f64,
    pub min_contribution: f64,
    pub max_contribution: f64,
    pub price_per_token: f64,
    pub team_name: String,
    pub contact_email: String,
    pub owner_user_id: String,
    pub whitepaper_url: Option<String>,
    pub pitch_deck_url: Option<String>,
    pub video_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_raise_currency() -> String {
    "SUI".to_string()
}

fn check_caps(soft_cap: f64, hard_cap: f64) -> Result<()> {
    require_positive("soft_cap", soft_cap)?;
    require_positive("hard_cap", hard_cap)?;
    if soft_cap > hard_cap {
        return Err(LaunchpadError::ValidationError(
            "soft_cap must not exceed hard_cap".to_string(),
        ));
    }
    Ok(())
}

impl Validate for ProjectCreate {
    fn validate(&self) -> Result<()> {
        require_non_empty("project_name", &self.project_name)?;
        require_non_empty("token_symbol", &self.token_symbol)?;
        require_non_empty("team_name", &self.team_name)?;
        require_non_empty("owner_user_id", &self.owner_user_id)?;
        validate_email(&self.contact_email)?;
        check_caps(self.soft_cap, self.hard_cap)?;
        require_positive("min_contribution", self.min_contribution)?;
        require_positive("max_contribution", self.max_contribution)?;
        if self.min_contribution > self.max_contribution {
            return Err(LaunchpadError::ValidationError(
                "min_contribution must not exceed max_contribution".to_string(),
            ));
        }
        require_positive("price_per_token", self.price_per_token)?;
        for (field, value) in [
            ("logo_url", &self.logo_url),
            ("website", &self.website),
            ("hero_image_url", &self.hero_image_url),
            ("card_image_url", &self.card_image_url),
            ("whitepaper_url", &self.whitepaper_url),
            ("pitch_deck_url", &self.pitch_deck_url),
            ("video_url", &self.video_url),
        ] {
            require_optional_http_url(field, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub status: Option<ProjectStatus>,
    pub description: Option<String>,
    pub soft_cap: Option<f64>,
    pub hard_cap: Option<f64>,
    pub featured: Option<bool>,
    pub trending: Option<bool>,
    pub admin_notes: Option<String>,
    pub rejection_reason: Option<String>,
}

impl Validate for ProjectUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(soft_cap) = self.soft_cap {
            require_positive("soft_cap", soft_cap)?;
        }
        if let Some(hard_cap) = self.hard_cap {
            require_positive("hard_cap", hard_cap)?;
        }
        Ok(())
    }
}

/// Stored project record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub project_name: String,
    pub token_symbol: String,
    pub description: String,
    pub project_type: String,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub hero_image_url: Option<String>,
    pub card_image_url: Option<String>,
    pub twitter: Option<String>,
    pub discord: Option<String>,
    pub telegram: Option<String>,
    pub token_address_sui: Option<String>,
    pub raise_object_address: Option<String>,
    pub raise_currency: String,
    pub soft_cap: f64,
    pub hard_cap: f64,
    pub min_contribution: f64,
    pub max_contribution: f64,
    pub price_per_token: f64,
    pub team_name: String,
    pub contact_email: String,
    pub owner_user_id: String,
    pub whitepaper_url: Option<String>,
    pub pitch_deck_url: Option<String>,
    pub video_url: Option<String>,
    pub tags: Vec<String>,
    pub status: ProjectStatus,
    pub featured: bool,
    pub trending: bool,
    pub total_raised: f64,
    pub total_contributors: u64,
    pub admin_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct Projects;

impl Resource for Projects {
    const NAME: &'static str = "Project";
    const PATH: &'static str = "projects";
    const COLLECTION: &'static str = "projects";
    const FILTER_FIELDS: &'static [&'static str] = &["status", "featured", "trending"];

    type Create = ProjectCreate;
    type Update = ProjectUpdate;

    fn create_document(payload: ProjectCreate, id: String, now: DateTime<Utc>) -> Result<Document> {
        to_document(&Project {
            id,
            project_name: payload.project_name,
            token_symbol: payload.token_symbol,
            description: payload.description,
            project_type: payload.project_type,
            logo_url: payload.logo_url,
            website: payload.website,
            hero_image_url: payload.hero_image_url,
            card_image_url: payload.card_image_url,
            twitter: payload.twitter,
            discord: payload.discord,
            telegram: payload.telegram,
            token_address_sui: payload.token_address_sui,
            raise_object_address: payload.raise_object_address,
            raise_currency: payload.raise_currency,
            soft_cap: payload.soft_cap,
            hard_cap: payload.hard_cap,
            min_contribution: payload.min_contribution,
            max_contribution: payload.max_contribution,
            price_per_token: payload.price_per_token,
            team_name: payload.team_name,
            contact_email: payload.contact_email,
            owner_user_id: payload.owner_user_id,
            whitepaper_url: payload.whitepaper_url,
            pitch_deck_url: payload.pitch_deck_url,
            video_url: payload.video_url,
            tags: payload.tags,
            status: ProjectStatus::Pending,
            featured: false,
            trending: false,
            total_raised: 0.0,
            total_contributors: 0,
            admin_notes: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// A cap sent alone is checked against the stored value of the other one
    fn update_fields(
        update: ProjectUpdate,
        current: &Document,
        now: DateTime<Utc>,
    ) -> Result<Document> {
        if update.soft_cap.is_some() || update.hard_cap.is_some() {
            let stored = |field: &str| current.get(field).and_then(Value::as_f64);
            let soft_cap = update.soft_cap.or_else(|| stored("soft_cap"));
            let hard_cap = update.hard_cap.or_else(|| stored("hard_cap"));
            if let (Some(soft_cap), Some(hard_cap)) = (soft_cap, hard_cap) {
                check_caps(soft_cap, hard_cap)?;
            }
        }

        let mut fields = to_document(&update)?;
        fields.retain(|_, value| !value.is_null());
        fields.insert("updated_at".to_string(), serde_json::json!(now));
        Ok(fields)
    }
}

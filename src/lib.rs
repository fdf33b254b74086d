//! Launchpad Admin - administrative backend for a crowdfunding launchpad marketplace
//!
//! This library provides admin authentication (password hashing, bearer
//! tokens, role gating, bootstrap seeding) and CRUD over the marketplace
//! collections, exposed as a warp filter tree.

pub mod app;
pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod resources;
pub mod security;
pub mod storage;

// Re-export main components
pub use app::AppState;
pub use config::ServerConfig;
pub use error::{LaunchpadError, Result};

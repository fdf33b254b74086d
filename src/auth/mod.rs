//! Admin authentication and authorization

pub mod admin;
pub mod gate;
pub mod password;
pub mod service;
pub mod token;

// Re-export main components
pub use admin::{AdminIdentity, AdminRole, AdminStatus, AdminUserResponse};
pub use gate::{authenticate_request, require_any_role, require_role};
pub use password::PasswordHasher;
pub use service::{AdminAuthService, SeedCredentials};
pub use token::{Claims, TokenManager};

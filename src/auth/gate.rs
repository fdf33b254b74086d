//! Authentication middleware and authorization gate
//!
//! Both are plain functions over claims so they can be reused outside of the
//! warp filters in `handlers::auth`.

use crate::auth::admin::AdminRole;
use crate::auth::token::{extract_bearer_token, Claims, TokenManager};
use crate::error::{LaunchpadError, Result};

/// Resolve the raw `Authorization` header into verified claims.
///
/// Claims are trusted as of issuance; the credential store is not consulted.
pub async fn authenticate_request(
    auth_header: Option<&str>,
    tokens: &TokenManager,
) -> Result<Claims> {
    let token = auth_header
        .and_then(extract_bearer_token)
        .ok_or(LaunchpadError::Unauthenticated)?;

    let claims = tokens.verify(&token).await?;

    if claims.sub.trim().is_empty() {
        log::debug!("Token without subject rejected");
        return Err(LaunchpadError::Unauthenticated);
    }

    Ok(claims)
}

/// Exact role match. No hierarchy: `super_admin` does not imply `admin`.
pub fn require_role(claims: Claims, role: AdminRole) -> Result<Claims> {
    if claims.role == role {
        Ok(claims)
    } else {
        log::warn!(
            "Admin {} with role {} denied access requiring {}",
            claims.sub,
            claims.role,
            role
        );
        Err(LaunchpadError::Forbidden)
    }
}

/// Allow any of an explicitly listed set of roles
pub fn require_any_role(claims: Claims, roles: &[AdminRole]) -> Result<Claims> {
    if roles.contains(&claims.role) {
        Ok(claims)
    } else {
        log::warn!("Admin {} with role {} denied access", claims.sub, claims.role);
        Err(LaunchpadError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SECRET: &str = "gate-test-signing-key-0123456789abcdef";

    fn claims(role: AdminRole) -> Claims {
        Claims::new("admin-1".to_string(), "ops@example.com".to_string(), role, Duration::minutes(5))
    }

    #[test]
    fn test_super_admin_gate() {
        assert!(require_role(claims(AdminRole::SuperAdmin), AdminRole::SuperAdmin).is_ok());
        assert!(matches!(
            require_role(claims(AdminRole::Admin), AdminRole::SuperAdmin),
            Err(LaunchpadError::Forbidden)
        ));
    }

    #[test]
    fn test_no_implicit_hierarchy() {
        assert!(matches!(
            require_role(claims(AdminRole::SuperAdmin), AdminRole::Admin),
            Err(LaunchpadError::Forbidden)
        ));
        let both = [AdminRole::Admin, AdminRole::SuperAdmin];
        assert!(require_any_role(claims(AdminRole::SuperAdmin), &both).is_ok());
        assert!(require_any_role(claims(AdminRole::Admin), &both).is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_request() {
        let tokens = TokenManager::new(SECRET, Duration::minutes(5));
        let token = tokens.issue("admin-1", "ops@example.com", AdminRole::Admin).unwrap();

        let header = format!("Bearer {}", token);
        let claims = authenticate_request(Some(header.as_str()), &tokens).await.unwrap();
        assert_eq!(claims.sub, "admin-1");

        assert!(matches!(
            authenticate_request(None, &tokens).await,
            Err(LaunchpadError::Unauthenticated)
        ));
        assert!(matches!(
            authenticate_request(Some(token.as_str()), &tokens).await,
            Err(LaunchpadError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_foreign_secret_rejected() {
        let ours = TokenManager::new(SECRET, Duration::minutes(5));
        let theirs = TokenManager::new("some-other-key-entirely-0123456789abc", Duration::minutes(5));
        let token = theirs.issue("admin-1", "ops@example.com", AdminRole::SuperAdmin).unwrap();

        let header = format!("Bearer {}", token);
        assert!(matches!(
            authenticate_request(Some(header.as_str()), &ours).await,
            Err(LaunchpadError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_empty_subject_rejected() {
        let tokens = TokenManager::new(SECRET, Duration::minutes(5));
        let claims = Claims::new(" ".to_string(), "ops@example.com".to_string(), AdminRole::Admin, Duration::minutes(5));
        let header = format!("Bearer {}", tokens.generate_token(&claims).unwrap());
        assert!(matches!(
            authenticate_request(Some(header.as_str()), &tokens).await,
            Err(LaunchpadError::Unauthenticated)
        ));
    }
}

//! Authentication middleware for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;
use epm_shared::Claims;

/// Roles allowed to manage other employees' records (approvals, team views).
const MANAGER_ROLES: [&str; 5] = [
    "Super Admin",
    "HR",
    "Billing Manager",
    "Project Manager",
    "Team Lead",
];

/// Roles allowed to administer master data (employees, teams, projects...).
const ADMIN_ROLES: [&str; 2] = ["Super Admin", "HR"];

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "missing_token",
                "message": "Authorization header with Bearer token is required"
            })),
        )
            .into_response();
    };

    // Validate token
    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            // Store claims in request extensions
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            let (status, error, message) = match e {
                epm_shared::JwtError::Expired => (
                    StatusCode::UNAUTHORIZED,
                    "token_expired",
                    "Token has expired",
                ),
                _ => (
                    StatusCode::UNAUTHORIZED,
                    "invalid_token",
                    "Invalid or malformed token",
                ),
            };

            (status, Json(json!({ "error": error, "message": message }))).into_response()
        }
    }
}

/// Extractor for authenticated user claims.
///
/// Use this in handlers to get the authenticated user's claims:
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl IntoResponse {
///     let user_id = auth.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub fn user_id(&self) -> uuid::Uuid {
        self.0.user_id()
    }

    /// Returns the team ID from the claims, if any.
    #[must_use]
    pub fn team_id(&self) -> Option<uuid::Uuid> {
        self.0.team_id()
    }

    /// Returns the user's role name.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.0.role
    }

    /// Returns true if the role may approve and view other employees' data.
    #[must_use]
    pub fn can_manage(&self) -> bool {
        MANAGER_ROLES.iter().any(|r| *r == self.0.role)
    }

    /// Returns true if the role may administer master data.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        ADMIN_ROLES.iter().any(|r| *r == self.0.role)
    }

    /// Returns the inner claims.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "unauthorized",
                        "message": "Authentication required"
                    })),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn auth_user(role: &str) -> AuthUser {
        AuthUser(Claims::new(
            Uuid::new_v4(),
            role,
            None,
            Utc::now() + Duration::minutes(15),
        ))
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_role_tiers() {
        assert!(auth_user("Super Admin").is_admin());
        assert!(auth_user("HR").is_admin());
        assert!(!auth_user("Project Manager").is_admin());

        assert!(auth_user("Project Manager").can_manage());
        assert!(auth_user("Team Lead").can_manage());
        assert!(!auth_user("Employee").can_manage());
    }
}

//! Authentication routes: login, refresh, logout.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{error, info, warn};

use crate::AppState;
use epm_core::auth::verify_password;
use epm_db::{RoleRepository, SessionRepository, UserRepository};
use epm_shared::AppError;
use epm_shared::auth::{LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, UserInfo};

/// Creates the authentication routes (public).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Email or password is incorrect"
        })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    super::error_response(&AppError::Internal("unexpected failure".into()))
}

/// POST `/auth/login` - Authenticate with email and password.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(user)) => user,
        Ok(None) => return invalid_credentials(),
        Err(e) => {
            error!(error = %e, "Failed to look up user");
            return internal_error();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(e) => {
            error!(error = %e, "Password verification failed");
            return internal_error();
        }
    }

    let role_repo = RoleRepository::new((*state.db).clone());
    let role = match role_repo.find_by_id(user.role_id).await {
        Ok(Some(role)) => role.name,
        Ok(None) => {
            error!(user_id = %user.id, role_id = %user.role_id, "User references missing role");
            return internal_error();
        }
        Err(e) => {
            error!(error = %e, "Failed to look up role");
            return internal_error();
        }
    };

    let access_token = match state
        .jwt_service
        .generate_access_token(user.id, &role, user.team_id)
    {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error();
        }
    };
    let refresh_token = match state
        .jwt_service
        .generate_refresh_token(user.id, &role, user.team_id)
    {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return internal_error();
        }
    };

    let session_repo = SessionRepository::new((*state.db).clone());
    let expires_at = Utc::now() + Duration::days(state.jwt_service.refresh_token_expires_days());
    if let Err(e) = session_repo
        .create(user.id, &refresh_token, expires_at, None, None)
        .await
    {
        error!(error = %e, "Failed to store session");
        return internal_error();
    }

    info!(user_id = %user.id, "User logged in");

    let response = LoginResponse {
        user: UserInfo {
            id: user.id,
            email: user.email,
            name: user.name,
            role,
            team_id: user.team_id,
        },
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// POST `/auth/refresh` - Exchange a refresh token for a new token pair.
///
/// Refresh tokens are single-use: the presented session is revoked and a
/// new one is issued.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(claims) => claims,
        Err(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_token",
                    "message": "Refresh token is invalid or expired"
                })),
            )
                .into_response();
        }
    };

    let session_repo = SessionRepository::new((*state.db).clone());
    let session = match session_repo.find_by_token(&payload.refresh_token).await {
        Ok(Some(session)) if session.expires_at > Utc::now() => session,
        Ok(_) => {
            warn!(user_id = %claims.user_id(), "Refresh with unknown or expired session");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "session_revoked",
                    "message": "Session is no longer active"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to look up session");
            return internal_error();
        }
    };

    let (access_token, refresh_token) = match (
        state
            .jwt_service
            .generate_access_token(claims.user_id(), &claims.role, claims.team_id()),
        state
            .jwt_service
            .generate_refresh_token(claims.user_id(), &claims.role, claims.team_id()),
    ) {
        (Ok(access), Ok(refresh)) => (access, refresh),
        _ => {
            error!("Failed to generate tokens on refresh");
            return internal_error();
        }
    };

    let expires_at = Utc::now() + Duration::days(state.jwt_service.refresh_token_expires_days());
    let rotation = async {
        session_repo.revoke(session.id).await?;
        session_repo
            .create(claims.user_id(), &refresh_token, expires_at, None, None)
            .await
    };
    if let Err(e) = rotation.await {
        error!(error = %e, "Failed to rotate session");
        return internal_error();
    }

    (
        StatusCode::OK,
        Json(json!({
            "access_token": access_token,
            "refresh_token": refresh_token,
            "expires_in": state.jwt_service.access_token_expires_in()
        })),
    )
        .into_response()
}

/// POST `/auth/logout` - Revoke the presented refresh token.
async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<LogoutRequest>,
) -> impl IntoResponse {
    let session_repo = SessionRepository::new((*state.db).clone());

    match session_repo.revoke_by_token(&payload.refresh_token).await {
        Ok(revoked) => {
            if !revoked {
                warn!("Logout with unknown refresh token");
            }
            (
                StatusCode::OK,
                Json(json!({ "message": "Logged out" })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to revoke session");
            internal_error()
        }
    }
}

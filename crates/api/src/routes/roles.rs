//! Role management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use epm_db::RoleRepository;
use epm_shared::AppError;

/// Creates the role routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/roles", post(create_role))
        .route("/roles/{id}", put(rename_role))
        .route("/roles/{id}", delete(delete_role))
}

/// Request body for creating or renaming a role.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    /// Role name.
    pub name: String,
}

fn forbidden() -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "forbidden", "message": "Admin role required" })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    super::error_response(&AppError::Internal("unexpected failure".into()))
}

/// GET `/roles` - List all roles.
async fn list_roles(State(state): State<AppState>) -> impl IntoResponse {
    let repo = RoleRepository::new((*state.db).clone());
    match repo.list().await {
        Ok(roles) => (StatusCode::OK, Json(json!({ "roles": roles }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list roles");
            internal_error()
        }
    }
}

/// POST `/roles` - Create a role (admins only).
async fn create_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RoleRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = RoleRepository::new((*state.db).clone());

    match repo.find_by_name(&payload.name).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "duplicate_name",
                    "message": "A role with this name already exists"
                })),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Failed to check role name");
            return internal_error();
        }
    }

    match repo.create(payload.name).await {
        Ok(role) => {
            info!(role_id = %role.id, name = %role.name, "Role created");
            (StatusCode::CREATED, Json(role)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create role");
            internal_error()
        }
    }
}

/// PUT `/roles/{id}` - Rename a role (admins only).
async fn rename_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = RoleRepository::new((*state.db).clone());
    match repo.rename(id, payload.name).await {
        Ok(Some(role)) => {
            info!(role_id = %id, "Role renamed");
            (StatusCode::OK, Json(role)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": "Role not found" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to rename role");
            internal_error()
        }
    }
}

/// DELETE `/roles/{id}` - Remove a role (admins only).
async fn delete_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = RoleRepository::new((*state.db).clone());
    match repo.delete(id).await {
        Ok(true) => {
            info!(role_id = %id, "Role deleted");
            (StatusCode::OK, Json(json!({ "message": "Role deleted" }))).into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": "Role not found" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to delete role");
            internal_error()
        }
    }
}

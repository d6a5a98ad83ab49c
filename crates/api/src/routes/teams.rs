//! Team management routes.

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
use epm_db::TeamRepository;
use epm_shared::AppError;

/// Creates the team routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/teams", get(list_teams))
        .route("/teams", post(create_team))
        .route("/teams/{id}", put(rename_team))
        .route("/teams/{id}", delete(delete_team))
}

/// Request body for creating or renaming a team.
#[derive(Debug, Deserialize)]
pub struct TeamRequest {
    /// Team name.
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

/// GET `/teams` - List all teams.
async fn list_teams(State(state): State<AppState>) -> impl IntoResponse {
    let repo = TeamRepository::new((*state.db).clone());
    match repo.list().await {
        Ok(teams) => (StatusCode::OK, Json(json!({ "teams": teams }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list teams");
            internal_error()
        }
    }
}

/// POST `/teams` - Create a team (admins only).
async fn create_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TeamRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = TeamRepository::new((*state.db).clone());

    match repo.find_by_name(&payload.name).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "duplicate_name",
                    "message": "A team with this name already exists"
                })),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Failed to check team name");
            return internal_error();
        }
    }

    match repo.create(payload.name).await {
        Ok(team) => {
            info!(team_id = %team.id, name = %team.name, "Team created");
            (StatusCode::CREATED, Json(team)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create team");
            internal_error()
        }
    }
}

/// PUT `/teams/{id}` - Rename a team (admins only).
async fn rename_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TeamRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = TeamRepository::new((*state.db).clone());
    match repo.rename(id, payload.name).await {
        Ok(Some(team)) => {
            info!(team_id = %id, "Team renamed");
            (StatusCode::OK, Json(team)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": "Team not found" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to rename team");
            internal_error()
        }
    }
}

/// DELETE `/teams/{id}` - Remove a team (admins only).
async fn delete_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = TeamRepository::new((*state.db).clone());
    match repo.delete(id).await {
        Ok(true) => {
            info!(team_id = %id, "Team deleted");
            (StatusCode::OK, Json(json!({ "message": "Team deleted" }))).into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": "Team not found" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to delete team");
            internal_error()
        }
    }
}

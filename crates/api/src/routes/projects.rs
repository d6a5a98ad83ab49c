//! Project management routes, including member assignment.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use epm_db::{
    ProjectRepository,
    entities::{clients, projects},
    repositories::{CreateProjectInput, ProjectError, UpdateProjectInput},
};

/// Creates the project routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects", post(create_project))
        .route("/projects/assigned", get(list_assigned_projects))
        .route("/projects/{id}", get(get_project))
        .route("/projects/{id}", put(update_project))
        .route("/projects/{id}", delete(delete_project))
        .route("/projects/{id}/members", get(list_members))
        .route("/projects/{id}/members", post(add_member))
        .route("/projects/{id}/members/{user_id}", delete(remove_member))
}

/// Request body for creating a project.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Owning client.
    pub client_id: Uuid,
    /// Sales team credited with the project.
    pub sales_team_id: Option<Uuid>,
    /// Project name.
    pub project_name: String,
    /// Requirements description.
    pub requirements: Option<String>,
    /// Monetary budget.
    pub budget: Option<Decimal>,
    /// Delivery deadline.
    pub deadline: Option<NaiveDate>,
}

/// Request body for updating a project.
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    /// Owning client.
    pub client_id: Option<Uuid>,
    /// Sales team credited with the project.
    pub sales_team_id: Option<Uuid>,
    /// Project name.
    pub project_name: Option<String>,
    /// Requirements description.
    pub requirements: Option<String>,
    /// Monetary budget.
    pub budget: Option<Decimal>,
    /// Delivery deadline.
    pub deadline: Option<NaiveDate>,
}

/// Request body for assigning a member.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// Employee to assign.
    pub user_id: Uuid,
}

fn project_json(
    project: &projects::Model,
    client: Option<&clients::Model>,
) -> serde_json::Value {
    json!({
        "id": project.id,
        "client_id": project.client_id,
        "client_name": client.map(|c| c.name.clone()),
        "sales_team_id": project.sales_team_id,
        "project_name": project.project_name,
        "requirements": project.requirements,
        "budget": project.budget.map(|b| b.to_string()),
        "deadline": project.deadline,
        "total_hours": project.total_hours.to_string(),
        "total_working_hours": project.total_working_hours.to_string(),
        "created_at": project.created_at,
        "updated_at": project.updated_at
    })
}

fn forbidden() -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "forbidden", "message": "Manager role required" })),
    )
        .into_response()
}

/// Maps project errors to HTTP responses.
fn map_project_error(e: &ProjectError) -> axum::response::Response {
    let (status, error) = match e {
        ProjectError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        ProjectError::ClientNotFound(_) => (StatusCode::BAD_REQUEST, "client_not_found"),
        ProjectError::UserNotFound(_) => (StatusCode::BAD_REQUEST, "user_not_found"),
        ProjectError::AlreadyMember { .. } => (StatusCode::CONFLICT, "already_member"),
        ProjectError::MemberNotFound { .. } => (StatusCode::NOT_FOUND, "member_not_found"),
        ProjectError::Database(_) => {
            error!(error = %e, "Project operation failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal_error", "message": "An error occurred" })),
            )
                .into_response();
        }
    };

    (
        status,
        Json(json!({ "error": error, "message": e.to_string() })),
    )
        .into_response()
}

/// GET `/projects` - List all projects with client names (managers only).
async fn list_projects(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let repo = ProjectRepository::new((*state.db).clone());
    match repo.list_with_clients().await {
        Ok(rows) => {
            let data: Vec<serde_json::Value> = rows
                .iter()
                .map(|(project, client)| project_json(project, client.as_ref()))
                .collect();
            (StatusCode::OK, Json(json!({ "projects": data }))).into_response()
        }
        Err(e) => map_project_error(&e),
    }
}

/// GET `/projects/assigned` - Projects assigned to the caller.
async fn list_assigned_projects(
    State(state): State<AppState>,
    auth: AuthUser,
) -> impl IntoResponse {
    let repo = ProjectRepository::new((*state.db).clone());
    match repo.assigned_to_user(auth.user_id()).await {
        Ok(rows) => {
            let data: Vec<serde_json::Value> =
                rows.iter().map(|p| project_json(p, None)).collect();
            (StatusCode::OK, Json(json!({ "projects": data }))).into_response()
        }
        Err(e) => map_project_error(&e),
    }
}

/// GET `/projects/{id}` - Fetch one project.
async fn get_project(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ProjectRepository::new((*state.db).clone());
    match repo.find_by_id(id).await {
        Ok(Some(project)) => (StatusCode::OK, Json(project_json(&project, None))).into_response(),
        Ok(None) => map_project_error(&ProjectError::NotFound(id)),
        Err(e) => map_project_error(&e),
    }
}

/// POST `/projects` - Create a project (managers only).
async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let repo = ProjectRepository::new((*state.db).clone());
    let input = CreateProjectInput {
        client_id: payload.client_id,
        sales_team_id: payload.sales_team_id,
        project_name: payload.project_name,
        requirements: payload.requirements,
        budget: payload.budget,
        deadline: payload.deadline,
    };

    match repo.create(input).await {
        Ok(project) => (StatusCode::CREATED, Json(project_json(&project, None))).into_response(),
        Err(e) => map_project_error(&e),
    }
}

/// PUT `/projects/{id}` - Update a project (managers only).
async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let repo = ProjectRepository::new((*state.db).clone());
    let input = UpdateProjectInput {
        client_id: payload.client_id,
        sales_team_id: payload.sales_team_id.map(Some),
        project_name: payload.project_name,
        requirements: payload.requirements.map(Some),
        budget: payload.budget.map(Some),
        deadline: payload.deadline.map(Some),
    };

    match repo.update(id, input).await {
        Ok(project) => {
            info!(project_id = %id, "Project updated");
            (StatusCode::OK, Json(project_json(&project, None))).into_response()
        }
        Err(e) => map_project_error(&e),
    }
}

/// DELETE `/projects/{id}` - Remove a project (admins only).
async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "forbidden", "message": "Admin role required" })),
        )
            .into_response();
    }

    let repo = ProjectRepository::new((*state.db).clone());
    match repo.delete(id).await {
        Ok(true) => {
            info!(project_id = %id, "Project deleted");
            (StatusCode::OK, Json(json!({ "message": "Project deleted" }))).into_response()
        }
        Ok(false) => map_project_error(&ProjectError::NotFound(id)),
        Err(e) => map_project_error(&e),
    }
}

/// GET `/projects/{id}/members` - List assigned employees (managers only).
async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let repo = ProjectRepository::new((*state.db).clone());
    match repo.members(id).await {
        Ok(members) => {
            let data: Vec<serde_json::Value> = members
                .iter()
                .map(|u| json!({ "id": u.id, "name": u.name, "email": u.email }))
                .collect();
            (StatusCode::OK, Json(json!({ "members": data }))).into_response()
        }
        Err(e) => map_project_error(&e),
    }
}

/// POST `/projects/{id}/members` - Assign an employee (managers only).
async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let repo = ProjectRepository::new((*state.db).clone());
    match repo
        .add_member(id, payload.user_id, Some(auth.user_id()))
        .await
    {
        Ok(member) => (
            StatusCode::CREATED,
            Json(json!({
                "project_id": member.project_id,
                "user_id": member.user_id,
                "assigned_by": member.assigned_by
            })),
        )
            .into_response(),
        Err(e) => map_project_error(&e),
    }
}

/// DELETE `/projects/{id}/members/{user_id}` - Unassign an employee
/// (managers only).
async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let repo = ProjectRepository::new((*state.db).clone());
    match repo.remove_member(id, user_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Project member removed" })),
        )
            .into_response(),
        Err(e) => map_project_error(&e),
    }
}

//! Task management routes.
//!
//! Task hour estimates feed the timesheet approval rule: their per-project
//! sum is the contracted ceiling billable time is allocated against.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
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
    TaskRepository,
    repositories::{CreateTaskInput, TaskError, UpdateTaskInput},
};

/// Creates the task routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects/{id}/tasks", get(list_tasks))
        .route("/projects/{id}/tasks", post(create_task))
        .route("/tasks/{id}", put(update_task))
        .route("/tasks/{id}", delete(delete_task))
        .route("/tasks/{id}/status", put(set_task_status))
}

/// Request body for creating a task.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Assigned employee.
    pub assigned_to: Option<Uuid>,
    /// Task title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Estimated hours.
    pub hours: Decimal,
    /// Delivery deadline.
    pub deadline: Option<NaiveDate>,
}

/// Request body for updating a task.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// Assigned employee.
    pub assigned_to: Option<Uuid>,
    /// Task title.
    pub title: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Estimated hours.
    pub hours: Option<Decimal>,
    /// Workflow status.
    pub status: Option<String>,
    /// Delivery deadline.
    pub deadline: Option<NaiveDate>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct TaskStatusRequest {
    /// Target status ("pending", "in progress", "completed").
    pub status: String,
}

/// Query filter for task listing.
#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    /// Restrict to tasks assigned to this employee.
    pub assigned_to: Option<Uuid>,
}

fn forbidden() -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "forbidden", "message": "Manager role required" })),
    )
        .into_response()
}

/// Maps task errors to HTTP responses.
fn map_task_error(e: &TaskError) -> axum::response::Response {
    let (status, error) = match e {
        TaskError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        TaskError::ProjectNotFound(_) => (StatusCode::BAD_REQUEST, "project_not_found"),
        TaskError::InvalidStatus(_) => (StatusCode::BAD_REQUEST, "invalid_status"),
        TaskError::Database(_) => {
            error!(error = %e, "Task operation failed");
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

/// GET `/projects/{id}/tasks` - List a project's tasks, optionally filtered
/// to one assignee.
async fn list_tasks(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<TaskListQuery>,
) -> impl IntoResponse {
    let repo = TaskRepository::new((*state.db).clone());

    let result = match query.assigned_to {
        Some(user_id) => repo.list_for_employee(id, user_id).await,
        None => repo.list_for_project(id).await,
    };

    match result {
        Ok(tasks) => (StatusCode::OK, Json(json!({ "tasks": tasks }))).into_response(),
        Err(e) => map_task_error(&e),
    }
}

/// POST `/projects/{id}/tasks` - Create a task (managers only).
async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateTaskRequest>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let repo = TaskRepository::new((*state.db).clone());
    let input = CreateTaskInput {
        project_id: id,
        assigned_to: payload.assigned_to,
        title: payload.title,
        description: payload.description,
        hours: payload.hours,
        deadline: payload.deadline,
    };

    match repo.create(input).await {
        Ok(task) => {
            info!(task_id = %task.id, project_id = %id, "Task created");
            (StatusCode::CREATED, Json(task)).into_response()
        }
        Err(e) => map_task_error(&e),
    }
}

/// PUT `/tasks/{id}` - Update a task (managers only).
async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskRequest>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let repo = TaskRepository::new((*state.db).clone());
    let input = UpdateTaskInput {
        assigned_to: payload.assigned_to.map(Some),
        title: payload.title,
        description: payload.description.map(Some),
        hours: payload.hours,
        status: payload.status,
        deadline: payload.deadline.map(Some),
    };

    match repo.update(id, input).await {
        Ok(task) => {
            info!(task_id = %id, "Task updated");
            (StatusCode::OK, Json(task)).into_response()
        }
        Err(e) => map_task_error(&e),
    }
}

/// PUT `/tasks/{id}/status` - Move a task through its workflow.
///
/// Assignees may update their own task status; any other change requires a
/// manager role.
async fn set_task_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaskStatusRequest>,
) -> impl IntoResponse {
    let repo = TaskRepository::new((*state.db).clone());

    if !auth.can_manage() {
        let owns_task = match repo.find_by_id(id).await {
            Ok(Some(task)) => task.assigned_to == Some(auth.user_id()),
            Ok(None) => return map_task_error(&TaskError::NotFound(id)),
            Err(e) => return map_task_error(&e),
        };
        if !owns_task {
            return forbidden();
        }
    }

    let input = UpdateTaskInput {
        status: Some(payload.status),
        ..UpdateTaskInput::default()
    };

    match repo.update(id, input).await {
        Ok(task) => {
            info!(task_id = %id, status = %task.status, "Task status changed");
            (StatusCode::OK, Json(task)).into_response()
        }
        Err(e) => map_task_error(&e),
    }
}

/// DELETE `/tasks/{id}` - Remove a task (managers only).
async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let repo = TaskRepository::new((*state.db).clone());
    match repo.delete(id).await {
        Ok(true) => {
            info!(task_id = %id, "Task deleted");
            (StatusCode::OK, Json(json!({ "message": "Task deleted" }))).into_response()
        }
        Ok(false) => map_task_error(&TaskError::NotFound(id)),
        Err(e) => map_task_error(&e),
    }
}

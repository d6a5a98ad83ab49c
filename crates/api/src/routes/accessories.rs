//! Accessory (asset) tracking routes: categories, items, assignments.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use epm_db::{
    AccessoryRepository,
    repositories::{AccessoryError, AccessoryInput, AssignmentInput},
};

/// Creates the accessory routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accessory-categories", get(list_categories))
        .route("/accessory-categories", post(create_category))
        .route("/accessory-categories/{id}", put(rename_category))
        .route("/accessory-categories/{id}", delete(delete_category))
        .route("/accessories", get(list_accessories))
        .route("/accessories", post(create_accessory))
        .route("/accessories/{id}", put(update_accessory))
        .route("/accessories/{id}", delete(delete_accessory))
        .route("/accessory-assignments", get(list_assignments))
        .route("/accessory-assignments", post(create_assignment))
        .route("/accessory-assignments/{id}/return", put(return_assignment))
        .route("/accessory-assignments/{id}", delete(delete_assignment))
}

/// Request body for creating or renaming a category.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    /// Category name.
    pub name: String,
}

/// Request body for creating or updating an accessory.
#[derive(Debug, Deserialize)]
pub struct AccessoryRequest {
    /// Category the accessory belongs to.
    pub category_id: Uuid,
    /// Accessory name.
    pub name: String,
    /// Serial number.
    pub serial_number: Option<String>,
    /// Free-text details.
    pub detail: Option<String>,
    /// Units on hand.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// Request body for assigning an accessory.
#[derive(Debug, Deserialize)]
pub struct AssignmentRequest {
    /// Accessory to hand out.
    pub accessory_id: Uuid,
    /// Receiving employee.
    pub user_id: Uuid,
    /// Hand-out date.
    pub assigned_on: NaiveDate,
    /// Free-text note.
    pub note: Option<String>,
}

/// Request body for marking an assignment returned.
#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    /// Return date.
    pub returned_on: NaiveDate,
}

/// Query filter for assignment listing.
#[derive(Debug, Deserialize)]
pub struct AssignmentListQuery {
    /// Restrict to one employee's assignments.
    pub user_id: Option<Uuid>,
}

fn forbidden() -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "forbidden", "message": "Admin role required" })),
    )
        .into_response()
}

/// Maps accessory errors to HTTP responses.
fn map_accessory_error(e: &AccessoryError) -> axum::response::Response {
    let (status, error) = match e {
        AccessoryError::CategoryNotFound(_) => (StatusCode::BAD_REQUEST, "category_not_found"),
        AccessoryError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        AccessoryError::AssignmentNotFound(_) => (StatusCode::NOT_FOUND, "assignment_not_found"),
        AccessoryError::UserNotFound(_) => (StatusCode::BAD_REQUEST, "user_not_found"),
        AccessoryError::Database(_) => {
            error!(error = %e, "Accessory operation failed");
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

/// GET `/accessory-categories` - List categories.
async fn list_categories(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = AccessoryRepository::new((*state.db).clone());
    match repo.list_categories().await {
        Ok(categories) => {
            (StatusCode::OK, Json(json!({ "categories": categories }))).into_response()
        }
        Err(e) => map_accessory_error(&e),
    }
}

/// POST `/accessory-categories` - Create a category (admins only).
async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CategoryRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = AccessoryRepository::new((*state.db).clone());
    match repo.create_category(payload.name).await {
        Ok(category) => {
            info!(category_id = %category.id, "Accessory category created");
            (StatusCode::CREATED, Json(category)).into_response()
        }
        Err(e) => map_accessory_error(&e),
    }
}

/// PUT `/accessory-categories/{id}` - Rename a category (admins only).
async fn rename_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = AccessoryRepository::new((*state.db).clone());
    match repo.rename_category(id, payload.name).await {
        Ok(category) => (StatusCode::OK, Json(category)).into_response(),
        Err(e) => map_accessory_error(&e),
    }
}

/// DELETE `/accessory-categories/{id}` - Remove a category (admins only).
async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = AccessoryRepository::new((*state.db).clone());
    match repo.delete_category(id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "message": "Category deleted" })),
        )
            .into_response(),
        Ok(false) => map_accessory_error(&AccessoryError::CategoryNotFound(id)),
        Err(e) => map_accessory_error(&e),
    }
}

/// GET `/accessories` - List accessories with their categories.
async fn list_accessories(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = AccessoryRepository::new((*state.db).clone());
    match repo.list_accessories().await {
        Ok(rows) => {
            let data: Vec<serde_json::Value> = rows
                .iter()
                .map(|(accessory, category)| {
                    json!({
                        "id": accessory.id,
                        "category_id": accessory.category_id,
                        "category_name": category.as_ref().map(|c| c.name.clone()),
                        "name": accessory.name,
                        "serial_number": accessory.serial_number,
                        "detail": accessory.detail,
                        "quantity": accessory.quantity
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "accessories": data }))).into_response()
        }
        Err(e) => map_accessory_error(&e),
    }
}

/// POST `/accessories` - Create an accessory (admins only).
async fn create_accessory(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AccessoryRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = AccessoryRepository::new((*state.db).clone());
    let input = AccessoryInput {
        category_id: payload.category_id,
        name: payload.name,
        serial_number: payload.serial_number,
        detail: payload.detail,
        quantity: payload.quantity,
    };

    match repo.create_accessory(input).await {
        Ok(accessory) => {
            info!(accessory_id = %accessory.id, "Accessory created");
            (StatusCode::CREATED, Json(accessory)).into_response()
        }
        Err(e) => map_accessory_error(&e),
    }
}

/// PUT `/accessories/{id}` - Replace an accessory's fields (admins only).
async fn update_accessory(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccessoryRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = AccessoryRepository::new((*state.db).clone());
    let input = AccessoryInput {
        category_id: payload.category_id,
        name: payload.name,
        serial_number: payload.serial_number,
        detail: payload.detail,
        quantity: payload.quantity,
    };

    match repo.update_accessory(id, input).await {
        Ok(accessory) => (StatusCode::OK, Json(accessory)).into_response(),
        Err(e) => map_accessory_error(&e),
    }
}

/// DELETE `/accessories/{id}` - Remove an accessory (admins only).
async fn delete_accessory(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = AccessoryRepository::new((*state.db).clone());
    match repo.delete_accessory(id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "message": "Accessory deleted" })),
        )
            .into_response(),
        Ok(false) => map_accessory_error(&AccessoryError::NotFound(id)),
        Err(e) => map_accessory_error(&e),
    }
}

/// GET `/accessory-assignments` - List assignments, optionally one employee's.
async fn list_assignments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<AssignmentListQuery>,
) -> impl IntoResponse {
    let repo = AccessoryRepository::new((*state.db).clone());
    match repo.list_assignments(query.user_id).await {
        Ok(assignments) => {
            (StatusCode::OK, Json(json!({ "assignments": assignments }))).into_response()
        }
        Err(e) => map_accessory_error(&e),
    }
}

/// POST `/accessory-assignments` - Hand an accessory out (admins only).
async fn create_assignment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AssignmentRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = AccessoryRepository::new((*state.db).clone());
    let input = AssignmentInput {
        accessory_id: payload.accessory_id,
        user_id: payload.user_id,
        assigned_on: payload.assigned_on,
        note: payload.note,
    };

    match repo.create_assignment(input).await {
        Ok(assignment) => {
            info!(
                assignment_id = %assignment.id,
                accessory_id = %assignment.accessory_id,
                user_id = %assignment.user_id,
                "Accessory assigned"
            );
            (StatusCode::CREATED, Json(assignment)).into_response()
        }
        Err(e) => map_accessory_error(&e),
    }
}

/// PUT `/accessory-assignments/{id}/return` - Mark an assignment returned
/// (admins only).
async fn return_assignment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReturnRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = AccessoryRepository::new((*state.db).clone());
    match repo.return_assignment(id, payload.returned_on).await {
        Ok(assignment) => (StatusCode::OK, Json(assignment)).into_response(),
        Err(e) => map_accessory_error(&e),
    }
}

/// DELETE `/accessory-assignments/{id}` - Remove an assignment (admins only).
async fn delete_assignment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = AccessoryRepository::new((*state.db).clone());
    match repo.delete_assignment(id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "message": "Assignment deleted" })),
        )
            .into_response(),
        Ok(false) => map_accessory_error(&AccessoryError::AssignmentNotFound(id)),
        Err(e) => map_accessory_error(&e),
    }
}

//! Employee management routes.

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
use epm_core::auth::hash_password;
use epm_db::{
    UserRepository,
    entities::users,
    repositories::{CreateUserInput, UpdateUserInput},
};
use epm_shared::{AppError, PageRequest, PageResponse};

/// Creates the employee routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees))
        .route("/employees", post(create_employee))
        .route("/employees/count-by-team", get(count_by_team))
        .route("/employees/{id}", get(get_employee))
        .route("/employees/{id}", put(update_employee))
        .route("/employees/{id}", delete(delete_employee))
}

/// Request body for creating an employee.
#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    /// Full name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Initial password (hashed before storage).
    pub password: String,
    /// Role assignment.
    pub role_id: Uuid,
    /// Team assignment.
    pub team_id: Option<Uuid>,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// First day of employment.
    pub joining_date: Option<NaiveDate>,
}

/// Request body for updating an employee.
#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    /// Full name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// New password (hashed before storage).
    pub password: Option<String>,
    /// Role assignment.
    pub role_id: Option<Uuid>,
    /// Team assignment (null clears it).
    #[serde(default)]
    pub team_id: Option<Option<Uuid>>,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

fn user_json(user: &users::Model) -> serde_json::Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "role_id": user.role_id,
        "team_id": user.team_id,
        "phone": user.phone,
        "address": user.address,
        "joining_date": user.joining_date,
        "created_at": user.created_at,
        "updated_at": user.updated_at
    })
}

fn forbidden(message: &str) -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "forbidden", "message": message })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    super::error_response(&AppError::Internal("unexpected failure".into()))
}

/// GET `/employees` - List employees, paginated (managers only).
async fn list_employees(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden("Manager role required");
    }

    let repo = UserRepository::new((*state.db).clone());
    match repo.list(&page).await {
        Ok((users, total)) => {
            let data: Vec<serde_json::Value> = users.iter().map(user_json).collect();
            (
                StatusCode::OK,
                Json(PageResponse::new(data, page.page, page.per_page, total)),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list employees");
            internal_error()
        }
    }
}

/// POST `/employees` - Create an employee (admins only).
async fn create_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateEmployeeRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden("Admin role required");
    }

    let repo = UserRepository::new((*state.db).clone());

    match repo.find_by_email(&payload.email).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "email_taken",
                    "message": "An employee with this email already exists"
                })),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Failed to check email");
            return internal_error();
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error();
        }
    };

    let input = CreateUserInput {
        name: payload.name,
        email: payload.email,
        password_hash,
        role_id: payload.role_id,
        team_id: payload.team_id,
        phone: payload.phone,
        address: payload.address,
        joining_date: payload.joining_date,
    };

    match repo.create(input).await {
        Ok(user) => {
            info!(user_id = %user.id, "Employee created");
            (StatusCode::CREATED, Json(user_json(&user))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create employee");
            internal_error()
        }
    }
}

/// GET `/employees/{id}` - Fetch one employee (self or manager).
async fn get_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if id != auth.user_id() && !auth.can_manage() {
        return forbidden("Manager role required to view other employees");
    }

    let repo = UserRepository::new((*state.db).clone());
    match repo.find_by_id(id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user_json(&user))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": "Employee not found" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to fetch employee");
            internal_error()
        }
    }
}

/// PUT `/employees/{id}` - Update an employee (admins only).
async fn update_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden("Admin role required");
    }

    let password_hash = match payload.password {
        Some(password) => match hash_password(&password) {
            Ok(hash) => Some(hash),
            Err(e) => {
                error!(error = %e, "Failed to hash password");
                return internal_error();
            }
        },
        None => None,
    };

    let input = UpdateUserInput {
        name: payload.name,
        email: payload.email,
        password_hash,
        role_id: payload.role_id,
        team_id: payload.team_id,
        phone: payload.phone.map(Some),
        address: payload.address.map(Some),
    };

    let repo = UserRepository::new((*state.db).clone());
    match repo.update(id, input).await {
        Ok(Some(user)) => {
            info!(user_id = %id, "Employee updated");
            (StatusCode::OK, Json(user_json(&user))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": "Employee not found" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to update employee");
            internal_error()
        }
    }
}

/// DELETE `/employees/{id}` - Remove an employee (admins only).
async fn delete_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden("Admin role required");
    }

    let repo = UserRepository::new((*state.db).clone());
    match repo.delete(id).await {
        Ok(true) => {
            info!(user_id = %id, "Employee deleted");
            (StatusCode::OK, Json(json!({ "message": "Employee deleted" }))).into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": "Employee not found" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to delete employee");
            internal_error()
        }
    }
}

/// GET `/employees/count-by-team` - Head-count per team (managers only).
async fn count_by_team(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden("Manager role required");
    }

    let repo = UserRepository::new((*state.db).clone());
    match repo.count_by_team().await {
        Ok(counts) => {
            let data: Vec<serde_json::Value> = counts
                .iter()
                .map(|c| {
                    json!({
                        "team_id": c.team_id,
                        "team_name": c.team_name,
                        "users": c.users
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "teams": data }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to count employees by team");
            internal_error()
        }
    }
}

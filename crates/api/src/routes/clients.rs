//! Client management routes.

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
use epm_db::{
    ClientRepository,
    repositories::{CreateClientInput, UpdateClientInput},
};
use epm_shared::AppError;

/// Creates the client routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients))
        .route("/clients", post(create_client))
        .route("/clients/{id}", put(update_client))
        .route("/clients/{id}", delete(delete_client))
}

/// Request body for creating a client.
#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    /// Client name.
    pub name: String,
    /// Contact email.
    pub contact_email: Option<String>,
    /// Platform the client was hired through.
    pub hire_through: Option<String>,
    /// The client's own project identifier on that platform.
    pub client_project_id: Option<String>,
    /// Company name.
    pub company_name: Option<String>,
    /// Company address.
    pub company_address: Option<String>,
}

/// Request body for updating a client.
#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    /// Client name.
    pub name: Option<String>,
    /// Contact email.
    pub contact_email: Option<String>,
    /// Platform the client was hired through.
    pub hire_through: Option<String>,
    /// The client's own project identifier on that platform.
    pub client_project_id: Option<String>,
    /// Company name.
    pub company_name: Option<String>,
    /// Company address.
    pub company_address: Option<String>,
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

/// GET `/clients` - List all clients (managers only).
async fn list_clients(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if !auth.can_manage() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "forbidden", "message": "Manager role required" })),
        )
            .into_response();
    }

    let repo = ClientRepository::new((*state.db).clone());
    match repo.list().await {
        Ok(clients) => (StatusCode::OK, Json(json!({ "clients": clients }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list clients");
            internal_error()
        }
    }
}

/// POST `/clients` - Create a client (admins only).
async fn create_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateClientRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = ClientRepository::new((*state.db).clone());
    let input = CreateClientInput {
        name: payload.name,
        contact_email: payload.contact_email,
        hire_through: payload.hire_through,
        client_project_id: payload.client_project_id,
        company_name: payload.company_name,
        company_address: payload.company_address,
    };

    match repo.create(input).await {
        Ok(client) => {
            info!(client_id = %client.id, "Client created");
            (StatusCode::CREATED, Json(client)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create client");
            internal_error()
        }
    }
}

/// PUT `/clients/{id}` - Update a client (admins only).
async fn update_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = ClientRepository::new((*state.db).clone());
    let input = UpdateClientInput {
        name: payload.name,
        contact_email: payload.contact_email.map(Some),
        hire_through: payload.hire_through.map(Some),
        client_project_id: payload.client_project_id.map(Some),
        company_name: payload.company_name.map(Some),
        company_address: payload.company_address.map(Some),
    };

    match repo.update(id, input).await {
        Ok(Some(client)) => {
            info!(client_id = %id, "Client updated");
            (StatusCode::OK, Json(client)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": "Client not found" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to update client");
            internal_error()
        }
    }
}

/// DELETE `/clients/{id}` - Remove a client (admins only).
async fn delete_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let repo = ClientRepository::new((*state.db).clone());
    match repo.delete(id).await {
        Ok(true) => {
            info!(client_id = %id, "Client deleted");
            (StatusCode::OK, Json(json!({ "message": "Client deleted" }))).into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": "Client not found" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to delete client");
            internal_error()
        }
    }
}

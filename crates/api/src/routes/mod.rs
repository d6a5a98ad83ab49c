//! API route definitions.

use axum::{Json, Router, http::StatusCode, middleware, response::IntoResponse};
use serde_json::json;

use crate::{AppState, middleware::auth::auth_middleware};
use epm_shared::AppError;

pub mod accessories;
pub mod auth;
pub mod clients;
pub mod employees;
pub mod health;
pub mod leaves;
pub mod projects;
pub mod reports;
pub mod roles;
pub mod tasks;
pub mod teams;
pub mod timesheets;

/// Maps an application error to its HTTP response envelope.
///
/// Server-side failures (5xx) are reported with a generic message; the
/// underlying error goes to the logs, not the client.
pub(crate) fn error_response(e: &AppError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = if status.is_server_error() {
        "An error occurred".to_string()
    } else {
        e.to_string()
    };

    (
        status,
        Json(json!({ "error": e.error_code(), "message": message })),
    )
        .into_response()
}

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(employees::routes())
        .merge(teams::routes())
        .merge(roles::routes())
        .merge(clients::routes())
        .merge(projects::routes())
        .merge(tasks::routes())
        .merge(timesheets::routes())
        .merge(leaves::routes())
        .merge(accessories::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

//! Working-hour report routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use epm_db::ReportRepository;
use epm_shared::AppError;

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/projects/hours", get(project_hours))
        .route("/reports/projects/{id}/weekly", get(weekly_project_hours))
        .route("/reports/employees/{id}/hours", get(employee_hours))
}

/// Query parameters for the weekly report.
#[derive(Debug, Deserialize)]
pub struct WeeklyQuery {
    /// First day of the seven-day window.
    pub week_start: NaiveDate,
}

fn forbidden() -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "forbidden", "message": "Manager role required" })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    super::error_response(&AppError::Internal("unexpected failure".into()))
}

/// GET `/reports/projects/hours` - Hour totals per project (managers only).
async fn project_hours(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let repo = ReportRepository::new((*state.db).clone());
    match repo.project_hours().await {
        Ok(rows) => {
            let data: Vec<serde_json::Value> = rows
                .iter()
                .map(|r| {
                    json!({
                        "project_id": r.project_id,
                        "project_name": r.project_name,
                        "total_hours": r.total_hours.as_decimal().to_string(),
                        "total_working_hours": r.total_working_hours.as_decimal().to_string()
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "projects": data }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to build project hours report");
            internal_error()
        }
    }
}

/// GET `/reports/projects/{id}/weekly?week_start=...` - Approved hours per
/// day over one week (managers only).
async fn weekly_project_hours(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<WeeklyQuery>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let repo = ReportRepository::new((*state.db).clone());
    match repo.weekly_project_hours(id, query.week_start).await {
        Ok(days) => {
            let data: Vec<serde_json::Value> = days
                .iter()
                .map(|d| json!({ "date": d.date, "hours": d.hours.to_string() }))
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "project_id": id, "days": data })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to build weekly report");
            internal_error()
        }
    }
}

/// GET `/reports/employees/{id}/hours` - One employee's approved hours,
/// total and per project (self or manager).
async fn employee_hours(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if id != auth.user_id() && !auth.can_manage() {
        return forbidden();
    }

    let repo = ReportRepository::new((*state.db).clone());
    match repo.employee_hours(id).await {
        Ok((total, per_project)) => {
            let projects: Vec<serde_json::Value> = per_project
                .iter()
                .map(|p| {
                    json!({
                        "project_id": p.project_id,
                        "hours": p.hours.to_string()
                    })
                })
                .collect();
            (
                StatusCode::OK,
                Json(json!({
                    "user_id": id,
                    "total_hours": total.to_string(),
                    "projects": projects
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to build employee hours report");
            internal_error()
        }
    }
}

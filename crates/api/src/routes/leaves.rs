//! Leave request routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use epm_core::leave::{LeaveError, LeaveService, LeaveStatus, LeaveType};
use epm_db::{LeaveRepository, entities::leave_requests};
use epm_shared::Hours;

/// Creates the leave routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leaves", get(list_all_leaves))
        .route("/leaves", post(submit_leave))
        .route("/leaves/mine", get(list_my_leaves))
        .route("/leaves/team", get(list_team_leaves))
        .route("/leaves/approve", post(decide_leave))
}

/// Request body for submitting a leave request.
#[derive(Debug, Deserialize)]
pub struct SubmitLeaveRequest {
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave; required for Multiple Days Leave.
    pub end_date: Option<NaiveDate>,
    /// Leave type ("Full Leave", "Short Leave", "Half Day",
    /// "Multiple Days Leave").
    pub leave_type: String,
    /// Hours away (`HH:MM`); only meaningful for Short Leave.
    pub hours: Option<String>,
    /// Reason for the leave.
    pub reason: String,
}

/// Request body for deciding a leave request.
#[derive(Debug, Deserialize)]
pub struct DecideLeaveRequest {
    /// Leave request to decide.
    pub id: Uuid,
    /// Target status ("approved" or "rejected").
    pub status: String,
}

fn leave_json(leave: &leave_requests::Model) -> serde_json::Value {
    json!({
        "id": leave.id,
        "user_id": leave.user_id,
        "start_date": leave.start_date,
        "end_date": leave.end_date,
        "leave_type": leave.leave_type,
        "hours": leave.hours.map(|h| h.to_string()),
        "reason": leave.reason,
        "status": leave.status,
        "decided_by": leave.decided_by,
        "created_at": leave.created_at,
        "updated_at": leave.updated_at
    })
}

fn forbidden() -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "forbidden", "message": "Manager role required" })),
    )
        .into_response()
}

/// Maps leave errors to HTTP responses.
fn map_leave_error(e: &LeaveError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %e, "Leave operation failed");
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

/// POST `/leaves` - Submit a leave request.
async fn submit_leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SubmitLeaveRequest>,
) -> impl IntoResponse {
    let Some(leave_type) = LeaveType::parse(&payload.leave_type) else {
        return map_leave_error(&LeaveError::UnknownLeaveType(payload.leave_type));
    };

    if payload.reason.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "validation_failed",
                "message": "reason must not be empty"
            })),
        )
            .into_response();
    }

    let hours = match payload.hours.as_deref().map(Hours::parse).transpose() {
        Ok(hours) => hours,
        Err(_) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "validation_failed",
                    "message": "hours must be a valid HH:MM value"
                })),
            )
                .into_response();
        }
    };

    let plan = match LeaveService::normalize(
        leave_type,
        payload.start_date,
        payload.end_date,
        hours,
    ) {
        Ok(plan) => plan,
        Err(e) => return map_leave_error(&e),
    };

    let repo = LeaveRepository::new((*state.db).clone());
    match repo
        .create(auth.user_id(), leave_type, plan, payload.reason)
        .await
    {
        Ok(leave) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Leave request submitted successfully",
                "leave": leave_json(&leave)
            })),
        )
            .into_response(),
        Err(e) => map_leave_error(&e),
    }
}

/// GET `/leaves` - All leave requests (managers only; HR view).
async fn list_all_leaves(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let repo = LeaveRepository::new((*state.db).clone());
    match repo.list_all().await {
        Ok(leaves) => (
            StatusCode::OK,
            Json(json!({
                "leaves": leaves.iter().map(leave_json).collect::<Vec<_>>()
            })),
        )
            .into_response(),
        Err(e) => map_leave_error(&e),
    }
}

/// GET `/leaves/mine` - The caller's own leave requests.
async fn list_my_leaves(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = LeaveRepository::new((*state.db).clone());
    match repo.list_for_user(auth.user_id()).await {
        Ok(leaves) => (
            StatusCode::OK,
            Json(json!({
                "leaves": leaves.iter().map(leave_json).collect::<Vec<_>>()
            })),
        )
            .into_response(),
        Err(e) => map_leave_error(&e),
    }
}

/// GET `/leaves/team` - Leave requests from the caller's team (managers only).
async fn list_team_leaves(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }
    let Some(team_id) = auth.team_id() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "no_team",
                "message": "The caller does not belong to a team"
            })),
        )
            .into_response();
    };

    let repo = LeaveRepository::new((*state.db).clone());
    match repo.list_for_team(team_id).await {
        Ok(leaves) => (
            StatusCode::OK,
            Json(json!({
                "team_id": team_id,
                "leaves": leaves.iter().map(leave_json).collect::<Vec<_>>()
            })),
        )
            .into_response(),
        Err(e) => map_leave_error(&e),
    }
}

/// POST `/leaves/approve` - Decide a pending leave request (managers only).
async fn decide_leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<DecideLeaveRequest>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden();
    }

    let Some(target) = LeaveStatus::parse(&payload.status) else {
        return map_leave_error(&LeaveError::UnknownStatus(payload.status));
    };

    let repo = LeaveRepository::new((*state.db).clone());
    match repo.decide(payload.id, auth.user_id(), target).await {
        Ok(leave) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("Leave request {}", leave.status),
                "leave": leave_json(&leave)
            })),
        )
            .into_response(),
        Err(e) => map_leave_error(&e),
    }
}

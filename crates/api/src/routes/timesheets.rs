//! Timesheet routes: submission, listing, editing, approval and sync.
//!
//! `POST /timesheets/approve` is the hour-allocation entry point: a JSON
//! array of `{id, status}` items answered by a per-entry outcome array.
//! Items are processed sequentially; one item's failure never fails the
//! request or its sibling items.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use epm_core::timesheet::{ActivityType, TimesheetError};
use epm_db::{
    TimesheetRepository,
    entities::timesheet_entries,
    repositories::{ApprovalItem, ApprovalItemOutcome, EditEntryInput, NewEntryInput, SyncOutcome},
};
use epm_shared::Hours;

/// Creates the timesheet routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/timesheets", post(submit_entries))
        .route("/timesheets", get(list_all_entries))
        .route("/timesheets/mine", get(list_my_entries))
        .route("/timesheets/team", get(list_team_entries))
        .route("/timesheets/{id}", put(edit_entry))
        .route("/timesheets/approve", post(approve_entries))
        .route("/timesheets/sync", post(sync_project))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// One submitted timesheet entry.
#[derive(Debug, Deserialize)]
pub struct EntryPayload {
    /// Project reported against; omit for in-house work.
    pub project_id: Option<Uuid>,
    /// Day the time was worked (`YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Reported duration as `HH:MM`.
    pub duration: String,
    /// Kind of work performed.
    pub work_type: String,
    /// Billing classification ("Billable", "Non Billable", "Inhouse").
    pub activity_type: String,
    /// Free-text narration.
    pub narration: Option<String>,
}

/// Request body for batch submission.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Entries to create.
    pub data: Vec<EntryPayload>,
}

/// One item of a batch approval request.
#[derive(Debug, Deserialize)]
pub struct ApprovalItemPayload {
    /// Entry to decide.
    pub id: Uuid,
    /// Target status ("approved", "rejected", "pending").
    pub status: String,
}

/// Request body for project sync.
#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    /// Project whose Non Billable entries should be reconverted.
    pub project_id: Uuid,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Validates a submitted entry payload; returns a field error message.
fn validate_payload(payload: &EntryPayload) -> Result<(), String> {
    if Hours::parse(&payload.duration).is_err() {
        return Err(format!(
            "duration {:?} is not a valid HH:MM value",
            payload.duration
        ));
    }
    if ActivityType::parse(&payload.activity_type).is_none() {
        return Err(format!(
            "activity_type {:?} is not recognized",
            payload.activity_type
        ));
    }
    if payload.work_type.trim().is_empty() {
        return Err("work_type must not be empty".to_string());
    }
    Ok(())
}

fn entry_json(entry: &timesheet_entries::Model) -> serde_json::Value {
    json!({
        "id": entry.id,
        "user_id": entry.user_id,
        "project_id": entry.project_id,
        "date": entry.date,
        "duration": entry.duration,
        "work_type": entry.work_type,
        "activity_type": entry.activity_type,
        "narration": entry.narration,
        "note": entry.note,
        "status": entry.status,
        "approved_by": entry.approved_by,
        "created_at": entry.created_at,
        "updated_at": entry.updated_at
    })
}

fn outcome_json(outcome: &ApprovalItemOutcome) -> serde_json::Value {
    json!({
        "id": outcome.id,
        "success": outcome.success,
        "message": outcome.message,
        "error_code": outcome.error_code,
        "final_total_working_hours": outcome
            .final_total_working_hours
            .map(|h| h.as_decimal().to_string()),
        "remaining_hours": outcome.remaining_hours.map(|h| h.as_decimal().to_string()),
        "extra_hours": outcome.extra_hours.map(|h| h.as_decimal().to_string())
    })
}

fn forbidden(message: &str) -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "forbidden", "message": message })),
    )
        .into_response()
}

/// Maps timesheet errors to HTTP responses.
fn map_timesheet_error(e: &TimesheetError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %e, "Timesheet operation failed");
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

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/timesheets` - Submit a batch of entries (created pending).
///
/// Boundary validation rejects the whole request before anything is
/// written; per-entry failure reporting only applies to approval.
async fn submit_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SubmitRequest>,
) -> impl IntoResponse {
    if payload.data.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "validation_failed",
                "message": "data must contain at least one entry"
            })),
        )
            .into_response();
    }

    for (index, entry) in payload.data.iter().enumerate() {
        if let Err(message) = validate_payload(entry) {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "validation_failed",
                    "message": format!("entry {index}: {message}")
                })),
            )
                .into_response();
        }
    }

    let inputs = payload
        .data
        .into_iter()
        .map(|e| NewEntryInput {
            project_id: e.project_id,
            date: e.date,
            duration: e.duration,
            work_type: e.work_type,
            activity_type: e.activity_type,
            narration: e.narration,
        })
        .collect();

    let repo = TimesheetRepository::new((*state.db).clone());
    match repo.submit_batch(auth.user_id(), inputs).await {
        Ok(entries) => (
            StatusCode::CREATED,
            Json(json!({
                "message": format!("{} timesheet entries added successfully", entries.len()),
                "entries": entries.iter().map(entry_json).collect::<Vec<_>>()
            })),
        )
            .into_response(),
        Err(e) => map_timesheet_error(&e),
    }
}

/// GET `/timesheets/mine` - The caller's own entries.
async fn list_my_entries(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = TimesheetRepository::new((*state.db).clone());

    match repo.list_for_user(auth.user_id()).await {
        Ok(entries) => (
            StatusCode::OK,
            Json(json!({
                "user_id": auth.user_id(),
                "entries": entries.iter().map(entry_json).collect::<Vec<_>>()
            })),
        )
            .into_response(),
        Err(e) => map_timesheet_error(&e),
    }
}

/// GET `/timesheets` - Every employee's entries (managers only).
async fn list_all_entries(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden("Manager role required");
    }

    let repo = TimesheetRepository::new((*state.db).clone());
    match repo.list_all().await {
        Ok(entries) => (
            StatusCode::OK,
            Json(json!({
                "entries": entries.iter().map(entry_json).collect::<Vec<_>>()
            })),
        )
            .into_response(),
        Err(e) => map_timesheet_error(&e),
    }
}

/// GET `/timesheets/team` - Entries from the caller's team (managers only).
async fn list_team_entries(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden("Manager role required");
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

    let repo = TimesheetRepository::new((*state.db).clone());
    match repo.list_for_team(team_id).await {
        Ok(entries) => (
            StatusCode::OK,
            Json(json!({
                "team_id": team_id,
                "entries": entries.iter().map(entry_json).collect::<Vec<_>>()
            })),
        )
            .into_response(),
        Err(e) => map_timesheet_error(&e),
    }
}

/// PUT `/timesheets/{id}` - Edit an own entry.
///
/// Changing an already-decided entry resets it to pending.
async fn edit_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EntryPayload>,
) -> impl IntoResponse {
    if let Err(message) = validate_payload(&payload) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "validation_failed",
                "message": message
            })),
        )
            .into_response();
    }

    let input = EditEntryInput {
        project_id: payload.project_id,
        date: payload.date,
        duration: payload.duration,
        work_type: payload.work_type,
        activity_type: payload.activity_type,
        narration: payload.narration,
    };

    let repo = TimesheetRepository::new((*state.db).clone());
    match repo.edit_entry(auth.user_id(), id, input).await {
        Ok((entry, changed)) => (
            StatusCode::OK,
            Json(json!({
                "message": if changed {
                    "Timesheet entry updated successfully"
                } else {
                    "No changes detected"
                },
                "entry": entry_json(&entry)
            })),
        )
            .into_response(),
        Err(e) => map_timesheet_error(&e),
    }
}

/// POST `/timesheets/approve` - Decide a batch of entries (managers only).
///
/// Returns a per-entry outcome array; a partial-success batch is still a
/// 200 response.
async fn approve_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<Vec<ApprovalItemPayload>>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden("Manager role required");
    }
    if payload.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "validation_failed",
                "message": "At least one {id, status} item is required"
            })),
        )
            .into_response();
    }

    let items: Vec<ApprovalItem> = payload
        .into_iter()
        .map(|p| ApprovalItem {
            id: p.id,
            status: p.status,
        })
        .collect();

    let repo = TimesheetRepository::new((*state.db).clone());
    let outcomes = repo.approve_batch(auth.user_id(), &items).await;
    let results: Vec<serde_json::Value> = outcomes.iter().map(outcome_json).collect();

    (StatusCode::OK, Json(results)).into_response()
}

/// POST `/timesheets/sync` - Reconvert a project's Non Billable entries
/// once all of its tasks are completed (managers only).
async fn sync_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SyncRequest>,
) -> impl IntoResponse {
    if !auth.can_manage() {
        return forbidden("Manager role required");
    }

    let repo = TimesheetRepository::new((*state.db).clone());
    match repo.sync_project(payload.project_id).await {
        Ok(SyncOutcome::TasksIncomplete) => (
            StatusCode::OK,
            Json(json!({
                "all_completed": false,
                "message": "All tasks are not completed",
                "converted": []
            })),
        )
            .into_response(),
        Ok(SyncOutcome::Converted {
            converted_entries,
            updated_total_working_hours,
            remaining_after,
        }) => (
            StatusCode::OK,
            Json(json!({
                "all_completed": true,
                "message": "Non Billable entries converted based on remaining hours",
                "converted": converted_entries,
                "updated_total_working_hours": updated_total_working_hours.as_decimal().to_string(),
                "remaining_after_conversion": remaining_after.as_decimal().to_string()
            })),
        )
            .into_response(),
        Err(e) => map_timesheet_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(duration: &str, activity: &str) -> EntryPayload {
        EntryPayload {
            project_id: None,
            date: NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
            duration: duration.to_string(),
            work_type: "Development".to_string(),
            activity_type: activity.to_string(),
            narration: None,
        }
    }

    #[rstest::rstest]
    #[case("01:30", "Billable")]
    #[case("00:15", "Non Billable")]
    #[case("08:00", "Inhouse")]
    fn test_validate_payload_accepts_good_entry(#[case] duration: &str, #[case] activity: &str) {
        assert!(validate_payload(&payload(duration, activity)).is_ok());
    }

    #[test]
    fn test_validate_payload_rejects_bad_duration() {
        let err = validate_payload(&payload("ninety", "Billable")).unwrap_err();
        assert!(err.contains("duration"));
    }

    #[test]
    fn test_validate_payload_rejects_bad_activity() {
        let err = validate_payload(&payload("01:00", "Weekend")).unwrap_err();
        assert!(err.contains("activity_type"));
    }

    #[test]
    fn test_validate_payload_rejects_blank_work_type() {
        let mut entry = payload("01:00", "Billable");
        entry.work_type = "  ".to_string();
        assert!(validate_payload(&entry).is_err());
    }
}

//! Timesheet error types.
//!
//! This module defines the per-entry error taxonomy for approval processing:
//! a failure on one entry of a batch never aborts its siblings.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while processing timesheet entries.
#[derive(Debug, Error)]
pub enum TimesheetError {
    /// Referenced entry does not exist.
    #[error("Timesheet entry {0} not found")]
    EntryNotFound(Uuid),

    /// Referenced project does not exist.
    #[error("Project {0} not found")]
    ProjectNotFound(Uuid),

    /// The entry's stored duration is not a valid `HH:MM` string.
    #[error("Malformed duration {0:?}, expected HH:MM")]
    MalformedDuration(String),

    /// The entry's activity type is missing or unknown.
    #[error("Unknown activity type {0:?}")]
    UnknownActivityType(String),

    /// The requested target status is not part of the workflow.
    #[error("Unknown status {0:?}")]
    UnknownStatus(String),

    /// The entry has already been decided and must be edited (resetting it
    /// to pending) before it can be decided again.
    #[error("Entry {id} is already {status}")]
    AlreadyDecided {
        /// The entry.
        id: Uuid,
        /// Its current status.
        status: String,
    },

    /// Caller does not own the entry being edited.
    #[error("Entry {0} does not belong to the requesting user")]
    NotOwner(Uuid),

    /// Caller is not assigned to the project being reported against.
    #[error("User is not assigned to project {0}")]
    NotAssigned(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl TimesheetError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::EntryNotFound(_) | Self::ProjectNotFound(_) => 404,
            Self::MalformedDuration(_) | Self::UnknownActivityType(_) => 422,
            Self::UnknownStatus(_) => 400,
            Self::AlreadyDecided { .. } => 409,
            Self::NotOwner(_) | Self::NotAssigned(_) => 403,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::ProjectNotFound(_) => "PROJECT_NOT_FOUND",
            Self::MalformedDuration(_) => "MALFORMED_DURATION",
            Self::UnknownActivityType(_) => "UNKNOWN_ACTIVITY_TYPE",
            Self::UnknownStatus(_) => "UNKNOWN_STATUS",
            Self::AlreadyDecided { .. } => "ALREADY_DECIDED",
            Self::NotOwner(_) => "NOT_OWNER",
            Self::NotAssigned(_) => "NOT_ASSIGNED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_errors() {
        let err = TimesheetError::EntryNotFound(Uuid::nil());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "ENTRY_NOT_FOUND");

        let err = TimesheetError::ProjectNotFound(Uuid::nil());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "PROJECT_NOT_FOUND");
    }

    #[test]
    fn test_malformed_data_errors() {
        let err = TimesheetError::MalformedDuration("1h30".into());
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "MALFORMED_DURATION");
        assert!(err.to_string().contains("1h30"));

        let err = TimesheetError::UnknownActivityType("Weekend".into());
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "UNKNOWN_ACTIVITY_TYPE");
    }

    #[test]
    fn test_permission_errors() {
        let err = TimesheetError::NotOwner(Uuid::nil());
        assert_eq!(err.status_code(), 403);

        let err = TimesheetError::NotAssigned(Uuid::nil());
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "NOT_ASSIGNED");
    }

    #[test]
    fn test_database_error() {
        let err = TimesheetError::Database("connection reset".into());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }
}

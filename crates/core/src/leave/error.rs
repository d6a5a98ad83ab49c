//! Leave error types.

use thiserror::Error;

use crate::leave::types::LeaveStatus;

/// Errors that can occur during leave request operations.
#[derive(Debug, Error)]
pub enum LeaveError {
    /// Multiple Days Leave submitted without an end date.
    #[error("End date is required for Multiple Days Leave")]
    EndDateRequired,

    /// End date precedes the start date.
    #[error("End date must not be before the start date")]
    EndDateBeforeStart,

    /// The leave type string is not recognized.
    #[error("Unknown leave type {0:?}")]
    UnknownLeaveType(String),

    /// The status string is not recognized.
    #[error("Unknown status {0:?}")]
    UnknownStatus(String),

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: LeaveStatus,
        /// The attempted target status.
        to: LeaveStatus,
    },

    /// Leave request not found.
    #[error("Leave request {0} not found")]
    NotFound(uuid::Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LeaveError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::EndDateRequired
            | Self::EndDateBeforeStart
            | Self::UnknownLeaveType(_)
            | Self::UnknownStatus(_)
            | Self::InvalidTransition { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EndDateRequired => "END_DATE_REQUIRED",
            Self::EndDateBeforeStart => "END_DATE_BEFORE_START",
            Self::UnknownLeaveType(_) => "UNKNOWN_LEAVE_TYPE",
            Self::UnknownStatus(_) => "UNKNOWN_STATUS",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotFound(_) => "LEAVE_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_400() {
        assert_eq!(LeaveError::EndDateRequired.status_code(), 400);
        assert_eq!(LeaveError::EndDateBeforeStart.status_code(), 400);
        assert_eq!(LeaveError::UnknownLeaveType("x".into()).status_code(), 400);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(LeaveError::EndDateRequired.error_code(), "END_DATE_REQUIRED");
        assert_eq!(
            LeaveError::NotFound(uuid::Uuid::nil()).error_code(),
            "LEAVE_NOT_FOUND"
        );
        assert_eq!(
            LeaveError::InvalidTransition {
                from: LeaveStatus::Approved,
                to: LeaveStatus::Pending,
            }
            .error_code(),
            "INVALID_TRANSITION"
        );
    }
}

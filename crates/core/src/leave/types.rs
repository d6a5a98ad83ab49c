//! Leave request domain types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveType {
    /// A whole working day off.
    FullLeave,
    /// A few hours off within one day; carries an `hours` amount.
    ShortLeave,
    /// Half a working day off.
    HalfDay,
    /// A date range spanning several days.
    MultipleDays,
}

impl LeaveType {
    /// Parses a leave type from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "full leave" => Some(Self::FullLeave),
            "short leave" => Some(Self::ShortLeave),
            "half day" => Some(Self::HalfDay),
            "multiple days leave" | "multiple days" => Some(Self::MultipleDays),
            _ => None,
        }
    }

    /// Returns the wire representation of the leave type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FullLeave => "Full Leave",
            Self::ShortLeave => "Short Leave",
            Self::HalfDay => "Half Day",
            Self::MultipleDays => "Multiple Days Leave",
        }
    }

    /// Returns true if the leave is confined to a single day.
    #[must_use]
    pub const fn is_single_day(&self) -> bool {
        matches!(self, Self::FullLeave | Self::ShortLeave | Self::HalfDay)
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    /// Awaiting a manager's decision.
    Pending,
    /// Granted.
    Approved,
    /// Declined.
    Rejected,
}

impl LeaveStatus {
    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_type_parse() {
        assert_eq!(LeaveType::parse("Full Leave"), Some(LeaveType::FullLeave));
        assert_eq!(LeaveType::parse("short leave"), Some(LeaveType::ShortLeave));
        assert_eq!(LeaveType::parse("Half Day"), Some(LeaveType::HalfDay));
        assert_eq!(
            LeaveType::parse("Multiple Days Leave"),
            Some(LeaveType::MultipleDays)
        );
        assert_eq!(LeaveType::parse("sabbatical"), None);
    }

    #[test]
    fn test_leave_type_round_trip() {
        for ty in [
            LeaveType::FullLeave,
            LeaveType::ShortLeave,
            LeaveType::HalfDay,
            LeaveType::MultipleDays,
        ] {
            assert_eq!(LeaveType::parse(ty.as_str()), Some(ty));
        }
    }

    #[test]
    fn test_single_day() {
        assert!(LeaveType::FullLeave.is_single_day());
        assert!(LeaveType::ShortLeave.is_single_day());
        assert!(LeaveType::HalfDay.is_single_day());
        assert!(!LeaveType::MultipleDays.is_single_day());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(LeaveStatus::parse("Pending"), Some(LeaveStatus::Pending));
        assert_eq!(LeaveStatus::parse("approved"), Some(LeaveStatus::Approved));
        assert_eq!(LeaveStatus::parse("REJECTED"), Some(LeaveStatus::Rejected));
        assert_eq!(LeaveStatus::parse("maybe"), None);
    }
}

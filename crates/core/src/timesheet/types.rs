//! Timesheet domain types.
//!
//! This module defines the core types used for timesheet entries
//! and the project hour budget they are approved against.

use std::fmt;

use serde::{Deserialize, Serialize};

use epm_shared::Hours;

/// Billing classification of a reported time block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityType {
    /// Time chargeable against the project's contracted hour budget.
    Billable,
    /// Time not counted against the client-facing budget.
    NonBillable,
    /// Internal work with no client project attached.
    Inhouse,
}

impl ActivityType {
    /// Parses an activity type from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "billable" => Some(Self::Billable),
            "non billable" | "non-billable" => Some(Self::NonBillable),
            "inhouse" | "in-house" | "in house" => Some(Self::Inhouse),
            _ => None,
        }
    }

    /// Returns the wire representation of the activity type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Billable => "Billable",
            Self::NonBillable => "Non Billable",
            Self::Inhouse => "Inhouse",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a timesheet entry in the approval workflow.
///
/// Entries are created `Pending` by the owning employee. The valid
/// transitions are:
/// - Pending → Approved (manager approval, triggers hour allocation)
/// - Pending → Rejected (manager rejection, status-only)
/// - Approved/Rejected → Pending (owner edits the entry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetStatus {
    /// Awaiting a manager's decision.
    Pending,
    /// Approved; its hours have been credited to the project.
    Approved,
    /// Rejected; the owner may edit and resubmit.
    Rejected,
}

impl SheetStatus {
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

    /// Returns true if moving to this status runs the hour-allocation rule.
    ///
    /// Any other target status is a status-only write; no hour arithmetic
    /// occurs (rejections never touch the project counters).
    #[must_use]
    pub const fn triggers_allocation(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl fmt::Display for SheetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A project's hour budget state, read and advanced by approvals.
///
/// `total_working_hours` only ever moves forward through the allocation
/// rule; rejections and edits never touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectBudget {
    /// Contracted hour ceiling.
    pub total_hours: Hours,
    /// Cumulative hours already credited by approvals.
    pub total_working_hours: Hours,
}

impl ProjectBudget {
    /// Creates a budget state.
    #[must_use]
    pub const fn new(total_hours: Hours, total_working_hours: Hours) -> Self {
        Self {
            total_hours,
            total_working_hours,
        }
    }

    /// Contracted hours not yet consumed, clamped at zero.
    #[must_use]
    pub fn remaining(&self) -> Hours {
        self.total_hours.saturating_sub(self.total_working_hours)
    }

    /// Returns true if the contracted budget is already exhausted.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining().is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(s: &str) -> Hours {
        Hours::parse(s).unwrap()
    }

    #[test]
    fn test_activity_type_parse() {
        assert_eq!(ActivityType::parse("Billable"), Some(ActivityType::Billable));
        assert_eq!(
            ActivityType::parse("non billable"),
            Some(ActivityType::NonBillable)
        );
        assert_eq!(
            ActivityType::parse("Non-Billable"),
            Some(ActivityType::NonBillable)
        );
        assert_eq!(ActivityType::parse("Inhouse"), Some(ActivityType::Inhouse));
        assert_eq!(ActivityType::parse("in-house"), Some(ActivityType::Inhouse));
        assert_eq!(ActivityType::parse("weekend"), None);
        assert_eq!(ActivityType::parse(""), None);
    }

    #[test]
    fn test_activity_type_as_str() {
        assert_eq!(ActivityType::Billable.as_str(), "Billable");
        assert_eq!(ActivityType::NonBillable.as_str(), "Non Billable");
        assert_eq!(ActivityType::Inhouse.as_str(), "Inhouse");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(SheetStatus::parse("pending"), Some(SheetStatus::Pending));
        assert_eq!(SheetStatus::parse("Approved"), Some(SheetStatus::Approved));
        assert_eq!(SheetStatus::parse("REJECTED"), Some(SheetStatus::Rejected));
        assert_eq!(SheetStatus::parse("posted"), None);
    }

    #[test]
    fn test_status_triggers_allocation() {
        assert!(SheetStatus::Approved.triggers_allocation());
        assert!(!SheetStatus::Pending.triggers_allocation());
        assert!(!SheetStatus::Rejected.triggers_allocation());
    }

    #[test]
    fn test_budget_remaining() {
        let budget = ProjectBudget::new(hours("10:00"), hours("09:00"));
        assert_eq!(budget.remaining(), hours("01:00"));
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn test_budget_remaining_clamps_at_zero() {
        let overrun = ProjectBudget::new(hours("10:00"), hours("12:00"));
        assert_eq!(overrun.remaining(), Hours::ZERO);
        assert!(overrun.is_exhausted());
    }
}

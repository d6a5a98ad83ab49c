//! Leave request normalization and approval transitions.

use chrono::NaiveDate;

use epm_shared::Hours;

use crate::leave::error::LeaveError;
use crate::leave::types::{LeaveStatus, LeaveType};

/// A normalized leave request ready to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeavePlan {
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (equals `start_date` for single-day types).
    pub end_date: NaiveDate,
    /// Hours away; only set for Short Leave.
    pub hours: Option<Hours>,
}

/// Stateless service for leave request rules.
pub struct LeaveService;

impl LeaveService {
    /// Normalizes a leave request.
    ///
    /// Single-day types (Full Leave, Short Leave, Half Day) get their end
    /// date pinned to the start date; Multiple Days Leave requires an
    /// explicit end date on or after the start. The `hours` amount is kept
    /// only for Short Leave and silently dropped otherwise.
    ///
    /// # Errors
    ///
    /// Returns `LeaveError::EndDateRequired` or `LeaveError::EndDateBeforeStart`
    /// when the date range is unusable.
    pub fn normalize(
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        hours: Option<Hours>,
    ) -> Result<LeavePlan, LeaveError> {
        let end_date = if leave_type.is_single_day() {
            start_date
        } else {
            let end = end_date.ok_or(LeaveError::EndDateRequired)?;
            if end < start_date {
                return Err(LeaveError::EndDateBeforeStart);
            }
            end
        };

        let hours = if leave_type == LeaveType::ShortLeave {
            hours
        } else {
            None
        };

        Ok(LeavePlan {
            start_date,
            end_date,
            hours,
        })
    }

    /// Validates a manager's decision on a pending request.
    ///
    /// # Errors
    ///
    /// Returns `LeaveError::InvalidTransition` unless moving from `Pending`
    /// to `Approved` or `Rejected`.
    pub fn decide(current: LeaveStatus, target: LeaveStatus) -> Result<LeaveStatus, LeaveError> {
        match (current, target) {
            (LeaveStatus::Pending, LeaveStatus::Approved | LeaveStatus::Rejected) => Ok(target),
            (from, to) => Err(LeaveError::InvalidTransition { from, to }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest::rstest]
    #[case(LeaveType::FullLeave)]
    #[case(LeaveType::ShortLeave)]
    #[case(LeaveType::HalfDay)]
    fn test_single_day_types_pin_end_date(#[case] ty: LeaveType) {
        let plan =
            LeaveService::normalize(ty, date(2026, 8, 10), Some(date(2026, 8, 20)), None).unwrap();
        assert_eq!(plan.end_date, date(2026, 8, 10));
        assert_eq!(plan.hours, None);
    }

    #[test]
    fn test_short_leave_keeps_hours() {
        let plan = LeaveService::normalize(
            LeaveType::ShortLeave,
            date(2026, 8, 10),
            None,
            Some(Hours::parse("02:00").unwrap()),
        )
        .unwrap();
        assert_eq!(plan.hours, Some(Hours::parse("02:00").unwrap()));
        assert_eq!(plan.end_date, plan.start_date);
    }

    #[test]
    fn test_hours_dropped_for_other_types() {
        let plan = LeaveService::normalize(
            LeaveType::FullLeave,
            date(2026, 8, 10),
            None,
            Some(Hours::parse("02:00").unwrap()),
        )
        .unwrap();
        assert_eq!(plan.hours, None);
    }

    #[test]
    fn test_multiple_days_requires_end_date() {
        let result =
            LeaveService::normalize(LeaveType::MultipleDays, date(2026, 8, 10), None, None);
        assert!(matches!(result, Err(LeaveError::EndDateRequired)));
    }

    #[test]
    fn test_multiple_days_valid_range() {
        let plan = LeaveService::normalize(
            LeaveType::MultipleDays,
            date(2026, 8, 10),
            Some(date(2026, 8, 14)),
            None,
        )
        .unwrap();
        assert_eq!(plan.end_date, date(2026, 8, 14));
    }

    #[test]
    fn test_multiple_days_rejects_backwards_range() {
        let result = LeaveService::normalize(
            LeaveType::MultipleDays,
            date(2026, 8, 10),
            Some(date(2026, 8, 9)),
            None,
        );
        assert!(matches!(result, Err(LeaveError::EndDateBeforeStart)));
    }

    #[test]
    fn test_same_day_range_is_valid() {
        let plan = LeaveService::normalize(
            LeaveType::MultipleDays,
            date(2026, 8, 10),
            Some(date(2026, 8, 10)),
            None,
        )
        .unwrap();
        assert_eq!(plan.start_date, plan.end_date);
    }

    #[test]
    fn test_decide_from_pending() {
        assert_eq!(
            LeaveService::decide(LeaveStatus::Pending, LeaveStatus::Approved).unwrap(),
            LeaveStatus::Approved
        );
        assert_eq!(
            LeaveService::decide(LeaveStatus::Pending, LeaveStatus::Rejected).unwrap(),
            LeaveStatus::Rejected
        );
    }

    #[test]
    fn test_decide_rejects_settled_requests() {
        assert!(matches!(
            LeaveService::decide(LeaveStatus::Approved, LeaveStatus::Rejected),
            Err(LeaveError::InvalidTransition { .. })
        ));
        assert!(matches!(
            LeaveService::decide(LeaveStatus::Rejected, LeaveStatus::Approved),
            Err(LeaveError::InvalidTransition { .. })
        ));
        assert!(matches!(
            LeaveService::decide(LeaveStatus::Pending, LeaveStatus::Pending),
            Err(LeaveError::InvalidTransition { .. })
        ));
    }
}

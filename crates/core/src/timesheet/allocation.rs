//! Hour-allocation rule applied when a timesheet entry is approved.
//!
//! This module decides how much of an approved entry's duration counts as
//! "Billable" versus "Non Billable" against the project's contracted hour
//! budget, and how far the project's consumed-hours counter advances.

use epm_shared::Hours;

use crate::timesheet::types::{ActivityType, ProjectBudget};

/// Note written to an entry that kept only the in-budget part of its time.
pub const NOTE_WITHIN_LIMIT: &str = "Billable - within limit";

/// Note written to the overflow sibling created for out-of-budget time.
pub const NOTE_EXTRA_APPROVED: &str = "Non Billable - Extra hours approved";

/// Note written to an entry whose billable part shrank to zero because the
/// budget was already exhausted. The entry is kept, not deleted.
pub const NOTE_BUDGET_EXHAUSTED: &str = "Billable - budget exhausted, time moved to Non Billable";

/// Result of allocating one approved entry against a project budget.
///
/// Invariant: `kept_duration + overflow.unwrap_or(ZERO)` equals the entry's
/// original duration; the split never creates or destroys reported time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationOutcome {
    /// Contracted hours that were still open before this entry.
    pub remaining_before: Hours,
    /// Reported time that did not fit the contracted budget.
    pub extra: Hours,
    /// Duration the original entry keeps (stays Billable).
    ///
    /// May be `00:00` when the budget was already exhausted; the entry is
    /// kept rather than deleted.
    pub kept_duration: Hours,
    /// Duration of the "Non Billable" sibling entry, if a split occurred.
    pub overflow: Option<Hours>,
    /// The budget state after crediting the full reported duration.
    pub updated: ProjectBudget,
}

impl AllocationOutcome {
    /// Returns true if a sibling entry must be created.
    #[must_use]
    pub const fn is_split(&self) -> bool {
        self.overflow.is_some()
    }
}

/// Stateless engine implementing the hour-allocation rule.
pub struct AllocationEngine;

impl AllocationEngine {
    /// Allocates one approved entry's duration against the project budget.
    ///
    /// The rule:
    /// 1. `remaining = max(0, total_hours - total_working_hours)`
    /// 2. `extra = max(0, duration - remaining)`
    /// 3. A Billable entry that would push the counter past the ceiling is
    ///    split: the original shrinks to `remaining` (possibly `00:00`) and
    ///    the `extra` moves to a new approved "Non Billable" sibling.
    /// 4. Anything else (fits within budget, or not Billable) is approved
    ///    unchanged.
    ///
    /// Regardless of the split, `total_working_hours` advances by the full
    /// reported duration: the time was worked either way, only its billing
    /// classification changes.
    #[must_use]
    pub fn allocate(
        duration: Hours,
        activity: ActivityType,
        budget: ProjectBudget,
    ) -> AllocationOutcome {
        let remaining = budget.remaining();
        let extra = duration.saturating_sub(remaining);

        let crosses_ceiling = activity == ActivityType::Billable
            && budget.total_working_hours + duration > budget.total_hours;

        let (kept_duration, overflow) = if crosses_ceiling {
            let kept = duration.min(remaining);
            let overflow = if extra.is_zero() { None } else { Some(extra) };
            (kept, overflow)
        } else {
            (duration, None)
        };

        let updated = ProjectBudget {
            total_hours: budget.total_hours,
            total_working_hours: budget.total_working_hours + duration,
        };

        AllocationOutcome {
            remaining_before: remaining,
            extra,
            kept_duration,
            overflow,
            updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(s: &str) -> Hours {
        Hours::parse(s).unwrap()
    }

    fn budget(total: &str, working: &str) -> ProjectBudget {
        ProjectBudget::new(hours(total), hours(working))
    }

    #[test]
    fn test_billable_within_budget_no_split() {
        // total=10, working=5, approve 01:00 -> no split, working becomes 6.
        let outcome =
            AllocationEngine::allocate(hours("01:00"), ActivityType::Billable, budget("10:00", "05:00"));

        assert!(!outcome.is_split());
        assert_eq!(outcome.kept_duration, hours("01:00"));
        assert_eq!(outcome.updated.total_working_hours, hours("06:00"));
        assert_eq!(outcome.remaining_before, hours("05:00"));
        assert_eq!(outcome.extra, Hours::ZERO);
    }

    #[test]
    fn test_billable_crossing_ceiling_splits() {
        // total=10, working=9, approve 02:00 -> remaining=1, extra=1.
        let outcome =
            AllocationEngine::allocate(hours("02:00"), ActivityType::Billable, budget("10:00", "09:00"));

        assert_eq!(outcome.remaining_before, hours("01:00"));
        assert_eq!(outcome.extra, hours("01:00"));
        assert_eq!(outcome.kept_duration, hours("01:00"));
        assert_eq!(outcome.overflow, Some(hours("01:00")));
        // Full time credited as worked.
        assert_eq!(outcome.updated.total_working_hours, hours("11:00"));
    }

    #[test]
    fn test_exact_fit_produces_no_split() {
        // duration == remaining: extra = 0, counter lands exactly on the ceiling.
        let outcome =
            AllocationEngine::allocate(hours("01:00"), ActivityType::Billable, budget("10:00", "09:00"));

        assert!(!outcome.is_split());
        assert_eq!(outcome.kept_duration, hours("01:00"));
        assert_eq!(outcome.updated.total_working_hours, hours("10:00"));
    }

    #[test]
    fn test_exhausted_budget_routes_everything_to_sibling() {
        // working >= total: original shrinks to 00:00, sibling takes it all.
        let outcome =
            AllocationEngine::allocate(hours("03:00"), ActivityType::Billable, budget("10:00", "10:00"));

        assert_eq!(outcome.remaining_before, Hours::ZERO);
        assert_eq!(outcome.kept_duration, Hours::ZERO);
        assert_eq!(outcome.overflow, Some(hours("03:00")));
        assert_eq!(outcome.updated.total_working_hours, hours("13:00"));
    }

    #[test]
    fn test_overrun_budget_behaves_like_exhausted() {
        let outcome =
            AllocationEngine::allocate(hours("01:30"), ActivityType::Billable, budget("10:00", "12:00"));

        assert_eq!(outcome.kept_duration, Hours::ZERO);
        assert_eq!(outcome.overflow, Some(hours("01:30")));
        assert_eq!(outcome.updated.total_working_hours, hours("13:30"));
    }

    #[test]
    fn test_non_billable_never_splits() {
        // Over the ceiling, but Non Billable: approved unchanged.
        let outcome = AllocationEngine::allocate(
            hours("04:00"),
            ActivityType::NonBillable,
            budget("10:00", "09:00"),
        );

        assert!(!outcome.is_split());
        assert_eq!(outcome.kept_duration, hours("04:00"));
        assert_eq!(outcome.updated.total_working_hours, hours("13:00"));
    }

    #[test]
    fn test_inhouse_never_splits() {
        let outcome = AllocationEngine::allocate(
            hours("02:00"),
            ActivityType::Inhouse,
            budget("10:00", "09:30"),
        );

        assert!(!outcome.is_split());
        assert_eq!(outcome.updated.total_working_hours, hours("11:30"));
    }

    #[test]
    fn test_fractional_split() {
        // total=10, working=9:30, approve 01:45 -> keep 00:30, overflow 01:15.
        let outcome =
            AllocationEngine::allocate(hours("01:45"), ActivityType::Billable, budget("10:00", "09:30"));

        assert_eq!(outcome.kept_duration, hours("00:30"));
        assert_eq!(outcome.overflow, Some(hours("01:15")));
        assert_eq!(outcome.updated.total_working_hours, hours("11:15"));
    }

    #[test]
    fn test_sequential_batch_second_entry_sees_first() {
        // remaining=1, two 1-hour Billable entries: first fits exactly,
        // second is entirely overflow. Exactly one split.
        let first =
            AllocationEngine::allocate(hours("01:00"), ActivityType::Billable, budget("10:00", "09:00"));
        assert!(!first.is_split());

        let second =
            AllocationEngine::allocate(hours("01:00"), ActivityType::Billable, first.updated);
        assert_eq!(second.kept_duration, Hours::ZERO);
        assert_eq!(second.overflow, Some(hours("01:00")));
        assert_eq!(second.updated.total_working_hours, hours("11:00"));
    }

    #[test]
    fn test_zero_duration_entry() {
        let outcome =
            AllocationEngine::allocate(Hours::ZERO, ActivityType::Billable, budget("10:00", "09:00"));

        assert!(!outcome.is_split());
        assert_eq!(outcome.updated.total_working_hours, hours("09:00"));
    }
}

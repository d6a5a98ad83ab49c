//! Property-based tests for the hour-allocation rule.

use proptest::prelude::*;
use rust_decimal::Decimal;

use epm_shared::Hours;

use crate::timesheet::allocation::AllocationEngine;
use crate::timesheet::types::{ActivityType, ProjectBudget};

/// Strategy for durations up to 24 hours, in whole minutes.
fn arb_duration() -> impl Strategy<Value = Hours> {
    (0i64..=24 * 60).prop_map(|minutes| {
        Hours::from_decimal(Decimal::from(minutes) / Decimal::from(60)).unwrap()
    })
}

/// Strategy for budget states: ceiling up to 1000h, consumption up to 1200h.
fn arb_budget() -> impl Strategy<Value = ProjectBudget> {
    (0i64..=1000 * 60, 0i64..=1200 * 60).prop_map(|(total, working)| ProjectBudget {
        total_hours: Hours::from_decimal(Decimal::from(total) / Decimal::from(60)).unwrap(),
        total_working_hours: Hours::from_decimal(Decimal::from(working) / Decimal::from(60))
            .unwrap(),
    })
}

fn arb_activity() -> impl Strategy<Value = ActivityType> {
    prop_oneof![
        Just(ActivityType::Billable),
        Just(ActivityType::NonBillable),
        Just(ActivityType::Inhouse),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The full reported duration is always credited as worked.
    #[test]
    fn prop_counter_advances_by_full_duration(
        duration in arb_duration(),
        activity in arb_activity(),
        budget in arb_budget(),
    ) {
        let outcome = AllocationEngine::allocate(duration, activity, budget);
        prop_assert_eq!(
            outcome.updated.total_working_hours,
            budget.total_working_hours + duration
        );
        prop_assert_eq!(outcome.updated.total_hours, budget.total_hours);
    }

    /// Splitting never creates or destroys reported time.
    #[test]
    fn prop_split_is_duration_preserving(
        duration in arb_duration(),
        activity in arb_activity(),
        budget in arb_budget(),
    ) {
        let outcome = AllocationEngine::allocate(duration, activity, budget);
        let total = outcome.kept_duration + outcome.overflow.unwrap_or(Hours::ZERO);
        prop_assert_eq!(total, duration);
    }

    /// Only Billable entries are ever split.
    #[test]
    fn prop_only_billable_splits(
        duration in arb_duration(),
        budget in arb_budget(),
    ) {
        for activity in [ActivityType::NonBillable, ActivityType::Inhouse] {
            let outcome = AllocationEngine::allocate(duration, activity, budget);
            prop_assert!(!outcome.is_split());
            prop_assert_eq!(outcome.kept_duration, duration);
        }
    }

    /// A Billable entry that fits never splits.
    #[test]
    fn prop_within_budget_never_splits(
        duration in arb_duration(),
        budget in arb_budget(),
    ) {
        prop_assume!(budget.total_working_hours + duration <= budget.total_hours);

        let outcome = AllocationEngine::allocate(duration, ActivityType::Billable, budget);
        prop_assert!(!outcome.is_split());
        prop_assert_eq!(outcome.kept_duration, duration);
    }

    /// The kept (billable) part never exceeds the open budget.
    #[test]
    fn prop_kept_never_exceeds_remaining(
        duration in arb_duration(),
        budget in arb_budget(),
    ) {
        prop_assume!(budget.total_working_hours + duration > budget.total_hours);
        prop_assume!(!duration.is_zero());

        let outcome = AllocationEngine::allocate(duration, ActivityType::Billable, budget);
        prop_assert!(outcome.kept_duration <= budget.remaining());
    }

    /// An exhausted budget sends everything to the overflow sibling.
    #[test]
    fn prop_exhausted_budget_keeps_zero(
        duration in arb_duration(),
        budget in arb_budget(),
    ) {
        prop_assume!(budget.is_exhausted());
        prop_assume!(!duration.is_zero());

        let outcome = AllocationEngine::allocate(duration, ActivityType::Billable, budget);
        prop_assert_eq!(outcome.kept_duration, Hours::ZERO);
        prop_assert_eq!(outcome.overflow, Some(duration));
    }

    /// Allocation is independent of everything but duration, activity, budget:
    /// running it twice gives identical results.
    #[test]
    fn prop_deterministic(
        duration in arb_duration(),
        activity in arb_activity(),
        budget in arb_budget(),
    ) {
        let first = AllocationEngine::allocate(duration, activity, budget);
        let second = AllocationEngine::allocate(duration, activity, budget);
        prop_assert_eq!(first, second);
    }
}

//! Reconversion of Non Billable time into freed contracted hours.
//!
//! Once every task of a project is completed, leftover contracted hours
//! (`total_hours - total_working_hours`) can be refilled by converting the
//! project's approved "Non Billable" entries back to "Billable", oldest
//! first. The planner here is pure; the repository applies the plan.

use uuid::Uuid;

use epm_shared::Hours;

/// Note written to an entry converted wholesale.
pub const NOTE_CONVERTED: &str = "Converted from Non Billable to Billable via Sync";

/// Note written to an entry that was only partially converted.
pub const NOTE_PARTIALLY_CONVERTED: &str = "Partially converted to Billable via Sync";

/// Note written to the leftover Non Billable sibling of a partial conversion.
pub const NOTE_LEFTOVER: &str = "Remaining Non Billable after partial conversion";

/// One approved "Non Billable" entry eligible for reconversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconvertCandidate {
    /// Entry ID.
    pub id: Uuid,
    /// The entry's reported duration.
    pub duration: Hours,
}

/// A single step of a reconversion plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconvertAction {
    /// The whole entry becomes Billable.
    Full {
        /// Entry to convert.
        id: Uuid,
    },
    /// The entry shrinks to the billable part; the leftover moves to a new
    /// approved Non Billable sibling.
    Partial {
        /// Entry to shrink and reclassify.
        id: Uuid,
        /// Duration the entry keeps as Billable.
        billable: Hours,
        /// Duration of the leftover Non Billable sibling.
        leftover: Hours,
    },
}

/// The ordered actions refilling a project's freed budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconversionPlan {
    /// Actions to apply, in candidate order.
    pub actions: Vec<ReconvertAction>,
    /// Total hours turned Billable; the project's `total_working_hours`
    /// advances by this amount.
    pub converted: Hours,
}

impl ReconversionPlan {
    /// Returns true if nothing could be converted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Stateless planner for Non Billable reconversion.
pub struct ReconversionPlanner;

impl ReconversionPlanner {
    /// Plans how `remaining` freed hours are refilled from `candidates`.
    ///
    /// Candidates are consumed in the given order (oldest first). Conversion
    /// stops at the first partial fill or when the freed hours run out.
    #[must_use]
    pub fn plan(remaining: Hours, candidates: &[ReconvertCandidate]) -> ReconversionPlan {
        let mut actions = Vec::new();
        let mut left = remaining;
        let mut converted = Hours::ZERO;

        for candidate in candidates {
            if left.is_zero() {
                break;
            }

            if candidate.duration <= left {
                actions.push(ReconvertAction::Full { id: candidate.id });
                left = left.saturating_sub(candidate.duration);
                converted += candidate.duration;
            } else {
                actions.push(ReconvertAction::Partial {
                    id: candidate.id,
                    billable: left,
                    leftover: candidate.duration.saturating_sub(left),
                });
                converted += left;
                left = Hours::ZERO;
            }
        }

        ReconversionPlan { actions, converted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(s: &str) -> Hours {
        Hours::parse(s).unwrap()
    }

    fn candidate(duration: &str) -> ReconvertCandidate {
        ReconvertCandidate {
            id: Uuid::new_v4(),
            duration: hours(duration),
        }
    }

    #[test]
    fn test_no_remaining_converts_nothing() {
        let plan = ReconversionPlanner::plan(Hours::ZERO, &[candidate("01:00")]);
        assert!(plan.is_empty());
        assert_eq!(plan.converted, Hours::ZERO);
    }

    #[test]
    fn test_full_conversion_within_remaining() {
        let a = candidate("01:00");
        let b = candidate("00:30");
        let plan = ReconversionPlanner::plan(hours("02:00"), &[a, b]);

        assert_eq!(
            plan.actions,
            vec![
                ReconvertAction::Full { id: a.id },
                ReconvertAction::Full { id: b.id }
            ]
        );
        assert_eq!(plan.converted, hours("01:30"));
    }

    #[test]
    fn test_partial_conversion_stops_the_plan() {
        let a = candidate("01:00");
        let b = candidate("02:00");
        let c = candidate("01:00");
        let plan = ReconversionPlanner::plan(hours("02:30"), &[a, b, c]);

        assert_eq!(
            plan.actions,
            vec![
                ReconvertAction::Full { id: a.id },
                ReconvertAction::Partial {
                    id: b.id,
                    billable: hours("01:30"),
                    leftover: hours("00:30"),
                },
            ]
        );
        // Converted equals the freed budget exactly.
        assert_eq!(plan.converted, hours("02:30"));
    }

    #[test]
    fn test_exact_fit_is_full_not_partial() {
        let a = candidate("02:00");
        let plan = ReconversionPlanner::plan(hours("02:00"), &[a]);

        assert_eq!(plan.actions, vec![ReconvertAction::Full { id: a.id }]);
        assert_eq!(plan.converted, hours("02:00"));
    }

    #[test]
    fn test_candidate_order_is_respected() {
        let a = candidate("01:30");
        let b = candidate("00:15");
        let plan = ReconversionPlanner::plan(hours("01:00"), &[a, b]);

        // The first (oldest) candidate is partially converted; the second
        // is never reached even though it would have fit.
        assert_eq!(
            plan.actions,
            vec![ReconvertAction::Partial {
                id: a.id,
                billable: hours("01:00"),
                leftover: hours("00:30"),
            }]
        );
    }

    #[test]
    fn test_partial_is_duration_preserving() {
        let a = candidate("03:45");
        let plan = ReconversionPlanner::plan(hours("01:20"), &[a]);

        match plan.actions[0] {
            ReconvertAction::Partial {
                billable, leftover, ..
            } => assert_eq!(billable + leftover, hours("03:45")),
            ReconvertAction::Full { .. } => panic!("expected partial"),
        }
    }
}

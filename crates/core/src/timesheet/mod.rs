//! Timesheet approval and hour allocation for the EPM backend.
//!
//! This module implements the rules that decide, when a manager approves a
//! submitted time entry, how the reported time is split between a project's
//! contracted ("Billable") hour budget and overflow ("Non Billable") time.
//!
//! # Modules
//!
//! - `types` - Timesheet domain types (ActivityType, SheetStatus, ProjectBudget)
//! - `error` - Timesheet-specific error types
//! - `allocation` - The hour-allocation rule applied on approval
//! - `sync` - Reconversion of Non Billable time once a project's tasks complete

pub mod allocation;
pub mod error;
pub mod sync;
pub mod types;

#[cfg(test)]
mod allocation_props;

pub use allocation::{AllocationEngine, AllocationOutcome};
pub use error::TimesheetError;
pub use sync::{ReconversionPlan, ReconvertAction, ReconvertCandidate, ReconversionPlanner};
pub use types::{ActivityType, ProjectBudget, SheetStatus};

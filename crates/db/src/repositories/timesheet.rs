//! Timesheet repository: submission, editing and batch approval.
//!
//! Batch approval is the hour-allocation entry point. Items are processed
//! strictly sequentially in request order; each item runs in its own
//! transaction holding a row-level lock on the project, so an item's
//! `remaining` calculation sees the effect of every prior item in the same
//! batch and concurrent approvals against one project cannot lose updates.
//! A failure on one item never rolls back or blocks its siblings.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use epm_core::timesheet::{
    ActivityType, AllocationEngine, ProjectBudget, ReconversionPlanner, ReconvertAction,
    ReconvertCandidate, SheetStatus, TimesheetError,
    allocation::{NOTE_BUDGET_EXHAUSTED, NOTE_EXTRA_APPROVED, NOTE_WITHIN_LIMIT},
    sync::{NOTE_CONVERTED, NOTE_LEFTOVER, NOTE_PARTIALLY_CONVERTED},
};
use epm_shared::Hours;

use crate::entities::{project_members, projects, tasks, timesheet_entries, users};

/// Input for one submitted timesheet entry.
#[derive(Debug, Clone)]
pub struct NewEntryInput {
    /// Project reported against; `None` means in-house work.
    pub project_id: Option<Uuid>,
    /// Day the time was worked.
    pub date: NaiveDate,
    /// Reported duration as `HH:MM` (validated at the request boundary).
    pub duration: String,
    /// Kind of work performed (free text, e.g. "Development").
    pub work_type: String,
    /// Billing classification string.
    pub activity_type: String,
    /// Free-text narration.
    pub narration: Option<String>,
}

/// Input for editing an existing entry.
#[derive(Debug, Clone)]
pub struct EditEntryInput {
    /// Project reported against; `None` means in-house work.
    pub project_id: Option<Uuid>,
    /// Day the time was worked.
    pub date: NaiveDate,
    /// Reported duration as `HH:MM`.
    pub duration: String,
    /// Kind of work performed.
    pub work_type: String,
    /// Billing classification string.
    pub activity_type: String,
    /// Free-text narration.
    pub narration: Option<String>,
}

/// One item of a batch approval request.
#[derive(Debug, Clone)]
pub struct ApprovalItem {
    /// Entry to decide.
    pub id: Uuid,
    /// Target status ("approved", "rejected", "pending").
    pub status: String,
}

/// Per-item outcome of a batch approval.
///
/// The hour fields are only present when the allocation rule actually ran
/// (i.e. the item targeted "approved" and referenced a project).
#[derive(Debug, Clone)]
pub struct ApprovalItemOutcome {
    /// The entry this outcome belongs to.
    pub id: Uuid,
    /// Whether processing succeeded.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// Machine-readable error code on failure.
    pub error_code: Option<&'static str>,
    /// Project consumed-hours counter after this item.
    pub final_total_working_hours: Option<Hours>,
    /// Contracted hours still open before this item.
    pub remaining_hours: Option<Hours>,
    /// Reported time that did not fit the contracted budget.
    pub extra_hours: Option<Hours>,
}

impl ApprovalItemOutcome {
    fn failure(id: Uuid, error: &TimesheetError) -> Self {
        Self {
            id,
            success: false,
            message: error.to_string(),
            error_code: Some(error.error_code()),
            final_total_working_hours: None,
            remaining_hours: None,
            extra_hours: None,
        }
    }
}

/// Result of a project sync (Non Billable reconversion).
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// Not every task of the project is completed; nothing was converted.
    TasksIncomplete,
    /// Conversion ran (possibly converting nothing).
    Converted {
        /// Entries updated or created by the conversion.
        converted_entries: Vec<Uuid>,
        /// Project consumed-hours counter after conversion.
        updated_total_working_hours: Hours,
        /// Contracted hours still open after conversion.
        remaining_after: Hours,
    },
}

#[derive(FromQueryResult)]
struct TaskHoursSum {
    total: Option<Decimal>,
}

/// Timesheet repository.
#[derive(Debug, Clone)]
pub struct TimesheetRepository {
    db: DatabaseConnection,
}

impl TimesheetRepository {
    /// Creates a new timesheet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Submits a batch of new entries for a user, all created pending.
    ///
    /// Every referenced project must have the user assigned as a member.
    ///
    /// # Errors
    ///
    /// Returns `TimesheetError::NotAssigned` for the first entry referencing
    /// a project the user is not a member of; nothing is inserted in that
    /// case (submission is all-or-nothing, unlike approval).
    pub async fn submit_batch(
        &self,
        user_id: Uuid,
        entries: Vec<NewEntryInput>,
    ) -> Result<Vec<timesheet_entries::Model>, TimesheetError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        for entry in &entries {
            if let Some(project_id) = entry.project_id {
                self.ensure_assigned(&txn, project_id, user_id).await?;
            }
        }

        let now = Utc::now().into();
        let mut inserted = Vec::with_capacity(entries.len());
        for entry in entries {
            let model = timesheet_entries::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                project_id: Set(entry.project_id),
                date: Set(entry.date),
                duration: Set(entry.duration),
                work_type: Set(entry.work_type),
                activity_type: Set(entry.activity_type),
                narration: Set(entry.narration),
                note: Set(None),
                status: Set(SheetStatus::Pending.as_str().to_string()),
                approved_by: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

            inserted.push(model);
        }

        txn.commit()
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        info!(user_id = %user_id, count = inserted.len(), "Timesheet entries submitted");
        Ok(inserted)
    }

    /// Edits an entry owned by `user_id`.
    ///
    /// If anything actually changed and the entry was already decided
    /// (approved or rejected), its status resets to pending so a manager
    /// decides it again. Returns the stored entry and whether it changed.
    pub async fn edit_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        input: EditEntryInput,
    ) -> Result<(timesheet_entries::Model, bool), TimesheetError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        let entry = timesheet_entries::Entity::find_by_id(entry_id)
            .one(&txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?
            .ok_or(TimesheetError::EntryNotFound(entry_id))?;

        if entry.user_id != user_id {
            return Err(TimesheetError::NotOwner(entry_id));
        }

        if let Some(project_id) = input.project_id {
            self.ensure_assigned(&txn, project_id, user_id).await?;
        }

        let changed = entry.project_id != input.project_id
            || entry.date != input.date
            || entry.duration != input.duration
            || entry.work_type != input.work_type
            || entry.activity_type != input.activity_type
            || entry.narration != input.narration;

        if !changed {
            txn.commit()
                .await
                .map_err(|e| TimesheetError::Database(e.to_string()))?;
            return Ok((entry, false));
        }

        let was_decided = matches!(
            SheetStatus::parse(&entry.status),
            Some(SheetStatus::Approved | SheetStatus::Rejected)
        );

        let mut active: timesheet_entries::ActiveModel = entry.into();
        active.project_id = Set(input.project_id);
        active.date = Set(input.date);
        active.duration = Set(input.duration);
        active.work_type = Set(input.work_type);
        active.activity_type = Set(input.activity_type);
        active.narration = Set(input.narration);
        if was_decided {
            active.status = Set(SheetStatus::Pending.as_str().to_string());
            active.note = Set(None);
            active.approved_by = Set(None);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        info!(entry_id = %entry_id, reset_to_pending = was_decided, "Timesheet entry edited");
        Ok((updated, true))
    }

    /// Lists a user's entries, newest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<timesheet_entries::Model>, TimesheetError> {
        timesheet_entries::Entity::find()
            .filter(timesheet_entries::Column::UserId.eq(user_id))
            .order_by_desc(timesheet_entries::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))
    }

    /// Lists all entries, newest first.
    pub async fn list_all(&self) -> Result<Vec<timesheet_entries::Model>, TimesheetError> {
        timesheet_entries::Entity::find()
            .order_by_desc(timesheet_entries::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))
    }

    /// Lists entries reported by members of one team, newest date first.
    pub async fn list_for_team(
        &self,
        team_id: Uuid,
    ) -> Result<Vec<timesheet_entries::Model>, TimesheetError> {
        timesheet_entries::Entity::find()
            .join(JoinType::InnerJoin, timesheet_entries::Relation::Users.def())
            .filter(users::Column::TeamId.eq(team_id))
            .order_by_desc(timesheet_entries::Column::Date)
            .all(&self.db)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))
    }

    /// Decides a batch of entries.
    ///
    /// Items are processed strictly sequentially in request order; this is a
    /// documented contract, not incidental iteration order. Each item's
    /// outcome is reported independently; a failed item never aborts the
    /// rest of the batch.
    pub async fn approve_batch(
        &self,
        approver: Uuid,
        items: &[ApprovalItem],
    ) -> Vec<ApprovalItemOutcome> {
        let mut outcomes = Vec::with_capacity(items.len());

        for item in items {
            let outcome = match self.process_item(approver, item).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(entry_id = %item.id, error = %error, "Approval item failed");
                    ApprovalItemOutcome::failure(item.id, &error)
                }
            };
            outcomes.push(outcome);
        }

        let succeeded = outcomes.iter().filter(|o| o.success).count();
        info!(
            approver = %approver,
            total = items.len(),
            succeeded,
            failed = items.len() - succeeded,
            "Timesheet approval batch processed"
        );

        outcomes
    }

    /// Processes a single approval item in its own transaction.
    async fn process_item(
        &self,
        approver: Uuid,
        item: &ApprovalItem,
    ) -> Result<ApprovalItemOutcome, TimesheetError> {
        let target = SheetStatus::parse(&item.status)
            .ok_or_else(|| TimesheetError::UnknownStatus(item.status.clone()))?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        let entry = timesheet_entries::Entity::find_by_id(item.id)
            .one(&txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?
            .ok_or(TimesheetError::EntryNotFound(item.id))?;

        // Rejections (and resets to pending) are status-only writes; no hour
        // arithmetic occurs. A reset to pending carries no decider.
        if !target.triggers_allocation() {
            let decided_by = (target != SheetStatus::Pending).then_some(approver);
            Self::write_status(&txn, entry, target, decided_by).await?;
            txn.commit()
                .await
                .map_err(|e| TimesheetError::Database(e.to_string()))?;

            return Ok(ApprovalItemOutcome {
                id: item.id,
                success: true,
                message: format!("Timesheet entry marked {target}"),
                error_code: None,
                final_total_working_hours: None,
                remaining_hours: None,
                extra_hours: None,
            });
        }

        let current = SheetStatus::parse(&entry.status)
            .ok_or_else(|| TimesheetError::UnknownStatus(entry.status.clone()))?;
        if current != SheetStatus::Pending {
            return Err(TimesheetError::AlreadyDecided {
                id: item.id,
                status: current.as_str().to_string(),
            });
        }

        // In-house entries have no budget row to consult.
        let Some(project_id) = entry.project_id else {
            Self::write_status(&txn, entry, SheetStatus::Approved, Some(approver)).await?;
            txn.commit()
                .await
                .map_err(|e| TimesheetError::Database(e.to_string()))?;

            return Ok(ApprovalItemOutcome {
                id: item.id,
                success: true,
                message: "In-house entry approved".to_string(),
                error_code: None,
                final_total_working_hours: None,
                remaining_hours: None,
                extra_hours: None,
            });
        };

        let duration = Hours::parse(&entry.duration)
            .map_err(|_| TimesheetError::MalformedDuration(entry.duration.clone()))?;
        let activity = ActivityType::parse(&entry.activity_type)
            .ok_or_else(|| TimesheetError::UnknownActivityType(entry.activity_type.clone()))?;

        // Row-level lock: concurrent approvals against this project serialize
        // on the budget row instead of racing the read-modify-write.
        let project = projects::Entity::find_by_id(project_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?
            .ok_or(TimesheetError::ProjectNotFound(project_id))?;

        // The contracted ceiling is the sum of the project's task hours.
        let total_hours = self.task_hours_sum(&txn, project_id).await?;
        let total_working_hours = Hours::from_decimal(project.total_working_hours)
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        let budget = ProjectBudget::new(total_hours, total_working_hours);
        let outcome = AllocationEngine::allocate(duration, activity, budget);

        // Apply to the original entry.
        let mut active: timesheet_entries::ActiveModel = entry.clone().into();
        active.status = Set(SheetStatus::Approved.as_str().to_string());
        active.approved_by = Set(Some(approver));
        if outcome.is_split() {
            active.duration = Set(outcome.kept_duration.to_string());
            let note = if outcome.kept_duration.is_zero() {
                NOTE_BUDGET_EXHAUSTED
            } else {
                NOTE_WITHIN_LIMIT
            };
            active.note = Set(Some(note.to_string()));
        }
        active.updated_at = Set(Utc::now().into());
        active
            .update(&txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        // Overflow becomes an approved Non Billable sibling, copying the
        // original's date, work type and narration.
        if let Some(overflow) = outcome.overflow {
            let now = Utc::now().into();
            timesheet_entries::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(entry.user_id),
                project_id: Set(Some(project_id)),
                date: Set(entry.date),
                duration: Set(overflow.to_string()),
                work_type: Set(entry.work_type.clone()),
                activity_type: Set(ActivityType::NonBillable.as_str().to_string()),
                narration: Set(entry.narration.clone()),
                note: Set(Some(NOTE_EXTRA_APPROVED.to_string())),
                status: Set(SheetStatus::Approved.as_str().to_string()),
                approved_by: Set(Some(approver)),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;
        }

        // Persist the budget: refreshed ceiling plus the advanced counter.
        let mut active_project: projects::ActiveModel = project.into();
        active_project.total_hours = Set(total_hours.as_decimal());
        active_project.total_working_hours = Set(outcome.updated.total_working_hours.as_decimal());
        active_project.updated_at = Set(Utc::now().into());
        active_project
            .update(&txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        info!(
            entry_id = %item.id,
            project_id = %project_id,
            split = outcome.is_split(),
            "Timesheet entry approved"
        );

        Ok(ApprovalItemOutcome {
            id: item.id,
            success: true,
            message: if outcome.is_split() {
                "Entry approved; extra hours moved to Non Billable".to_string()
            } else {
                "Entry approved".to_string()
            },
            error_code: None,
            final_total_working_hours: Some(outcome.updated.total_working_hours),
            remaining_hours: Some(outcome.remaining_before),
            extra_hours: Some(outcome.extra),
        })
    }

    /// Converts a project's approved Non Billable entries back to Billable
    /// once all of its tasks are completed, oldest entries first.
    pub async fn sync_project(&self, project_id: Uuid) -> Result<SyncOutcome, TimesheetError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        let statuses: Vec<String> = tasks::Entity::find()
            .filter(tasks::Column::ProjectId.eq(project_id))
            .select_only()
            .column(tasks::Column::Status)
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        if statuses.iter().any(|s| !s.eq_ignore_ascii_case("completed")) {
            return Ok(SyncOutcome::TasksIncomplete);
        }

        let project = projects::Entity::find_by_id(project_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?
            .ok_or(TimesheetError::ProjectNotFound(project_id))?;

        let total_hours = Hours::from_decimal(project.total_hours)
            .map_err(|e| TimesheetError::Database(e.to_string()))?;
        let working_hours = Hours::from_decimal(project.total_working_hours)
            .map_err(|e| TimesheetError::Database(e.to_string()))?;
        let remaining = total_hours.saturating_sub(working_hours);

        let entries = timesheet_entries::Entity::find()
            .filter(timesheet_entries::Column::ProjectId.eq(project_id))
            .filter(timesheet_entries::Column::Status.eq(SheetStatus::Approved.as_str()))
            .filter(
                timesheet_entries::Column::ActivityType.eq(ActivityType::NonBillable.as_str()),
            )
            .order_by_asc(timesheet_entries::Column::CreatedAt)
            .all(&txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        let mut candidates = Vec::with_capacity(entries.len());
        for entry in &entries {
            match Hours::parse(&entry.duration) {
                Ok(duration) => candidates.push(ReconvertCandidate {
                    id: entry.id,
                    duration,
                }),
                Err(_) => {
                    warn!(entry_id = %entry.id, duration = %entry.duration,
                        "Skipping entry with malformed duration during sync");
                }
            }
        }

        let plan = ReconversionPlanner::plan(remaining, &candidates);
        let mut converted_entries = Vec::new();

        for action in &plan.actions {
            match *action {
                ReconvertAction::Full { id } => {
                    let Some(entry) = entries.iter().find(|e| e.id == id) else {
                        continue;
                    };
                    let mut active: timesheet_entries::ActiveModel = entry.clone().into();
                    active.activity_type = Set(ActivityType::Billable.as_str().to_string());
                    active.note = Set(Some(NOTE_CONVERTED.to_string()));
                    active.updated_at = Set(Utc::now().into());
                    active
                        .update(&txn)
                        .await
                        .map_err(|e| TimesheetError::Database(e.to_string()))?;
                    converted_entries.push(id);
                }
                ReconvertAction::Partial {
                    id,
                    billable,
                    leftover,
                } => {
                    let Some(entry) = entries.iter().find(|e| e.id == id) else {
                        continue;
                    };
                    let mut active: timesheet_entries::ActiveModel = entry.clone().into();
                    active.duration = Set(billable.to_string());
                    active.activity_type = Set(ActivityType::Billable.as_str().to_string());
                    active.note = Set(Some(NOTE_PARTIALLY_CONVERTED.to_string()));
                    active.updated_at = Set(Utc::now().into());
                    active
                        .update(&txn)
                        .await
                        .map_err(|e| TimesheetError::Database(e.to_string()))?;
                    converted_entries.push(id);

                    let now = Utc::now().into();
                    let sibling = timesheet_entries::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        user_id: Set(entry.user_id),
                        project_id: Set(Some(project_id)),
                        date: Set(entry.date),
                        duration: Set(leftover.to_string()),
                        work_type: Set(entry.work_type.clone()),
                        activity_type: Set(ActivityType::NonBillable.as_str().to_string()),
                        narration: Set(entry.narration.clone()),
                        note: Set(Some(NOTE_LEFTOVER.to_string())),
                        status: Set(SheetStatus::Approved.as_str().to_string()),
                        approved_by: Set(entry.approved_by),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(&txn)
                    .await
                    .map_err(|e| TimesheetError::Database(e.to_string()))?;
                    converted_entries.push(sibling.id);
                }
            }
        }

        let updated_working = working_hours + plan.converted;
        let mut active_project: projects::ActiveModel = project.into();
        active_project.total_working_hours = Set(updated_working.as_decimal());
        active_project.updated_at = Set(Utc::now().into());
        active_project
            .update(&txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        info!(
            project_id = %project_id,
            converted = converted_entries.len(),
            hours = %plan.converted,
            "Non Billable entries reconverted"
        );

        Ok(SyncOutcome::Converted {
            converted_entries,
            updated_total_working_hours: updated_working,
            remaining_after: total_hours.saturating_sub(updated_working),
        })
    }

    /// Sums the task hours forming a project's contracted ceiling.
    async fn task_hours_sum(
        &self,
        txn: &DatabaseTransaction,
        project_id: Uuid,
    ) -> Result<Hours, TimesheetError> {
        let sum = tasks::Entity::find()
            .filter(tasks::Column::ProjectId.eq(project_id))
            .select_only()
            .column_as(tasks::Column::Hours.sum(), "total")
            .into_model::<TaskHoursSum>()
            .one(txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?
            .and_then(|row| row.total)
            .unwrap_or(Decimal::ZERO);

        Hours::from_decimal(sum).map_err(|e| TimesheetError::Database(e.to_string()))
    }

    /// Fails unless `user_id` is a member of `project_id`.
    async fn ensure_assigned(
        &self,
        txn: &DatabaseTransaction,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), TimesheetError> {
        let membership = project_members::Entity::find_by_id((project_id, user_id))
            .one(txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))?;

        if membership.is_none() {
            return Err(TimesheetError::NotAssigned(project_id));
        }
        Ok(())
    }

    /// Writes a status without touching hour counters.
    async fn write_status(
        txn: &DatabaseTransaction,
        entry: timesheet_entries::Model,
        status: SheetStatus,
        decided_by: Option<Uuid>,
    ) -> Result<timesheet_entries::Model, TimesheetError> {
        let mut active: timesheet_entries::ActiveModel = entry.into();
        active.status = Set(status.as_str().to_string());
        active.approved_by = Set(decided_by);
        active.updated_at = Set(Utc::now().into());

        active
            .update(txn)
            .await
            .map_err(|e| TimesheetError::Database(e.to_string()))
    }
}

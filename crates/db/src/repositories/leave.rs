//! Leave request repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use tracing::info;
use uuid::Uuid;

use epm_core::leave::{LeaveError, LeavePlan, LeaveService, LeaveStatus, LeaveType};

use crate::entities::{leave_requests, users};

/// Leave request repository.
#[derive(Debug, Clone)]
pub struct LeaveRepository {
    db: DatabaseConnection,
}

impl LeaveRepository {
    /// Creates a new leave repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores a normalized leave request as pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        user_id: Uuid,
        leave_type: LeaveType,
        plan: LeavePlan,
        reason: String,
    ) -> Result<leave_requests::Model, LeaveError> {
        let now = Utc::now().into();

        let request = leave_requests::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            start_date: Set(plan.start_date),
            end_date: Set(plan.end_date),
            leave_type: Set(leave_type.as_str().to_string()),
            hours: Set(plan.hours.map(|h| h.as_decimal())),
            reason: Set(reason),
            status: Set(LeaveStatus::Pending.as_str().to_string()),
            decided_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| LeaveError::Database(e.to_string()))?;

        info!(user_id = %user_id, leave_id = %request.id, "Leave request submitted");
        Ok(request)
    }

    /// Applies a manager's decision to a pending request.
    ///
    /// # Errors
    ///
    /// Returns `LeaveError::NotFound` or `LeaveError::InvalidTransition`.
    pub async fn decide(
        &self,
        id: Uuid,
        decided_by: Uuid,
        target: LeaveStatus,
    ) -> Result<leave_requests::Model, LeaveError> {
        let request = leave_requests::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LeaveError::Database(e.to_string()))?
            .ok_or(LeaveError::NotFound(id))?;

        let current = LeaveStatus::parse(&request.status)
            .ok_or_else(|| LeaveError::UnknownStatus(request.status.clone()))?;
        let decided = LeaveService::decide(current, target)?;

        let mut active: leave_requests::ActiveModel = request.into();
        active.status = Set(decided.as_str().to_string());
        active.decided_by = Set(Some(decided_by));
        active.updated_at = Set(Utc::now().into());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| LeaveError::Database(e.to_string()))?;

        info!(leave_id = %id, decided_by = %decided_by, status = %decided, "Leave request decided");
        Ok(updated)
    }

    /// Finds a request by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<leave_requests::Model>, LeaveError> {
        leave_requests::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LeaveError::Database(e.to_string()))
    }

    /// Lists all leave requests, newest first (HR view).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<leave_requests::Model>, LeaveError> {
        leave_requests::Entity::find()
            .order_by_desc(leave_requests::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| LeaveError::Database(e.to_string()))
    }

    /// Lists one user's leave requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<leave_requests::Model>, LeaveError> {
        leave_requests::Entity::find()
            .filter(leave_requests::Column::UserId.eq(user_id))
            .order_by_desc(leave_requests::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| LeaveError::Database(e.to_string()))
    }

    /// Lists leave requests from members of one team, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_team(
        &self,
        team_id: Uuid,
    ) -> Result<Vec<leave_requests::Model>, LeaveError> {
        leave_requests::Entity::find()
            .join(JoinType::InnerJoin, leave_requests::Relation::Users.def())
            .filter(users::Column::TeamId.eq(team_id))
            .order_by_desc(leave_requests::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| LeaveError::Database(e.to_string()))
    }
}

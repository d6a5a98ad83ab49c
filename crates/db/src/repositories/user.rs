//! User (employee) repository.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use epm_shared::PageRequest;

use crate::entities::{teams, users};

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Full name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 password hash (hashing happens in `epm-core`).
    pub password_hash: String,
    /// Role assignment.
    pub role_id: Uuid,
    /// Team assignment, if any.
    pub team_id: Option<Uuid>,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// First day of employment.
    pub joining_date: Option<NaiveDate>,
}

/// Input for updating a user; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// Full name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// New password hash.
    pub password_hash: Option<String>,
    /// Role assignment.
    pub role_id: Option<Uuid>,
    /// Team assignment (`Some(None)` clears it).
    pub team_id: Option<Option<Uuid>>,
    /// Phone number (`Some(None)` clears it).
    pub phone: Option<Option<String>>,
    /// Postal address (`Some(None)` clears it).
    pub address: Option<Option<String>>,
}

/// Employee head-count per team.
#[derive(Debug, Clone, FromQueryResult)]
pub struct TeamUserCount {
    /// Team ID.
    pub team_id: Uuid,
    /// Team name.
    pub team_name: String,
    /// Number of users in the team.
    pub users: i64,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (e.g. duplicate email).
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, DbErr> {
        let now = Utc::now().into();

        users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            role_id: Set(input.role_id),
            team_id: Set(input.team_id),
            phone: Set(input.phone),
            address: Set(input.address),
            joining_date: Set(input.joining_date),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }

    /// Updates a user. Returns `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateUserInput,
    ) -> Result<Option<users::Model>, DbErr> {
        let Some(user) = users::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = input.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(role_id) = input.role_id {
            active.role_id = Set(role_id);
        }
        if let Some(team_id) = input.team_id {
            active.team_id = Set(team_id);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Deletes a user. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = users::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Lists users, newest first, with the total row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, page: &PageRequest) -> Result<(Vec<users::Model>, u64), DbErr> {
        let paginator = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .paginate(&self.db, page.limit());

        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await?;

        Ok((items, total))
    }

    /// Lists users belonging to one team.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_team(&self, team_id: Uuid) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::TeamId.eq(team_id))
            .order_by_asc(users::Column::Name)
            .all(&self.db)
            .await
    }

    /// Employee head-count per team.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_by_team(&self) -> Result<Vec<TeamUserCount>, DbErr> {
        teams::Entity::find()
            .join(JoinType::LeftJoin, teams::Relation::Users.def())
            .select_only()
            .column_as(teams::Column::Id, "team_id")
            .column_as(teams::Column::Name, "team_name")
            .column_as(users::Column::Id.count(), "users")
            .group_by(teams::Column::Id)
            .group_by(teams::Column::Name)
            .into_model::<TeamUserCount>()
            .all(&self.db)
            .await
    }
}

//! Organization repository for database operations.

use ringbook_shared::types::{OrganizationId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::organizations;

/// Organization repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: OrganizationId,
    ) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id.0).one(&self.db).await
    }

    /// Finds the organization a user owns.
    ///
    /// A user owning several organizations gets the oldest one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find()
            .filter(organizations::Column::OwnerId.eq(owner_id.0))
            .order_by_asc(organizations::Column::Id)
            .one(&self.db)
            .await
    }

    /// Creates an organization owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        name: &str,
        owner_id: UserId,
    ) -> Result<organizations::Model, DbErr> {
        organizations::ActiveModel {
            name: Set(name.to_string()),
            owner_id: Set(owner_id.0),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }
}

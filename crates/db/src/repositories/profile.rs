//! Profile repository.
//!
//! Profiles mirror users of the hosted auth provider; the id is the token
//! subject.

use ringbook_shared::types::UserId;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set};

use crate::entities::profiles;

/// Profile repository.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    db: DatabaseConnection,
}

impl ProfileRepository {
    /// Creates a new profile repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a profile by user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<profiles::Model>, DbErr> {
        profiles::Entity::find_by_id(id.0).one(&self.db).await
    }

    /// Inserts or refreshes a profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert(
        &self,
        id: UserId,
        email: &str,
        name: Option<&str>,
    ) -> Result<profiles::Model, DbErr> {
        let model = profiles::ActiveModel {
            id: Set(id.0),
            name: Set(name.map(str::to_string)),
            email: Set(email.to_string()),
            image: Set(None),
        };

        profiles::Entity::insert(model)
            .on_conflict(
                OnConflict::column(profiles::Column::Id)
                    .update_columns([profiles::Column::Email, profiles::Column::Name])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
    }
}

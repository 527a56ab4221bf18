//! Account repository for chart of accounts database operations.

use ringbook_core::ledger::{self, AccountInfo, ChartAccount};
use ringbook_shared::types::{AccountId, OrganizationId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::accounts;

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account name, unique within the organization.
    pub name: String,
    /// Account type.
    pub account_type: ledger::AccountType,
    /// Normal balance side; defaults from the type when `None`.
    pub normal_balance: Option<ledger::NormalBalance>,
}

impl CreateAccountInput {
    /// Account with the type's default normal balance.
    #[must_use]
    pub fn new(name: impl Into<String>, account_type: ledger::AccountType) -> Self {
        Self {
            name: name.into(),
            account_type,
            normal_balance: None,
        }
    }
}

impl From<&accounts::Model> for ChartAccount {
    fn from(model: &accounts::Model) -> Self {
        Self {
            account_id: AccountId(model.id),
            name: model.name.clone(),
            account_type: model.account_type.into(),
            normal_balance: model.normal_balance.into(),
        }
    }
}

impl From<&accounts::Model> for AccountInfo {
    fn from(model: &accounts::Model) -> Self {
        Self {
            id: AccountId(model.id),
            account_type: model.account_type.into(),
            normal_balance: model.normal_balance.into(),
        }
    }
}

/// Account repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the organization's accounts ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<accounts::Model>, DbErr> {
        find_for_organization(&self.db, organization_id).await
    }

    /// The organization's chart of accounts as used by the generator.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn chart(&self, organization_id: OrganizationId) -> Result<Vec<ChartAccount>, DbErr> {
        let accounts = self.list_accounts(organization_id).await?;
        Ok(accounts.iter().map(ChartAccount::from).collect())
    }

    /// Finds an account by id within an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account(
        &self,
        organization_id: OrganizationId,
        id: AccountId,
    ) -> Result<Option<accounts::Model>, DbErr> {
        accounts::Entity::find_by_id(id.0)
            .filter(accounts::Column::OrganizationId.eq(organization_id.0))
            .one(&self.db)
            .await
    }

    /// Creates accounts with zero balances in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails, for example on a duplicate
    /// name; nothing is written in that case.
    pub async fn create_accounts(
        &self,
        organization_id: OrganizationId,
        inputs: &[CreateAccountInput],
    ) -> Result<Vec<accounts::Model>, DbErr> {
        let txn = self.db.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());

        for input in inputs {
            let normal_balance = input
                .normal_balance
                .unwrap_or_else(|| input.account_type.default_normal_balance());

            let account = accounts::ActiveModel {
                organization_id: Set(organization_id.0),
                name: Set(input.name.clone()),
                account_type: Set(input.account_type.into()),
                normal_balance: Set(normal_balance.into()),
                balance: Set(Decimal::ZERO),
                ..Default::default()
            };
            created.push(account.insert(&txn).await?);
        }

        txn.commit().await?;
        Ok(created)
    }
}

/// Loads an organization's accounts on any connection, including an open
/// transaction.
pub(crate) async fn find_for_organization<C: ConnectionTrait>(
    conn: &C,
    organization_id: OrganizationId,
) -> Result<Vec<accounts::Model>, DbErr> {
    accounts::Entity::find()
        .filter(accounts::Column::OrganizationId.eq(organization_id.0))
        .order_by_asc(accounts::Column::Id)
        .all(conn)
        .await
}

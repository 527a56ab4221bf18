//! Chart of accounts routes.

use axum::{Json, Router, extract::State, routing::get};
use ringbook_core::ledger::{AccountType, NormalBalance};
use ringbook_db::{AccountRepository, entities::accounts};
use rust_decimal::Decimal;
use serde::Serialize;

use super::organization_for;
use crate::{
    AppState,
    error::{ApiResult, db_error},
    middleware::AuthUser,
};

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/accounts", get(list_accounts))
}

/// An account with its running balance.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Account id.
    pub id: i32,
    /// Account name.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Side on which the balance grows.
    pub normal_balance: NormalBalance,
    /// Running balance.
    pub balance: Decimal,
}

impl From<accounts::Model> for AccountResponse {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            account_type: model.account_type.into(),
            normal_balance: model.normal_balance.into(),
            balance: model.balance,
        }
    }
}

/// GET /accounts
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<AccountResponse>>> {
    let organization_id = organization_for(&state, auth.user_id()).await?;
    let accounts = AccountRepository::new((*state.db).clone())
        .list_accounts(organization_id)
        .await
        .map_err(db_error)?;

    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

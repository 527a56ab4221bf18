//! API route definitions.

use axum::{Router, middleware};
use ringbook_core::ledger::LedgerError;
use ringbook_db::OrganizationRepository;
use ringbook_shared::types::{OrganizationId, UserId};

use crate::error::{ApiResult, db_error};
use crate::{AppState, middleware::auth::auth_middleware};

pub mod accounts;
pub mod health;
pub mod journal;
pub mod posts;
pub mod transactions;
pub mod uploads;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(accounts::routes())
        .merge(posts::routes())
        .merge(journal::routes())
        .merge(transactions::routes())
        .merge(uploads::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// The organization owned by `user`, if any.
pub(crate) async fn find_organization(
    state: &AppState,
    user: UserId,
) -> ApiResult<Option<OrganizationId>> {
    Ok(OrganizationRepository::new((*state.db).clone())
        .find_by_owner(user)
        .await
        .map_err(db_error)?
        .map(|org| OrganizationId(org.id)))
}

/// The organization owned by `user`.
pub(crate) async fn organization_for(state: &AppState, user: UserId) -> ApiResult<OrganizationId> {
    Ok(find_organization(state, user)
        .await?
        .ok_or(LedgerError::NoOrganization)?)
}

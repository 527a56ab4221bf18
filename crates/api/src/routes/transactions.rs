//! Ledger routes: posting reviewed entries, the ledger view and approval.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use ringbook_core::ledger::{
    CandidateEntry, LedgerError, ensure_balanced, entry_totals, validate_line,
};
use ringbook_db::{
    TransactionRepository,
    entities::transactions,
    repositories::TransactionWithLines,
};
use ringbook_shared::types::{PageRequest, PageResponse, PostId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::organization_for;
use crate::{
    AppState,
    error::{ApiError, ApiResult, db_error},
    middleware::AuthUser,
};

/// Creates the transaction routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction).get(list_transactions))
        .route("/transactions/{transaction_id}", get(get_transaction))
        .route("/transactions/{transaction_id}/approve", post(approve_transaction))
}

/// Request body for posting a reviewed entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    /// Post the entry was generated from.
    pub post_id: Option<Uuid>,
    /// The reviewed entry.
    pub entry: CandidateEntry,
}

/// Response after posting an entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTransaction {
    /// New transaction id.
    pub id: i32,
}

/// One journal line as shown in the ledger view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResponse {
    /// Line id.
    pub id: i32,
    /// Account id.
    pub account_id: i32,
    /// Account name, if the account still exists.
    pub account_name: Option<String>,
    /// Debit amount, zero for credit lines.
    pub debit: Decimal,
    /// Credit amount, zero for debit lines.
    pub credit: Decimal,
}

/// A transaction with its lines.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Transaction id.
    pub id: i32,
    /// Description.
    pub description: String,
    /// Transaction date.
    pub date: NaiveDate,
    /// Source post.
    pub post_id: Option<Uuid>,
    /// Approval flag.
    pub is_approved: bool,
    /// Approver.
    pub approved_by: Option<Uuid>,
    /// Approval time.
    pub approved_at: Option<DateTime<FixedOffset>>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Sum of debit lines.
    pub total_debit: Decimal,
    /// Sum of credit lines.
    pub total_credit: Decimal,
    /// Lines in posting order.
    pub lines: Vec<LineResponse>,
}

impl TransactionResponse {
    fn header(t: transactions::Model, lines: Vec<LineResponse>) -> Self {
        let total_debit = lines.iter().map(|l| l.debit).sum();
        let total_credit = lines.iter().map(|l| l.credit).sum();
        Self {
            id: t.id,
            description: t.description,
            date: t.date,
            post_id: t.post_id,
            is_approved: t.is_approved,
            approved_by: t.approved_by,
            approved_at: t.approved_at,
            created_at: t.created_at,
            total_debit,
            total_credit,
            lines,
        }
    }
}

impl From<TransactionWithLines> for TransactionResponse {
    fn from(value: TransactionWithLines) -> Self {
        let lines = value
            .lines
            .into_iter()
            .map(|l| {
                let (debit, credit) = if l.line.is_credit {
                    (Decimal::ZERO, l.line.amount)
                } else {
                    (l.line.amount, Decimal::ZERO)
                };
                LineResponse {
                    id: l.line.id,
                    account_id: l.line.account_id,
                    account_name: l.account.map(|a| a.name),
                    debit,
                    credit,
                }
            })
            .collect();
        Self::header(value.transaction, lines)
    }
}

/// Rejects malformed lines and entries whose debits and credits differ,
/// before the database is touched.
pub(crate) fn require_postable(entry: &CandidateEntry) -> ApiResult<()> {
    if entry.entries.is_empty() {
        return Err(LedgerError::EmptyEntry.into());
    }
    for line in &entry.entries {
        validate_line(line)?;
    }
    ensure_balanced(&entry_totals(&entry.entries))?;
    Ok(())
}

/// POST /transactions
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<CreatedTransaction>)> {
    require_postable(&req.entry)?;

    let user_id = auth.user_id();
    let organization_id = organization_for(&state, user_id).await?;

    let id = TransactionRepository::new((*state.db).clone())
        .post_entry(
            organization_id,
            &req.entry,
            req.post_id.map(PostId::from_uuid),
            user_id,
        )
        .await?;

    // The reviewed draft is now in the ledger.
    state.drafts.clear(user_id);

    Ok((StatusCode::CREATED, Json(CreatedTransaction { id: id.0 })))
}

/// GET /transactions
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<TransactionResponse>>> {
    let organization_id = organization_for(&state, auth.user_id()).await?;

    let result = TransactionRepository::new((*state.db).clone())
        .list_transactions(organization_id, &page)
        .await
        .map_err(db_error)?;

    Ok(Json(PageResponse {
        data: result.data.into_iter().map(TransactionResponse::from).collect(),
        meta: result.meta,
    }))
}

/// GET /transactions/{transaction_id}
async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<i32>,
) -> ApiResult<Json<TransactionResponse>> {
    let organization_id = organization_for(&state, auth.user_id()).await?;

    TransactionRepository::new((*state.db).clone())
        .find_transaction(organization_id, TransactionId(transaction_id))
        .await
        .map_err(db_error)?
        .map(|t| Json(TransactionResponse::from(t)))
        .ok_or_else(|| ApiError::not_found(format!("Transaction {transaction_id}")))
}

/// POST /transactions/{transaction_id}/approve
async fn approve_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<i32>,
) -> ApiResult<Json<TransactionResponse>> {
    let user_id = auth.user_id();
    let organization_id = organization_for(&state, user_id).await?;
    let repo = TransactionRepository::new((*state.db).clone());

    repo.approve_transaction(organization_id, TransactionId(transaction_id), user_id)
        .await?;
    info!(transaction_id, user_id = %user_id, "Transaction approved via API");

    repo.find_transaction(organization_id, TransactionId(transaction_id))
        .await
        .map_err(db_error)?
        .map(|t| Json(TransactionResponse::from(t)))
        .ok_or_else(|| ApiError::not_found(format!("Transaction {transaction_id}")))
}

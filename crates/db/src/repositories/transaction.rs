//! Transaction repository: the ledger writer and the ledger view.
//!
//! Posting a candidate entry is one database transaction: resolve the
//! accounts, insert the transaction and its journal lines, then apply the
//! balance deltas as in-database increments in ascending account order.
//! Any failure rolls back the whole unit.

use std::collections::HashMap;

use chrono::Utc;
use ringbook_core::ledger::{AccountInfo, CandidateEntry, LedgerError, LedgerService, PostingPlan};
use ringbook_shared::types::{
    AccountId, OrganizationId, PageRequest, PageResponse, PostId, TransactionId, UserId,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use super::account::find_for_organization;
use crate::entities::{accounts, journal_lines, posts, transactions};

/// Journal line joined with its account.
#[derive(Debug, Clone)]
pub struct LineWithAccount {
    /// The journal line.
    pub line: journal_lines::Model,
    /// The account it posts to.
    pub account: Option<accounts::Model>,
}

/// Transaction with its journal lines in posting order.
#[derive(Debug, Clone)]
pub struct TransactionWithLines {
    /// Transaction header.
    pub transaction: transactions::Model,
    /// Journal lines.
    pub lines: Vec<LineWithAccount>,
}

/// Maps a database failure inside the posting unit.
pub(crate) fn db_err(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a candidate entry atomically.
    ///
    /// When `source_post_id` is given, the post must exist, be authored by
    /// `user_id` and not be processed yet; it is marked processed in the
    /// same unit. The transaction is created unapproved. Balance is not
    /// enforced here.
    ///
    /// # Errors
    ///
    /// Validation variants of [`LedgerError`] before anything is written;
    /// `PostNotFound` for a foreign or missing source post;
    /// `PostAlreadyProcessed` if an entry was already posted from it;
    /// `Database` if the unit fails and is rolled back.
    pub async fn post_entry(
        &self,
        organization_id: OrganizationId,
        candidate: &CandidateEntry,
        source_post_id: Option<PostId>,
        user_id: UserId,
    ) -> Result<TransactionId, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        if let Some(post_id) = source_post_id {
            claim_post(&txn, post_id, user_id).await?;
        }

        let transaction_id = write_entry(&txn, organization_id, candidate, source_post_id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            transaction_id = %transaction_id,
            organization_id = %organization_id,
            user_id = %user_id,
            lines = candidate.entries.len(),
            "Posted journal entry"
        );
        Ok(transaction_id)
    }

    /// Lists transactions newest first, with their lines and accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn list_transactions(
        &self,
        organization_id: OrganizationId,
        page: &PageRequest,
    ) -> Result<PageResponse<TransactionWithLines>, DbErr> {
        let paginator = transactions::Entity::find()
            .filter(transactions::Column::OrganizationId.eq(organization_id.0))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .paginate(&self.db, u64::from(page.per_page()));

        let total = paginator.num_items().await?;
        let headers = paginator.fetch_page(page.page_index()).await?;
        let data = attach_lines(&self.db, headers).await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Finds a transaction with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn find_transaction(
        &self,
        organization_id: OrganizationId,
        id: TransactionId,
    ) -> Result<Option<TransactionWithLines>, DbErr> {
        let header = transactions::Entity::find_by_id(id.0)
            .filter(transactions::Column::OrganizationId.eq(organization_id.0))
            .one(&self.db)
            .await?;

        match header {
            Some(header) => Ok(attach_lines(&self.db, vec![header]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Marks a transaction approved by `user_id`.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound` outside the organization, `AlreadyApproved` on
    /// a second approval, `Database` on failure.
    pub async fn approve_transaction(
        &self,
        organization_id: OrganizationId,
        id: TransactionId,
        user_id: UserId,
    ) -> Result<transactions::Model, LedgerError> {
        let now = Utc::now();

        // Conditional update so two concurrent approvals cannot both succeed.
        let result = transactions::Entity::update_many()
            .col_expr(transactions::Column::IsApproved, Expr::value(true))
            .col_expr(transactions::Column::ApprovedBy, Expr::value(user_id.0))
            .col_expr(transactions::Column::ApprovedAt, Expr::value(now))
            .filter(transactions::Column::Id.eq(id.0))
            .filter(transactions::Column::OrganizationId.eq(organization_id.0))
            .filter(transactions::Column::IsApproved.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        let transaction = transactions::Entity::find_by_id(id.0)
            .filter(transactions::Column::OrganizationId.eq(organization_id.0))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::TransactionNotFound(id))?;

        if result.rows_affected == 0 {
            return Err(LedgerError::AlreadyApproved(id));
        }

        info!(transaction_id = %id, approved_by = %user_id, "Approved transaction");
        Ok(transaction)
    }
}

/// Marks an unprocessed post of `user_id` as processed.
///
/// The conditional update takes the row lock, so of two concurrent postings
/// against the same post only one succeeds.
async fn claim_post<C: ConnectionTrait>(
    txn: &C,
    post_id: PostId,
    user_id: UserId,
) -> Result<(), LedgerError> {
    let owned = posts::Entity::find_by_id(post_id.0)
        .filter(posts::Column::UserId.eq(user_id.0))
        .one(txn)
        .await
        .map_err(db_err)?;
    if owned.is_none() {
        return Err(LedgerError::PostNotFound(post_id));
    }

    let result = posts::Entity::update_many()
        .col_expr(posts::Column::Processed, Expr::value(true))
        .filter(posts::Column::Id.eq(post_id.0))
        .filter(posts::Column::UserId.eq(user_id.0))
        .filter(posts::Column::Processed.eq(false))
        .exec(txn)
        .await
        .map_err(db_err)?;

    if result.rows_affected == 0 {
        return Err(LedgerError::PostAlreadyProcessed(post_id));
    }
    Ok(())
}

/// Runs the writer steps on an open transaction.
///
/// The caller owns commit and rollback.
pub(crate) async fn write_entry<C: ConnectionTrait>(
    txn: &C,
    organization_id: OrganizationId,
    candidate: &CandidateEntry,
    source_post_id: Option<PostId>,
) -> Result<TransactionId, LedgerError> {
    let chart: HashMap<AccountId, AccountInfo> = find_for_organization(txn, organization_id)
        .await
        .map_err(db_err)?
        .iter()
        .map(|a| (AccountId(a.id), AccountInfo::from(a)))
        .collect();

    let plan = LedgerService::plan_posting(candidate, |id| chart.get(&id).copied())?;

    let header = transactions::ActiveModel {
        organization_id: Set(organization_id.0),
        description: Set(candidate.description.clone()),
        date: Set(candidate.date),
        post_id: Set(source_post_id.map(PostId::into_inner)),
        is_approved: Set(false),
        approved_by: Set(None),
        approved_at: Set(None),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(db_err)?;
    let transaction_id = TransactionId(header.id);

    insert_lines(txn, transaction_id, &plan).await?;
    apply_deltas(txn, organization_id, &plan).await?;

    Ok(transaction_id)
}

async fn insert_lines<C: ConnectionTrait>(
    txn: &C,
    transaction_id: TransactionId,
    plan: &PostingPlan,
) -> Result<(), LedgerError> {
    let rows = plan.lines.iter().map(|line| journal_lines::ActiveModel {
        transaction_id: Set(transaction_id.0),
        account_id: Set(line.account_id.0),
        amount: Set(line.amount),
        is_credit: Set(line.is_credit),
        ..Default::default()
    });

    // insert_many keeps input order, so line ids follow candidate order.
    journal_lines::Entity::insert_many(rows)
        .exec(txn)
        .await
        .map_err(db_err)?;
    Ok(())
}

/// Applies each delta as `balance = balance + delta`, ascending by account.
async fn apply_deltas<C: ConnectionTrait>(
    txn: &C,
    organization_id: OrganizationId,
    plan: &PostingPlan,
) -> Result<(), LedgerError> {
    for delta in &plan.deltas {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(delta.delta),
            )
            .filter(accounts::Column::Id.eq(delta.account_id.0))
            .filter(accounts::Column::OrganizationId.eq(organization_id.0))
            .exec(txn)
            .await
            .map_err(db_err)?;

        // The account vanished between lookup and update.
        if result.rows_affected != 1 {
            return Err(LedgerError::UnknownAccount(delta.account_id));
        }
        debug!(account_id = %delta.account_id, delta = %delta.delta, "Adjusted balance");
    }
    Ok(())
}

/// Loads lines and accounts for `headers`, keeping header order.
pub(crate) async fn attach_lines<C: ConnectionTrait>(
    conn: &C,
    headers: Vec<transactions::Model>,
) -> Result<Vec<TransactionWithLines>, DbErr> {
    let ids: Vec<i32> = headers.iter().map(|t| t.id).collect();
    let rows = journal_lines::Entity::find()
        .filter(journal_lines::Column::TransactionId.is_in(ids))
        .order_by_asc(journal_lines::Column::Id)
        .find_also_related(accounts::Entity)
        .all(conn)
        .await?;

    let mut by_transaction: HashMap<i32, Vec<LineWithAccount>> = HashMap::new();
    for (line, account) in rows {
        by_transaction
            .entry(line.transaction_id)
            .or_default()
            .push(LineWithAccount { line, account });
    }

    Ok(headers
        .into_iter()
        .map(|transaction| TransactionWithLines {
            lines: by_transaction.remove(&transaction.id).unwrap_or_default(),
            transaction,
        })
        .collect())
}

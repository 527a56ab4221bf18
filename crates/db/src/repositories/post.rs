//! Post repository: the feed and posts with their ledger entry.

use ringbook_core::ledger::{CandidateEntry, LedgerError};
use ringbook_shared::types::{
    OrganizationId, PageRequest, PageResponse, PostId, TransactionId, UserId,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use tracing::info;

use super::transaction::{TransactionWithLines, attach_lines, db_err, write_entry};
use crate::entities::{posts, profiles, transactions};

/// Post with its author's profile.
#[derive(Debug, Clone)]
pub struct PostWithProfile {
    /// The post.
    pub post: posts::Model,
    /// Author profile, if one exists.
    pub profile: Option<profiles::Model>,
}

/// Post with its author and linked ledger transaction.
#[derive(Debug, Clone)]
pub struct PostDetail {
    /// The post.
    pub post: posts::Model,
    /// Author profile, if one exists.
    pub profile: Option<profiles::Model>,
    /// Transaction created from the post, if any.
    pub transaction: Option<TransactionWithLines>,
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    /// Author.
    pub user_id: UserId,
    /// Post text.
    pub content: String,
    /// Attachment URLs; `None` when no files were submitted.
    pub file_urls: Option<Vec<String>>,
}

/// Post repository.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Creates a new post repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an unprocessed post.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_post(&self, input: &CreatePostInput) -> Result<posts::Model, DbErr> {
        insert_post(&self.db, input, false).await
    }

    /// Creates a processed post and posts `candidate` against it, in one
    /// database transaction.
    ///
    /// # Errors
    ///
    /// Same as [`super::TransactionRepository::post_entry`]; on any error
    /// neither the post nor the entry is written.
    pub async fn create_post_with_entry(
        &self,
        organization_id: OrganizationId,
        input: &CreatePostInput,
        candidate: &CandidateEntry,
    ) -> Result<(posts::Model, TransactionId), LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let post = insert_post(&txn, input, true).await.map_err(db_err)?;
        let transaction_id =
            write_entry(&txn, organization_id, candidate, Some(PostId(post.id))).await?;

        txn.commit().await.map_err(db_err)?;

        info!(
            post_id = %post.id,
            transaction_id = %transaction_id,
            user_id = %input.user_id,
            "Created post with journal entry"
        );
        Ok((post, transaction_id))
    }

    /// The feed, newest first, with author profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn feed(&self, page: &PageRequest) -> Result<PageResponse<PostWithProfile>, DbErr> {
        let paginator = posts::Entity::find()
            .find_also_related(profiles::Entity)
            .order_by_desc(posts::Column::PostedAt)
            .order_by_desc(posts::Column::Id)
            .paginate(&self.db, u64::from(page.per_page()));

        let total = paginator.num_items().await?;
        let data = paginator
            .fetch_page(page.page_index())
            .await?
            .into_iter()
            .map(|(post, profile)| PostWithProfile { post, profile })
            .collect();

        Ok(PageResponse::new(data, page, total))
    }

    /// A post with its author and linked transaction.
    ///
    /// The transaction is included only when it belongs to
    /// `organization_id`; a viewer without an organization sees none.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn find_with_transaction(
        &self,
        id: PostId,
        organization_id: Option<OrganizationId>,
    ) -> Result<Option<PostDetail>, DbErr> {
        let Some((post, profile)) = posts::Entity::find_by_id(id.0)
            .find_also_related(profiles::Entity)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let transaction = match organization_id {
            Some(organization_id) => {
                let headers = transactions::Entity::find()
                    .filter(transactions::Column::PostId.eq(post.id))
                    .filter(transactions::Column::OrganizationId.eq(organization_id.0))
                    .order_by_asc(transactions::Column::Id)
                    .limit(1)
                    .all(&self.db)
                    .await?;
                attach_lines(&self.db, headers).await?.pop()
            }
            None => None,
        };

        Ok(Some(PostDetail {
            post,
            profile,
            transaction,
        }))
    }
}

async fn insert_post<C: ConnectionTrait>(
    conn: &C,
    input: &CreatePostInput,
    processed: bool,
) -> Result<posts::Model, DbErr> {
    posts::ActiveModel {
        id: Set(PostId::new().into_inner()),
        user_id: Set(input.user_id.0),
        content: Set(input.content.clone()),
        posted_at: Set(chrono::Utc::now().into()),
        processed: Set(processed),
        file_urls: Set(input.file_urls.as_ref().map(|urls| json!(urls))),
    }
    .insert(conn)
    .await
}


//! Feed routes: posts, optionally created together with their entry.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use ringbook_core::ledger::CandidateEntry;
use ringbook_db::{
    PostRepository, ProfileRepository,
    entities::{posts, profiles},
    repositories::{CreatePostInput, PostWithProfile},
};
use ringbook_shared::types::{PageRequest, PageResponse, PostId};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{find_organization, organization_for};
use super::transactions::{TransactionResponse, require_postable};
use crate::{
    AppState,
    error::{ApiError, ApiResult, db_error},
    extractors::validate_content,
    middleware::AuthUser,
};

/// Creates the post routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(feed).post(create_post))
        .route("/posts/{post_id}", get(get_post))
}

/// Request body for creating a post.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    /// Post text.
    pub content: String,
    /// URLs of files already uploaded.
    pub file_urls: Option<Vec<String>>,
    /// Reviewed entry to post together with the post.
    pub entry: Option<CandidateEntry>,
}

/// Post author.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    /// User id.
    pub id: Uuid,
    /// Display name.
    pub name: Option<String>,
    /// Email.
    pub email: String,
    /// Avatar URL.
    pub image: Option<String>,
}

impl From<profiles::Model> for AuthorResponse {
    fn from(p: profiles::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            email: p.email,
            image: p.image,
        }
    }
}

/// A post in the feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    /// Post id.
    pub id: Uuid,
    /// Author id.
    pub user_id: Uuid,
    /// Post text.
    pub content: String,
    /// Posting time.
    pub posted_at: DateTime<FixedOffset>,
    /// Whether an entry was posted from it.
    pub processed: bool,
    /// Attachment URLs.
    pub file_urls: Vec<String>,
    /// Author profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorResponse>,
}

impl PostResponse {
    /// Builds the response from a post row and its optional author.
    pub fn new(post: posts::Model, profile: Option<profiles::Model>) -> Self {
        let file_urls = post
            .file_urls
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        Self {
            id: post.id,
            user_id: post.user_id,
            content: post.content,
            posted_at: post.posted_at,
            processed: post.processed,
            file_urls,
            author: profile.map(AuthorResponse::from),
        }
    }
}

/// A post with its ledger entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    /// The post.
    #[serde(flatten)]
    pub post: PostResponse,
    /// Entry created from the post.
    pub transaction: Option<TransactionResponse>,
}

/// Response after creating a post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPost {
    /// The post.
    pub post: PostResponse,
    /// Transaction posted with it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i32>,
}

/// Makes sure the caller has a profile row for posts to reference.
pub(crate) async fn ensure_profile(state: &AppState, auth: &AuthUser) -> ApiResult<()> {
    let repo = ProfileRepository::new((*state.db).clone());
    if repo
        .find_by_id(auth.user_id())
        .await
        .map_err(db_error)?
        .is_some()
    {
        return Ok(());
    }

    let email = auth
        .email()
        .ok_or_else(|| ApiError::not_found("Profile for the current user"))?;
    repo.upsert(auth.user_id(), email, None)
        .await
        .map_err(db_error)?;
    Ok(())
}

/// GET /posts
async fn feed(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<PostResponse>>> {
    let result = PostRepository::new((*state.db).clone())
        .feed(&page)
        .await
        .map_err(db_error)?;

    Ok(Json(PageResponse {
        data: result
            .data
            .into_iter()
            .map(|PostWithProfile { post, profile }| PostResponse::new(post, profile))
            .collect(),
        meta: result.meta,
    }))
}

/// POST /posts
async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<CreatedPost>)> {
    validate_content(&req.content)?;
    if let Some(entry) = &req.entry {
        require_postable(entry)?;
    }
    ensure_profile(&state, &auth).await?;

    let user_id = auth.user_id();
    let input = CreatePostInput {
        user_id,
        content: req.content.trim().to_string(),
        file_urls: req.file_urls.filter(|urls| !urls.is_empty()),
    };
    let repo = PostRepository::new((*state.db).clone());

    let (post, transaction_id) = match &req.entry {
        Some(entry) => {
            let organization_id = organization_for(&state, user_id).await?;
            let (post, id) = repo
                .create_post_with_entry(organization_id, &input, entry)
                .await?;
            (post, Some(id.0))
        }
        None => (repo.create_post(&input).await.map_err(db_error)?, None),
    };

    info!(post_id = %post.id, user_id = %user_id, with_entry = transaction_id.is_some(), "Created post");
    Ok((
        StatusCode::CREATED,
        Json(CreatedPost {
            post: PostResponse::new(post, None),
            transaction_id,
        }),
    ))
}

/// GET /posts/{post_id}
///
/// The linked transaction is shown only to members of its organization.
async fn get_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<PostDetailResponse>> {
    let organization_id = find_organization(&state, auth.user_id()).await?;
    let detail = PostRepository::new((*state.db).clone())
        .find_with_transaction(PostId::from_uuid(post_id), organization_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found(format!("Post {post_id}")))?;

    Ok(Json(PostDetailResponse {
        post: PostResponse::new(detail.post, detail.profile),
        transaction: detail.transaction.map(TransactionResponse::from),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(file_urls: Option<serde_json::Value>) -> posts::Model {
        posts::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            content: "Lunch 60".into(),
            posted_at: chrono::Utc::now().fixed_offset(),
            processed: false,
            file_urls,
        }
    }

    #[test]
    fn test_post_response_file_urls() {
        let with = PostResponse::new(post(Some(json!(["https://f/a.png"]))), None);
        assert_eq!(with.file_urls, vec!["https://f/a.png".to_string()]);

        let without = PostResponse::new(post(None), None);
        assert!(without.file_urls.is_empty());

        let body = serde_json::to_value(&without).unwrap();
        assert!(body.get("author").is_none());
        assert_eq!(body["fileUrls"], json!([]));
    }

    #[test]
    fn test_create_request_entry_is_optional() {
        let req: CreatePostRequest =
            serde_json::from_value(json!({"content": "Paid rent"})).unwrap();
        assert!(req.entry.is_none());
        assert!(req.file_urls.is_none());
    }
}

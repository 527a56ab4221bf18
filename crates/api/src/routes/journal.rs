//! Journal routes: generating candidate entries and reviewing them.
//!
//! A generated candidate is kept as the caller's draft until it is posted.
//! When a user fires several generations, only the one started last may
//! replace the draft.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use ringbook_core::attachment::PreparedAttachments;
use ringbook_core::ledger::{
    CandidateEdit, CandidateEntry, CandidateLine, ChartAccount, Equation, compute_equation,
};
use ringbook_db::{AccountRepository, PostRepository, repositories::CreatePostInput};
use ringbook_shared::types::OrganizationId;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::organization_for;
use super::posts::{PostResponse, ensure_profile};
use super::transactions::require_postable;
use super::uploads::store_all;
use crate::{
    AppState,
    error::{ApiError, ApiResult, db_error},
    extractors::EntryForm,
    middleware::AuthUser,
};

/// Creates the journal routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal", post(generate_and_post))
        .route("/journal/generate", post(generate))
        .route("/journal/draft", get(get_draft))
        .route("/journal/draft/edits", post(edit_draft))
        .route("/journal/equation", post(equation))
}

/// A candidate with its equation summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    /// The candidate entry.
    pub entry: CandidateEntry,
    /// Accounting equation over its lines.
    pub equation: Equation,
    /// Whether this candidate is the caller's current draft.
    pub current: bool,
}

impl DraftResponse {
    fn new(entry: CandidateEntry, current: bool) -> Self {
        Self {
            equation: entry.equation(),
            entry,
            current,
        }
    }
}

/// Request body for editing the draft.
#[derive(Debug, Deserialize)]
pub struct EditDraftRequest {
    /// Edits applied in order; all or nothing.
    pub edits: Vec<CandidateEdit>,
}

/// Request body for the equation calculator.
#[derive(Debug, Deserialize)]
pub struct EquationRequest {
    /// Candidate lines.
    pub entries: Vec<CandidateLine>,
}

/// Response after generating and posting.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedEntryResponse {
    /// The new post.
    pub post: PostResponse,
    /// The posted transaction.
    pub transaction_id: i32,
    /// The entry as posted.
    pub entry: CandidateEntry,
}

async fn chart_for(state: &AppState, organization_id: OrganizationId) -> ApiResult<Vec<ChartAccount>> {
    AccountRepository::new((*state.db).clone())
        .chart(organization_id)
        .await
        .map_err(db_error)
}

async fn run_generator(
    state: &AppState,
    chart: &[ChartAccount],
    form: &EntryForm,
) -> ApiResult<CandidateEntry> {
    let attachments = if form.files.is_empty() {
        PreparedAttachments::default()
    } else {
        state.attachments.prepare(form.files.clone()).await?
    };

    Ok(state
        .generator
        .generate_entry(chart, &form.text, &attachments)
        .await?)
}

/// POST /journal/generate
async fn generate(
    State(state): State<AppState>,
    auth: AuthUser,
    form: EntryForm,
) -> ApiResult<Json<DraftResponse>> {
    let user_id = auth.user_id();
    let organization_id = organization_for(&state, user_id).await?;
    let chart = chart_for(&state, organization_id).await?;

    let ticket = state.drafts.begin(user_id);
    let entry = run_generator(&state, &chart, &form).await?;
    let current = state.drafts.complete(ticket, entry.clone());

    info!(
        user_id = %user_id,
        lines = entry.entries.len(),
        attachments = form.files.len(),
        current,
        "Generated candidate entry"
    );
    Ok(Json(DraftResponse::new(entry, current)))
}

/// GET /journal/draft
async fn get_draft(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<DraftResponse>> {
    state
        .drafts
        .current(auth.user_id())
        .map(|entry| Json(DraftResponse::new(entry, true)))
        .ok_or_else(|| ApiError::not_found("No draft entry"))
}

/// POST /journal/draft/edits
async fn edit_draft(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<EditDraftRequest>,
) -> ApiResult<Json<DraftResponse>> {
    let user_id = auth.user_id();
    let organization_id = organization_for(&state, user_id).await?;
    let chart = chart_for(&state, organization_id).await?;

    let entry = state
        .drafts
        .edit(user_id, |entry| {
            req.edits.iter().try_for_each(|edit| entry.apply(edit, &chart))
        })
        .ok_or_else(|| ApiError::not_found("No draft entry"))??;

    Ok(Json(DraftResponse::new(entry, true)))
}

/// POST /journal/equation
async fn equation(_auth: AuthUser, Json(req): Json<EquationRequest>) -> Json<Equation> {
    Json(compute_equation(&req.entries))
}

/// POST /journal
///
/// Generates an entry for the text, stores any files, and writes the post
/// and the entry in one database transaction.
async fn generate_and_post(
    State(state): State<AppState>,
    auth: AuthUser,
    form: EntryForm,
) -> ApiResult<(StatusCode, Json<PostedEntryResponse>)> {
    let user_id = auth.user_id();
    let organization_id = organization_for(&state, user_id).await?;
    let chart = chart_for(&state, organization_id).await?;

    let entry = run_generator(&state, &chart, &form).await?;
    require_postable(&entry)?;
    ensure_profile(&state, &auth).await?;

    let stored = match (&state.storage, form.files.is_empty()) {
        (_, true) => Vec::new(),
        (Some(storage), false) => store_all(storage, &form.files).await?,
        (None, false) => {
            warn!(user_id = %user_id, "Object storage not configured; post saved without file URLs");
            Vec::new()
        }
    };

    let input = CreatePostInput {
        user_id,
        content: form.text.clone(),
        file_urls: (!stored.is_empty()).then(|| stored.iter().map(|o| o.url.clone()).collect()),
    };

    let result = PostRepository::new((*state.db).clone())
        .create_post_with_entry(organization_id, &input, &entry)
        .await;

    let (post, transaction_id) = match result {
        Ok(created) => created,
        Err(e) => {
            if let Some(storage) = &state.storage {
                storage.discard(&stored).await;
            }
            return Err(e.into());
        }
    };

    info!(
        post_id = %post.id,
        transaction_id = %transaction_id,
        user_id = %user_id,
        "Posted generated entry"
    );
    Ok((
        StatusCode::CREATED,
        Json(PostedEntryResponse {
            post: PostResponse::new(post, None),
            transaction_id: transaction_id.0,
            entry,
        }),
    ))
}

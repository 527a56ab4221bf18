//! Attachment upload routes.

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use ringbook_core::attachment::Upload;
use ringbook_core::storage::{StorageError, StorageService, StoredObject};
use ringbook_shared::AppError;
use serde::Serialize;
use tracing::info;

use crate::{AppState, error::ApiResult, extractors::FileForm, middleware::AuthUser};

/// Folder that holds post attachments.
pub const POST_FILES_FOLDER: &str = "post-files";

/// Creates the upload routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/uploads", post(upload_files))
}

/// Response listing stored files.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Stored objects in upload order.
    pub files: Vec<StoredObject>,
}

/// The configured storage service, or `SERVICE_UNAVAILABLE`.
pub(crate) fn storage(state: &AppState) -> Result<&Arc<StorageService>, AppError> {
    state
        .storage
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Object storage is not configured".into()))
}

/// Stores every file, or none: a failure discards what was already written.
pub(crate) async fn store_all(
    storage: &StorageService,
    files: &[Upload],
) -> Result<Vec<StoredObject>, StorageError> {
    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        match storage
            .upload(
                POST_FILES_FOLDER,
                &file.filename,
                &file.content_type,
                file.data.clone(),
            )
            .await
        {
            Ok(object) => stored.push(object),
            Err(e) => {
                storage.discard(&stored).await;
                return Err(e);
            }
        }
    }
    Ok(stored)
}

/// POST /uploads
async fn upload_files(
    State(state): State<AppState>,
    auth: AuthUser,
    form: FileForm,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let storage = storage(&state)?;
    let files = store_all(storage, &form.files).await?;

    info!(user_id = %auth.user_id(), count = files.len(), "Stored uploads");
    Ok((StatusCode::CREATED, Json(UploadResponse { files })))
}

//! Error responses.
//!
//! Every handler error becomes `{"error": CODE, "message": ...}` with the
//! status of the underlying [`AppError`]. Server-side failures are logged
//! and their details withheld from the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ringbook_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Handler error.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    /// Request validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }

    /// Missing resource.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self(AppError::NotFound(message.into()))
    }
}

/// Maps a database failure outside the ledger writer.
pub fn db_error(err: DbErr) -> ApiError {
    ApiError(AppError::Database(err.to_string()))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Database and internal failures are logged, not returned.
        let message = match self.0 {
            AppError::Database(_) | AppError::Internal(_) => {
                error!(error = %self.0, "Request failed");
                "An error occurred".to_string()
            }
            _ => self.0.to_string(),
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use ringbook_core::generator::GenerationError;
    use ringbook_core::ledger::LedgerError;
    use ringbook_shared::types::AccountId;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ledger_validation_maps_to_400() {
        let response = ApiError::from(LedgerError::UnknownAccount(AccountId(7))).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "ACCOUNT_NOT_FOUND");
        assert_eq!(body["message"], "Account not found: 7");
    }

    #[tokio::test]
    async fn test_generation_timeout_maps_to_504() {
        let err = GenerationError::Timeout(std::time::Duration::from_secs(60));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let body = body_json(response).await;
        assert_eq!(body["error"], "GENERATION_TIMEOUT");
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let response = db_error(DbErr::Custom("password=hunter2".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "An error occurred");
    }
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::StoreError;
use services::services::insight::InsightError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Insight(#[from] InsightError),
    #[error("{0}")]
    Validation(String),
    #[error("insight service unavailable: ANTHROPIC_API_KEY not configured")]
    InsightUnavailable,
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Store(StoreError::OrderNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::NotInitialized) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Insight(InsightError::Store(StoreError::NotInitialized)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Insight(_) => StatusCode::BAD_GATEWAY,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InsightUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("api error: {self}");
        } else {
            tracing::debug!("api error: {self}");
        }

        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

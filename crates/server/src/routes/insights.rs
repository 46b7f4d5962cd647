//! AI insight route.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use services::services::insight::InsightReport;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// GET /api/insights
pub async fn get_insights(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<InsightReport>>, ApiError> {
    let service = state.insight.as_ref().ok_or(ApiError::InsightUnavailable)?;
    let report = service.generate().await?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/insights", get(get_insights))
}

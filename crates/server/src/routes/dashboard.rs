//! Trigger seam for the dashboard list adapter.
//!
//! The presentation layer reports its events here (focus, refresh,
//! search text, status filter) and polls the snapshot; the adapter
//! decides which store query to run.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::production_order::OrderStatus;
use serde::Deserialize;
use services::services::order_list::{ListState, ListTrigger};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// GET /api/dashboard
pub async fn snapshot(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<ListState>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(state.list.snapshot().await)))
}

/// POST /api/dashboard/refresh
pub async fn refresh(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    send(&state, ListTrigger::Refresh)?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/dashboard/focus
pub async fn focus(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    send(&state, ListTrigger::Focus)?;
    Ok(ResponseJson(ApiResponse::success(())))
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub q: String,
}

/// PUT /api/dashboard/search
pub async fn search(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<SearchBody>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    send(&state, ListTrigger::SearchChanged(body.q))?;
    Ok(ResponseJson(ApiResponse::success(())))
}

#[derive(Debug, Deserialize)]
pub struct FilterBody {
    pub status: Option<OrderStatus>,
}

/// PUT /api/dashboard/filter
pub async fn filter(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<FilterBody>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    send(&state, ListTrigger::FilterChanged(body.status))?;
    Ok(ResponseJson(ApiResponse::success(())))
}

fn send(state: &AppState, trigger: ListTrigger) -> Result<(), ApiError> {
    state
        .list_triggers
        .send(trigger)
        .map_err(|_| ApiError::Internal("dashboard adapter is not running".to_string()))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/dashboard",
        Router::new()
            .route("/", get(snapshot))
            .route("/refresh", post(refresh))
            .route("/focus", post(focus))
            .route("/search", put(search))
            .route("/filter", put(filter)),
    )
}

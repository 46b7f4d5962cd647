//! CRUD and status-transition routes for production orders.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::{
    StoreError,
    models::production_order::{CreateProductionOrder, OrderStatus, ProductionOrder},
};
use serde::Deserialize;
use services::services::{order_detail::OrderDetailModel, order_list::ListTrigger};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    /// Substring match against finished goods or status.
    pub q: Option<String>,
    /// Exact status filter; ignored when `q` is present.
    pub status: Option<OrderStatus>,
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ProductionOrder>>>, ApiError> {
    let orders = match (query.q.as_deref(), query.status) {
        (Some(q), _) if !q.trim().is_empty() => state.store.search(q).await?,
        (_, Some(status)) => state.store.filter_by_status(status).await?,
        _ => state.store.get_all().await?,
    };
    Ok(ResponseJson(ApiResponse::success(orders)))
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    axum::Json(mut payload): axum::Json<CreateProductionOrder>,
) -> Result<ResponseJson<ApiResponse<ProductionOrder>>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;
    // New orders always start pending, whatever the caller sent.
    payload.status = Some(OrderStatus::Pending);

    let id = state.store.create(&payload).await?;
    let order = state
        .store
        .get_by_id(id)
        .await?
        .ok_or(StoreError::OrderNotFound(id))?;

    let _ = state.list_triggers.send(ListTrigger::Mutated);
    Ok(ResponseJson(ApiResponse::success(order)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<ProductionOrder>>, ApiError> {
    let order = state
        .store
        .get_by_id(id)
        .await?
        .ok_or(StoreError::OrderNotFound(id))?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

/// POST /api/orders/{id}/advance
///
/// Single-step lifecycle transition. Completed orders pass through
/// unchanged; there is no jump or backward move.
pub async fn advance_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<ProductionOrder>>, ApiError> {
    let model = OrderDetailModel::new(Arc::clone(&state.store));
    model.load(id).await;

    let loaded = model.snapshot().await;
    if let Some(message) = loaded.error {
        return Err(ApiError::Internal(message));
    }
    let Some(order) = loaded.order else {
        return Err(StoreError::OrderNotFound(id).into());
    };
    if order.status.is_terminal() {
        return Ok(ResponseJson(ApiResponse::success(order)));
    }

    model.advance().await;
    let after = model.snapshot().await;
    if let Some(alert) = after.alert {
        return Err(ApiError::Internal(alert));
    }
    let order = after.order.ok_or(StoreError::OrderNotFound(id))?;

    let _ = state.list_triggers.send(ListTrigger::Mutated);
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/orders",
        Router::new()
            .route("/", get(list_orders).post(create_order))
            .route("/{id}", get(get_order))
            .route("/{id}/advance", post(advance_order)),
    )
}

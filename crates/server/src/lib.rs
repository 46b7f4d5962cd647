pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use db::OrderStore;
use services::services::{
    insight::InsightService,
    order_list::{ListTrigger, OrderListModel},
};
use tokio::sync::mpsc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<OrderStore>,
    pub list: Arc<OrderListModel>,
    pub list_triggers: mpsc::UnboundedSender<ListTrigger>,
    pub insight: Option<Arc<InsightService>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            routes::orders::router()
                .merge(routes::dashboard::router())
                .merge(routes::insights::router()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

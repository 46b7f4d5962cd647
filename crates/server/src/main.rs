use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use db::OrderStore;
use server::{AppState, router};
use services::services::{
    completion_api::CompletionClient, insight::InsightService, order_list::OrderListModel,
};
use tracing::{info, warn};

const DEFAULT_DB_PATH: &str = "production_orders.db";
const DEFAULT_PORT: u16 = 3001;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    utils::logging::init_tracing("info,sqlx=warn");

    let db_path =
        std::env::var("PRODTRACK_DB").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let port = std::env::var("PRODTRACK_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let store = Arc::new(OrderStore::new(&db_path));
    store
        .init()
        .await
        .context("failed to initialize order store")?;

    let (list, list_triggers, _list_loop) = OrderListModel::spawn(Arc::clone(&store));

    let insight = match CompletionClient::from_env() {
        Ok(client) => Some(Arc::new(InsightService::new(Arc::clone(&store), client))),
        Err(e) => {
            warn!("AI insight disabled: {e}");
            None
        }
    };

    let app = router(AppState {
        store,
        list,
        list_triggers,
        insight,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, db = %db_path, "prodtrack server listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

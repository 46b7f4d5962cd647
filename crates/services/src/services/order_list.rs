//! Dashboard list adapter.
//!
//! Holds the last successfully loaded order collection and re-issues
//! the appropriate store query when an external trigger fires: screen
//! focus, an explicit refresh, a debounced search-text change, a
//! status-filter change, or a completed mutation.

use std::{sync::Arc, time::Duration};

use db::{
    OrderStore,
    models::production_order::{OrderStatus, ProductionOrder},
};
use serde::Serialize;
use tokio::{
    sync::{RwLock, mpsc},
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, error};
use ts_rs::TS;

/// Quiescence window before a search-text change hits the store.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub enum ListTrigger {
    /// The dashboard regained focus.
    Focus,
    /// Explicit pull-to-refresh.
    Refresh,
    /// Search text changed; applied after the debounce window.
    SearchChanged(String),
    /// Status filter changed; `None` clears the filter.
    FilterChanged(Option<OrderStatus>),
    /// A create or status update went through somewhere else.
    Mutated,
}

#[derive(Debug, Clone, Default, Serialize, TS)]
pub struct ListState {
    pub orders: Vec<ProductionOrder>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct ListQuery {
    search: String,
    status: Option<OrderStatus>,
}

pub struct OrderListModel {
    store: Arc<OrderStore>,
    state: RwLock<ListState>,
    query: RwLock<ListQuery>,
}

impl OrderListModel {
    /// Spawn the adapter loop. Returns the model, the trigger sender,
    /// and the loop handle. The loop performs an initial load and then
    /// exits when every sender is dropped.
    pub fn spawn(
        store: Arc<OrderStore>,
    ) -> (
        Arc<Self>,
        mpsc::UnboundedSender<ListTrigger>,
        JoinHandle<()>,
    ) {
        let model = Arc::new(Self {
            store,
            state: RwLock::new(ListState {
                loading: true,
                ..ListState::default()
            }),
            query: RwLock::new(ListQuery::default()),
        });
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(Arc::clone(&model).run(rx));
        (model, tx, handle)
    }

    pub async fn snapshot(&self) -> ListState {
        self.state.read().await.clone()
    }

    async fn run(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<ListTrigger>) {
        self.reload().await;

        let mut pending_search: Option<(String, Instant)> = None;
        loop {
            let debounce = async {
                match pending_search.as_ref() {
                    Some((_, deadline)) => sleep_until(*deadline).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                trigger = rx.recv() => {
                    let Some(trigger) = trigger else { break };
                    match trigger {
                        ListTrigger::SearchChanged(text) => {
                            pending_search = Some((text, Instant::now() + SEARCH_DEBOUNCE));
                        }
                        ListTrigger::FilterChanged(status) => {
                            self.query.write().await.status = status;
                            self.reload().await;
                        }
                        ListTrigger::Focus | ListTrigger::Refresh | ListTrigger::Mutated => {
                            self.reload().await;
                        }
                    }
                }
                _ = debounce => {
                    if let Some((text, _)) = pending_search.take() {
                        self.query.write().await.search = text;
                        self.reload().await;
                    }
                }
            }
        }
        debug!("order list trigger channel closed, adapter loop exiting");
    }

    /// Re-run whichever query is currently active. Failures are
    /// captured as a displayable message and never retried; the last
    /// successful result stays on screen.
    async fn reload(&self) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let query = self.query.read().await.clone();
        let result = match self.store.init().await {
            Ok(()) => {
                if !query.search.trim().is_empty() {
                    self.store.search(&query.search).await
                } else if let Some(status) = query.status {
                    self.store.filter_by_status(status).await
                } else {
                    // Empty search text falls back to the full list.
                    self.store.get_all().await
                }
            }
            Err(e) => Err(e),
        };

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(orders) => state.orders = orders,
            Err(e) => {
                error!("failed to load orders: {e}");
                state.error = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_model() -> (
        Arc<OrderListModel>,
        mpsc::UnboundedSender<ListTrigger>,
        JoinHandle<()>,
    ) {
        let store = Arc::new(OrderStore::in_memory());
        OrderListModel::spawn(store)
    }

    async fn settle() {
        // Yields to the adapter loop and waits out the debounce window
        // plus query time.
        tokio::time::sleep(SEARCH_DEBOUNCE * 2 + Duration::from_millis(200)).await;
    }

    #[tokio::test]
    async fn initial_load_fills_the_list() {
        let (model, _tx, _handle) = spawn_model();
        settle().await;

        let state = model.snapshot().await;
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(state.orders.len(), 8);
        assert_eq!(state.orders[0].finished_goods, "Mixed Berry Muffins");
    }

    #[tokio::test]
    async fn search_is_debounced_and_applied() {
        let (model, tx, _handle) = spawn_model();
        settle().await;

        // Rapid typing: only the final text should reach the store.
        tx.send(ListTrigger::SearchChanged("m".to_string())).unwrap();
        tx.send(ListTrigger::SearchChanged("mu".to_string())).unwrap();
        tx.send(ListTrigger::SearchChanged("muffin".to_string()))
            .unwrap();
        settle().await;

        let state = model.snapshot().await;
        assert_eq!(state.orders.len(), 6);
        assert!(
            state
                .orders
                .iter()
                .all(|o| o.finished_goods.contains("Muffins"))
        );
    }

    #[tokio::test]
    async fn empty_search_falls_back_to_full_list() {
        let (model, tx, _handle) = spawn_model();
        settle().await;

        tx.send(ListTrigger::SearchChanged("muffin".to_string()))
            .unwrap();
        settle().await;
        assert_eq!(model.snapshot().await.orders.len(), 6);

        tx.send(ListTrigger::SearchChanged(String::new())).unwrap();
        settle().await;
        assert_eq!(model.snapshot().await.orders.len(), 8);
    }

    #[tokio::test]
    async fn filter_trigger_narrows_the_list() {
        let (model, tx, _handle) = spawn_model();
        settle().await;

        tx.send(ListTrigger::FilterChanged(Some(OrderStatus::Completed)))
            .unwrap();
        settle().await;
        let state = model.snapshot().await;
        assert_eq!(state.orders.len(), 6);
        assert!(state.orders.iter().all(|o| o.status == OrderStatus::Completed));

        tx.send(ListTrigger::FilterChanged(None)).unwrap();
        settle().await;
        assert_eq!(model.snapshot().await.orders.len(), 8);
    }

    #[tokio::test]
    async fn mutation_trigger_refreshes_the_list() {
        let store = Arc::new(OrderStore::in_memory());
        let (model, tx, _handle) = OrderListModel::spawn(Arc::clone(&store));
        settle().await;
        assert_eq!(model.snapshot().await.orders.len(), 8);

        let id = store
            .create(&db::models::production_order::CreateProductionOrder {
                finished_goods: "Test Cake".to_string(),
                produced_quantity: 1,
                raw_materials: "Flour".to_string(),
                due_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                storage_location: "Warehouse X".to_string(),
                status: None,
            })
            .await
            .unwrap();

        tx.send(ListTrigger::Mutated).unwrap();
        settle().await;

        let state = model.snapshot().await;
        assert_eq!(state.orders.len(), 9);
        assert_eq!(state.orders[0].id, id);
    }
}

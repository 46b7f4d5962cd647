//! Single-order adapter backing the detail screen.
//!
//! Loads one order, exposes the single-step status advance, and keeps
//! the displayed record consistent with the store after a mutation.

use std::sync::Arc;

use db::{
    OrderStore,
    models::production_order::ProductionOrder,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info};
use ts_rs::TS;

#[derive(Debug, Clone, Default, Serialize, TS)]
pub struct DetailState {
    pub order: Option<ProductionOrder>,
    pub loading: bool,
    pub error: Option<String>,
    /// Set when a status update fails; the detail screen surfaces this
    /// as a blocking alert on top of the inline error.
    pub alert: Option<String>,
}

pub struct OrderDetailModel {
    store: Arc<OrderStore>,
    state: RwLock<DetailState>,
}

impl OrderDetailModel {
    pub fn new(store: Arc<OrderStore>) -> Self {
        Self {
            store,
            state: RwLock::new(DetailState {
                loading: true,
                ..DetailState::default()
            }),
        }
    }

    pub async fn snapshot(&self) -> DetailState {
        self.state.read().await.clone()
    }

    /// Fetch the order. A missing id is not an error here; the screen
    /// renders its own not-found state from `order == None`.
    pub async fn load(&self, id: i64) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = match self.store.init().await {
            Ok(()) => self.store.get_by_id(id).await,
            Err(e) => Err(e),
        };

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(order) => state.order = order,
            Err(e) => {
                error!(id, "failed to load order: {e}");
                state.error = Some(e.to_string());
            }
        }
    }

    /// Advance the loaded order one step along the lifecycle and
    /// reload it. Guarded no-op when the order is already completed
    /// (the action control is disabled); the transition function
    /// itself stays total.
    pub async fn advance(&self) {
        let current = self.state.read().await.order.clone();
        let Some(order) = current else {
            self.state.write().await.alert = Some("no order loaded".to_string());
            return;
        };
        if order.status.is_terminal() {
            return;
        }

        let next = order.status.next();
        info!(id = order.id, from = %order.status, to = %next, "advancing order status");
        self.state.write().await.loading = true;

        match self.store.update_status(order.id, next).await {
            Ok(()) => self.load(order.id).await,
            Err(e) => {
                error!(id = order.id, "failed to update status: {e}");
                let mut state = self.state.write().await;
                state.loading = false;
                state.error = Some(e.to_string());
                state.alert = Some(format!("Failed to update status: {e}"));
            }
        }
    }
}

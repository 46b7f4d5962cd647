//! Owned database session for production orders.
//!
//! The store is constructed once by the process entry point and
//! injected into every consumer; nothing else touches the persisted
//! table. Lifecycle is open -> ready -> closed, and `init` can be
//! retried after a failed open.

use std::path::Path;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::production_order::{CreateProductionOrder, OrderStatus, ProductionOrder};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open order database: {0}")]
    Init(#[source] sqlx::Error),
    #[error("order store is not initialized")]
    NotInitialized,
    #[error("order {0} not found")]
    OrderNotFound(i64),
    #[error("no rows updated for order {0}")]
    UpdateFailed(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

const CREATE_PRODUCTION_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS production_orders (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    finished_goods    TEXT NOT NULL,
    produced_quantity INTEGER NOT NULL,
    raw_materials     TEXT NOT NULL,
    due_date          TEXT NOT NULL,
    storage_location  TEXT NOT NULL,
    status            TEXT CHECK(status IN ('pending', 'in-progress', 'completed')) DEFAULT 'pending'
)"#;

/// Sample records inserted on first run so the dashboard is not empty.
const SAMPLE_ORDERS: [(&str, i64, &str, &str, &str, &str); 8] = [
    (
        "Chocolate Chip Cookies",
        10,
        "Flour, Sugar, Chocolate Chips, Butter, Eggs",
        "2024-10-12",
        "Warehouse B",
        "pending",
    ),
    (
        "Vanilla Cupcakes",
        24,
        "Flour, Sugar, Vanilla Extract, Butter, Eggs",
        "2024-10-15",
        "Warehouse A",
        "in-progress",
    ),
    (
        "Blueberry Muffins",
        12,
        "Flour, Sugar, Blueberries, Butter, Eggs",
        "2024-10-08",
        "Warehouse C",
        "completed",
    ),
    (
        "Strawberry Muffins",
        12,
        "Flour, Sugar, Blueberries, Butter, Eggs",
        "2024-10-08",
        "Warehouse C",
        "completed",
    ),
    (
        "Grape Muffins",
        12,
        "Flour, Sugar, Blueberries, Butter, Eggs",
        "2024-10-08",
        "Warehouse C",
        "completed",
    ),
    (
        "Apple Muffins",
        12,
        "Flour, Sugar, Blueberries, Butter, Eggs",
        "2024-10-08",
        "Warehouse C",
        "completed",
    ),
    (
        "Strawberry Muffins",
        12,
        "Flour, Sugar, Strawberries, Butter, Eggs",
        "2024-10-08",
        "Warehouse C",
        "completed",
    ),
    (
        "Mixed Berry Muffins",
        12,
        "Flour, Sugar, Blueberries, Butter, Eggs",
        "2024-10-08",
        "Warehouse C",
        "completed",
    ),
];

pub struct OrderStore {
    options: SqliteConnectOptions,
    pool: RwLock<Option<SqlitePool>>,
}

impl OrderStore {
    /// Store backed by a database file, created on first `init`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            options: SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true),
            pool: RwLock::new(None),
        }
    }

    /// Independent in-memory store, used by tests.
    pub fn in_memory() -> Self {
        Self {
            options: SqliteConnectOptions::new().in_memory(true),
            pool: RwLock::new(None),
        }
    }

    /// Open the backing database, create the table if absent, and seed
    /// the sample records into an empty table. Idempotent: a second
    /// call on a ready store returns immediately.
    pub async fn init(&self) -> Result<(), StoreError> {
        let mut guard = self.pool.write().await;
        if guard.is_some() {
            debug!("order store already initialized");
            return Ok(());
        }

        info!("initializing order store");
        // The store is a single logical session; all access is
        // serialized through one connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(self.options.clone())
            .await
            .map_err(StoreError::Init)?;

        if let Err(e) = Self::prepare(&pool).await {
            // Leave the handle unset so a later init can retry.
            pool.close().await;
            return Err(StoreError::Init(e));
        }

        *guard = Some(pool);
        info!("order store initialized");
        Ok(())
    }

    async fn prepare(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_PRODUCTION_ORDERS_TABLE)
            .execute(pool)
            .await?;

        if ProductionOrder::count(pool).await? == 0 {
            for (finished_goods, quantity, raw_materials, due_date, location, status) in
                SAMPLE_ORDERS
            {
                sqlx::query(
                    "INSERT INTO production_orders
                        (finished_goods, produced_quantity, raw_materials, due_date, storage_location, status)
                     VALUES ($1, $2, $3, $4, $5, $6)",
                )
                .bind(finished_goods)
                .bind(quantity)
                .bind(raw_materials)
                .bind(due_date)
                .bind(location)
                .bind(status)
                .execute(pool)
                .await?;
            }
            info!(rows = SAMPLE_ORDERS.len(), "seeded sample production orders");
        }

        Ok(())
    }

    /// Close the session; the store returns to the uninitialized state.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.write().await.take() {
            pool.close().await;
            info!("order store closed");
        }
    }

    async fn pool(&self) -> Result<SqlitePool, StoreError> {
        self.pool
            .read()
            .await
            .clone()
            .ok_or(StoreError::NotInitialized)
    }

    /// All orders, most recently created first.
    pub async fn get_all(&self) -> Result<Vec<ProductionOrder>, StoreError> {
        let pool = self.pool().await?;
        let orders = ProductionOrder::find_all(&pool).await?;
        debug!(count = orders.len(), "loaded production orders");
        Ok(orders)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<ProductionOrder>, StoreError> {
        let pool = self.pool().await?;
        Ok(ProductionOrder::find_by_id(&pool, id).await?)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<ProductionOrder>, StoreError> {
        let pool = self.pool().await?;
        let orders = ProductionOrder::search(&pool, query).await?;
        debug!(query, count = orders.len(), "searched production orders");
        Ok(orders)
    }

    pub async fn filter_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<ProductionOrder>, StoreError> {
        let pool = self.pool().await?;
        Ok(ProductionOrder::filter_by_status(&pool, status).await?)
    }

    /// Insert a new order and return its assigned id. The payload's
    /// status is honored when present; callers that want the creation
    /// default simply leave it unset.
    pub async fn create(&self, data: &CreateProductionOrder) -> Result<i64, StoreError> {
        let pool = self.pool().await?;
        let id = ProductionOrder::create(&pool, data).await?;
        info!(id, finished_goods = %data.finished_goods, "created production order");
        Ok(id)
    }

    /// Set the status of an existing order. Self-healing: initializes
    /// the store first if needed, so the detail screen can mutate
    /// without caring who opened the session.
    pub async fn update_status(&self, id: i64, status: OrderStatus) -> Result<(), StoreError> {
        if self.pool.read().await.is_none() {
            debug!("order store not initialized, initializing before status update");
            self.init().await?;
        }
        let pool = self.pool().await?;

        if ProductionOrder::find_by_id(&pool, id).await?.is_none() {
            return Err(StoreError::OrderNotFound(id));
        }

        let affected = ProductionOrder::update_status(&pool, id, status).await?;
        // The row could have vanished between the existence check and
        // the update; zero affected rows detects that.
        if affected == 0 {
            return Err(StoreError::UpdateFailed(id));
        }

        info!(id, %status, "updated production order status");
        Ok(())
    }
}

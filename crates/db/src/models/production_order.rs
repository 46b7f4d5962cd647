use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display,
    Default,
)]
#[sqlx(type_name = "order_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Completed,
    ];

    /// Single-step forward transition. Completed is terminal; advancing
    /// it again is a no-op rather than an error.
    pub fn next(self) -> Self {
        match self {
            OrderStatus::Pending => OrderStatus::InProgress,
            OrderStatus::InProgress => OrderStatus::Completed,
            OrderStatus::Completed => OrderStatus::Completed,
        }
    }

    /// Label for the action control that advances an order out of this
    /// status. The terminal label is used to disable the control.
    pub fn action_label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Start Progress",
            OrderStatus::InProgress => "Mark Complete",
            OrderStatus::Completed => "Completed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct ProductionOrder {
    pub id: i64,
    pub finished_goods: String,
    pub produced_quantity: i64,
    pub raw_materials: String,
    pub due_date: NaiveDate,
    pub storage_location: String,
    pub status: OrderStatus,
}

/// Payload for inserting a new order. `status` stays optional so the
/// store remains permissive; the creation flow in the presentation
/// layer always forces `Pending`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProductionOrder {
    pub finished_goods: String,
    pub produced_quantity: i64,
    pub raw_materials: String,
    pub due_date: NaiveDate,
    pub storage_location: String,
    pub status: Option<OrderStatus>,
}

impl CreateProductionOrder {
    pub fn validate(&self) -> Result<(), String> {
        if self.finished_goods.trim().is_empty() {
            return Err("finished_goods must not be empty".to_string());
        }
        if self.produced_quantity < 1 {
            return Err("produced_quantity must be at least 1".to_string());
        }
        if self.raw_materials.trim().is_empty() {
            return Err("raw_materials must not be empty".to_string());
        }
        if self.storage_location.trim().is_empty() {
            return Err("storage_location must not be empty".to_string());
        }
        Ok(())
    }
}

impl ProductionOrder {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, finished_goods, produced_quantity, raw_materials, due_date, storage_location, status
               FROM production_orders
               ORDER BY id DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, finished_goods, produced_quantity, raw_materials, due_date, storage_location, status
               FROM production_orders
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Case-insensitive substring match against the produced item name
    /// or the status text. An empty query matches every row.
    pub async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{query}%");
        sqlx::query_as::<_, Self>(
            r#"SELECT id, finished_goods, produced_quantity, raw_materials, due_date, storage_location, status
               FROM production_orders
               WHERE finished_goods LIKE $1 OR status LIKE $1
               ORDER BY id DESC"#,
        )
        .bind(&pattern)
        .fetch_all(pool)
        .await
    }

    pub async fn filter_by_status(
        pool: &SqlitePool,
        status: OrderStatus,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, finished_goods, produced_quantity, raw_materials, due_date, storage_location, status
               FROM production_orders
               WHERE status = $1
               ORDER BY id DESC"#,
        )
        .bind(status)
        .fetch_all(pool)
        .await
    }

    /// Inserts a new order and returns its assigned id.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateProductionOrder,
    ) -> Result<i64, sqlx::Error> {
        let status = data.status.unwrap_or_default();
        let result = sqlx::query(
            "INSERT INTO production_orders
                (finished_goods, produced_quantity, raw_materials, due_date, storage_location, status)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&data.finished_goods)
        .bind(data.produced_quantity)
        .bind(&data.raw_materials)
        .bind(data.due_date)
        .bind(&data.storage_location)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Returns the number of rows the update touched.
    pub async fn update_status(
        pool: &SqlitePool,
        id: i64,
        status: OrderStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE production_orders SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM production_orders")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_is_forward_only_and_terminal() {
        assert_eq!(OrderStatus::Pending.next(), OrderStatus::InProgress);
        assert_eq!(OrderStatus::InProgress.next(), OrderStatus::Completed);
        assert_eq!(OrderStatus::Completed.next(), OrderStatus::Completed);
    }

    #[test]
    fn lifecycle_is_idempotent_at_completed() {
        let end = OrderStatus::Pending.next().next().next();
        assert_eq!(end, OrderStatus::Completed);
        assert_eq!(end.next(), OrderStatus::Completed);
    }

    #[test]
    fn action_labels_follow_status() {
        assert_eq!(OrderStatus::Pending.action_label(), "Start Progress");
        assert_eq!(OrderStatus::InProgress.action_label(), "Mark Complete");
        assert_eq!(OrderStatus::Completed.action_label(), "Completed");
    }

    #[test]
    fn only_completed_is_terminal() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::InProgress.is_terminal());
    }

    #[test]
    fn status_serializes_hyphenated() {
        // The canonical wire form is kebab-case; the space-separated
        // "in progress" spelling is not representable.
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(OrderStatus::InProgress.to_string(), "in-progress");
        assert_eq!(
            "in-progress".parse::<OrderStatus>().unwrap(),
            OrderStatus::InProgress
        );
        assert!("in progress".parse::<OrderStatus>().is_err());
    }

    fn valid_payload() -> CreateProductionOrder {
        CreateProductionOrder {
            finished_goods: "Test Cake".to_string(),
            produced_quantity: 1,
            raw_materials: "Flour".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            storage_location: "Warehouse X".to_string(),
            status: None,
        }
    }

    #[test]
    fn validate_accepts_well_formed_payload() {
        assert!(valid_payload().validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_fields_and_zero_quantity() {
        let mut p = valid_payload();
        p.finished_goods = "  ".to_string();
        assert!(p.validate().is_err());

        let mut p = valid_payload();
        p.produced_quantity = 0;
        assert!(p.validate().is_err());

        let mut p = valid_payload();
        p.raw_materials = String::new();
        assert!(p.validate().is_err());

        let mut p = valid_payload();
        p.storage_location = String::new();
        assert!(p.validate().is_err());
    }
}

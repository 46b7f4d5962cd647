//! AI-generated production insight.
//!
//! Feeds the current order list to the completion API and parses the
//! structured report the insight screen renders. Experimental surface;
//! the store only supplies data and never depends on the result.

use std::sync::Arc;

use db::{OrderStore, StoreError, models::production_order::ProductionOrder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use ts_rs::TS;

use super::completion_api::{CompletionClient, CompletionError};

const SYSTEM_PROMPT: &str = "You are a production planning assistant for a small bakery. \
    Respond with JSON only, no prose, matching the shape \
    {\"summary\": string, \"insights\": [{\"id\": string, \"finished_goods\": string, \
    \"due_date\": string, \"status\": string, \"suggestion\": string}]}.";

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("completion error: {0}")]
    Completion(#[from] CompletionError),
    #[error("failed to encode orders: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct InsightItem {
    pub id: String,
    pub finished_goods: String,
    pub due_date: String,
    pub status: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct InsightReport {
    pub summary: String,
    pub insights: Vec<InsightItem>,
}

pub struct InsightService {
    store: Arc<OrderStore>,
    client: CompletionClient,
}

impl InsightService {
    pub fn new(store: Arc<OrderStore>, client: CompletionClient) -> Self {
        Self { store, client }
    }

    /// Generate a report over the full order list. An empty list short
    /// circuits without touching the network.
    pub async fn generate(&self) -> Result<InsightReport, InsightError> {
        let orders = self.store.get_all().await?;
        if orders.is_empty() {
            return Ok(InsightReport {
                summary: "No production orders yet.".to_string(),
                insights: Vec::new(),
            });
        }

        let prompt = build_prompt(&orders)?;
        let report: InsightReport = self
            .client
            .complete_json(&prompt, Some(SYSTEM_PROMPT))
            .await?;
        info!(
            orders = orders.len(),
            insights = report.insights.len(),
            "generated production insight"
        );
        Ok(report)
    }
}

fn build_prompt(orders: &[ProductionOrder]) -> Result<String, serde_json::Error> {
    Ok(format!(
        "Review these production orders and suggest what to prioritize. \
         Reference orders by their id.\n\n{}",
        serde_json::to_string_pretty(orders)?
    ))
}

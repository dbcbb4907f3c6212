pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One persisted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: i64,
    pub topic: String,
    pub summary: String,
}

/// Window over the history. The default covers every row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Page {
    pub fn all() -> Self {
        Self::default()
    }
}

/// Where summaries live. Append-only from the server's point of view.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Insert one row and return its id.
    async fn insert(&self, topic: &str, summary: &str) -> Result<i64>;
    /// Rows in descending id order (newest first).
    async fn history(&self, page: Page) -> Result<Vec<ResultRecord>>;
}

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

use super::{Page, ResultRecord, ResultStore};

/// SQLite-backed result store.
///
/// Shares a database with [`CredentialStore`](crate::auth::CredentialStore)
/// and [`Config`](crate::config::Config).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open results database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS results (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                topic   TEXT NOT NULL,
                summary TEXT NOT NULL
            );",
        )
        .context("failed to create results table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("results database lock poisoned"))
    }
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn insert(&self, topic: &str, summary: &str) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO results (topic, summary) VALUES (?1, ?2)",
            [topic, summary],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn history(&self, page: Page) -> Result<Vec<ResultRecord>> {
        let conn = self.conn()?;
        // SQLite treats a negative LIMIT as "no limit".
        let limit = page
            .limit
            .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
            .unwrap_or(-1);
        let offset = i64::try_from(page.offset).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(
            "SELECT id, topic, summary FROM results ORDER BY id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt
            .query_map([limit, offset], |row| {
                Ok(ResultRecord {
                    id: row.get(0)?,
                    topic: row.get(1)?,
                    summary: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_returns_increasing_ids() {
        let store = SqliteStore::in_memory().unwrap();
        let a = store.insert("a", "sa").await.unwrap();
        let b = store.insert("b", "sb").await.unwrap();
        assert!(b > a);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert("first", "1").await.unwrap();
        store.insert("second", "2").await.unwrap();
        store.insert("third", "3").await.unwrap();

        let rows = store.history(Page::all()).await.unwrap();
        let topics: Vec<_> = rows.iter().map(|r| r.topic.as_str()).collect();
        assert_eq!(topics, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn empty_store_has_empty_history() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.history(Page::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn page_limits_and_offsets() {
        let store = SqliteStore::in_memory().unwrap();
        for i in 0..5 {
            store.insert(&format!("t{i}"), "s").await.unwrap();
        }

        let page = Page {
            limit: Some(2),
            offset: 1,
        };
        let rows = store.history(page).await.unwrap();
        let topics: Vec<_> = rows.iter().map(|r| r.topic.as_str()).collect();
        assert_eq!(topics, ["t3", "t2"]);
    }

    #[tokio::test]
    async fn offset_without_limit_returns_the_rest() {
        let store = SqliteStore::in_memory().unwrap();
        for i in 0..3 {
            store.insert(&format!("t{i}"), "s").await.unwrap();
        }
        let page = Page {
            limit: None,
            offset: 1,
        };
        let rows = store.history(page).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].topic, "t1");
    }

    #[tokio::test]
    async fn oversized_page_values_saturate() {
        let store = SqliteStore::in_memory().unwrap();
        for i in 0..3 {
            store.insert(&format!("t{i}"), "s").await.unwrap();
        }

        let huge_limit = Page {
            limit: Some(usize::MAX),
            offset: 0,
        };
        assert_eq!(store.history(huge_limit).await.unwrap().len(), 3);

        let huge_offset = Page {
            limit: None,
            offset: usize::MAX,
        };
        assert!(store.history(huge_offset).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn topic_and_summary_stored_verbatim() {
        let store = SqliteStore::in_memory().unwrap();
        let topic = "'; DROP TABLE results; --";
        let id = store.insert(topic, "").await.unwrap();
        let rows = store.history(Page::all()).await.unwrap();
        assert_eq!(
            rows,
            vec![ResultRecord {
                id,
                topic: topic.to_string(),
                summary: String::new(),
            }]
        );
    }

    #[tokio::test]
    async fn persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results-test.db");
        let path_str = path.to_str().unwrap();

        {
            let store = SqliteStore::new(path_str).unwrap();
            store.insert("kept", "summary").await.unwrap();
        }

        {
            let store = SqliteStore::new(path_str).unwrap();
            let rows = store.history(Page::all()).await.unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].topic, "kept");
        }
    }
}

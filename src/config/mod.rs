//! Persisted server settings backed by SQLite.
//!
//! Shares a database with [`CredentialStore`](crate::auth::CredentialStore)
//! and [`SqliteStore`](crate::store::sqlite::SqliteStore). Pass the same
//! path to all three. CLI flags override these values, and built-in
//! defaults apply when neither is set.

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

/// Keys the server reads at startup.
pub const KEYS: &[&str] = &["provider", "model", "bind"];

/// Persistent key-value configuration store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the config table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open config database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create config table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("config lock poisoned"))
    }

    fn check_key(key: &str) -> Result<()> {
        if !KEYS.contains(&key) {
            bail!("unknown config key: {key} (expected one of: {})", KEYS.join(", "));
        }
        Ok(())
    }

    /// Get a config value by key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Self::check_key(key)?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a config value (upsert).
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::check_key(key)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    /// Remove a config key.
    pub fn remove(&self, key: &str) -> Result<()> {
        Self::check_key(key)?;
        let conn = self.conn()?;
        conn.execute("DELETE FROM config WHERE key = ?1", [key])?;
        Ok(())
    }

    /// First of: explicit value, stored value, `default`.
    pub fn resolve(&self, key: &str, explicit: Option<String>, default: &str) -> Result<String> {
        if let Some(value) = explicit {
            return Ok(value);
        }
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }
}

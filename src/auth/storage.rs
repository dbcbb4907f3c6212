use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use rusqlite::Connection;

/// Credential types stored per provider.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum Credential {
    #[serde(rename = "api_key")]
    ApiKey { key: String },
    #[serde(rename = "cloudflare")]
    Cloudflare {
        account_id: String,
        api_token: String,
    },
}

/// Manages credential storage in SQLite.
///
/// Shares a database with the result store and config. Pass the same path
/// used for `SqliteStore`.
pub struct CredentialStore {
    conn: Mutex<Connection>,
}

impl CredentialStore {
    /// Open or create a credentials table in the given database path.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS credentials (
                provider TEXT PRIMARY KEY,
                data     TEXT NOT NULL
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("credentials lock poisoned"))
    }

    /// Get credential for a provider.
    pub fn get(&self, provider: &str) -> Result<Option<Credential>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT data FROM credentials WHERE provider = ?1")?;
        let mut rows = stmt.query([provider])?;
        match rows.next()? {
            Some(row) => {
                let json: String = row.get(0)?;
                let cred: Credential = serde_json::from_str(&json)?;
                Ok(Some(cred))
            }
            None => Ok(None),
        }
    }

    /// Store credential for a provider (upsert).
    pub fn set(&self, provider: &str, credential: Credential) -> Result<()> {
        let json = serde_json::to_string(&credential)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO credentials (provider, data) VALUES (?1, ?2)
             ON CONFLICT(provider) DO UPDATE SET data = excluded.data",
            [provider, &json],
        )?;
        Ok(())
    }

    /// Remove credential for a provider.
    pub fn remove(&self, provider: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM credentials WHERE provider = ?1", [provider])?;
        Ok(())
    }

    /// Resolve a credential: stored value first, then `env`.
    ///
    /// `env` is a lookup function so callers can pass `std::env::var` in
    /// production and a map in tests. Empty values count as unset.
    pub fn resolve<F>(&self, provider: &str, env: F) -> Result<Option<Credential>>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cred) = self.get(provider)? {
            return Ok(Some(cred));
        }

        let var = |name: &str| env(name).filter(|v| !v.is_empty());

        let from_env = match provider {
            super::ANTHROPIC => var(super::ANTHROPIC_KEY_ENV).map(|key| Credential::ApiKey { key }),
            super::WORKERS_AI => match (var(super::CF_ACCOUNT_ENV), var(super::CF_TOKEN_ENV)) {
                (Some(account_id), Some(api_token)) => Some(Credential::Cloudflare {
                    account_id,
                    api_token,
                }),
                _ => None,
            },
            _ => None,
        };
        Ok(from_env)
    }
}

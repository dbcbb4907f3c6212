//! Project-wide constants.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Default Workers AI model when none is specified.
pub const DEFAULT_MODEL: &str = "@cf/meta/llama-3.3-70b-instruct-fp8-fast";

/// Default Anthropic model when the anthropic provider is selected without `--model`.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// Default listen address for the HTTP server.
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

pub const SUBMIT_PATH: &str = "/api/submit";
pub const HISTORY_PATH: &str = "/api/history";

/// Default database path: `~/.insightgen/insightgen.db`.
/// Single DB for results, credentials, and config.
pub fn default_db_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".insightgen").join("insightgen.db"))
}

use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use insightgen::auth::{self, ANTHROPIC, Credential, CredentialStore, WORKERS_AI};
use insightgen::config::Config;
use insightgen::consts::{
    AUTHOR, DEFAULT_ANTHROPIC_MODEL, DEFAULT_BIND, DEFAULT_MODEL, REPO, default_db_path,
};
use insightgen::engine::Summarizer;
use insightgen::inference::InferenceClient;
use insightgen::inference::anthropic::AnthropicClient;
use insightgen::inference::workers_ai::WorkersAiClient;
use insightgen::server::{self, AppState};
use insightgen::store::sqlite::SqliteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Provider {
    WorkersAi,
    Anthropic,
}

impl Provider {
    fn id(self) -> &'static str {
        match self {
            Provider::WorkersAi => WORKERS_AI,
            Provider::Anthropic => ANTHROPIC,
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Provider::WorkersAi => DEFAULT_MODEL,
            Provider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "insightgen",
    version,
    author = AUTHOR,
    about = "Topic in, summary out.",
    after_help = REPO
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// LLM provider [default: workers-ai]
    #[arg(short, long, value_enum, global = true)]
    provider: Option<Provider>,

    /// Model name (provider-specific)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// SQLite database path (use :memory: for ephemeral) [default: ~/.insightgen/insightgen.db]
    #[arg(short, long, global = true)]
    db: Option<String>,

    /// Listen address [default: 127.0.0.1:8787]
    #[arg(short, long, global = true)]
    bind: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default)
    Serve,
    /// Save credentials for an LLM provider
    Login {
        #[arg(value_enum, default_value_t = Provider::WorkersAi)]
        provider: Provider,
    },
    /// Remove saved credentials for an LLM provider
    Logout {
        #[arg(value_enum, default_value_t = Provider::WorkersAi)]
        provider: Provider,
    },
    /// Read or change persisted settings (provider, model, bind)
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print a value
    Get { key: String },
    /// Store a value
    Set { key: String, value: String },
    /// Remove a value
    Unset { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn"));
    fmt().with_env_filter(filter).compact().with_target(false).init();

    let cli = Cli::parse();
    let db = resolve_db_path(cli.db.clone())?;

    match &cli.command {
        None | Some(Command::Serve) => serve(&cli, &db).await,
        Some(Command::Login { provider }) => handle_login(&db, *provider),
        Some(Command::Logout { provider }) => {
            auth::logout(&db, provider.id())?;
            println!("✓ Logged out from {}.", provider.id());
            Ok(())
        }
        Some(Command::Config { action }) => handle_config(&db, action),
    }
}

fn resolve_db_path(explicit: Option<String>) -> Result<String> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let path = default_db_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    path.to_str()
        .map(str::to_string)
        .context("database path is not valid UTF-8")
}

async fn serve(cli: &Cli, db: &str) -> Result<()> {
    let config = Config::open(db)?;

    let provider = match cli.provider {
        Some(p) => p,
        None => match config.get("provider")? {
            Some(name) => Provider::from_str(&name, true)
                .map_err(|e| anyhow::anyhow!("invalid provider in config: {e}"))?,
            None => Provider::WorkersAi,
        },
    };
    let model = config.resolve("model", cli.model.clone(), provider.default_model())?;
    let bind = config.resolve("bind", cli.bind.clone(), DEFAULT_BIND)?;
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address: {bind}"))?;

    let credentials = CredentialStore::open(db)?;
    let credential = credentials.resolve(provider.id(), |name| std::env::var(name).ok())?;

    let memory_label = if db == ":memory:" { "ephemeral" } else { db };

    info!(
        provider = provider.id(),
        model = %model,
        db = memory_label,
        auth = auth::describe(credential.as_ref()),
        repo = REPO,
        "starting insightgen"
    );

    let inference: Arc<dyn InferenceClient> = match (provider, credential) {
        (Provider::WorkersAi, Some(Credential::Cloudflare { account_id, api_token })) => {
            Arc::new(WorkersAiClient::new(account_id, api_token))
        }
        (Provider::Anthropic, Some(Credential::ApiKey { key })) => {
            Arc::new(AnthropicClient::new(key))
        }
        (provider, Some(_)) => {
            bail!(
                "stored credential for {} has the wrong shape. Run `insightgen login {}` again.",
                provider.id(),
                provider.id()
            )
        }
        (Provider::WorkersAi, None) => bail!(
            "no Workers AI credentials found. Run `insightgen login workers-ai` or set {} and {}.",
            auth::CF_ACCOUNT_ENV,
            auth::CF_TOKEN_ENV
        ),
        (Provider::Anthropic, None) => bail!(
            "no Anthropic credentials found. Run `insightgen login anthropic` or set {}.",
            auth::ANTHROPIC_KEY_ENV
        ),
    };

    let store = Arc::new(SqliteStore::new(db)?);
    let state = AppState::new(Summarizer::new(inference, store, model));

    server::serve(addr, state).await
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let line = line.trim().to_string();
    if line.is_empty() {
        bail!("no {} provided", label.to_lowercase());
    }
    Ok(line)
}

fn handle_login(db: &str, provider: Provider) -> Result<()> {
    let credential = match provider {
        Provider::WorkersAi => {
            println!("Logging in to Cloudflare Workers AI...\n");
            Credential::Cloudflare {
                account_id: prompt_line("Account ID")?,
                api_token: prompt_line("API token")?,
            }
        }
        Provider::Anthropic => {
            println!("Logging in to Anthropic...\n");
            Credential::ApiKey {
                key: prompt_line("API key")?,
            }
        }
    };

    auth::login(db, provider.id(), credential)?;
    println!("✓ Logged in to {} successfully!", provider.id());
    println!("  Credentials saved to {db}");
    Ok(())
}

fn handle_config(db: &str, action: &ConfigAction) -> Result<()> {
    let config = Config::open(db)?;
    match action {
        ConfigAction::Get { key } => match config.get(key)? {
            Some(value) => println!("{value}"),
            None => warn!(key = %key, "not set"),
        },
        ConfigAction::Set { key, value } => {
            if key == "provider" {
                Provider::from_str(value, true)
                    .map_err(|e| anyhow::anyhow!("invalid provider: {e}"))?;
            }
            config.set(key, value)?;
        }
        ConfigAction::Unset { key } => config.remove(key)?,
    }
    Ok(())
}

pub mod storage;

pub use storage::{Credential, CredentialStore};

use anyhow::{Context, Result, bail};

pub const WORKERS_AI: &str = "workers-ai";
pub const ANTHROPIC: &str = "anthropic";

pub const ANTHROPIC_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const CF_ACCOUNT_ENV: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const CF_TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";

/// Providers that accept stored credentials.
const SUPPORTED_PROVIDERS: &[&str] = &[WORKERS_AI, ANTHROPIC];

/// Check that a credential matches the shape its provider expects.
fn check_shape(provider: &str, credential: &Credential) -> Result<()> {
    match (provider, credential) {
        (ANTHROPIC, Credential::ApiKey { key }) if !key.is_empty() => Ok(()),
        (
            WORKERS_AI,
            Credential::Cloudflare {
                account_id,
                api_token,
            },
        ) if !account_id.is_empty() && !api_token.is_empty() => Ok(()),
        _ => bail!("credential does not match provider {provider}"),
    }
}

/// Save credentials for a provider.
///
/// Returns an error if the provider is not supported, the credential has
/// the wrong shape for it, or it cannot be saved.
pub fn login(db_path: &str, provider: &str, credential: Credential) -> Result<()> {
    if !SUPPORTED_PROVIDERS.contains(&provider) {
        bail!("unsupported provider: {provider}");
    }
    check_shape(provider, &credential)?;
    let storage = CredentialStore::open(db_path).context("failed to open credential storage")?;
    storage
        .set(provider, credential)
        .context("failed to save credentials")?;
    Ok(())
}

/// Remove stored credentials for a provider.
pub fn logout(db_path: &str, provider: &str) -> Result<()> {
    let storage = CredentialStore::open(db_path).context("failed to open credential storage")?;
    storage
        .remove(provider)
        .context("failed to remove credentials")?;
    Ok(())
}

/// Human-readable auth status for startup logs. Never includes secrets.
pub fn describe(credential: Option<&Credential>) -> &'static str {
    match credential {
        Some(Credential::ApiKey { .. }) => "API key",
        Some(Credential::Cloudflare { .. }) => "Cloudflare token",
        None => "not authenticated",
    }
}

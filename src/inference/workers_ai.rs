//! Cloudflare Workers AI over its REST API.
//!
//! `POST {base}/accounts/{account_id}/ai/run/{model}` with a bearer token
//! and a chat `messages` array. Responses come wrapped in the standard
//! Cloudflare envelope (`success`, `errors`, `result`).

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Generation, InferenceClient, Message, Prompt, TokenUsage};

const API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Inference client for Workers AI text-generation models.
pub struct WorkersAiClient {
    account_id: String,
    api_token: String,
    base_url: String,
    http: reqwest::Client,
}

impl WorkersAiClient {
    pub fn new(account_id: String, api_token: String) -> Self {
        Self {
            account_id,
            api_token,
            base_url: API_BASE.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Point the client at a different API base (tests, gateways).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn run_url(&self, model: &str) -> String {
        format!(
            "{}/accounts/{}/ai/run/{}",
            self.base_url, self.account_id, model
        )
    }

    fn build_request(prompt: &Prompt) -> ApiRequest {
        ApiRequest {
            messages: vec![Message::system(&prompt.system), Message::user(&prompt.user)],
        }
    }

    fn parse_envelope(envelope: ApiEnvelope) -> Result<Generation> {
        if !envelope.success {
            let messages = envelope
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ");
            bail!("Workers AI reported failure: {}", messages);
        }

        let Some(result) = envelope.result else {
            bail!("Workers AI returned no result");
        };

        let text = result.response.unwrap_or_default();
        if text.is_empty() {
            bail!("Workers AI returned empty response");
        }

        let usage = result.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        Ok(Generation { text, usage })
    }
}

#[async_trait]
impl InferenceClient for WorkersAiClient {
    async fn generate(&self, model: &str, prompt: &Prompt) -> Result<Generation> {
        let resp = self
            .http
            .post(self.run_url(model))
            .bearer_auth(&self.api_token)
            .json(&Self::build_request(prompt))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("Workers AI error ({}): {}", status, text);
        }

        let envelope: ApiEnvelope = resp.json().await?;
        let generation = Self::parse_envelope(envelope)?;

        if let Some(usage) = generation.usage {
            debug!(
                input = usage.input_tokens,
                output = usage.output_tokens,
                "workers ai token usage"
            );
        }

        Ok(generation)
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest {
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<RunResult>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RunResult {
    response: Option<String>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

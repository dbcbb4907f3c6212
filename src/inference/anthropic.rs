use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Generation, InferenceClient, Message, Prompt, TokenUsage};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Inference client for the Anthropic Messages API.
pub struct AnthropicClient {
    api_key: String,
    url: String,
    http: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            url: API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Point the client at a different messages endpoint (tests, proxies).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    fn build_request<'a>(model: &'a str, prompt: &'a Prompt) -> ApiRequest<'a> {
        ApiRequest {
            model,
            max_tokens: MAX_TOKENS,
            system: &prompt.system,
            messages: vec![Message::user(&prompt.user)],
        }
    }

    fn extract_text(resp: &ApiResponse) -> String {
        resp.content
            .iter()
            .filter_map(|block| {
                if block.content_type == "text" {
                    block.text.as_deref()
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

#[async_trait]
impl InferenceClient for AnthropicClient {
    async fn generate(&self, model: &str, prompt: &Prompt) -> Result<Generation> {
        let body = Self::build_request(model, prompt);

        let resp = self
            .http
            .post(&self.url)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("Anthropic API error ({}): {}", status, text);
        }

        let api_resp: ApiResponse = resp.json().await?;
        let text = Self::extract_text(&api_resp);

        if text.is_empty() {
            bail!("Anthropic API returned empty response");
        }

        let usage = api_resp.usage.map(|u| TokenUsage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
        });
        if let Some(usage) = usage {
            debug!(
                input = usage.input_tokens,
                output = usage.output_tokens,
                "anthropic token usage"
            );
        }

        Ok(Generation { text, usage })
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

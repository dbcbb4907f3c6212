use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Generation, InferenceClient, Prompt};

/// A scripted inference client for tests. Returns pre-defined replies in
/// order and records every call it receives.
pub struct MockInference {
    replies: Vec<Result<String, String>>,
    index: AtomicUsize,
    calls: Mutex<Vec<(String, Prompt)>>,
}

impl MockInference {
    pub fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with the same text.
    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string()); 64])
    }

    /// Always fails with the same message.
    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(message.to_string()); 64])
    }

    /// `(model, prompt)` pairs seen so far, oldest first.
    pub fn calls(&self) -> Vec<(String, Prompt)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InferenceClient for MockInference {
    async fn generate(&self, model: &str, prompt: &Prompt) -> Result<Generation> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((model.to_string(), prompt.clone()));
        }
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .get(i)
            .ok_or_else(|| anyhow::anyhow!("MockInference: no more replies (called {} times)", i + 1))?;
        match reply {
            Ok(text) => Ok(Generation {
                text: text.clone(),
                usage: None,
            }),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ApiError;
use crate::inference::InferenceClient;
use crate::prompts::summary::build_summary_prompt;
use crate::store::{Page, ResultRecord, ResultStore};

/// Outcome of one successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: i64,
    pub topic: String,
    pub summary: String,
}

/// Wires an inference client to a result store. Holds no per-request
/// state, so one instance serves every request.
pub struct Summarizer {
    inference: Arc<dyn InferenceClient>,
    store: Arc<dyn ResultStore>,
    model: String,
}

impl Summarizer {
    pub fn new(
        inference: Arc<dyn InferenceClient>,
        store: Arc<dyn ResultStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            inference,
            store,
            model: model.into(),
        }
    }

    /// Generate a summary for `topic` and persist it.
    ///
    /// Inference completes before the insert starts. The two steps are not
    /// transactional: if the insert fails the generated text is dropped.
    pub async fn submit(&self, topic: &str) -> Result<Submission, ApiError> {
        let prompt = build_summary_prompt(topic);

        let generation = self
            .inference
            .generate(&self.model, &prompt)
            .await
            .map_err(ApiError::Inference)?;

        if let Some(usage) = generation.usage {
            debug!(total = usage.total(), "generation usage");
        }

        let id = self
            .store
            .insert(topic, &generation.text)
            .await
            .map_err(ApiError::Storage)?;

        info!(id, topic, "stored summary");

        Ok(Submission {
            id,
            topic: topic.to_string(),
            summary: generation.text,
        })
    }

    /// Stored results, newest first.
    pub async fn history(&self, page: Page) -> Result<Vec<ResultRecord>, ApiError> {
        self.store.history(page).await.map_err(ApiError::Storage)
    }
}

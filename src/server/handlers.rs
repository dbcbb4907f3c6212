use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AppState;
use crate::error::ApiError;
use crate::store::{Page, ResultRecord};

/// `topic` accepts any JSON value. Only its absence is rejected.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub topic: Value,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: String,
    pub topic: Value,
    pub summary: String,
}

/// Text used for the prompt and the stored `topic` column: strings as-is,
/// anything else as its JSON text.
fn topic_text(topic: &Value) -> String {
    match topic {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Optional window over history. Absent parameters mean "everything".
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl From<HistoryQuery> for Page {
    fn from(q: HistoryQuery) -> Self {
        Page {
            limit: q.limit,
            offset: q.offset.unwrap_or(0),
        }
    }
}

/// `POST /api/submit`.
///
/// The body is read raw and parsed here so malformed JSON lands in the
/// shared 500 envelope instead of axum's extractor rejection.
pub async fn submit(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, ApiError> {
    let req: SubmitRequest = serde_json::from_slice(&body)?;
    let submission = state.summarizer.submit(&topic_text(&req.topic)).await?;
    Ok(Json(SubmitResponse {
        status: "success".to_string(),
        topic: req.topic,
        summary: submission.summary,
    }))
}

/// `/api/history`, any method.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ResultRecord>>, ApiError> {
    let rows = state.summarizer.history(query.into()).await?;
    Ok(Json(rows))
}

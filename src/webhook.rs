//! Webhook transport and wire payloads.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ChatError;
use crate::session::SessionId;

/// One JSON request, one JSON reply.
///
/// Implementations never retry. Widgets are generic over this so they can be
/// driven by a scripted double in tests.
pub trait Webhook {
    fn post<B>(&self, body: &B) -> impl Future<Output = Result<Value, ChatError>> + Send
    where
        B: Serialize + Sync + ?Sized;
}

/// A free-text chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRequest<'a> {
    pub message: &'a str,
    #[serde(rename = "sessionId")]
    pub session_id: &'a SessionId,
}

/// The user's pick on a rendered quiz, sent back for feedback.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRequest<'a> {
    pub answer: &'a str,
    pub question: &'a str,
    pub correct_answer: &'a str,
    pub is_correct: bool,
    #[serde(rename = "sessionId")]
    pub session_id: &'a SessionId,
}

/// What the quiz agent says about an answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerReply {
    pub feedback: Option<String>,
    /// Raw quiz payload, to be run through the normalizer.
    pub next_question: Option<Value>,
}

impl AnswerReply {
    /// Lenient read: an empty or missing `feedback` and a null
    /// `next_question` are both treated as absent.
    pub fn from_value(value: &Value) -> Self {
        let feedback = match value.get("feedback") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::String(_)) | Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let next_question = value.get("next_question").filter(|v| !v.is_null()).cloned();
        Self { feedback, next_question }
    }
}

/// reqwest-backed webhook bound to one fixed URL.
#[derive(Debug, Clone)]
pub struct HttpWebhook {
    client: Client,
    url: String,
}

impl HttpWebhook {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ChatError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Webhook for HttpWebhook {
    async fn post<B>(&self, body: &B) -> Result<Value, ChatError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        // Agents sometimes put a usable JSON body on an error status, so the
        // status alone does not decide the outcome.
        let status = response.status();
        if !status.is_success() {
            warn!(%status, url = %self.url, "webhook returned a non-success status");
        }

        let text = response.text().await?;
        debug!(url = %self.url, body = %text, "webhook reply");
        serde_json::from_str(&text).map_err(|e| ChatError::Decode(e.to_string()))
    }
}

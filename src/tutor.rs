//! Tutor widget: free-text questions answered with formatted explanations.

use tracing::{debug, info};

use crate::format::format_html;
use crate::input::InputHandler;
use crate::normalize::{normalize_tutor, Reply, TutorReply};
use crate::session::SessionId;
use crate::transcript::{ChatEvent, Transcript};
use crate::webhook::{TurnRequest, Webhook};

pub const THINKING: &str = "⏳ Thinking...";
pub const SEND_FAILED: &str = "❌ Failed to contact tutor webhook.";

pub struct TutorWidget<W> {
    session: SessionId,
    webhook: W,
    transcript: Transcript,
    input: InputHandler,
}

impl<W: Webhook> TutorWidget<W> {
    pub fn new(webhook: W) -> Self {
        let session = SessionId::new();
        info!(%session, "tutor session started");
        Self {
            session,
            webhook,
            transcript: Transcript::new(),
            input: InputHandler::default(),
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn subscribe(&mut self) -> tokio::sync::mpsc::UnboundedReceiver<ChatEvent> {
        self.transcript.subscribe()
    }

    /// Submit free text. Returns `false` when the input was blank and
    /// nothing was sent.
    pub async fn send(&mut self, raw: &str) -> bool {
        let Some(message) = self.input.accept(raw) else {
            return false;
        };
        self.transcript.push_user(message.as_str());
        let thinking = self.transcript.push_ai_html(format_html(THINKING));

        let request = TurnRequest {
            message: &message,
            session_id: &self.session,
        };
        debug!(session = %self.session, message = %message, "sending tutor turn");
        let outcome = self.webhook.post(&request).await;
        self.transcript.remove(thinking);

        match outcome {
            Ok(data) => self.show(normalize_tutor(&data)),
            Err(e) => {
                e.report("tutor turn failed");
                self.transcript.push_ai_html(format_html(SEND_FAILED));
            }
        }
        true
    }

    fn show(&mut self, reply: Reply) {
        match reply {
            Reply::Tutor(reply) => self.show_tutor(reply),
            Reply::Text(text) => {
                self.transcript.push_ai_html(format_html(&text));
            }
            Reply::Quiz(item) => {
                let text = serde_json::to_string(&item).unwrap_or_default();
                self.transcript.push_ai_html(format_html(&text));
            }
        }
    }

    /// One bubble per present field: topic, explanation, follow-up.
    fn show_tutor(&mut self, reply: TutorReply) {
        if let Some(topic) = reply.topic {
            self.transcript
                .push_ai_html(format_html(&format!("<strong>📚 {}</strong>", topic)));
        }
        if let Some(explanation) = reply.explanation {
            self.transcript.push_ai_html(format_html(&explanation));
        }
        if let Some(follow_up) = reply.follow_up {
            self.transcript
                .push_ai_html(format_html(&format!("<em>{}</em>", follow_up)));
        }
    }
}

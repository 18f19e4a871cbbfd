//! The on-screen message list and the chat lock.
//!
//! A [`Transcript`] is append-only: messages are pushed and never edited. The
//! single exception is a transient placeholder (the tutor's "thinking"
//! bubble), which can be removed once the real reply is in. Every change is
//! broadcast as a [`ChatEvent`] to whoever subscribed; a front end renders
//! those events instead of reaching into widget state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::quiz::{OptionMark, QuizId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Ai => write!(f, "ai"),
        }
    }
}

/// Bubble content: plain text, or the limited HTML the formatter produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "lowercase")]
pub enum Content {
    Text(String),
    Html(String),
}

impl Content {
    pub fn as_str(&self) -> &str {
        match self {
            Content::Text(s) | Content::Html(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MessageId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: Content,
}

/// Change notifications emitted to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ChatEvent {
    Appended(ChatMessage),
    Removed(MessageId),
    QuizRendered {
        id: QuizId,
        question: String,
        options: Vec<String>,
    },
    QuizRevealed {
        id: QuizId,
        marks: Vec<OptionMark>,
    },
    Locked,
    Unlocked,
}

#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: u64,
    subscribers: Vec<mpsc::UnboundedSender<ChatEvent>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Dropping the returned receiver unsubscribes it.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ChatEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn push(&mut self, role: Role, content: Content) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        let message = ChatMessage { id, role, content };
        self.messages.push(message.clone());
        self.emit(ChatEvent::Appended(message));
        id
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> MessageId {
        self.push(Role::User, Content::Text(text.into()))
    }

    pub fn push_ai_text(&mut self, text: impl Into<String>) -> MessageId {
        self.push(Role::Ai, Content::Text(text.into()))
    }

    pub fn push_ai_html(&mut self, html: impl Into<String>) -> MessageId {
        self.push(Role::Ai, Content::Html(html.into()))
    }

    /// Drop a message, returning whether it was present.
    pub fn remove(&mut self, id: MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        let removed = self.messages.len() != before;
        if removed {
            self.emit(ChatEvent::Removed(id));
        }
        removed
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Broadcast an event, pruning subscribers whose receiver is gone.
    pub fn emit(&mut self, event: ChatEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Shared flag that refuses free-text input while a quiz awaits its answer.
#[derive(Debug, Clone, Default)]
pub struct ChatLock(Arc<AtomicBool>);

impl ChatLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn unlock(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_locked(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

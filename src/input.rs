use crate::transcript::ChatLock;

/// Gatekeeper between the text box and the webhook.
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    lock: ChatLock,
}

impl InputHandler {
    pub fn new(lock: ChatLock) -> Self {
        Self { lock }
    }

    /// The trimmed message, or `None` when it is blank or the chat is locked.
    pub fn accept(&self, raw: &str) -> Option<String> {
        if self.lock.is_locked() {
            return None;
        }
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

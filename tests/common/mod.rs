//! Scripted webhook double shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;
use study_chat::{ChatError, Webhook};

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<Value, String>>,
    requests: Vec<Value>,
}

/// Answers each request with the next scripted reply and records the body.
/// Running out of replies behaves like a failed request.
#[derive(Clone, Default)]
pub struct ScriptedWebhook {
    script: Arc<Mutex<Script>>,
}

impl ScriptedWebhook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, value: Value) -> Self {
        self.script.lock().unwrap().replies.push_back(Ok(value));
        self
    }

    pub fn fail(self, reason: &str) -> Self {
        self.script.lock().unwrap().replies.push_back(Err(reason.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<Value> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }
}

impl Webhook for ScriptedWebhook {
    async fn post<B>(&self, body: &B) -> Result<Value, ChatError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let mut script = self.script.lock().unwrap();
        script.requests.push(serde_json::to_value(body).expect("serializable body"));
        match script.replies.pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(reason)) => Err(ChatError::Decode(reason)),
            None => Err(ChatError::Decode("no scripted reply left".to_string())),
        }
    }
}

pub fn quiz_json(question: &str, options: &[&str], correct: &str) -> Value {
    serde_json::json!({
        "question": question,
        "options": options,
        "correct_answer": correct,
    })
}

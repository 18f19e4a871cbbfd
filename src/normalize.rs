//! Classification of webhook replies.
//!
//! The agents behind the webhooks do not honour a fixed schema. Replies show
//! up as bare objects, as `[{"output": ...}]` batch wrappers, as `{"output": ...}`,
//! or as free text with a fenced JSON block embedded somewhere. Everything
//! here turns such a payload into a [`Reply`] and never fails: whatever cannot
//! be understood becomes [`Reply::Text`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ChatError;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// A multiple-choice question as produced by the quiz agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    pub question: String,
    /// Display order is preserved; labels are not guaranteed unique.
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuizItem {
    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.correct_answer
    }
}

/// An explanation from the tutor agent. Each present field is one bubble.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, rename = "followUp", skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
}

impl TutorReply {
    pub fn is_empty(&self) -> bool {
        self.topic.is_none() && self.explanation.is_none() && self.follow_up.is_none()
    }
}

/// The canonical shapes a reply can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Quiz(QuizItem),
    Tutor(TutorReply),
    /// Passthrough of anything that could not be classified.
    Text(String),
}

/// Peel `[{"output": X}]` and `{"output": X}` wrappers off a payload.
///
/// Any number of nested wrappers is peeled. An `output` of `null`, `false`
/// or `""` does not count as a wrapper.
pub fn unwrap_output(payload: &Value) -> &Value {
    let mut current = payload;
    loop {
        let next = match current {
            Value::Array(items) => items.first().and_then(output_of),
            Value::Object(_) => output_of(current),
            _ => None,
        };
        match next {
            Some(inner) => current = inner,
            None => return current,
        }
    }
}

/// Classify a quiz-agent reply.
pub fn normalize_quiz(payload: &Value) -> Reply {
    let raw = unwrap_output(payload);
    let parsed = match raw {
        Value::Object(_) if field_text(raw, "question").is_some() => {
            quiz_from_object(raw).ok_or_else(|| {
                ChatError::Parse("quiz object is missing its options".to_string())
            })
        }
        Value::String(text) => parse_fenced_quiz(text),
        _ => Err(ChatError::Parse("no question in reply".to_string())),
    };

    match parsed {
        Ok(quiz) => Reply::Quiz(quiz),
        Err(e) => {
            debug!(error = %e, "quiz reply falls back to text");
            Reply::Text(text_fallback(raw))
        }
    }
}

/// Classify a tutor-agent reply.
pub fn normalize_tutor(payload: &Value) -> Reply {
    let raw = unwrap_output(payload);
    let parsed = match raw {
        Value::Object(_)
            if field_text(raw, "explanation").is_some() || field_text(raw, "topic").is_some() =>
        {
            Ok(tutor_from_object(raw))
        }
        Value::String(text) => serde_json::from_str::<Value>(&strip_fences(text))
            .map(|value| tutor_from_object(&value))
            .map_err(|e| ChatError::Parse(e.to_string())),
        _ => Err(ChatError::Parse("no explanation in reply".to_string())),
    };

    match parsed {
        Ok(reply) if !reply.is_empty() => Reply::Tutor(reply),
        Ok(_) => Reply::Text(text_fallback(raw)),
        Err(e) => {
            debug!(error = %e, "tutor reply falls back to text");
            Reply::Text(text_fallback(raw))
        }
    }
}

/// Remove every fence marker and surrounding whitespace.
pub fn strip_fences(text: &str) -> String {
    text.replace(JSON_FENCE, "").replace(FENCE, "").trim().to_string()
}

fn output_of(value: &Value) -> Option<&Value> {
    value.get("output").filter(|o| match o {
        Value::Null | Value::Bool(false) => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    })
}

/// Splits on the first ```json marker: the prose before it is the intro,
/// the fenced JSON after it carries the question.
fn parse_fenced_quiz(text: &str) -> Result<QuizItem, ChatError> {
    let (intro, body) = match text.split_once(JSON_FENCE) {
        Some((before, after)) => {
            let before = before.trim();
            ((!before.is_empty()).then(|| before.to_string()), after)
        }
        None => (None, text),
    };

    let value: Value =
        serde_json::from_str(&strip_fences(body)).map_err(|e| ChatError::Parse(e.to_string()))?;
    let mut quiz = quiz_from_object(&value)
        .ok_or_else(|| ChatError::Parse("fenced JSON is not a quiz".to_string()))?;
    quiz.intro = intro;
    Ok(quiz)
}

fn quiz_from_object(value: &Value) -> Option<QuizItem> {
    let question = field_text(value, "question")?;
    let options: Vec<String> = value
        .get("options")?
        .as_array()?
        .iter()
        .map(value_text)
        .collect();
    if options.is_empty() {
        return None;
    }

    Some(QuizItem {
        intro: field_text(value, "intro"),
        question,
        options,
        correct_answer: field_text(value, "correct_answer").unwrap_or_default(),
    })
}

fn tutor_from_object(value: &Value) -> TutorReply {
    TutorReply {
        topic: field_text(value, "topic"),
        explanation: field_text(value, "explanation"),
        follow_up: field_text(value, "followUp").or_else(|| field_text(value, "follow_up")),
    }
}

/// Empty strings and nulls count as absent.
fn field_text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(value_text(other)),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text_fallback(raw: &Value) -> String {
    value_text(raw)
}

//! End-to-end sessions through the line-oriented front end.

mod common;

use std::time::Duration;

use serde_json::json;
use study_chat::repl::{run_quiz, run_tutor};
use study_chat::{QuizWidget, TutorWidget};

use common::{quiz_json, ScriptedWebhook};

fn output(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).expect("utf8")
}

#[tokio::test]
async fn test_quiz_session_answers_by_number() {
    colored::control::set_override(false);
    let hook = ScriptedWebhook::new()
        .reply(json!(quiz_json("Capital of Italy?", &["Paris", "Rome"], "Rome")))
        .reply(json!({"feedback": "Yes, Rome."}));
    let widget = QuizWidget::new(hook.clone(), Duration::ZERO);

    let input = b"quiz me\n2\n/quit\nnever sent\n".as_slice();
    let out = output(run_quiz(widget, input, Vec::new()).await.expect("session"));

    assert!(out.contains("you  › quiz me"));
    assert!(out.contains("[2] Rome"));
    assert!(out.contains("✔ Rome"));
    assert!(out.contains("ai   › Yes, Rome."));
    let requests = hook.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1]["answer"], "Rome");
    assert_eq!(requests[1]["is_correct"], true);
}

#[tokio::test]
async fn test_quiz_session_ignores_invalid_pick() {
    colored::control::set_override(false);
    let hook = ScriptedWebhook::new()
        .reply(json!(quiz_json("Q", &["A", "B"], "A")))
        .reply(json!({}));
    let widget = QuizWidget::new(hook.clone(), Duration::ZERO);

    let input = b"go\n7\nsomething else\nB\n".as_slice();
    let out = output(run_quiz(widget, input, Vec::new()).await.expect("session"));

    let requests = hook.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1]["answer"], "B");
    assert!(out.contains("✘ B"));
    assert!(out.contains("✔ A"));
}

#[tokio::test]
async fn test_quiz_session_skips_blank_lines() {
    colored::control::set_override(false);
    let hook = ScriptedWebhook::new();
    let widget = QuizWidget::new(hook.clone(), Duration::ZERO);
    run_quiz(widget, b"\n   \n".as_slice(), Vec::new()).await.expect("session");
    assert_eq!(hook.request_count(), 0);
}

#[tokio::test]
async fn test_tutor_session_with_continued_lines() {
    colored::control::set_override(false);
    let hook = ScriptedWebhook::new().reply(json!({"topic": "Gravity", "explanation": "Things fall."}));
    let widget = TutorWidget::new(hook.clone());

    let input = b"explain\\\ngravity\n".as_slice();
    let out = output(run_tutor(widget, input, Vec::new()).await.expect("session"));

    assert_eq!(hook.requests()[0]["message"], "explain\ngravity");
    assert!(out.contains("📚 Gravity"));
    assert!(out.contains("Things fall."));
}

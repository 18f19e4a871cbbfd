//! Crate-level error type.

use thiserror::Error;

/// Everything that can go wrong while talking to a webhook or driving a quiz.
///
/// `Network`, `Decode` and `Parse` never reach the user as-is: the widgets
/// catch them and show a fixed fallback message instead.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("response body is not JSON: {0}")]
    Decode(String),

    #[error("unparseable reply: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("quiz {0} already has an answer")]
    QuizClosed(u64),

    #[error("quiz has no option #{0}")]
    NoSuchOption(usize),

    #[error("no quiz with id {0}")]
    NoSuchQuiz(u64),
}

impl ChatError {
    /// True for the failures a webhook round-trip can produce.
    pub fn is_transport(&self) -> bool {
        matches!(self, ChatError::Network(_) | ChatError::Decode(_))
    }

    /// Log a failure the caller is about to replace with a fallback message.
    /// Transport failures log at `warn`, anything else at `error`.
    pub fn report(&self, context: &str) {
        if self.is_transport() {
            tracing::warn!(error = %self, "{}", context);
        } else {
            tracing::error!(error = %self, "{}", context);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_decode_display() {
        let e = ChatError::Decode("expected value at line 1".to_string());
        assert_eq!(e.to_string(), "response body is not JSON: expected value at line 1");
    }

    #[test]
    fn test_quiz_closed_display() {
        assert_eq!(ChatError::QuizClosed(3).to_string(), "quiz 3 already has an answer");
    }

    #[test]
    fn test_no_such_option_display() {
        assert_eq!(ChatError::NoSuchOption(7).to_string(), "quiz has no option #7");
    }

    #[test]
    fn test_io_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: ChatError = io.into();
        assert!(matches!(e, ChatError::Io(_)));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged(err: ChatError) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || err.report("tutor turn failed"));
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_report_logs_transport_failures_as_warnings() {
        let out = logged(ChatError::Decode("eof".into()));
        assert!(out.contains("WARN"), "{}", out);
        assert!(out.contains("tutor turn failed"));
        assert!(out.contains("eof"));
    }

    #[test]
    fn test_report_logs_other_failures_as_errors() {
        let out = logged(ChatError::Parse("bad".into()));
        assert!(out.contains("ERROR"), "{}", out);
        assert!(!out.contains("WARN"));
    }

    #[test]
    fn test_is_transport() {
        assert!(ChatError::Decode("x".into()).is_transport());
        assert!(!ChatError::Parse("x".into()).is_transport());
        assert!(!ChatError::NoSuchQuiz(1).is_transport());
    }
}

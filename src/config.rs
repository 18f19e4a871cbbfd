//! Runtime configuration: built-in defaults, then an optional TOML file, then
//! environment overrides. CLI flags are applied last by [`crate::cli::Args`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

pub const QUIZ_WEBHOOK_ENV: &str = "STUDY_CHAT_QUIZ_WEBHOOK";
pub const TUTOR_WEBHOOK_ENV: &str = "STUDY_CHAT_TUTOR_WEBHOOK";

const DEFAULT_QUIZ_WEBHOOK: &str = "http://localhost:5678/webhook/quiz";
const DEFAULT_TUTOR_WEBHOOK: &str = "http://localhost:5678/webhook/tutor";
const DEFAULT_ANSWER_DELAY_MS: u64 = 800;

/// ```toml
/// quiz_webhook = "https://agents.example.org/webhook/quiz"
/// tutor_webhook = "https://agents.example.org/webhook/tutor"
/// answer_delay_ms = 800
/// request_timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub quiz_webhook: String,
    pub tutor_webhook: String,
    /// Pause between revealing an answer and sending it for feedback.
    pub answer_delay_ms: u64,
    /// Unset means a request may wait forever.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quiz_webhook: DEFAULT_QUIZ_WEBHOOK.to_string(),
            tutor_webhook: DEFAULT_TUTOR_WEBHOOK.to_string(),
            answer_delay_ms: DEFAULT_ANSWER_DELAY_MS,
            request_timeout_secs: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, ChatError> {
        toml::from_str(source).map_err(|e| ChatError::Config(e.to_string()))
    }

    /// Defaults, overlaid with `path` when given, overlaid with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ChatError> {
        let mut config = match path {
            Some(path) => {
                let source = std::fs::read_to_string(path).map_err(|e| {
                    ChatError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&source)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply webhook overrides from an environment lookup. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_blank(QUIZ_WEBHOOK_ENV) {
            self.quiz_webhook = url;
        }
        if let Some(url) = non_blank(TUTOR_WEBHOOK_ENV) {
            self.tutor_webhook = url;
        }
    }

    pub fn answer_delay(&self) -> Duration {
        Duration::from_millis(self.answer_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.answer_delay(), Duration::from_millis(800));
        assert!(config.request_timeout().is_none());
        assert!(config.quiz_webhook.starts_with("http"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("answer_delay_ms = 0").expect("parse");
        assert_eq!(config.answer_delay_ms, 0);
        assert_eq!(config.tutor_webhook, Config::default().tutor_webhook);
    }

    #[test]
    fn test_full_toml() {
        let config = Config::from_toml_str(
            r#"
            quiz_webhook = "https://example.org/q"
            tutor_webhook = "https://example.org/t"
            answer_delay_ms = 250
            request_timeout_secs = 12
            "#,
        )
        .expect("parse");
        assert_eq!(config.quiz_webhook, "https://example.org/q");
        assert_eq!(config.tutor_webhook, "https://example.org/t");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = Config::from_toml_str("quiz_hook = \"x\"").unwrap_err();
        assert!(matches!(err, ChatError::Config(_)));
    }

    #[test]
    fn test_bad_type_is_rejected() {
        assert!(Config::from_toml_str("answer_delay_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            QUIZ_WEBHOOK_ENV => Some("https://env.example/q".to_string()),
            TUTOR_WEBHOOK_ENV => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.quiz_webhook, "https://env.example/q");
        assert_eq!(config.tutor_webhook, Config::default().tutor_webhook);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "request_timeout_secs = 5").expect("write");
        let config = Config::load(Some(file.path())).expect("load");
        assert_eq!(config.request_timeout_secs, Some(5));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}

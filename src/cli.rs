use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "study-chat")]
#[command(version)]
#[command(about = "Chat with a quiz or tutor webhook agent from the terminal")]
pub struct Args {
    #[command(subcommand)]
    pub mode: Mode,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Webhook URL for the selected mode, overriding config and environment
    #[arg(long, global = true)]
    pub webhook: Option<String>,

    /// Pause between revealing a quiz answer and sending it, in milliseconds
    #[arg(long, global = true)]
    pub answer_delay_ms: Option<u64>,

    /// Per-request timeout in seconds (default: wait indefinitely)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Multiple-choice quiz agent
    Quiz,
    /// Tutoring agent
    Tutor,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Quiz => write!(f, "quiz"),
            Mode::Tutor => write!(f, "tutor"),
        }
    }
}

impl Args {
    /// Flags win over everything loaded before them.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.webhook {
            match self.mode {
                Mode::Quiz => config.quiz_webhook = url.clone(),
                Mode::Tutor => config.tutor_webhook = url.clone(),
            }
        }
        if let Some(ms) = self.answer_delay_ms {
            config.answer_delay_ms = ms;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = Some(secs);
        }
    }
}

/// URL the selected mode talks to.
pub fn webhook_for(mode: Mode, config: &Config) -> &str {
    match mode {
        Mode::Quiz => &config.quiz_webhook,
        Mode::Tutor => &config.tutor_webhook,
    }
}

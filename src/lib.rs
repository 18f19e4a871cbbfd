//! Terminal chat front end for two webhook agents: one that writes
//! multiple-choice quizzes and one that tutors.
//!
//! Each turn flows input → [`webhook`] → [`normalize`] → [`transcript`], and a
//! front end such as [`render::TerminalRenderer`] draws the resulting
//! [`transcript::ChatEvent`]s.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod input;
pub mod normalize;
pub mod quiz;
pub mod render;
pub mod repl;
pub mod session;
pub mod transcript;
pub mod tutor;
pub mod webhook;

pub use error::ChatError;
pub use normalize::{normalize_quiz, normalize_tutor, QuizItem, Reply, TutorReply};
pub use quiz::QuizWidget;
pub use session::SessionId;
pub use tutor::TutorWidget;
pub use webhook::{HttpWebhook, Webhook};

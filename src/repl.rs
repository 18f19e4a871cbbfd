//! Line-oriented front end wiring stdin to a widget and a renderer.
//!
//! A line ending in `\` continues the message on the next line. While a quiz
//! is pending, input picks an option instead of being sent as chat.

use std::io::{self, Write};

use colored::*;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::{Stream, StreamExt};

use crate::cli::Mode;
use crate::error::ChatError;
use crate::quiz::QuizWidget;
use crate::render::{pump, TerminalRenderer};
use crate::session::SessionId;
use crate::tutor::TutorWidget;
use crate::webhook::Webhook;

const EXIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

pub fn print_banner(mode: Mode, url: &str, session: &SessionId) {
    eprintln!(
        "{} {}",
        "study-chat".bright_cyan().bold(),
        format!("· {} mode · {}", mode, url).dimmed()
    );
    eprintln!("{}", format!("session {} · /quit to leave", session).dimmed());
}

fn hint(text: &str) {
    eprintln!("{}", text.bright_yellow());
}

fn is_exit(message: &str) -> bool {
    EXIT_COMMANDS.contains(&message.trim())
}

/// Read one message, joining `\`-continued lines with newlines.
async fn next_message<S>(lines: &mut S) -> Option<io::Result<String>>
where
    S: Stream<Item = io::Result<String>> + Unpin,
{
    let mut message = String::new();
    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => return Some(Err(e)),
        };
        match line.strip_suffix('\\') {
            Some(head) => {
                message.push_str(head);
                message.push('\n');
            }
            None => {
                message.push_str(&line);
                return Some(Ok(message));
            }
        }
    }
    (!message.is_empty()).then_some(Ok(message))
}

pub async fn run_quiz<W, R, O>(mut widget: QuizWidget<W>, input: R, out: O) -> Result<O, ChatError>
where
    W: Webhook,
    R: AsyncBufRead + Unpin,
    O: Write + Send + 'static,
{
    let renderer = tokio::spawn(pump(widget.subscribe(), TerminalRenderer::new(out)));
    let mut lines = LinesStream::new(input.lines());

    while let Some(message) = next_message(&mut lines).await {
        let message = message?;
        if is_exit(&message) {
            break;
        }

        let pending = widget.pending_quiz().filter(|_| widget.lock().is_locked());
        if let Some(id) = pending {
            match widget.quiz(id).and_then(|quiz| quiz.option_index(&message)) {
                Some(index) => widget.answer(id, index).await?,
                None => hint("Pick one of the listed options first."),
            }
            continue;
        }

        widget.send(&message).await;
    }

    drop(widget);
    finish(renderer).await
}

pub async fn run_tutor<W, R, O>(mut widget: TutorWidget<W>, input: R, out: O) -> Result<O, ChatError>
where
    W: Webhook,
    R: AsyncBufRead + Unpin,
    O: Write + Send + 'static,
{
    let renderer = tokio::spawn(pump(widget.subscribe(), TerminalRenderer::new(out)));
    let mut lines = LinesStream::new(input.lines());

    while let Some(message) = next_message(&mut lines).await {
        let message = message?;
        if is_exit(&message) {
            break;
        }
        widget.send(&message).await;
    }

    drop(widget);
    finish(renderer).await
}

async fn finish<O: Write>(
    renderer: tokio::task::JoinHandle<io::Result<TerminalRenderer<O>>>,
) -> Result<O, ChatError> {
    let renderer = renderer.await.map_err(io::Error::other)??;
    Ok(renderer.into_inner())
}

//! Terminal rendering of [`ChatEvent`]s.

use std::collections::HashMap;
use std::io::{self, Write};

use colored::*;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::mpsc;

use crate::quiz::{OptionMark, QuizId};
use crate::transcript::{ChatEvent, ChatMessage, Content, Role};

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)[^>]*>").expect("tag pattern"));

const BULLET: &str = "  • ";

/// Flatten the formatter's HTML into styled terminal text.
///
/// `<strong>`/`<b>` turn bold, `<em>`/`<i>` italic, paragraphs and list items
/// become lines. Unknown tags are dropped, their text kept.
pub fn html_to_terminal(html: &str) -> String {
    let mut out = String::new();
    let mut bold = 0usize;
    let mut italic = 0usize;
    let mut cursor = 0;

    for caps in TAG.captures_iter(html) {
        let whole = caps.get(0).expect("match");
        push_styled(&mut out, &html[cursor..whole.start()], bold > 0, italic > 0);
        cursor = whole.end();

        let closing = !caps[1].is_empty();
        match (caps[2].to_ascii_lowercase().as_str(), closing) {
            ("strong" | "b", false) => bold += 1,
            ("strong" | "b", true) => bold = bold.saturating_sub(1),
            ("em" | "i", false) => italic += 1,
            ("em" | "i", true) => italic = italic.saturating_sub(1),
            ("p" | "ul" | "ol", false) => start_line(&mut out),
            ("p" | "ul" | "ol", true) | ("br", _) => out.push('\n'),
            ("li", false) => {
                start_line(&mut out);
                out.push_str(BULLET);
            }
            ("li", true) => out.push('\n'),
            _ => {}
        }
    }
    push_styled(&mut out, &html[cursor..], bold > 0, italic > 0);

    let mut lines: Vec<&str> = out.lines().collect();
    lines.dedup_by(|a, b| a.trim().is_empty() && b.trim().is_empty());
    lines.join("\n").trim_matches('\n').to_string()
}

fn start_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn push_styled(out: &mut String, text: &str, bold: bool, italic: bool) {
    if text.is_empty() {
        return;
    }
    let text = unescape(text);
    let styled = match (bold, italic) {
        (true, true) => text.bold().italic().to_string(),
        (true, false) => text.bold().to_string(),
        (false, true) => text.italic().to_string(),
        (false, false) => text,
    };
    out.push_str(&styled);
}

fn unescape(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Writes chat events to a terminal-like sink.
pub struct TerminalRenderer<O: Write> {
    out: O,
    quizzes: HashMap<QuizId, Vec<String>>,
}

impl<O: Write> TerminalRenderer<O> {
    pub fn new(out: O) -> Self {
        Self {
            out,
            quizzes: HashMap::new(),
        }
    }

    pub fn into_inner(self) -> O {
        self.out
    }

    pub fn handle(&mut self, event: &ChatEvent) -> io::Result<()> {
        match event {
            ChatEvent::Appended(message) => self.message(message)?,
            // Lines already on a terminal stay there.
            ChatEvent::Removed(_) => {}
            ChatEvent::QuizRendered { id, question, options } => {
                writeln!(self.out, "{} {}", "quiz ›".bright_yellow().bold(), question.bold())?;
                for (i, option) in options.iter().enumerate() {
                    writeln!(self.out, "  [{}] {}", i + 1, option)?;
                }
                self.quizzes.insert(*id, options.clone());
            }
            ChatEvent::QuizRevealed { id, marks } => {
                let options = self.quizzes.remove(id).unwrap_or_default();
                for (option, mark) in options.iter().zip(marks) {
                    let line = match mark {
                        OptionMark::Correct => format!("  ✔ {}", option).bright_green().to_string(),
                        OptionMark::Wrong => format!("  ✘ {}", option).bright_red().to_string(),
                        OptionMark::Neutral => format!("    {}", option).dimmed().to_string(),
                    };
                    writeln!(self.out, "{}", line)?;
                }
            }
            ChatEvent::Locked => {
                writeln!(self.out, "{}", "(answer with an option number or label)".dimmed())?;
            }
            ChatEvent::Unlocked => {}
        }
        self.out.flush()
    }

    fn message(&mut self, message: &ChatMessage) -> io::Result<()> {
        let body = match &message.content {
            Content::Text(text) => text.clone(),
            Content::Html(html) => html_to_terminal(html),
        };
        let label = match message.role {
            Role::User => "you  ›".bright_green().bold(),
            Role::Ai => "ai   ›".bright_cyan().bold(),
        };
        let mut lines = body.lines();
        writeln!(self.out, "{} {}", label, lines.next().unwrap_or(""))?;
        for line in lines {
            writeln!(self.out, "       {}", line)?;
        }
        Ok(())
    }
}

/// Drain a subscription into a renderer until every sender is gone.
pub async fn pump<O: Write>(
    mut events: mpsc::UnboundedReceiver<ChatEvent>,
    mut renderer: TerminalRenderer<O>,
) -> io::Result<TerminalRenderer<O>> {
    while let Some(event) = events.recv().await {
        renderer.handle(&event)?;
    }
    Ok(renderer)
}

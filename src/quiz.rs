//! Quiz widget: free-text turns that may come back as a multiple-choice
//! question, and the one-shot answer interaction on each rendered question.
//!
//! Every rendered question owns a [`QuizState`]:
//!
//! ```text
//! AwaitingSelection --select--> Revealed
//! ```
//!
//! Entering `AwaitingSelection` locks the chat; the answer round-trip
//! releases it whether the feedback request succeeds or not.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ChatError;
use crate::input::InputHandler;
use crate::normalize::{normalize_quiz, QuizItem, Reply};
use crate::session::SessionId;
use crate::transcript::{ChatEvent, ChatLock, Transcript};
use crate::webhook::{AnswerReply, AnswerRequest, TurnRequest, Webhook};

pub const SEND_FAILED: &str = "❌ Failed to send the message to the quiz server.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QuizId(pub u64);

impl std::fmt::Display for QuizId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visual state of one option button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionMark {
    Neutral,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizPhase {
    AwaitingSelection,
    Revealed { choice: usize, correct: bool },
}

/// Result of picking an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub choice: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct QuizState {
    id: QuizId,
    item: QuizItem,
    phase: QuizPhase,
    marks: Vec<OptionMark>,
}

impl QuizState {
    pub fn new(id: QuizId, item: QuizItem) -> Self {
        let marks = vec![OptionMark::Neutral; item.options.len()];
        Self {
            id,
            item,
            phase: QuizPhase::AwaitingSelection,
            marks,
        }
    }

    pub fn id(&self) -> QuizId {
        self.id
    }

    pub fn item(&self) -> &QuizItem {
        &self.item
    }

    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    pub fn marks(&self) -> &[OptionMark] {
        &self.marks
    }

    /// Options accept clicks only until the first selection.
    pub fn options_enabled(&self) -> bool {
        self.phase == QuizPhase::AwaitingSelection
    }

    /// Pick option `index`, revealing the answer.
    ///
    /// The pick is marked correct on exact label equality with
    /// `correct_answer`. A wrong pick additionally marks every option carrying
    /// the correct label.
    pub fn select(&mut self, index: usize) -> Result<Selection, ChatError> {
        if !self.options_enabled() {
            return Err(ChatError::QuizClosed(self.id.0));
        }
        let choice = self
            .item
            .options
            .get(index)
            .cloned()
            .ok_or(ChatError::NoSuchOption(index))?;
        let correct = self.item.is_correct(&choice);

        if correct {
            self.marks[index] = OptionMark::Correct;
        } else {
            self.marks[index] = OptionMark::Wrong;
            for (mark, label) in self.marks.iter_mut().zip(&self.item.options) {
                if self.item.correct_answer == *label {
                    *mark = OptionMark::Correct;
                }
            }
        }
        self.phase = QuizPhase::Revealed { choice: index, correct };

        Ok(Selection {
            choice,
            is_correct: correct,
        })
    }

    /// Map typed input to an option: a 1-based number or an exact label.
    pub fn option_index(&self, input: &str) -> Option<usize> {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            return (1..=self.item.options.len()).contains(&n).then(|| n - 1);
        }
        self.item.options.iter().position(|o| o == input)
    }
}

/// Feedback shown when the agent does not provide any.
pub fn fallback_feedback(is_correct: bool, correct_answer: &str) -> String {
    if is_correct {
        "✅ Correct! Your answer is right.".to_string()
    } else {
        format!("❌ Wrong. The correct answer is: {}", correct_answer)
    }
}

pub struct QuizWidget<W> {
    session: SessionId,
    webhook: W,
    transcript: Transcript,
    lock: ChatLock,
    input: InputHandler,
    quizzes: BTreeMap<QuizId, QuizState>,
    next_quiz: u64,
    answer_delay: Duration,
}

impl<W: Webhook> QuizWidget<W> {
    pub fn new(webhook: W, answer_delay: Duration) -> Self {
        let session = SessionId::new();
        info!(%session, "quiz session started");
        let lock = ChatLock::new();
        Self {
            session,
            webhook,
            transcript: Transcript::new(),
            input: InputHandler::new(lock.clone()),
            lock,
            quizzes: BTreeMap::new(),
            next_quiz: 0,
            answer_delay,
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn subscribe(&mut self) -> tokio::sync::mpsc::UnboundedReceiver<ChatEvent> {
        self.transcript.subscribe()
    }

    pub fn lock(&self) -> &ChatLock {
        &self.lock
    }

    pub fn quiz(&self, id: QuizId) -> Option<&QuizState> {
        self.quizzes.get(&id)
    }

    /// Most recently rendered quiz still waiting for an answer.
    pub fn pending_quiz(&self) -> Option<QuizId> {
        self.quizzes
            .values()
            .rev()
            .find(|q| q.options_enabled())
            .map(QuizState::id)
    }

    pub fn pending_count(&self) -> usize {
        self.quizzes.values().filter(|q| q.options_enabled()).count()
    }

    /// Submit free text. Returns `false` when the input was rejected and
    /// nothing was sent.
    pub async fn send(&mut self, raw: &str) -> bool {
        let Some(message) = self.input.accept(raw) else {
            return false;
        };
        self.transcript.push_user(message.as_str());

        let request = TurnRequest {
            message: &message,
            session_id: &self.session,
        };
        debug!(session = %self.session, message = %message, "sending quiz turn");
        match self.webhook.post(&request).await {
            Ok(data) => self.show(normalize_quiz(&data)),
            Err(e) => {
                e.report("quiz turn failed");
                self.transcript.push_ai_text(SEND_FAILED);
            }
        }
        true
    }

    /// Put a question on screen and lock the chat until it is answered.
    pub fn render(&mut self, item: QuizItem) -> QuizId {
        let id = QuizId(self.next_quiz);
        self.next_quiz += 1;

        if let Some(intro) = &item.intro {
            self.transcript.push_ai_text(intro.as_str());
        }
        self.lock.lock();
        self.transcript.emit(ChatEvent::Locked);
        self.transcript.emit(ChatEvent::QuizRendered {
            id,
            question: item.question.clone(),
            options: item.options.clone(),
        });
        self.quizzes.insert(id, QuizState::new(id, item));
        id
    }

    /// Reveal the answer on quiz `id` without contacting the agent.
    pub fn select(&mut self, id: QuizId, index: usize) -> Result<Selection, ChatError> {
        let state = self.quizzes.get_mut(&id).ok_or(ChatError::NoSuchQuiz(id.0))?;
        let selection = state.select(index)?;
        let marks = state.marks().to_vec();
        self.transcript.emit(ChatEvent::QuizRevealed { id, marks });
        Ok(selection)
    }

    /// Full answer round-trip: reveal, pause, echo the pick, ask the agent for
    /// feedback, release the chat, then render any follow-up question.
    pub async fn answer(&mut self, id: QuizId, index: usize) -> Result<(), ChatError> {
        let selection = self.select(id, index)?;
        let item = self
            .quizzes
            .get(&id)
            .map(|q| q.item().clone())
            .ok_or(ChatError::NoSuchQuiz(id.0))?;

        if !self.answer_delay.is_zero() {
            tokio::time::sleep(self.answer_delay).await;
        }
        self.transcript.push_user(selection.choice.as_str());

        let request = AnswerRequest {
            answer: &selection.choice,
            question: &item.question,
            correct_answer: &item.correct_answer,
            is_correct: selection.is_correct,
            session_id: &self.session,
        };
        let reply = match self.webhook.post(&request).await {
            Ok(data) => AnswerReply::from_value(&data),
            Err(e) => {
                e.report(&format!("answer feedback for quiz {} failed", id));
                AnswerReply::default()
            }
        };

        let feedback = reply
            .feedback
            .unwrap_or_else(|| fallback_feedback(selection.is_correct, &item.correct_answer));
        self.transcript.push_ai_text(feedback);

        self.lock.unlock();
        self.transcript.emit(ChatEvent::Unlocked);

        if let Some(next) = reply.next_question {
            match normalize_quiz(&next) {
                Reply::Quiz(next_item) => {
                    self.render(next_item);
                }
                other => debug!(?other, "next_question is not a quiz, ignoring"),
            }
        }
        Ok(())
    }

    fn show(&mut self, reply: Reply) {
        match reply {
            Reply::Quiz(item) => {
                self.render(item);
            }
            Reply::Text(text) => {
                self.transcript.push_ai_text(text);
            }
            Reply::Tutor(reply) => {
                let text = serde_json::to_string(&reply).unwrap_or_default();
                self.transcript.push_ai_text(text);
            }
        }
    }
}

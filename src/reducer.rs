use crate::events::{synthesize_id, AgentEvent};
use crate::payload::{ChatMessage, Role};

/// Live lifecycle of a conversational session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Idle,
    Streaming,
    Error,
}

/// A transcript entry whose content may still be growing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub streaming: bool,
}

impl TranscriptMessage {
    fn assistant(id: String, content: String) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content,
            streaming: true,
        }
    }

    pub fn to_chat_message(&self) -> ChatMessage {
        ChatMessage {
            id: self.id.clone(),
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Deterministic, append-only assembly of the conversational message list.
///
/// Given an identical ordered event sequence the resulting list is fully
/// determined: deltas append strictly in arrival order, nothing is
/// reordered, and the only deduplication is the idempotent handling of a
/// repeated `TextMessageStart` for an id already present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<TranscriptMessage>,
    status: SessionStatus,
    viewing_session: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[TranscriptMessage] {
        &self.messages
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Identifier of the historical session currently loaded, if any.
    pub fn viewing_session(&self) -> Option<&str> {
        self.viewing_session.as_deref()
    }

    /// Replace the transcript with a stored session's messages for viewing.
    pub fn open_session(&mut self, session_id: impl Into<String>, transcript: Vec<ChatMessage>) {
        self.messages = transcript
            .into_iter()
            .map(|message| TranscriptMessage {
                id: message.id,
                role: message.role,
                content: message.content,
                streaming: false,
            })
            .collect();
        self.viewing_session = Some(session_id.into());
        self.status = SessionStatus::Idle;
    }

    /// Append a locally authored user message ahead of submitting a run.
    /// Returns the synthesized message id.
    pub fn push_user_message(&mut self, content: impl Into<String>) -> String {
        let id = synthesize_id("local-msg");
        self.messages.push(TranscriptMessage {
            id: id.clone(),
            role: Role::User,
            content: content.into(),
            streaming: false,
        });
        id
    }

    /// Model-facing history snapshot for the next run request.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .map(TranscriptMessage::to_chat_message)
            .collect()
    }

    /// Advance the state machine by one conversational event.
    pub fn apply(&mut self, event: &AgentEvent) {
        match event {
            AgentEvent::RunStarted { .. } => {
                self.status = SessionStatus::Streaming;
                self.viewing_session = None;
            }
            AgentEvent::TextMessageStart { message_id } => {
                if !self.has_message(message_id) {
                    self.messages
                        .push(TranscriptMessage::assistant(message_id.clone(), String::new()));
                }
            }
            AgentEvent::TextMessageContent { message_id, delta } => {
                if let Some(message) = self.find_mut(message_id) {
                    message.content.push_str(delta);
                } else {
                    // Tolerate a missing start: seed a new assistant message
                    // with exactly this delta.
                    self.messages
                        .push(TranscriptMessage::assistant(message_id.clone(), delta.clone()));
                }
            }
            AgentEvent::TextMessageEnd { message_id } => {
                if let Some(message) = self.find_mut(message_id) {
                    message.streaming = false;
                }
            }
            AgentEvent::RunFinished { .. } => {
                self.status = SessionStatus::Idle;
                self.finalize_streaming();
            }
            AgentEvent::RunError { message } => {
                self.messages.push(TranscriptMessage {
                    id: synthesize_id("local-msg"),
                    role: Role::System,
                    content: format!("Agent error: {message}"),
                    streaming: false,
                });
                self.status = SessionStatus::Error;
                self.finalize_streaming();
            }
        }
    }

    /// Resolve a cancelled run: never an error transition.
    pub fn on_cancelled(&mut self) {
        self.status = SessionStatus::Idle;
        self.finalize_streaming();
    }

    fn has_message(&self, message_id: &str) -> bool {
        self.messages.iter().any(|message| message.id == message_id)
    }

    fn find_mut(&mut self, message_id: &str) -> Option<&mut TranscriptMessage> {
        self.messages
            .iter_mut()
            .find(|message| message.id == message_id)
    }

    fn finalize_streaming(&mut self) {
        for message in &mut self.messages {
            message.streaming = false;
        }
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Speaker role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.trim().to_ascii_lowercase().as_str() {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "system" => Self::System,
            "tool" => Self::Tool,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
            Self::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
        }
    }
}

/// Outbound body for a conversational run request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPayload {
    pub thread_id: String,
    pub run_id: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
}

/// Optional per-run extras forwarded verbatim to the server.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub state: Option<Value>,
    pub tools: Option<Value>,
}

impl RunOptions {
    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_tools(mut self, tools: Value) -> Self {
        self.tools = Some(tools);
        self
    }
}

/// Outbound body for test-agent simulation requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestAgentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TestAgentRequest {
    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_persona(mut self, persona: Value) -> Self {
        self.persona = Some(persona);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Outbound body for spec preview requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecPreviewPayload {
    pub thread_id: String,
    pub refresh: bool,
}

/// Outbound body for spec feedback submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackPayload {
    pub message: String,
}

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

/// Conversational stream event after normalization.
///
/// The server controls the payload shape; mapping is total and unknown
/// event types are dropped rather than surfaced as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    RunStarted {
        thread_id: Option<String>,
        run_id: Option<String>,
    },
    TextMessageStart {
        message_id: String,
    },
    TextMessageContent {
        message_id: String,
        delta: String,
    },
    TextMessageEnd {
        message_id: String,
    },
    RunFinished {
        thread_id: Option<String>,
        run_id: Option<String>,
    },
    RunError {
        message: String,
    },
}

/// Map a raw JSON record into a conversational event.
///
/// Never panics; a missing `messageId` is synthesized locally rather than
/// causing failure, and unrecognized `type` values map to `None`.
pub fn map_agent_event(value: &Value) -> Option<AgentEvent> {
    let event_type = value.get("type")?.as_str()?;

    match event_type {
        "RUN_STARTED" => Some(AgentEvent::RunStarted {
            thread_id: string_field(value, "threadId"),
            run_id: string_field(value, "runId"),
        }),
        "TEXT_MESSAGE_START" => Some(AgentEvent::TextMessageStart {
            message_id: message_id_or_local(value),
        }),
        "TEXT_MESSAGE_CONTENT" => {
            let delta = value
                .get("delta")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_owned();
            Some(AgentEvent::TextMessageContent {
                message_id: message_id_or_local(value),
                delta,
            })
        }
        "TEXT_MESSAGE_END" => Some(AgentEvent::TextMessageEnd {
            message_id: message_id_or_local(value),
        }),
        "RUN_FINISHED" => Some(AgentEvent::RunFinished {
            thread_id: string_field(value, "threadId"),
            run_id: string_field(value, "runId"),
        }),
        "RUN_ERROR" => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_owned();
            Some(AgentEvent::RunError { message })
        }
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(ToOwned::to_owned)
}

fn message_id_or_local(value: &Value) -> String {
    string_field(value, "messageId").unwrap_or_else(|| synthesize_id("local-msg"))
}

/// Mint a process-unique identifier for records the server left anonymous.
pub(crate) fn synthesize_id(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("{prefix}-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

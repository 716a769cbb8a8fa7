//! Strict local projections of the persisted-session REST surface.
//!
//! All decoding here is defensive: missing fields get safe defaults, entries
//! without the identifiers a caller depends on are dropped, and nothing in
//! this module panics on malformed input. Every call re-fetches from the
//! server; no record is cached.

use serde_json::Value;

use crate::config::InterviewScope;
use crate::events::synthesize_id;
use crate::payload::{ChatMessage, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub scope: InterviewScope,
    pub created_at: String,
    pub turn_count: u64,
    pub has_spec: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetail {
    pub id: String,
    pub scope: InterviewScope,
    pub created_at: String,
    pub transcript: Vec<ChatMessage>,
    pub spec_markdown: Option<String>,
    pub feedback: Vec<SpecFeedbackEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFeedbackEntry {
    pub id: String,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecPreview {
    pub markdown: String,
    pub markdown_path: Option<String>,
    pub pdf_path: Option<String>,
    pub diagrams: Vec<SpecDiagram>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDiagram {
    pub title: String,
    pub path: String,
}

/// Normalize a session list response; accepts a bare array or a wrapping
/// `{"sessions": [...]}` object. Entries missing an id are dropped.
pub fn session_list_from_json(value: &Value, default_scope: InterviewScope) -> Vec<SessionSummary> {
    let items = value
        .as_array()
        .or_else(|| value.get("sessions").and_then(Value::as_array));

    let Some(items) = items else {
        return Vec::new();
    };

    let summaries: Vec<SessionSummary> = items
        .iter()
        .filter_map(|item| session_summary_from_json(item, default_scope))
        .collect();

    if summaries.len() < items.len() {
        tracing::debug!(
            dropped = items.len() - summaries.len(),
            "dropped session entries without an id"
        );
    }

    summaries
}

pub fn session_summary_from_json(
    value: &Value,
    default_scope: InterviewScope,
) -> Option<SessionSummary> {
    let id = required_string(value, "id")?;

    Some(SessionSummary {
        id,
        scope: scope_or_default(value, default_scope),
        created_at: string_or_empty(value, "created_at"),
        turn_count: value.get("turn_count").and_then(Value::as_u64).unwrap_or(0),
        has_spec: value
            .get("has_spec")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

/// Normalize a session detail response. Transcript entries with empty
/// content are dropped; surviving entries without an id get a synthesized
/// local one. Feedback entries missing an id or message are dropped.
pub fn session_detail_from_json(
    value: &Value,
    session_id: &str,
    default_scope: InterviewScope,
) -> SessionDetail {
    let transcript = value
        .get("transcript")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(transcript_message_from_json).collect())
        .unwrap_or_default();

    let feedback = value
        .get("feedback")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(feedback_entry_from_json).collect())
        .unwrap_or_default();

    SessionDetail {
        id: required_string(value, "id").unwrap_or_else(|| session_id.to_owned()),
        scope: scope_or_default(value, default_scope),
        created_at: string_or_empty(value, "created_at"),
        transcript,
        spec_markdown: opt_string(value, "spec_markdown"),
        feedback,
    }
}

pub fn feedback_entry_from_json(value: &Value) -> Option<SpecFeedbackEntry> {
    Some(SpecFeedbackEntry {
        id: required_string(value, "id")?,
        message: required_string(value, "message")?,
        created_at: string_or_empty(value, "created_at"),
    })
}

/// Normalize a spec preview response; diagram entries missing a path are
/// dropped.
pub fn spec_preview_from_json(value: &Value) -> SpecPreview {
    let diagrams = value
        .get("diagrams")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    Some(SpecDiagram {
                        title: string_or_empty(entry, "title"),
                        path: required_string(entry, "path")?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    SpecPreview {
        markdown: string_or_empty(value, "markdown"),
        markdown_path: opt_string(value, "markdown_path"),
        pdf_path: opt_string(value, "pdf_path"),
        diagrams,
    }
}

fn transcript_message_from_json(entry: &Value) -> Option<ChatMessage> {
    let content = string_or_empty(entry, "content");
    if content.is_empty() {
        return None;
    }

    let role = entry
        .get("role")
        .and_then(Value::as_str)
        .and_then(Role::parse)
        .unwrap_or(Role::Assistant);

    Some(ChatMessage {
        id: required_string(entry, "id").unwrap_or_else(|| synthesize_id("local-msg")),
        role,
        content,
    })
}

fn scope_or_default(value: &Value, default_scope: InterviewScope) -> InterviewScope {
    value
        .get("scope")
        .and_then(Value::as_str)
        .and_then(InterviewScope::parse)
        .unwrap_or(default_scope)
}

fn required_string(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(ToOwned::to_owned)
}

fn string_or_empty(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
        .to_owned()
}

fn opt_string(value: &Value, key: &str) -> Option<String> {
    required_string(value, key)
}

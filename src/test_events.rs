use serde_json::Value;

use crate::payload::Role;

/// Stakeholder profile driving a simulated interview.
///
/// The external schema is snake-cased and loosely typed; every field is
/// coerced defensively, with absent values resolving to an empty string or
/// an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaProfile {
    pub project_name: String,
    pub company: String,
    pub stakeholder_role: String,
    pub context: String,
    pub goals: Vec<String>,
    pub risks: Vec<String>,
    pub preferences: Vec<String>,
    pub tone: String,
}

impl PersonaProfile {
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Project: {}", self.project_name),
            format!("Company: {}", self.company),
            format!("Stakeholder role: {}", self.stakeholder_role),
            format!("Context: {}", self.context),
            format!("Goals: {}", self.goals.join("; ")),
            format!("Risks: {}", self.risks.join("; ")),
            format!("Preferences: {}", self.preferences.join("; ")),
            format!("Tone: {}", self.tone),
        ]
    }

    pub fn summary(&self) -> String {
        self.summary_lines().join("\n")
    }
}

/// One question/answer pair from a simulated interview transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptTurn {
    pub question: String,
    pub answer: String,
}

/// Final record of a completed test-agent simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestRunResult {
    pub persona: PersonaProfile,
    pub transcript: Vec<TranscriptTurn>,
    pub closing_feedback: String,
    pub review_warnings: Vec<String>,
    pub record_id: Option<String>,
    pub spec_path: Option<String>,
    pub pdf_path: Option<String>,
}

/// Stream event emitted while a test-agent simulation runs.
#[derive(Debug, Clone, PartialEq)]
pub enum TestAgentStreamEvent {
    Persona(PersonaProfile),
    Message { role: Role, content: String },
    Status { content: String },
    SpecDraft { content: String },
    SpecFinal { content: String },
    ReviewFeedback { content: String },
    ReviewWarning { note: String },
    ReviewNote { note: String },
    Artifact {
        kind: String,
        path: Option<String>,
        record_id: Option<String>,
    },
    Complete(TestRunResult),
    Error { message: String },
}

/// Map a raw JSON record into a test-agent stream event.
///
/// Total and non-throwing: unknown `type` values and `message` events with
/// empty content map to `None`.
pub fn map_test_event(value: &Value) -> Option<TestAgentStreamEvent> {
    let event_type = value.get("type")?.as_str()?;

    match event_type {
        "persona" => Some(TestAgentStreamEvent::Persona(map_persona(
            value.get("persona").unwrap_or(&Value::Null),
        ))),
        "message" => {
            // Forwarded verbatim; only a truly absent or empty content field
            // drops the event.
            let content = value
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_owned();
            if content.is_empty() {
                return None;
            }
            let role = value
                .get("role")
                .and_then(Value::as_str)
                .and_then(Role::parse)
                .unwrap_or(Role::Assistant);
            Some(TestAgentStreamEvent::Message { role, content })
        }
        "status" => Some(TestAgentStreamEvent::Status {
            content: string_or_empty(value, "content"),
        }),
        "spec_draft" => Some(TestAgentStreamEvent::SpecDraft {
            content: string_or_empty(value, "content"),
        }),
        "spec_final" => Some(TestAgentStreamEvent::SpecFinal {
            content: string_or_empty(value, "content"),
        }),
        "review_feedback" => Some(TestAgentStreamEvent::ReviewFeedback {
            content: string_or_empty(value, "content"),
        }),
        "review_warning" => Some(TestAgentStreamEvent::ReviewWarning {
            note: note_field(value),
        }),
        "review_note" => Some(TestAgentStreamEvent::ReviewNote {
            note: note_field(value),
        }),
        "artifact" => Some(TestAgentStreamEvent::Artifact {
            kind: string_or_empty(value, "kind"),
            path: opt_string(value, "path"),
            record_id: opt_string(value, "recordId").or_else(|| opt_string(value, "record_id")),
        }),
        "complete" => Some(TestAgentStreamEvent::Complete(map_test_result(
            value.get("result").unwrap_or(&Value::Null),
        ))),
        "error" => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_owned();
            Some(TestAgentStreamEvent::Error { message })
        }
        _ => None,
    }
}

/// Coerce an external persona payload into the local shape. Never panics.
pub fn map_persona(value: &Value) -> PersonaProfile {
    PersonaProfile {
        project_name: string_or_empty(value, "project_name"),
        company: string_or_empty(value, "company"),
        stakeholder_role: string_or_empty(value, "stakeholder_role"),
        context: string_or_empty(value, "context"),
        goals: coerce_string_list(value.get("goals")),
        risks: coerce_string_list(value.get("risks")),
        preferences: coerce_string_list(value.get("preferences")),
        tone: string_or_empty(value, "tone"),
    }
}

/// Normalize a buffered simulation result record. Never panics.
pub fn map_test_result(value: &Value) -> TestRunResult {
    let transcript = value
        .get("transcript")
        .and_then(Value::as_array)
        .map(|turns| turns.iter().filter_map(map_transcript_turn).collect())
        .unwrap_or_default();

    TestRunResult {
        persona: map_persona(value.get("persona").unwrap_or(&Value::Null)),
        transcript,
        closing_feedback: string_or_empty(value, "closing_feedback"),
        review_warnings: coerce_string_list(value.get("review_warnings")),
        record_id: opt_string(value, "record_id"),
        spec_path: opt_string(value, "spec_path"),
        pdf_path: opt_string(value, "pdf_path"),
    }
}

/// Transcript turns arrive either as `{question, answer}` mappings or as
/// two-element pairs; turns with neither side populated are dropped.
fn map_transcript_turn(turn: &Value) -> Option<TranscriptTurn> {
    let (question, answer) = match turn {
        Value::Object(_) => (
            string_or_empty(turn, "question"),
            string_or_empty(turn, "answer"),
        ),
        Value::Array(pair) if pair.len() >= 2 => {
            (coerce_string(&pair[0]), coerce_string(&pair[1]))
        }
        _ => return None,
    };

    if question.is_empty() && answer.is_empty() {
        None
    } else {
        Some(TranscriptTurn { question, answer })
    }
}

/// Accept either a native list or a `;`/newline-delimited string, always
/// normalized to trimmed non-empty entries.
pub(crate) fn coerce_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(coerce_string)
            .filter(|item| !item.is_empty())
            .collect(),
        Some(Value::String(raw)) => raw
            .split([';', '\n'])
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_owned(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Review events carry their text as `note`, older payloads as `content`.
fn note_field(value: &Value) -> String {
    let note = string_or_empty(value, "note");
    if note.is_empty() {
        string_or_empty(value, "content")
    } else {
        note
    }
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
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(ToOwned::to_owned)
}

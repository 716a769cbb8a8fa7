use crate::events::synthesize_id;
use crate::payload::Role;
use crate::reducer::{SessionStatus, TranscriptMessage};
use crate::test_events::{PersonaProfile, TestAgentStreamEvent, TestRunResult};

/// Placeholder shown in the first transcript slot until a persona arrives.
pub const PERSONA_PLACEHOLDER: &str = "Preparing simulated stakeholder persona...";

/// Whether the orchestrator wants more events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestRunControl {
    Continue,
    Stop,
}

/// Single-pass transcript builder for a test-agent simulation stream.
///
/// Unlike the conversational reducer, this orchestrator fails fast: the
/// first `Error` event terminates consumption and any events queued after
/// it are never processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunTranscript {
    messages: Vec<TranscriptMessage>,
    status: SessionStatus,
}

impl Default for TestRunTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRunTranscript {
    pub fn new() -> Self {
        Self {
            messages: vec![system_message(PERSONA_PLACEHOLDER.to_owned())],
            status: SessionStatus::Streaming,
        }
    }

    pub fn messages(&self) -> &[TranscriptMessage] {
        &self.messages
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Apply one event and report whether consumption should continue.
    pub fn apply(&mut self, event: &TestAgentStreamEvent) -> TestRunControl {
        match event {
            TestAgentStreamEvent::Persona(persona) => {
                // Later persona events replace the same slot again.
                self.messages[0] = system_message(persona_summary(persona));
            }
            TestAgentStreamEvent::Message { role, content } => {
                if !content.is_empty() {
                    self.messages.push(TranscriptMessage {
                        id: synthesize_id("local-msg"),
                        role: *role,
                        content: content.clone(),
                        streaming: false,
                    });
                }
            }
            TestAgentStreamEvent::Status { content } => {
                self.annotate(format!("Status: {content}"));
            }
            TestAgentStreamEvent::SpecDraft { content } => {
                self.annotate(format!("Spec draft:\n{content}"));
            }
            TestAgentStreamEvent::SpecFinal { content } => {
                self.annotate(format!("Spec final:\n{content}"));
            }
            TestAgentStreamEvent::ReviewFeedback { content } => {
                self.annotate(format!("Review feedback:\n{content}"));
            }
            TestAgentStreamEvent::ReviewWarning { note } => {
                self.annotate(format!("Review warning: {note}"));
            }
            TestAgentStreamEvent::ReviewNote { note } => {
                self.annotate(format!("Review note: {note}"));
            }
            TestAgentStreamEvent::Artifact {
                kind,
                path,
                record_id,
            } => {
                self.annotate(artifact_line(kind, path.as_deref(), record_id.as_deref()));
            }
            TestAgentStreamEvent::Complete(result) => {
                self.annotate(complete_summary(result));
                self.status = SessionStatus::Idle;
            }
            TestAgentStreamEvent::Error { message } => {
                self.annotate(format!("Test run failed: {message}"));
                self.status = SessionStatus::Error;
                return TestRunControl::Stop;
            }
        }

        TestRunControl::Continue
    }

    /// Consume events in order, stopping at the first fail-fast event.
    pub fn consume<I>(&mut self, events: I) -> TestRunControl
    where
        I: IntoIterator<Item = TestAgentStreamEvent>,
    {
        for event in events {
            if self.apply(&event) == TestRunControl::Stop {
                return TestRunControl::Stop;
            }
        }
        TestRunControl::Continue
    }

    /// A cancelled run gets a notice, not an error.
    pub fn cancel(&mut self) {
        self.annotate("Test run cancelled.".to_owned());
        self.status = SessionStatus::Idle;
    }

    fn annotate(&mut self, content: String) {
        self.messages.push(system_message(content));
    }
}

fn system_message(content: String) -> TranscriptMessage {
    TranscriptMessage {
        id: synthesize_id("local-msg"),
        role: Role::System,
        content,
        streaming: false,
    }
}

fn persona_summary(persona: &PersonaProfile) -> String {
    format!("Simulated stakeholder persona\n{}", persona.summary())
}

fn artifact_line(kind: &str, path: Option<&str>, record_id: Option<&str>) -> String {
    match kind {
        "spec_markdown" => format!(
            "Spec markdown written to {}",
            path.unwrap_or("unknown location")
        ),
        "spec_pdf" => format!("Spec PDF written to {}", path.unwrap_or("unknown location")),
        "transcript_record" => format!(
            "Transcript stored as record {}",
            record_id.unwrap_or("unknown")
        ),
        other => format!(
            "{other} (path={}, record={})",
            path.unwrap_or("n/a"),
            record_id.unwrap_or("n/a")
        ),
    }
}

fn complete_summary(result: &TestRunResult) -> String {
    let mut lines = vec!["Simulation complete.".to_owned()];

    if let Some(spec_path) = &result.spec_path {
        lines.push(format!("Spec markdown: {spec_path}"));
    }
    if let Some(pdf_path) = &result.pdf_path {
        lines.push(format!("Spec PDF: {pdf_path}"));
    }
    if let Some(record_id) = &result.record_id {
        lines.push(format!("Transcript record: {record_id}"));
    }
    if !result.review_warnings.is_empty() {
        lines.push("Review warnings:".to_owned());
        for (index, warning) in result.review_warnings.iter().enumerate() {
            lines.push(format!("  {}. {warning}", index + 1));
        }
    }

    lines.join("\n")
}

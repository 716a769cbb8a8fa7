//! Transport and session-state client for the interview agent protocol.
//!
//! This crate owns the wire-facing core of the interview chat client: it
//! decodes the blank-line-delimited `data:` event-stream framing, normalizes
//! loosely typed JSON payloads into two closed event sets (conversational
//! [`AgentEvent`]s and simulated [`TestAgentStreamEvent`]s), drives a
//! cancellable streaming consumption loop per session, and reconstructs
//! ordered chat transcripts from incremental text deltas.
//!
//! It intentionally contains no rendering or persistence concerns; session
//! history and spec previews are fetched on demand and normalized into strict
//! local records without caching.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod headers;
pub mod payload;
pub mod reducer;
pub mod sessions;
pub mod sse;
pub mod test_events;
pub mod test_run;
pub mod url;

pub use client::{
    CancellationSignal, InterviewApiClient, StreamEnd, StreamResult, TestStreamResult,
};
pub use config::{InterviewApiConfig, InterviewScope};
pub use error::InterviewApiError;
pub use events::AgentEvent;
pub use payload::{ChatMessage, Role, RunOptions, TestAgentRequest};
pub use reducer::{Conversation, SessionStatus};
pub use sessions::{SessionDetail, SessionSummary, SpecFeedbackEntry, SpecPreview};
pub use sse::SseStreamParser;
pub use test_events::{PersonaProfile, TestAgentStreamEvent, TestRunResult};
pub use test_run::{TestRunControl, TestRunTranscript};

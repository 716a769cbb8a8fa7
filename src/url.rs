use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::InterviewScope;

/// Characters escaped when an identifier is interpolated into a URL path
/// segment or query value.
const ID_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn encode_id(id: &str) -> String {
    utf8_percent_encode(id, ID_ENCODE_SET).to_string()
}

/// Default base URL for a locally hosted interview agent service.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8081";

/// Normalize a base URL by trimming whitespace and trailing slashes.
pub fn normalize_base_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };
    base.trim_end_matches('/').to_string()
}

/// Conversational streaming endpoint for a scope.
pub fn scope_endpoint(base_url: &str, scope: InterviewScope) -> String {
    format!("{}/{}", normalize_base_url(base_url), scope.as_str())
}

/// Buffered (non-streaming) test-agent simulation endpoint.
pub fn test_agent_endpoint(base_url: &str, scope: InterviewScope) -> String {
    format!("{}/test-agent/{}", normalize_base_url(base_url), scope.as_str())
}

/// Streaming test-agent simulation endpoint.
pub fn test_agent_stream_endpoint(base_url: &str, scope: InterviewScope) -> String {
    format!("{}/stream", test_agent_endpoint(base_url, scope))
}

pub fn sessions_endpoint(base_url: &str) -> String {
    format!("{}/sessions", normalize_base_url(base_url))
}

pub fn session_detail_endpoint(base_url: &str, session_id: &str) -> String {
    format!(
        "{}/sessions/{}",
        normalize_base_url(base_url),
        encode_id(session_id)
    )
}

pub fn session_feedback_endpoint(base_url: &str, session_id: &str) -> String {
    format!("{}/feedback", session_detail_endpoint(base_url, session_id))
}

pub fn spec_preview_endpoint(base_url: &str) -> String {
    format!("{}/spec-preview", normalize_base_url(base_url))
}

/// Spec PDF download URL with a cache-busting timestamp parameter.
pub fn spec_pdf_url(base_url: &str, thread_id: &str, cache_bust_ms: u64) -> String {
    format!(
        "{}/spec-pdf?thread_id={}&ts={}",
        normalize_base_url(base_url),
        encode_id(thread_id),
        cache_bust_ms
    )
}

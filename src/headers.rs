use std::collections::BTreeMap;

use crate::config::InterviewApiConfig;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_ACCEPT_LANGUAGE: &str = "accept-language";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_USER_AGENT: &str = "user-agent";

pub const EVENT_STREAM_MIME: &str = "text/event-stream";

/// Build a deterministic header map for interview agent requests.
pub fn build_headers(
    config: &InterviewApiConfig,
    accept_event_stream: bool,
) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    if accept_event_stream {
        headers.insert(HEADER_ACCEPT.to_owned(), EVENT_STREAM_MIME.to_owned());
    }

    if let Some(language) = config.language.as_deref().map(str::trim) {
        if !language.is_empty() {
            headers.insert(HEADER_ACCEPT_LANGUAGE.to_owned(), language.to_owned());
        }
    }

    if let Some(user_agent) = config.user_agent.as_deref().map(str::trim) {
        if !user_agent.is_empty() {
            headers.insert(HEADER_USER_AGENT.to_owned(), user_agent.to_owned());
        }
    }

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    headers
}

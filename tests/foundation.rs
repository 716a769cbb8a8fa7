use std::time::Duration;

use interview_api::headers::{
    build_headers, EVENT_STREAM_MIME, HEADER_ACCEPT, HEADER_ACCEPT_LANGUAGE, HEADER_CONTENT_TYPE,
    HEADER_USER_AGENT,
};
use interview_api::{InterviewApiClient, InterviewApiConfig, InterviewScope};

#[test]
fn smoke_client_constructs_from_config() {
    let config = InterviewApiConfig::new(InterviewScope::Process)
        .with_base_url("http://localhost:9000/")
        .with_language("en-GB")
        .with_timeout(Duration::from_secs(30));

    let client = InterviewApiClient::new(config).expect("client creation should succeed");
    assert_eq!(client.config().base_url, "http://localhost:9000/");
    assert_eq!(client.config().scope, InterviewScope::Process);
    assert_eq!(client.config().language.as_deref(), Some("en-GB"));
    assert!(client.thread_id().starts_with("thread-local-"));
}

#[test]
fn spec_pdf_url_embeds_thread_and_cache_bust() {
    let config = InterviewApiConfig::new(InterviewScope::Project).with_base_url("http://host/");
    let client = InterviewApiClient::new(config).expect("client");

    let url = client.build_spec_pdf_url("t-5");
    assert!(url.starts_with("http://host/spec-pdf?thread_id=t-5&ts="));

    let timestamp = url
        .rsplit("ts=")
        .next()
        .expect("timestamp suffix")
        .parse::<u64>()
        .expect("timestamp should be numeric");
    assert!(timestamp > 0);
}

#[test]
fn header_map_includes_json_and_conditional_event_stream() {
    let config = InterviewApiConfig::new(InterviewScope::Project)
        .with_language("de")
        .with_user_agent("interview-tui/0.1")
        .insert_header("X-Request-Source", " tui ");

    let streaming = build_headers(&config, true);
    assert_eq!(
        streaming.get(HEADER_CONTENT_TYPE).map(String::as_str),
        Some("application/json")
    );
    assert_eq!(
        streaming.get(HEADER_ACCEPT).map(String::as_str),
        Some(EVENT_STREAM_MIME)
    );
    assert_eq!(
        streaming.get(HEADER_ACCEPT_LANGUAGE).map(String::as_str),
        Some("de")
    );
    assert_eq!(
        streaming.get(HEADER_USER_AGENT).map(String::as_str),
        Some("interview-tui/0.1")
    );
    // Extra headers are lowercased and trimmed.
    assert_eq!(
        streaming.get("x-request-source").map(String::as_str),
        Some("tui")
    );

    let buffered = build_headers(&config, false);
    assert!(buffered.get(HEADER_ACCEPT).is_none());
}

#[test]
fn header_map_skips_blank_optional_values() {
    let config = InterviewApiConfig::new(InterviewScope::Project)
        .with_language("   ")
        .with_user_agent("");

    let headers = build_headers(&config, false);
    assert!(headers.get(HEADER_ACCEPT_LANGUAGE).is_none());
    assert!(headers.get(HEADER_USER_AGENT).is_none());
}

#[test]
fn scope_parse_accepts_both_change_request_spellings() {
    assert_eq!(
        InterviewScope::parse("change-request"),
        Some(InterviewScope::ChangeRequest)
    );
    assert_eq!(
        InterviewScope::parse("CHANGE_REQUEST"),
        Some(InterviewScope::ChangeRequest)
    );
    assert_eq!(InterviewScope::parse("projects"), None);
    assert_eq!(InterviewScope::ChangeRequest.as_str(), "change_request");
}

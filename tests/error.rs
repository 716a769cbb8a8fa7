use interview_api::error::parse_error_message;
use interview_api::InterviewApiError;
use reqwest::StatusCode;

#[test]
fn parse_error_message_prefers_detail_field() {
    let body = r#"{"detail":"scope not recognized"}"#;
    let message = parse_error_message(StatusCode::UNPROCESSABLE_ENTITY, body);
    assert_eq!(message, "scope not recognized");
}

#[test]
fn parse_error_message_ignores_blank_detail() {
    let body = r#"{"detail":"   "}"#;
    let message = parse_error_message(StatusCode::BAD_REQUEST, body);
    assert_eq!(message, body);
}

#[test]
fn parse_error_message_falls_back_to_raw_body() {
    let message = parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, "raw failure text");
    assert_eq!(message, "raw failure text");
}

#[test]
fn parse_error_message_marks_empty_bodies_with_status() {
    let message = parse_error_message(StatusCode::BAD_GATEWAY, "   ");
    assert_eq!(message, "(502)");
}

#[test]
fn display_formats_are_stable() {
    let status = InterviewApiError::Status(StatusCode::NOT_FOUND, "session missing".to_owned());
    assert_eq!(status.to_string(), "HTTP 404 Not Found session missing");

    assert_eq!(
        InterviewApiError::StreamUnavailable.to_string(),
        "response stream unavailable"
    );

    let header = InterviewApiError::InvalidHeader("invalid header key: x y".to_owned());
    assert_eq!(header.to_string(), "invalid header: invalid header key: x y");
}

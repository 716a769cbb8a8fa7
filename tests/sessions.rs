use interview_api::sessions::{
    feedback_entry_from_json, session_detail_from_json, session_list_from_json,
    spec_preview_from_json,
};
use interview_api::{InterviewScope, Role};
use serde_json::json;

#[test]
fn session_list_accepts_bare_array_and_wrapped_object() {
    let bare = json!([
        {"id": "s-1", "scope": "process", "created_at": "2026-08-01T10:00:00Z", "turn_count": 4, "has_spec": true}
    ]);
    let from_bare = session_list_from_json(&bare, InterviewScope::Project);
    assert_eq!(from_bare.len(), 1);
    assert_eq!(from_bare[0].id, "s-1");
    assert_eq!(from_bare[0].scope, InterviewScope::Process);
    assert_eq!(from_bare[0].turn_count, 4);
    assert!(from_bare[0].has_spec);

    let wrapped = json!({"sessions": [{"id": "s-2"}]});
    let from_wrapped = session_list_from_json(&wrapped, InterviewScope::Project);
    assert_eq!(from_wrapped.len(), 1);
    assert_eq!(from_wrapped[0].scope, InterviewScope::Project);
    assert_eq!(from_wrapped[0].turn_count, 0);
    assert!(!from_wrapped[0].has_spec);
}

#[test]
fn session_list_drops_entries_without_an_id() {
    let value = json!([
        {"id": "s-1"},
        {"created_at": "2026-08-01T10:00:00Z"},
        {"id": "   "}
    ]);

    let summaries = session_list_from_json(&value, InterviewScope::Project);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, "s-1");
}

#[test]
fn session_list_tolerates_non_list_payloads() {
    assert!(session_list_from_json(&json!({"count": 3}), InterviewScope::Project).is_empty());
    assert!(session_list_from_json(&json!("nope"), InterviewScope::Project).is_empty());
}

#[test]
fn session_detail_normalizes_transcript_and_feedback() {
    let value = json!({
        "id": "s-9",
        "scope": "change_request",
        "created_at": "2026-08-02T09:30:00Z",
        "transcript": [
            {"id": "m-1", "role": "user", "content": "We need reporting"},
            {"role": "assistant", "content": "What cadence?"},
            {"id": "m-3", "role": "assistant", "content": ""},
            {"id": "m-4", "role": "narrator", "content": "aside"}
        ],
        "spec_markdown": "# Spec",
        "feedback": [
            {"id": "f-1", "message": "add KPIs", "created_at": "2026-08-03T08:00:00Z"},
            {"message": "orphan without id"}
        ]
    });

    let detail = session_detail_from_json(&value, "s-9", InterviewScope::Project);
    assert_eq!(detail.id, "s-9");
    assert_eq!(detail.scope, InterviewScope::ChangeRequest);
    assert_eq!(detail.spec_markdown.as_deref(), Some("# Spec"));

    // Empty-content entry dropped; id-less entry kept with a synthesized id;
    // unknown role falls back to assistant.
    assert_eq!(detail.transcript.len(), 3);
    assert_eq!(detail.transcript[0].id, "m-1");
    assert!(detail.transcript[1].id.starts_with("local-msg-"));
    assert_eq!(detail.transcript[1].role, Role::Assistant);
    assert_eq!(detail.transcript[2].role, Role::Assistant);

    assert_eq!(detail.feedback.len(), 1);
    assert_eq!(detail.feedback[0].message, "add KPIs");
}

#[test]
fn session_detail_falls_back_to_requested_id_and_scope() {
    let detail = session_detail_from_json(&json!({}), "s-requested", InterviewScope::Process);
    assert_eq!(detail.id, "s-requested");
    assert_eq!(detail.scope, InterviewScope::Process);
    assert!(detail.transcript.is_empty());
    assert!(detail.feedback.is_empty());
    assert_eq!(detail.spec_markdown, None);
}

#[test]
fn feedback_entry_requires_id_and_message() {
    assert!(feedback_entry_from_json(&json!({"id": "f-1", "message": "ok"})).is_some());
    assert!(feedback_entry_from_json(&json!({"id": "f-1"})).is_none());
    assert!(feedback_entry_from_json(&json!({"message": "ok"})).is_none());
}

#[test]
fn spec_preview_drops_pathless_diagrams() {
    let value = json!({
        "markdown": "# Spec",
        "markdown_path": "/out/spec.md",
        "diagrams": [
            {"title": "Context", "path": "/out/context.svg"},
            {"title": "Broken"},
            {"path": "/out/untitled.svg"}
        ]
    });

    let preview = spec_preview_from_json(&value);
    assert_eq!(preview.markdown, "# Spec");
    assert_eq!(preview.markdown_path.as_deref(), Some("/out/spec.md"));
    assert_eq!(preview.pdf_path, None);
    assert_eq!(preview.diagrams.len(), 2);
    assert_eq!(preview.diagrams[0].title, "Context");
    assert_eq!(preview.diagrams[1].title, "");
}

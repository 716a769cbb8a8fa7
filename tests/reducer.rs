use interview_api::{AgentEvent, ChatMessage, Conversation, Role, SessionStatus};

fn started() -> AgentEvent {
    AgentEvent::RunStarted {
        thread_id: Some("t-1".to_owned()),
        run_id: Some("r-1".to_owned()),
    }
}

fn content(message_id: &str, delta: &str) -> AgentEvent {
    AgentEvent::TextMessageContent {
        message_id: message_id.to_owned(),
        delta: delta.to_owned(),
    }
}

#[test]
fn full_run_assembles_one_assistant_message() {
    let mut conversation = Conversation::new();
    conversation.push_user_message("Tell me about the project");

    conversation.apply(&started());
    assert_eq!(conversation.status(), SessionStatus::Streaming);

    conversation.apply(&AgentEvent::TextMessageStart {
        message_id: "m-1".to_owned(),
    });
    conversation.apply(&content("m-1", "What problem "));
    conversation.apply(&content("m-1", "are you solving?"));
    conversation.apply(&AgentEvent::TextMessageEnd {
        message_id: "m-1".to_owned(),
    });
    conversation.apply(&AgentEvent::RunFinished {
        thread_id: Some("t-1".to_owned()),
        run_id: Some("r-1".to_owned()),
    });

    assert_eq!(conversation.status(), SessionStatus::Idle);
    let messages = conversation.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "What problem are you solving?");
    assert!(!messages[1].streaming);
}

#[test]
fn repeated_start_for_same_id_is_idempotent() {
    let mut conversation = Conversation::new();
    conversation.apply(&started());
    conversation.apply(&AgentEvent::TextMessageStart {
        message_id: "m-1".to_owned(),
    });
    conversation.apply(&content("m-1", "hello"));
    conversation.apply(&AgentEvent::TextMessageStart {
        message_id: "m-1".to_owned(),
    });

    assert_eq!(conversation.messages().len(), 1);
    assert_eq!(conversation.messages()[0].content, "hello");
}

#[test]
fn content_without_start_seeds_a_new_message() {
    let mut conversation = Conversation::new();
    conversation.apply(&started());
    conversation.apply(&content("m-7", "orphan delta"));

    assert_eq!(conversation.messages().len(), 1);
    assert_eq!(conversation.messages()[0].content, "orphan delta");
    assert!(conversation.messages()[0].streaming);
}

#[test]
fn deltas_interleave_strictly_in_arrival_order() {
    let mut conversation = Conversation::new();
    conversation.apply(&started());
    conversation.apply(&content("a", "1"));
    conversation.apply(&content("b", "x"));
    conversation.apply(&content("a", "2"));
    conversation.apply(&content("b", "y"));

    let messages = conversation.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "12");
    assert_eq!(messages[1].content, "xy");
}

#[test]
fn run_error_appends_system_notice_and_marks_error() {
    let mut conversation = Conversation::new();
    conversation.apply(&started());
    conversation.apply(&content("m-1", "partial"));
    conversation.apply(&AgentEvent::RunError {
        message: "backend exploded".to_owned(),
    });

    assert_eq!(conversation.status(), SessionStatus::Error);
    let messages = conversation.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::System);
    assert_eq!(messages[1].content, "Agent error: backend exploded");
    // Partial output stays in place and is no longer marked streaming.
    assert_eq!(messages[0].content, "partial");
    assert!(!messages[0].streaming);
}

#[test]
fn cancellation_resolves_to_idle_not_error() {
    let mut conversation = Conversation::new();
    conversation.apply(&started());
    conversation.apply(&content("m-1", "half an ans"));

    conversation.on_cancelled();

    assert_eq!(conversation.status(), SessionStatus::Idle);
    assert_eq!(conversation.messages()[0].content, "half an ans");
    assert!(!conversation.messages()[0].streaming);
}

#[test]
fn opening_a_session_loads_history_and_new_run_leaves_it() {
    let mut conversation = Conversation::new();
    conversation.open_session(
        "s-1",
        vec![
            ChatMessage::new("m-1", Role::User, "old question"),
            ChatMessage::new("m-2", Role::Assistant, "old answer"),
        ],
    );

    assert_eq!(conversation.viewing_session(), Some("s-1"));
    assert_eq!(conversation.messages().len(), 2);

    conversation.apply(&started());
    assert_eq!(conversation.viewing_session(), None);
    assert_eq!(conversation.status(), SessionStatus::Streaming);
}

#[test]
fn history_snapshot_mirrors_the_message_list() {
    let mut conversation = Conversation::new();
    let id = conversation.push_user_message("hi");
    conversation.apply(&started());
    conversation.apply(&content("m-1", "hello back"));

    let history = conversation.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, id);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[1].content, "hello back");
}

use super::{use_case_with, use_case_with_interrupt};
use crate::adapter::{InterruptAfter, StreamScript, StubBackend};
use crate::domain::{ConversationRef, Message, Role, SendOptions, SessionState};
use crate::usecase::StreamOutcome;
use common::backend::{ChatRequest, SseEvent};
use common::domain::{ConversationId, ModelName};
use common::error::Error;
use std::sync::Arc;

fn opts() -> SendOptions {
    SendOptions::default()
}

#[test]
fn test_hello_scenario_streams_into_one_assistant_message() {
    let backend = Arc::new(StubBackend::new().with_stream(&["Hi", " there"]));
    let (mut uc, view) = use_case_with(Arc::clone(&backend));

    let outcome = uc.send("Hello", &opts()).unwrap();

    assert_eq!(outcome, StreamOutcome::Completed);
    assert_eq!(
        uc.transcript().messages(),
        [Message::user("Hello"), Message::assistant("Hi there")]
    );
    let snapshots = view.snapshots();
    // ユーザーの発言は受信より前に表示される
    assert_eq!(snapshots[0].messages(), [Message::user("Hello")]);
    assert_eq!(
        snapshots[1].messages(),
        [Message::user("Hello"), Message::pending("Hi")]
    );
    assert_eq!(
        snapshots[2].messages(),
        [Message::user("Hello"), Message::pending("Hi there")]
    );
    assert_eq!(snapshots.len(), 4);
    assert!(uc.live_session().is_none());

    let targets = backend.stream_targets();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].conversation_id, None);
    assert_eq!(targets[0].message, "Hello");
    assert_eq!(targets[0].model, None);
    assert!(!targets[0].use_rag);
}

#[test]
fn test_open_message_is_concatenation_of_chunks_in_order() {
    let (mut uc, _view) = use_case_with(Arc::new(StubBackend::new()));
    uc.open_session("q", &opts()).unwrap();
    let chunks = ["a", "bc", "", "d", " e"];
    let mut expected = String::new();
    for chunk in chunks {
        uc.on_chunk(chunk).unwrap();
        expected.push_str(chunk);
        assert_eq!(uc.transcript().open_message(), Some(&Message::pending(expected.clone())));
        assert_eq!(uc.live_session().map(|s| s.buffer()), Some(expected.as_str()));
    }
    assert_eq!(uc.live_session().map(|s| s.state()), Some(SessionState::Streaming));
}

#[test]
fn test_done_sentinel_completes_and_closes_stream() {
    let backend = Arc::new(StubBackend::new().with_stream(&["Hi", "[DONE]", "never"]));
    let (mut uc, _view) = use_case_with(Arc::clone(&backend));

    uc.send("Hello", &opts()).unwrap();

    assert_eq!(uc.transcript().last(), Some(&Message::assistant("Hi")));
    assert_eq!(backend.delivered(), vec![2]);
    assert_eq!(uc.conversation(), &ConversationRef::Placeholder);
}

#[test]
fn test_only_message_events_are_applied() {
    let backend = Arc::new(StubBackend::new().with_script(StreamScript {
        events: vec![
            SseEvent {
                event: Some("ping".to_string()),
                data: "keepalive".to_string(),
                id: None,
            },
            SseEvent::message("A"),
            SseEvent {
                event: Some("message".to_string()),
                data: "B".to_string(),
                id: Some("2".to_string()),
            },
        ],
        fail_with: None,
    }));
    let (mut uc, _view) = use_case_with(backend);

    uc.send("Hello", &opts()).unwrap();

    assert_eq!(uc.transcript().last(), Some(&Message::assistant("AB")));
}

#[test]
fn test_error_after_chunks_finalizes_partial_and_surfaces_once() {
    let backend = Arc::new(StubBackend::new().with_failing_stream(&["Par", "tial"], "connection reset"));
    let (mut uc, view) = use_case_with(backend);

    let err = uc.send("Hello", &opts()).unwrap_err();

    assert_eq!(err, Error::stream("connection reset"));
    assert_eq!(
        uc.transcript().messages(),
        [Message::user("Hello"), Message::assistant("Partial")]
    );
    assert_eq!(uc.transcript().pending_count(), 0);
    assert_eq!(uc.conversation(), &ConversationRef::Placeholder);

    // 終端後の通知は transcript を変えず、エラーも返さない
    let before = view.snapshots().len();
    assert!(uc.on_error(Error::stream("again")).is_ok());
    assert!(uc.on_complete().is_ok());
    assert_eq!(view.snapshots().len(), before);
}

#[test]
fn test_connect_failure_leaves_only_user_message() {
    let (mut uc, _view) = use_case_with(Arc::new(StubBackend::new()));

    let err = uc.send("Hello", &opts()).unwrap_err();

    assert_eq!(err.exit_code(), 69);
    assert_eq!(uc.transcript().messages(), [Message::user("Hello")]);
    assert!(uc.live_session().is_none());
}

#[test]
fn test_complete_and_error_are_idempotent() {
    let (mut uc, view) = use_case_with(Arc::new(StubBackend::new()));
    uc.open_session("Hello", &opts()).unwrap();
    uc.on_chunk("Hi").unwrap();
    uc.on_complete().unwrap();
    let after_complete = uc.transcript().clone();
    let refreshes = view.snapshots().len();

    uc.on_complete().unwrap();
    uc.on_error(Error::stream("late")).unwrap();
    uc.on_chunk("late chunk").unwrap();
    uc.close_session().unwrap();

    assert_eq!(uc.transcript(), &after_complete);
    assert_eq!(view.snapshots().len(), refreshes);
}

#[test]
fn test_two_sequential_sends_do_not_touch_first_reply() {
    let backend = Arc::new(StubBackend::new().with_stream(&["A1"]).with_stream(&["B1", "B2"]));
    let (mut uc, view) = use_case_with(Arc::clone(&backend));

    uc.send("first", &opts()).unwrap();
    uc.send("second", &opts()).unwrap();

    assert_eq!(
        uc.transcript().messages(),
        [
            Message::user("first"),
            Message::assistant("A1"),
            Message::user("second"),
            Message::assistant("B1B2"),
        ]
    );
    for snapshot in view.snapshots() {
        assert!(snapshot.pending_count() <= 1);
        if snapshot.len() > 2 {
            assert_eq!(snapshot.messages()[1], Message::assistant("A1"));
        }
    }
    // プレースホルダは新規作成と同じ /stream/ に送られる
    let targets = backend.stream_targets();
    assert_eq!(targets[1].conversation_id, None);
}

#[test]
fn test_opening_a_session_closes_the_live_one() {
    let (mut uc, _view) = use_case_with(Arc::new(StubBackend::new()));
    let first = uc.open_session("a", &opts()).unwrap();
    uc.on_chunk("x").unwrap();

    let second = uc.open_session("b", &opts()).unwrap();

    assert_ne!(first, second);
    assert_eq!(uc.live_session().map(|s| s.id()), Some(second));
    assert_eq!(
        uc.transcript().messages(),
        [Message::user("a"), Message::assistant("x"), Message::user("b")]
    );
    // クローズではプレースホルダを置かない
    assert_eq!(uc.conversation(), &ConversationRef::New);
}

#[test]
fn test_known_conversation_streams_to_its_path() {
    let backend = Arc::new(StubBackend::new().with_stream(&["ok"]));
    let (mut uc, _view) = use_case_with(Arc::clone(&backend));
    uc.use_conversation(ConversationId::new("c-1"));
    let opts = SendOptions {
        model: Some(ModelName::new("gpt-4o")),
        use_rag: true,
        ..SendOptions::default()
    };

    uc.send("more", &opts).unwrap();

    let target = &backend.stream_targets()[0];
    assert_eq!(target.conversation_id.as_deref(), Some("c-1"));
    assert_eq!(target.model.as_deref(), Some("gpt-4o"));
    assert!(target.use_rag);
    assert_eq!(
        uc.conversation(),
        &ConversationRef::Known(ConversationId::new("c-1"))
    );
}

#[test]
fn test_system_role_is_recorded_as_system_message() {
    let (mut uc, _view) = use_case_with(Arc::new(StubBackend::new().with_stream(&["ok"])));
    let opts = SendOptions {
        role: Role::System,
        ..SendOptions::default()
    };

    uc.send("be brief", &opts).unwrap();

    assert_eq!(uc.transcript().messages()[0], Message::system("be brief"));
}

#[test]
fn test_interrupt_closes_session_with_partial_content() {
    let backend = Arc::new(StubBackend::new().with_stream(&["Hi", " there", " more"]));
    let interrupt = Arc::new(InterruptAfter::new(1));
    let (mut uc, _view) = use_case_with_interrupt(Arc::clone(&backend), interrupt.clone());

    let outcome = uc.send("Hello", &opts()).unwrap();

    assert_eq!(outcome, StreamOutcome::Interrupted);
    assert_eq!(backend.delivered(), vec![2]);
    assert_eq!(
        uc.transcript().messages(),
        [Message::user("Hello"), Message::assistant("Hi")]
    );
    assert!(uc.live_session().is_none());
    assert_eq!(uc.conversation(), &ConversationRef::New);
    assert!(interrupt.clears.load(std::sync::atomic::Ordering::SeqCst) >= 2);
}

#[test]
fn test_empty_message_is_not_sent() {
    let backend = Arc::new(StubBackend::new().with_stream(&["x"]));
    let (mut uc, view) = use_case_with(Arc::clone(&backend));

    let err = uc.send("   ", &opts()).unwrap_err();

    assert!(err.is_usage());
    assert!(uc.transcript().is_empty());
    assert!(backend.stream_targets().is_empty());
    assert!(view.snapshots().is_empty());
}

#[test]
fn test_blocking_send_appends_final_reply_and_adopts_id() {
    let backend = Arc::new(StubBackend::new().with_chat_response("c-9", "Full answer"));
    let (mut uc, _view) = use_case_with(Arc::clone(&backend));
    let opts = SendOptions {
        stream: false,
        use_rag: true,
        k: 5,
        ..SendOptions::default()
    };

    uc.send("q", &opts).unwrap();

    assert_eq!(
        uc.transcript().messages(),
        [Message::user("q"), Message::assistant("Full answer")]
    );
    assert_eq!(
        uc.conversation(),
        &ConversationRef::Known(ConversationId::new("c-9"))
    );
    assert_eq!(
        backend.chat_requests(),
        vec![ChatRequest {
            conversation_id: None,
            message: "q".to_string(),
            model: None,
            use_rag: true,
            k: 5,
        }]
    );
}

#[test]
fn test_blocking_send_failure_keeps_only_user_message() {
    let (mut uc, _view) = use_case_with(Arc::new(StubBackend::new()));
    let opts = SendOptions {
        stream: false,
        ..SendOptions::default()
    };

    let err = uc.send("q", &opts).unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(uc.transcript().messages(), [Message::user("q")]);
    assert_eq!(uc.conversation(), &ConversationRef::New);
}

#[test]
fn test_placeholder_is_sent_as_empty_id_to_chat() {
    let backend = Arc::new(
        StubBackend::new()
            .with_stream(&["streamed"])
            .with_chat_response("", "blocking"),
    );
    let (mut uc, _view) = use_case_with(Arc::clone(&backend));

    uc.send("one", &opts()).unwrap();
    let blocking = SendOptions {
        stream: false,
        ..SendOptions::default()
    };
    uc.send("two", &blocking).unwrap();

    assert_eq!(backend.chat_requests()[0].conversation_id.as_deref(), Some(""));
    // 空の ID は採用しない
    assert_eq!(uc.conversation(), &ConversationRef::Placeholder);
}

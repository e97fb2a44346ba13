//! Session lifecycle and queue behavior
//!
//! Terminal-transition semantics, state-change notification fan-out,
//! pending-action bookkeeping, and the strict FIFO guarantee of the
//! per-session action queue.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::*;
use parking_lot::Mutex;

use rjingle_session_core::{
    Session, SessionEvent, SessionKind, SessionOptions, SessionResult, SessionState,
    SignalingEvent,
};
use rjingle_stanza_core::{
    Action, Content, JinglePayload, Reason, ReasonCondition, StanzaKind,
};

#[tokio::test]
async fn loud_end_sends_exactly_one_terminate() {
    let (manager, mut handles) = manager();
    let session = manager
        .create_session(
            PEER,
            Box::new(StubKind),
            SessionOptions::default().with_sid("sid123"),
        )
        .unwrap();
    next_event(&mut handles.events).await; // created

    session
        .end(Reason::new(ReasonCondition::Success), false)
        .await;
    // A second end is a no-op.
    session
        .end(Reason::new(ReasonCondition::Gone), false)
        .await;

    let terminate = next_outbound(&mut handles.outbound).await;
    assert_eq!(terminate.kind, StanzaKind::Set);
    let jingle = terminate.jingle.unwrap();
    assert_eq!(jingle.action, "session-terminate");
    assert_eq!(jingle.sid, "sid123");
    assert_eq!(jingle.reason.unwrap().condition, ReasonCondition::Success);
    assert_no_outbound(&mut handles.outbound).await;

    let SignalingEvent::Terminated { reason, .. } = next_event(&mut handles.events).await else {
        panic!("expected a terminated notification");
    };
    assert_eq!(reason.condition, ReasonCondition::Success);
    assert_eq!(manager.session_count(), 0);
}

#[tokio::test]
async fn silent_end_notifies_without_sending() {
    let (manager, mut handles) = manager();
    let session = manager
        .create_session(
            PEER,
            Box::new(StubKind),
            SessionOptions::default().with_sid("sid123"),
        )
        .unwrap();
    next_event(&mut handles.events).await; // created

    session
        .end(Reason::new(ReasonCondition::Success), true)
        .await;

    assert!(matches!(
        next_event(&mut handles.events).await,
        SignalingEvent::Terminated { .. }
    ));
    assert_no_outbound(&mut handles.outbound).await;
}

#[tokio::test]
async fn state_changes_fan_out_named_notifications() {
    let (manager, _handles) = manager();
    let session = manager
        .create_session(PEER, Box::new(StubKind), SessionOptions::default())
        .unwrap();
    let mut events = session.subscribe();

    session.set_session_state(SessionState::Pending);
    // Re-writing the same value must not notify again.
    session.set_session_state(SessionState::Pending);

    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::SessionStateChanged {
            old: SessionState::Starting,
            new: SessionState::Pending,
        }
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::SessionStateEntered {
            state: SessionState::Pending
        }
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::SessionStateExited {
            state: SessionState::Starting
        }
    ));

    // The next notification comes from a different write entirely.
    session.set_session_state(SessionState::Active);
    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::SessionStateChanged {
            old: SessionState::Pending,
            new: SessionState::Active,
        }
    ));
}

#[tokio::test]
async fn connection_state_is_independent_of_session_state() {
    let (manager, _handles) = manager();
    let session = manager
        .create_session(PEER, Box::new(StubKind), SessionOptions::default())
        .unwrap();
    let mut events = session.subscribe();

    session.set_connection_state(rjingle_session_core::ConnectionState::Connecting);
    session.set_connection_state(rjingle_session_core::ConnectionState::Connected);
    session.set_connection_state(rjingle_session_core::ConnectionState::Interrupted);
    session.set_connection_state(rjingle_session_core::ConnectionState::Connected);

    assert_eq!(session.session_state(), SessionState::Starting);

    let mut connected_entries = 0;
    for _ in 0..12 {
        match events.recv().await.unwrap() {
            SessionEvent::ConnectionStateEntered {
                state: rjingle_session_core::ConnectionState::Connected,
            } => connected_entries += 1,
            SessionEvent::SessionStateChanged { .. } => {
                panic!("connection writes must not touch session state")
            }
            _ => {}
        }
    }
    assert_eq!(connected_entries, 2);
}

#[tokio::test]
async fn result_clears_the_pending_action() {
    let (manager, mut handles) = manager();
    let session = manager
        .create_session(
            PEER,
            Box::new(StubKind),
            SessionOptions::default().with_sid("sid123"),
        )
        .unwrap();
    session.set_session_state(SessionState::Active);

    session.send(Action::ContentModify, JinglePayload::new());
    next_outbound(&mut handles.outbound).await;
    assert_eq!(session.pending_action(), Some(Action::ContentModify));

    manager.process(result_request(PEER, "123", "sid123")).await;
    assert_eq!(session.pending_action(), None);
}

#[tokio::test]
async fn terminate_clears_the_pending_action() {
    let (manager, mut handles) = manager();
    let session = manager
        .create_session(
            PEER,
            Box::new(StubKind),
            SessionOptions::default().with_sid("sid123"),
        )
        .unwrap();
    session.set_session_state(SessionState::Active);

    session.send(Action::ContentModify, JinglePayload::new());
    next_outbound(&mut handles.outbound).await;

    session
        .end(Reason::new(ReasonCondition::Success), false)
        .await;
    assert_eq!(session.pending_action(), None);
}

#[tokio::test]
async fn cancel_and_decline_carry_their_reasons() {
    let (manager, mut handles) = manager();

    // The initiator withdraws its own offer.
    let outgoing = manager
        .create_session(
            PEER,
            Box::new(StubKind),
            SessionOptions::default().with_sid("sid123"),
        )
        .unwrap();
    outgoing.start().await.unwrap();
    next_outbound(&mut handles.outbound).await; // session-initiate
    outgoing.cancel().await;

    let terminate = next_outbound(&mut handles.outbound).await;
    let jingle = terminate.jingle.unwrap();
    assert_eq!(jingle.action, "session-terminate");
    assert_eq!(jingle.reason.unwrap().condition, ReasonCondition::Cancel);

    // The responder refuses the peer's offer.
    manager
        .process(set_request(
            PEER,
            "1",
            action_payload("sid124", "session-initiate")
                .with_contents(vec![Content::tagged("test", "test")]),
        ))
        .await;
    next_outbound(&mut handles.outbound).await; // ack
    let incoming = manager.session("sid124").unwrap();
    incoming.decline().await;

    let terminate = next_outbound(&mut handles.outbound).await;
    let jingle = terminate.jingle.unwrap();
    assert_eq!(jingle.action, "session-terminate");
    assert_eq!(jingle.sid, "sid124");
    assert_eq!(jingle.reason.unwrap().condition, ReasonCondition::Decline);
}

/// A kind whose first handler stalls, to prove queued actions never
/// overtake one another.
struct SlowKind {
    processed: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SessionKind for SlowKind {
    async fn on_session_info(
        &self,
        _session: &Session,
        payload: JinglePayload,
        _ack: &rjingle_session_core::Completion,
    ) -> SessionResult<()> {
        let first = self.processed.lock().is_empty();
        if first {
            // Suspend mid-handler; the queue must wait for us.
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        self.processed
            .lock()
            .push(payload.info.keys().next().cloned().unwrap_or_default());
        Ok(())
    }
}

#[tokio::test]
async fn queued_actions_run_strictly_in_order() {
    let (manager, mut handles) = manager();
    let processed = Arc::new(Mutex::new(Vec::new()));
    let session = manager
        .create_session(
            PEER,
            Box::new(SlowKind {
                processed: processed.clone(),
            }),
            SessionOptions::default().with_sid("sid123"),
        )
        .unwrap();
    session.set_session_state(SessionState::Active);

    for (id, marker) in [("1", "first"), ("2", "second"), ("3", "third")] {
        manager
            .process(set_request(
                PEER,
                id,
                action_payload("sid123", "session-info").with_info_flag(marker),
            ))
            .await;
    }

    // Acks come back in submission order even though the first handler
    // slept while the others were already queued.
    for expected in ["1", "2", "3"] {
        let ack = next_outbound(&mut handles.outbound).await;
        assert_eq!(ack.kind, StanzaKind::Result);
        assert_eq!(ack.id.as_deref(), Some(expected));
    }
    assert_eq!(*processed.lock(), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn actions_queued_behind_a_terminate_become_no_ops() {
    let (manager, mut handles) = manager();
    let processed = Arc::new(Mutex::new(Vec::new()));
    let session = manager
        .create_session(
            PEER,
            Box::new(SlowKind {
                processed: processed.clone(),
            }),
            SessionOptions::default().with_sid("sid123"),
        )
        .unwrap();
    session.set_session_state(SessionState::Active);

    // The first handler stalls, so all three requests pass validation while
    // the session is still alive. The content-add runs only after the
    // terminate has ended the session: it must be acknowledged as a no-op,
    // with no content-reject following.
    manager
        .process(set_request(
            PEER,
            "1",
            action_payload("sid123", "session-info").with_info_flag("stall"),
        ))
        .await;
    manager
        .process(set_request(
            PEER,
            "2",
            action_payload("sid123", "session-terminate"),
        ))
        .await;
    manager
        .process(
            set_request(
                PEER,
                "3",
                action_payload("sid123", "content-add")
                    .with_contents(vec![Content::tagged("test", "test")]),
            ),
        )
        .await;

    for expected in ["1", "2", "3"] {
        let ack = next_outbound(&mut handles.outbound).await;
        assert_eq!(ack.id.as_deref(), Some(expected));
        assert_eq!(ack.kind, StanzaKind::Result);
    }

    assert!(session.is_ended());
    assert_no_outbound(&mut handles.outbound).await;
}

#[tokio::test]
async fn ending_all_peer_sessions_spares_other_peers() {
    let (manager, mut handles) = manager();
    for (sid, peer) in [
        ("sid123", PEER),
        ("sid124", PEER),
        ("sid125", "otherpeer@example.com"),
    ] {
        manager
            .create_session(
                peer,
                Box::new(StubKind),
                SessionOptions::default().with_sid(sid),
            )
            .unwrap();
        next_event(&mut handles.events).await; // created
    }

    manager
        .end_peer_sessions(PEER, Reason::success(), true)
        .await;

    let mut terminated = Vec::new();
    for _ in 0..2 {
        let SignalingEvent::Terminated { session, .. } = next_event(&mut handles.events).await
        else {
            panic!("expected a terminated notification");
        };
        assert_eq!(session.peer(), PEER);
        terminated.push(session.sid().to_string());
    }
    terminated.sort();
    assert_eq!(terminated, ["sid123", "sid124"]);

    assert_eq!(manager.session_count(), 1);
    assert!(manager.session("sid125").is_some());
}

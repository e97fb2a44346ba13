//! Tie-break resolution
//!
//! Racing negotiation attempts must resolve deterministically on both
//! sides, with no extra round trip: duplicate sids, overlapping content
//! offers, in-flight pending actions, and the silent teardown after losing
//! an initiate tie-break.

mod common;

use common::*;

use rjingle_session_core::{
    SessionManager, SessionManagerConfig, SessionOptions, SessionState, SignalingEvent,
};
use rjingle_stanza_core::{Action, JinglePayload, ReasonCondition, StanzaError, StanzaKind};

#[tokio::test]
async fn duplicate_sid_tie_break_rejects_the_lesser_identity() {
    init_tracing();
    // zuser > peer, so the local attempt is authoritative and the peer's
    // colliding initiate is rejected.
    let (manager, mut handles) = manager();
    let session = manager
        .create_session(
            PEER,
            Box::new(StubKind),
            SessionOptions::default()
                .with_sid("sid123")
                .with_description_types(vec!["test".into()]),
        )
        .unwrap();
    session.set_session_state(SessionState::Pending);

    manager
        .process(initiate_request(PEER, "123", "sid123", "test"))
        .await;

    let reply = next_outbound(&mut handles.outbound).await;
    assert_eq!(reply.to, PEER);
    assert_eq!(reply.id.as_deref(), Some("123"));
    assert_eq!(reply.error.unwrap(), StanzaError::tie_break());
}

#[tokio::test]
async fn duplicate_sid_from_greater_identity_is_not_tie_broken() {
    // auser < peer: the peer's attempt is authoritative, so the reply is
    // the ordinary out-of-order rejection, not a tie-break.
    let (manager, mut handles) =
        SessionManager::new(SessionManagerConfig::new("auser@example.com"));
    let session = manager
        .create_session(
            PEER,
            Box::new(StubKind),
            SessionOptions::default().with_sid("sid123"),
        )
        .unwrap();
    session.set_session_state(SessionState::Pending);

    manager
        .process(initiate_request(PEER, "123", "sid123", "test"))
        .await;

    let reply = next_outbound(&mut handles.outbound).await;
    assert_eq!(reply.error.unwrap(), StanzaError::out_of_order());
}

#[tokio::test]
async fn exactly_one_side_rejects_a_symmetric_race() {
    // Two managers race the same sid at each other. Exactly one of them -
    // always the lexicographically lesser identity - must reject with
    // tie-break, regardless of arrival order.
    for flip in [false, true] {
        let (alpha, mut alpha_handles) =
            SessionManager::new(SessionManagerConfig::new("auser@example.com"));
        let (zeta, mut zeta_handles) =
            SessionManager::new(SessionManagerConfig::new("zuser@example.com"));

        let alpha_session = alpha
            .create_session(
                "zuser@example.com",
                Box::new(StubKind),
                SessionOptions::default()
                    .with_sid("sid123")
                    .with_description_types(vec!["test".into()]),
            )
            .unwrap();
        alpha_session.set_session_state(SessionState::Pending);

        let zeta_session = zeta
            .create_session(
                "auser@example.com",
                Box::new(StubKind),
                SessionOptions::default()
                    .with_sid("sid123")
                    .with_description_types(vec!["test".into()]),
            )
            .unwrap();
        zeta_session.set_session_state(SessionState::Pending);

        let to_alpha = initiate_request("zuser@example.com", "1", "sid123", "test");
        let to_zeta = initiate_request("auser@example.com", "2", "sid123", "test");

        if flip {
            zeta.process(to_zeta).await;
            alpha.process(to_alpha).await;
        } else {
            alpha.process(to_alpha).await;
            zeta.process(to_zeta).await;
        }

        // zeta wins: it rejects the peer's attempt with tie-break.
        let from_zeta = next_outbound(&mut zeta_handles.outbound).await;
        assert_eq!(from_zeta.error.unwrap(), StanzaError::tie_break());

        // alpha lost: its reply is not a tie-break.
        let from_alpha = next_outbound(&mut alpha_handles.outbound).await;
        assert_ne!(from_alpha.error.unwrap(), StanzaError::tie_break());
    }
}

#[tokio::test]
async fn overlapping_content_tie_break_favors_the_greater_sid() {
    let (manager, mut handles) = manager();

    // A pending outgoing offer for "test" under a sid greater than the
    // incoming one: the existing session survives, the new one is rejected.
    let session = manager
        .create_session(
            PEER,
            Box::new(StubKind),
            SessionOptions::default()
                .with_sid("sid998")
                .with_description_types(vec!["test".into()]),
        )
        .unwrap();
    session.set_session_state(SessionState::Pending);

    // An unrelated pending session must not interfere.
    let other = manager
        .create_session(
            PEER,
            Box::new(StubKind),
            SessionOptions::default()
                .with_sid("sid999")
                .with_description_types(vec!["othertest".into()]),
        )
        .unwrap();
    other.set_session_state(SessionState::Pending);

    manager
        .process(initiate_request(PEER, "123", "sid123", "test"))
        .await;

    let reply = next_outbound(&mut handles.outbound).await;
    assert_eq!(reply.error.unwrap(), StanzaError::tie_break());
    assert!(manager.session("sid123").is_none());
}

#[tokio::test]
async fn overlapping_content_with_lesser_sid_lets_the_offer_through() {
    let (manager, mut handles) = manager();

    let session = manager
        .create_session(
            PEER,
            Box::new(StubKind),
            SessionOptions::default()
                .with_sid("sid100")
                .with_description_types(vec!["test".into()]),
        )
        .unwrap();
    session.set_session_state(SessionState::Pending);

    // The incoming sid sorts greater, so the peer's offer is the survivor.
    manager
        .process(initiate_request(PEER, "123", "sid555", "test"))
        .await;

    let ack = next_outbound(&mut handles.outbound).await;
    assert_eq!(ack.kind, StanzaKind::Result);
    assert!(manager.session("sid555").is_some());
}

#[tokio::test]
async fn pending_action_tie_break_on_the_initiator_side() {
    let (manager, mut handles) = manager();
    let session = manager
        .create_session(
            PEER,
            Box::new(StubKind),
            SessionOptions::default().with_sid("sid123"),
        )
        .unwrap();
    session.set_session_state(SessionState::Active);

    // Our own content-modify is still awaiting acknowledgment.
    session.send(Action::ContentModify, JinglePayload::new());
    next_outbound(&mut handles.outbound).await;
    assert_eq!(session.pending_action(), Some(Action::ContentModify));

    // The peer races the same action; as initiator we reject it.
    manager
        .process(set_request(
            PEER,
            "123",
            action_payload("sid123", "content-modify"),
        ))
        .await;

    let reply = next_outbound(&mut handles.outbound).await;
    assert_eq!(reply.error.unwrap(), StanzaError::tie_break());
}

#[tokio::test]
async fn pending_action_race_proceeds_on_the_responder_side() {
    let (manager, mut handles) = manager();

    // Build a responder-side session by processing an incoming initiate.
    manager
        .process(initiate_request(PEER, "123", "sid123", "test"))
        .await;
    next_outbound(&mut handles.outbound).await; // ack
    let session = manager.session("sid123").unwrap();
    assert!(!session.is_initiator());

    session.send(Action::ContentModify, JinglePayload::new());
    next_outbound(&mut handles.outbound).await;

    // The responder yields: the peer's racing attempt is processed and
    // acknowledged.
    manager
        .process(set_request(
            PEER,
            "124",
            action_payload("sid123", "content-modify"),
        ))
        .await;

    let reply = next_outbound(&mut handles.outbound).await;
    assert_eq!(reply.kind, StanzaKind::Result);
    assert_eq!(reply.id.as_deref(), Some("124"));
}

#[tokio::test]
async fn losing_an_initiate_tie_break_ends_the_session_silently() {
    let (manager, mut handles) =
        SessionManager::new(SessionManagerConfig::new("auser@example.com"));
    let session = manager
        .create_session(
            PEER,
            Box::new(StubKind),
            SessionOptions::default().with_sid("sid123"),
        )
        .unwrap();
    session.set_session_state(SessionState::Pending);
    next_event(&mut handles.events).await; // created

    manager
        .process(error_request(PEER, "123", "sid123", StanzaError::tie_break()))
        .await;

    // Ended with alternative-session, no outbound terminate, and the raw
    // error surfaced.
    let SignalingEvent::Terminated { session, reason } = next_event(&mut handles.events).await
    else {
        panic!("expected a terminated notification");
    };
    assert_eq!(session.sid(), "sid123");
    assert_eq!(reason.condition, ReasonCondition::AlternativeSession);
    assert!(matches!(
        next_event(&mut handles.events).await,
        SignalingEvent::Error { .. }
    ));
    assert_no_outbound(&mut handles.outbound).await;
    assert_eq!(manager.session_count(), 0);
}

#[tokio::test]
async fn other_errors_clear_the_pending_action() {
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

    manager
        .process(error_request(
            PEER,
            "123",
            "sid123",
            StanzaError::bad_request(),
        ))
        .await;

    assert_eq!(session.pending_action(), None);
    assert!(!session.is_ended());
}

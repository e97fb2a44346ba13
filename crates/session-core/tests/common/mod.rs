//! Shared helpers for session-core integration tests
#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

use rjingle_session_core::{
    Session, SessionKind, SessionManager, SessionManagerConfig, SessionResult, SessionState,
    SignalingEvent, SignalingHandles,
};
use rjingle_stanza_core::{
    Action, Content, JinglePayload, OutboundMessage, Request, StanzaError, StanzaKind,
};

pub const SELF_ID: &str = "zuser@example.com";
pub const PEER: &str = "peer@example.com";

/// Opt-in log output for debugging a failing test (RUST_LOG=debug).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub fn manager() -> (std::sync::Arc<SessionManager>, SignalingHandles) {
    SessionManager::new(SessionManagerConfig::new(SELF_ID))
}

/// A `set` request carrying the given action payload.
pub fn set_request(from: &str, id: &str, jingle: JinglePayload) -> Request {
    Request {
        to: Some(SELF_ID.to_string()),
        from: from.to_string(),
        id: id.to_string(),
        kind: StanzaKind::Set,
        jingle: Some(jingle),
        error: None,
    }
}

pub fn action_payload(sid: &str, action: &str) -> JinglePayload {
    JinglePayload {
        sid: sid.to_string(),
        action: action.to_string(),
        ..JinglePayload::default()
    }
}

/// A well-formed `session-initiate` request with one tagged content.
pub fn initiate_request(from: &str, id: &str, sid: &str, desc_type: &str) -> Request {
    set_request(
        from,
        id,
        action_payload(sid, "session-initiate")
            .with_contents(vec![Content::tagged(desc_type, "test")]),
    )
}

/// An inbound error stanza referencing a sid.
pub fn error_request(from: &str, id: &str, sid: &str, error: StanzaError) -> Request {
    Request {
        to: Some(SELF_ID.to_string()),
        from: from.to_string(),
        id: id.to_string(),
        kind: StanzaKind::Error,
        jingle: Some(JinglePayload {
            sid: sid.to_string(),
            ..JinglePayload::default()
        }),
        error: Some(error),
    }
}

/// An inbound result stanza referencing a sid.
pub fn result_request(from: &str, id: &str, sid: &str) -> Request {
    Request {
        to: Some(SELF_ID.to_string()),
        from: from.to_string(),
        id: id.to_string(),
        kind: StanzaKind::Result,
        jingle: Some(JinglePayload {
            sid: sid.to_string(),
            ..JinglePayload::default()
        }),
        error: None,
    }
}

pub async fn next_outbound(rx: &mut UnboundedReceiver<OutboundMessage>) -> OutboundMessage {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for an outbound message")
        .expect("outbound channel closed")
}

pub async fn next_event(rx: &mut UnboundedReceiver<SignalingEvent>) -> SignalingEvent {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for a lifecycle event")
        .expect("event channel closed")
}

/// Asserts that no outbound message arrives within a short window.
pub async fn assert_no_outbound(rx: &mut UnboundedReceiver<OutboundMessage>) {
    let quiet = timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(quiet.is_err(), "unexpected outbound message: {quiet:?}");
}

/// A session kind that negotiates like a real one would, instead of
/// terminating itself the way the generic kind does.
pub struct StubKind;

#[async_trait]
impl SessionKind for StubKind {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn start(&self, session: &Session) -> SessionResult<()> {
        session.set_session_state(SessionState::Pending);
        session.send(
            Action::SessionInitiate,
            JinglePayload::new().with_contents(vec![Content::tagged("stub", "stub")]),
        );
        Ok(())
    }

    async fn accept(&self, session: &Session) -> SessionResult<()> {
        session.set_session_state(SessionState::Active);
        session.send(
            Action::SessionAccept,
            JinglePayload::new().with_contents(vec![Content::tagged("stub", "stub")]),
        );
        Ok(())
    }
}

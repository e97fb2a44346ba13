//! Negotiation engine boundary
//!
//! The engine is the out-of-scope collaborator that actually does
//! SDP/ICE/DTLS (or a data-channel equivalent). The protocol core only
//! carries the content payloads it produces and consumes; it never inspects
//! them. Concrete session kinds call into an engine supplied by the
//! embedding application; the host also drives
//! [`Session::set_connection_state`](crate::Session::set_connection_state)
//! from the engine's own connectivity callbacks.

use async_trait::async_trait;

use rjingle_stanza_core::Content;

use crate::errors::SessionResult;

/// Media/transport engine for one session.
#[async_trait]
pub trait NegotiationEngine: Send + Sync {
    /// Produce the local offer contents for a `session-initiate`.
    async fn create_offer(&self) -> SessionResult<Vec<Content>>;

    /// Process the peer's offer and produce the local answer contents. The
    /// answer is held by the session until the application accepts.
    async fn answer_offer(&self, offer: Vec<Content>) -> SessionResult<Vec<Content>>;

    /// Apply the peer's answer to our outstanding offer.
    async fn apply_answer(&self, answer: Vec<Content>) -> SessionResult<()>;

    /// Apply remote transport candidates from a `transport-info`.
    async fn apply_remote_candidates(&self, contents: Vec<Content>) -> SessionResult<()>;

    /// Release engine resources. Called once during session teardown.
    async fn close(&self);
}

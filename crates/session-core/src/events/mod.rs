//! Event types for session-core
//!
//! Two audiences, two streams. The manager-level stream carries session
//! lifecycle events and the outbound messages the carrier must deliver; the
//! embedding application consumes both through [`SignalingHandles`].
//! Session-internal notifications (state changes, media info) are broadcast
//! per session via [`Session::subscribe`](crate::Session::subscribe) and are
//! deliberately not re-emitted at the manager level.

use std::sync::Arc;

use tokio::sync::mpsc;

use rjingle_stanza_core::{OutboundMessage, Reason, Request};

use crate::session::{ConnectionState, MediaInfo, Session, SessionState};

/// Lifecycle events emitted by the session manager.
#[derive(Debug)]
pub enum SignalingEvent {
    /// A session was registered, before any negotiation took place.
    Created { session: Arc<Session> },

    /// A remotely initiated session passed validation and acknowledged its
    /// `session-initiate`. The application never observes a session before
    /// this point.
    Incoming { session: Arc<Session> },

    /// A locally initiated session sent its first `session-initiate`.
    Outgoing { session: Arc<Session> },

    /// A session reached its terminal state and was removed from the
    /// registry.
    Terminated {
        session: Arc<Session>,
        reason: Reason,
    },

    /// An inbound error stanza, surfaced raw for the application to inspect.
    Error { request: Request },
}

/// Per-session notifications, broadcast to subscribers of one session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Negotiation progress changed
    SessionStateChanged {
        old: SessionState,
        new: SessionState,
    },
    /// The session entered the named state
    SessionStateEntered { state: SessionState },
    /// The session left the named state
    SessionStateExited { state: SessionState },

    /// Transport liveness changed
    ConnectionStateChanged {
        old: ConnectionState,
        new: ConnectionState,
    },
    /// The connection entered the named state
    ConnectionStateEntered { state: ConnectionState },
    /// The connection left the named state
    ConnectionStateExited { state: ConnectionState },

    /// The peer sent a recognized session-info payload
    MediaInfo { info: MediaInfo },
}

/// The receiver pair handed to the embedding application.
///
/// `outbound` carries every message the engine wants delivered to a peer;
/// `events` carries the lifecycle notifications of [`SignalingEvent`]. Both
/// must be drained; the engine never blocks on either.
#[derive(Debug)]
pub struct SignalingHandles {
    /// Session lifecycle notifications
    pub events: mpsc::UnboundedReceiver<SignalingEvent>,

    /// Messages to hand to the delivery channel
    pub outbound: mpsc::UnboundedReceiver<OutboundMessage>,
}

/// The single ordered pipe from sessions and the dispatcher into the
/// manager's event pump. Using one pipe keeps acknowledgments ordered with
/// the follow-up messages a handler sends after acknowledging.
#[derive(Debug)]
pub(crate) enum ManagerMessage {
    Outbound(OutboundMessage),
    Lifecycle(SignalingEvent),
}

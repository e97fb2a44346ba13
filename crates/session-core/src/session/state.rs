//! Session and connection state machines
//!
//! Two independent state spaces are tracked per session: negotiation
//! progress (`SessionState`, monotonic, `Ended` absorbing) and transport
//! liveness (`ConnectionState`, free-moving, no terminal value). Transitions
//! are computed by pure functions returning the entered/exited pair so the
//! session can fan out one generic "changed" notification plus two named
//! notifications, letting observers watch a single state without inspecting
//! the raw enum.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Negotiation progress of a session.
///
/// The derived ordering is the lifecycle ordering; transitions never move
/// backwards and `Ended` is absorbing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Created, no negotiation exchanged yet
    Starting,
    /// Offer sent or received, awaiting acceptance
    Pending,
    /// Accepted and in progress
    Active,
    /// Terminal
    Ended,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Starting => "starting",
            SessionState::Pending => "pending",
            SessionState::Active => "active",
            SessionState::Ended => "ended",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Liveness of the underlying transport, tracked independently of
/// negotiation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Starting,
    Connecting,
    Connected,
    Disconnected,
    Interrupted,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Starting => "starting",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entered/exited pair produced by an effective transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StateChange<S> {
    pub entered: S,
    pub exited: S,
}

/// Computes the effect of writing `next` over `current`.
///
/// Returns `None` for a same-value write, for any write over the absorbing
/// `Ended` state, and for a backwards write.
pub(crate) fn session_transition(
    current: SessionState,
    next: SessionState,
) -> Option<StateChange<SessionState>> {
    if next <= current {
        return None;
    }
    Some(StateChange {
        entered: next,
        exited: current,
    })
}

/// Computes the effect of writing `next` over `current`.
///
/// Only same-value writes are suppressed; connection liveness may move in
/// any direction and has no terminal value.
pub(crate) fn connection_transition(
    current: ConnectionState,
    next: ConnectionState,
) -> Option<StateChange<ConnectionState>> {
    if next == current {
        return None;
    }
    Some(StateChange {
        entered: next,
        exited: current,
    })
}

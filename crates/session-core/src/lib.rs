//! # rjingle-session-core
//!
//! Session negotiation engine for the rjingle stack, implementing the
//! [XEP-0166](https://xmpp.org/extensions/xep-0166.html) session-establishment
//! model: two parties agree to open, modify and tear down negotiated sessions
//! through typed, acknowledged actions carried over an external delivery
//! channel.
//!
//! ## Architecture
//!
//! ```text
//! embedding application
//!      │ Request                      ▲ OutboundMessage / SignalingEvent
//!      ▼                              │
//! SessionManager (dispatch, validation, tie-breaking, registry)
//!      │ enqueue(action, payload)
//!      ▼
//! Session (state machine + strictly FIFO action queue)
//!      │ SessionKind handlers (generic / media / file-transfer)
//!      ▼
//! NegotiationEngine (ICE/DTLS/SDP - external, never touched here)
//! ```
//!
//! The manager validates every inbound request against the registry before a
//! session ever sees it, resolves racing negotiation attempts with pure
//! lexicographic tie-breaking, and acknowledges or rejects each action when
//! the owning session's queue completes it. Each session processes its
//! actions one at a time, in arrival order, even when a handler suspends on
//! external asynchronous work.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rjingle_session_core::{SessionManager, SessionManagerConfig};
//! use rjingle_stanza_core::Request;
//!
//! # async fn example(request: Request) {
//! let (manager, mut handles) = SessionManager::new(
//!     SessionManagerConfig::new("zuser@example.com"),
//! );
//!
//! // Feed inbound requests from the carrier:
//! manager.process(request).await;
//!
//! // Deliver what the engine wants sent:
//! while let Some(message) = handles.outbound.recv().await {
//!     // hand `message` to the connection
//! }
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod events;
pub mod manager;
pub mod session;
pub mod tiebreak;

// Re-export main types
pub use config::SessionManagerConfig;
pub use errors::{SessionError, SessionResult};
pub use events::{SessionEvent, SignalingEvent, SignalingHandles};
pub use manager::{
    IncomingSessionParams, SessionFactory, SessionManager, SessionOptions, StrictTrust,
    TrustPolicy,
};
pub use session::{
    Completion, ConnectionState, FileMetadata, FileTransferSession, GenericSession, MediaInfo,
    MediaSession, NegotiationEngine, Session, SessionKind, SessionState,
};

// Re-export the wire vocabulary for convenience
pub use rjingle_stanza_core as stanza;

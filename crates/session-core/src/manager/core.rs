//! Session manager
//!
//! The manager owns the registry and the event plumbing. Sessions and the
//! dispatcher feed one ordered internal pipe; the event pump fans it out to
//! the two host-facing channels (outbound messages, lifecycle events) and
//! performs the only registry removals, in response to terminal
//! notifications. Keeping a single pipe means an acknowledgment always
//! reaches the carrier before any follow-up message the handler sent after
//! acknowledging.

use std::fmt;
use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tracing::{debug, info};

use rjingle_stanza_core::Reason;

use crate::config::SessionManagerConfig;
use crate::errors::SessionResult;
use crate::events::{ManagerMessage, SignalingEvent, SignalingHandles};
use crate::manager::hooks::{SessionFactory, StrictTrust, TrustPolicy};
use crate::manager::registry::SessionRegistry;
use crate::session::{Session, SessionKind, SessionParams};

/// Options for a locally created session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Session id; generated when absent
    pub sid: Option<String>,

    /// Content description type tags this session will offer, recorded for
    /// overlapping-content tie-breaks while the session is pending
    pub description_types: Vec<String>,

    /// Content transport type tags this session will offer
    pub transport_types: Vec<String>,
}

impl SessionOptions {
    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn with_description_types(mut self, types: Vec<String>) -> Self {
        self.description_types = types;
        self
    }

    pub fn with_transport_types(mut self, types: Vec<String>) -> Self {
        self.transport_types = types;
        self
    }
}

/// The session dispatcher and registry.
pub struct SessionManager {
    pub(crate) self_identity: String,
    pub(crate) factory: Option<Arc<dyn SessionFactory>>,
    pub(crate) trust: Arc<dyn TrustPolicy>,
    pub(crate) session_event_capacity: usize,
    pub(crate) registry: SessionRegistry,
    pub(crate) internal_tx: mpsc::UnboundedSender<ManagerMessage>,
}

impl SessionManager {
    /// Build a manager and spawn its event pump. Requires a tokio runtime
    /// context. The returned [`SignalingHandles`] carry everything the
    /// engine emits; both receivers must be drained.
    pub fn new(config: SessionManagerConfig) -> (Arc<SessionManager>, SignalingHandles) {
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let manager = Arc::new(SessionManager {
            self_identity: config.self_identity,
            factory: config.factory,
            trust: config
                .trust
                .unwrap_or_else(|| Arc::new(StrictTrust)),
            session_event_capacity: config.session_event_capacity,
            registry: SessionRegistry::new(),
            internal_tx,
        });

        Self::spawn_event_pump(
            Arc::downgrade(&manager),
            internal_rx,
            events_tx,
            outbound_tx,
        );

        info!(identity = %manager.self_identity, "session manager started");
        (
            manager,
            SignalingHandles {
                events: events_rx,
                outbound: outbound_rx,
            },
        )
    }

    /// Drains the internal pipe in order, removing terminated sessions from
    /// the registry before the application learns about them. Holds only a
    /// weak manager reference so the pump dies with its senders.
    fn spawn_event_pump(
        manager: Weak<SessionManager>,
        mut internal_rx: mpsc::UnboundedReceiver<ManagerMessage>,
        events_tx: mpsc::UnboundedSender<SignalingEvent>,
        outbound_tx: mpsc::UnboundedSender<rjingle_stanza_core::OutboundMessage>,
    ) {
        tokio::spawn(async move {
            while let Some(message) = internal_rx.recv().await {
                match message {
                    ManagerMessage::Outbound(outbound) => {
                        let _ = outbound_tx.send(outbound);
                    }
                    ManagerMessage::Lifecycle(event) => {
                        if let SignalingEvent::Terminated { session, .. } = &event {
                            if let Some(manager) = manager.upgrade() {
                                manager.registry.remove(session.sid());
                            }
                        }
                        let _ = events_tx.send(event);
                    }
                }
            }
            debug!("session manager event pump stopped");
        });
    }

    /// This party's own identity.
    pub fn self_identity(&self) -> &str {
        &self.self_identity
    }

    /// Create and register a locally initiated session.
    ///
    /// Emits the Created lifecycle event; the Outgoing event follows when
    /// the session sends its first `session-initiate` (normally from
    /// [`Session::start`]).
    pub fn create_session(
        &self,
        peer: impl Into<String>,
        kind: Box<dyn SessionKind>,
        options: SessionOptions,
    ) -> SessionResult<Arc<Session>> {
        let session = Session::spawn(
            SessionParams {
                sid: options.sid,
                peer: peer.into(),
                initiator: true,
                description_types: options.description_types,
                transport_types: options.transport_types,
            },
            kind,
            self.internal_tx.clone(),
            self.session_event_capacity,
        );
        self.registry.insert(session.clone())?;
        info!(sid = %session.sid(), peer = %session.peer(), "outgoing session created");
        self.emit_lifecycle(SignalingEvent::Created {
            session: session.clone(),
        });
        Ok(session)
    }

    /// Look up one session by sid.
    pub fn session(&self, sid: &str) -> Option<Arc<Session>> {
        self.registry.get(sid)
    }

    /// All registered sessions.
    pub fn sessions(&self) -> Vec<Arc<Session>> {
        self.registry.all()
    }

    /// All sessions with the given peer.
    pub fn peer_sessions(&self, peer: &str) -> Vec<Arc<Session>> {
        self.registry.peer_sessions(peer)
    }

    /// Number of registered sessions.
    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    /// End every session with the given peer.
    pub async fn end_peer_sessions(&self, peer: &str, reason: Reason, silent: bool) {
        let sessions = self.registry.peer_sessions(peer);
        info!(peer, count = sessions.len(), "ending all sessions with peer");
        for session in sessions {
            session.end(reason.clone(), silent).await;
        }
    }

    /// End every registered session.
    pub async fn end_all_sessions(&self, reason: Reason, silent: bool) {
        let sessions = self.registry.all();
        info!(count = sessions.len(), "ending all sessions");
        for session in sessions {
            session.end(reason.clone(), silent).await;
        }
    }

    pub(crate) fn emit_lifecycle(&self, event: SignalingEvent) {
        if self.internal_tx.send(ManagerMessage::Lifecycle(event)).is_err() {
            debug!("event pump gone; dropping lifecycle event");
        }
    }

    pub(crate) fn emit_outbound(&self, message: rjingle_stanza_core::OutboundMessage) {
        if self.internal_tx.send(ManagerMessage::Outbound(message)).is_err() {
            debug!("event pump gone; dropping outbound message");
        }
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("self_identity", &self.self_identity)
            .field("sessions", &self.registry.len())
            .finish()
    }
}

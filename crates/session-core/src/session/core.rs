//! Session implementation
//!
//! One [`Session`] is one negotiation with one peer: immutable identity
//! (sid, initiator flag, the content type tags it was opened with), a
//! guarded mutable core (peer identity, both state machines, the pending
//! acknowledgment-tracked action), and the strictly-FIFO action queue that
//! serializes handler execution.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use rjingle_stanza_core::{
    Action, Creator, JinglePayload, OutboundMessage, Reason, ReasonCondition, StanzaError,
};
use serde_json::json;
use uuid::Uuid;

use crate::events::{ManagerMessage, SessionEvent, SignalingEvent};
use crate::session::kind::SessionKind;
use crate::session::media::MediaInfo;
use crate::session::queue::{self, Completion, SessionTask};
use crate::session::state::{
    connection_transition, session_transition, ConnectionState, SessionState,
};

/// Construction parameters, filled in by the manager.
pub(crate) struct SessionParams {
    pub sid: Option<String>,
    pub peer: String,
    pub initiator: bool,
    pub description_types: Vec<String>,
    pub transport_types: Vec<String>,
}

struct SessionCore {
    peer: String,
    peer_updated: bool,
    session_state: SessionState,
    connection_state: ConnectionState,
    pending_action: Option<Action>,
}

/// One negotiation's state machine and action queue.
pub struct Session {
    sid: String,
    is_initiator: bool,

    // Immutable snapshot of the content type tags this session was opened
    // with, consulted by the dispatcher for overlapping-content tie-breaks.
    pending_description_types: Vec<String>,
    pending_transport_types: Vec<String>,

    kind: Box<dyn SessionKind>,
    core: Mutex<SessionCore>,

    events: broadcast::Sender<SessionEvent>,
    manager_tx: mpsc::UnboundedSender<ManagerMessage>,
    queue_tx: mpsc::UnboundedSender<SessionTask>,

    outgoing_announced: AtomicBool,
    weak_self: Weak<Session>,
}

impl Session {
    /// Builds the session and spawns its queue worker. Requires a tokio
    /// runtime context.
    pub(crate) fn spawn(
        params: SessionParams,
        kind: Box<dyn SessionKind>,
        manager_tx: mpsc::UnboundedSender<ManagerMessage>,
        event_capacity: usize,
    ) -> Arc<Session> {
        let sid = params
            .sid
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(event_capacity);

        let session = Arc::new_cyclic(|weak| Session {
            sid,
            is_initiator: params.initiator,
            pending_description_types: params.description_types,
            pending_transport_types: params.transport_types,
            kind,
            core: Mutex::new(SessionCore {
                peer: params.peer,
                peer_updated: false,
                session_state: SessionState::Starting,
                connection_state: ConnectionState::Starting,
                pending_action: None,
            }),
            events,
            manager_tx,
            queue_tx,
            outgoing_announced: AtomicBool::new(false),
            weak_self: weak.clone(),
        });

        queue::spawn_worker(&session, queue_rx);
        session
    }

    // ========== Identity and state accessors ==========

    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// The other party's identity. May change exactly once, on
    /// `session-accept`, when the trust policy allows the responder to
    /// answer from a different address.
    pub fn peer(&self) -> String {
        self.core.lock().peer.clone()
    }

    pub fn is_initiator(&self) -> bool {
        self.is_initiator
    }

    pub fn session_state(&self) -> SessionState {
        self.core.lock().session_state
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.core.lock().connection_state
    }

    pub fn is_ended(&self) -> bool {
        self.session_state() == SessionState::Ended
    }

    pub fn pending_action(&self) -> Option<Action> {
        self.core.lock().pending_action
    }

    pub fn pending_description_types(&self) -> &[String] {
        &self.pending_description_types
    }

    pub fn pending_transport_types(&self) -> &[String] {
        &self.pending_transport_types
    }

    /// Subscribe to this session's notifications (state changes, media
    /// info). Session-internal notifications are not re-emitted at the
    /// manager level.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn kind(&self) -> &dyn SessionKind {
        self.kind.as_ref()
    }

    // ========== State setters ==========

    /// Writes the session state, fanning out the generic change
    /// notification plus the entered/exited named pair. Same-value and
    /// backwards writes are no-ops; `Ended` is absorbing.
    pub fn set_session_state(&self, next: SessionState) {
        let change = {
            let mut core = self.core.lock();
            match session_transition(core.session_state, next) {
                Some(change) => {
                    core.session_state = next;
                    Some(change)
                }
                None => None,
            }
        };
        if let Some(change) = change {
            info!(sid = %self.sid, state = %change.entered, "session state changed");
            self.emit(SessionEvent::SessionStateChanged {
                old: change.exited,
                new: change.entered,
            });
            self.emit(SessionEvent::SessionStateEntered {
                state: change.entered,
            });
            self.emit(SessionEvent::SessionStateExited {
                state: change.exited,
            });
        }
    }

    /// Writes the connection state; independent of negotiation progress.
    pub fn set_connection_state(&self, next: ConnectionState) {
        let change = {
            let mut core = self.core.lock();
            match connection_transition(core.connection_state, next) {
                Some(change) => {
                    core.connection_state = next;
                    Some(change)
                }
                None => None,
            }
        };
        if let Some(change) = change {
            info!(sid = %self.sid, state = %change.entered, "connection state changed");
            self.emit(SessionEvent::ConnectionStateChanged {
                old: change.exited,
                new: change.entered,
            });
            self.emit(SessionEvent::ConnectionStateEntered {
                state: change.entered,
            });
            self.emit(SessionEvent::ConnectionStateExited {
                state: change.exited,
            });
        }
    }

    // ========== Outbound actions ==========

    /// Stamps the payload with this session's sid and the action name, and
    /// hands it to the delivery channel.
    ///
    /// Acknowledgment-tracked actions record themselves as the pending
    /// action; `session-terminate` clears it. The pending action is never
    /// overwritten while set - tie-break resolution at the dispatcher
    /// decides whose attempt survives.
    pub fn send(&self, action: Action, mut payload: JinglePayload) {
        payload.sid = self.sid.clone();
        payload.action = action.as_str().to_string();

        let to = {
            let mut core = self.core.lock();
            if action == Action::SessionTerminate {
                core.pending_action = None;
            } else if action.requires_ack() {
                match core.pending_action {
                    None => core.pending_action = Some(action),
                    Some(existing) if existing == action => {}
                    Some(existing) => {
                        warn!(
                            sid = %self.sid,
                            pending = %existing,
                            %action,
                            "sending while another action awaits acknowledgment"
                        );
                    }
                }
            }
            core.peer.clone()
        };

        debug!(sid = %self.sid, %action, to = %to, "sending action");
        self.notify_manager(ManagerMessage::Outbound(OutboundMessage::set(to, payload)));

        if action == Action::SessionInitiate
            && self.is_initiator
            && !self.outgoing_announced.swap(true, Ordering::SeqCst)
        {
            if let Some(session) = self.weak_self.upgrade() {
                self.notify_manager(ManagerMessage::Lifecycle(SignalingEvent::Outgoing {
                    session,
                }));
            }
        }
    }

    /// Send a `session-info` carrying a single recognized flag or entry.
    pub fn ring(&self) {
        self.send(
            Action::SessionInfo,
            JinglePayload::new().with_info_flag("ringing"),
        );
    }

    pub fn hold(&self) {
        self.send(
            Action::SessionInfo,
            JinglePayload::new().with_info_flag("hold"),
        );
    }

    pub fn resume(&self) {
        self.send(
            Action::SessionInfo,
            JinglePayload::new().with_info_flag("active"),
        );
    }

    pub fn mute(&self, creator: Creator, name: Option<&str>) {
        self.send(
            Action::SessionInfo,
            JinglePayload::new().with_info("mute", json!({"creator": creator, "name": name})),
        );
    }

    pub fn unmute(&self, creator: Creator, name: Option<&str>) {
        self.send(
            Action::SessionInfo,
            JinglePayload::new().with_info("unmute", json!({"creator": creator, "name": name})),
        );
    }

    // ========== Lifecycle operations ==========

    /// Begin the outgoing negotiation (initiator side).
    pub async fn start(&self) -> crate::errors::SessionResult<()> {
        self.kind.start(self).await
    }

    /// Accept the incoming negotiation (responder side).
    pub async fn accept(&self) -> crate::errors::SessionResult<()> {
        self.kind.accept(self).await
    }

    /// Withdraw our own offer.
    pub async fn cancel(&self) {
        self.end(Reason::new(ReasonCondition::Cancel), false).await;
    }

    /// Refuse the peer's offer.
    pub async fn decline(&self) {
        self.end(Reason::new(ReasonCondition::Decline), false).await;
    }

    /// Idempotent terminal transition.
    ///
    /// Tears down the kind's external resources, sends `session-terminate`
    /// with the reason unless `silent`, and emits exactly one terminal
    /// notification so the registry can drop the session. A handler still
    /// in flight is not aborted; it completes against an ended session.
    pub async fn end(&self, reason: Reason, silent: bool) {
        let change = {
            let mut core = self.core.lock();
            match session_transition(core.session_state, SessionState::Ended) {
                Some(change) => {
                    core.session_state = SessionState::Ended;
                    core.pending_action = None;
                    Some(change)
                }
                None => None,
            }
        };
        let Some(change) = change else {
            debug!(sid = %self.sid, "end() on an already ended session");
            return;
        };

        info!(sid = %self.sid, reason = %reason.condition, silent, "session ended");
        self.emit(SessionEvent::SessionStateChanged {
            old: change.exited,
            new: SessionState::Ended,
        });
        self.emit(SessionEvent::SessionStateEntered {
            state: SessionState::Ended,
        });
        self.emit(SessionEvent::SessionStateExited {
            state: change.exited,
        });

        self.kind.teardown(self).await;

        if !silent {
            self.send(
                Action::SessionTerminate,
                JinglePayload::new().with_reason(reason.clone()),
            );
        }

        if let Some(session) = self.weak_self.upgrade() {
            self.notify_manager(ManagerMessage::Lifecycle(SignalingEvent::Terminated {
                session,
                reason,
            }));
        }
    }

    // ========== Dispatcher plumbing ==========

    /// Queue one validated inbound action for serialized processing.
    pub(crate) fn enqueue(&self, action: Action, payload: JinglePayload, completion: Completion) {
        let task = SessionTask {
            action,
            payload,
            completion,
        };
        if let Err(failed) = self.queue_tx.send(task) {
            warn!(sid = %self.sid, "queue worker gone; failing action");
            failed
                .0
                .completion
                .fail(StanzaError::general_error().with_text("session queue unavailable"));
        }
    }

    /// Cleared when the peer acknowledges or rejects our pending action.
    pub(crate) fn clear_pending_action(&self) {
        let mut core = self.core.lock();
        if let Some(action) = core.pending_action.take() {
            debug!(sid = %self.sid, %action, "pending action acknowledged");
        }
    }

    /// Adopt the responder's actual identity, at most once.
    pub(crate) fn try_update_peer(&self, new_peer: &str) -> bool {
        let mut core = self.core.lock();
        if core.peer_updated || core.peer == new_peer {
            return false;
        }
        info!(
            sid = %self.sid,
            old = %core.peer,
            new = %new_peer,
            "responder identity updated on session-accept"
        );
        core.peer = new_peer.to_string();
        core.peer_updated = true;
        true
    }

    /// Broadcast a recognized inbound session-info to observers.
    pub fn notify_media_info(&self, info: MediaInfo) {
        self.emit(SessionEvent::MediaInfo { info });
    }

    fn emit(&self, event: SessionEvent) {
        // Err just means nobody is subscribed right now.
        let _ = self.events.send(event);
    }

    fn notify_manager(&self, message: ManagerMessage) {
        if self.manager_tx.send(message).is_err() {
            debug!(sid = %self.sid, "manager event pipe closed");
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.lock();
        f.debug_struct("Session")
            .field("sid", &self.sid)
            .field("peer", &core.peer)
            .field("is_initiator", &self.is_initiator)
            .field("kind", &self.kind.name())
            .field("session_state", &core.session_state)
            .field("connection_state", &core.connection_state)
            .field("pending_action", &core.pending_action)
            .finish()
    }
}

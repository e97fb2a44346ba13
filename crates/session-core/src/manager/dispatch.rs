//! Request dispatch and validation
//!
//! Every inbound request is classified by stanza kind and, for actions,
//! driven through a fixed validation sequence before the owning session's
//! queue ever sees it. The first failing check wins; each failure becomes a
//! protocol error reply addressed to the sender with the transaction id
//! echoed. Conflicting negotiation attempts are resolved with pure
//! lexicographic tie-breaking, so both parties agree on the survivor
//! without an extra round trip.

use std::sync::Arc;

use tracing::{debug, warn};

use rjingle_stanza_core::{
    Action, JinglePayload, OutboundMessage, ReasonCondition, Request, StanzaError, StanzaKind,
};

use crate::events::{ManagerMessage, SignalingEvent};
use crate::manager::core::SessionManager;
use crate::manager::hooks::IncomingSessionParams;
use crate::session::{Completion, GenericSession, Session, SessionParams, SessionState};
use crate::tiebreak;

impl SessionManager {
    /// Process one inbound request.
    ///
    /// Validation runs inline; accepted actions are queued on the target
    /// session and acknowledged (or rejected) when its handler completes.
    /// Processing a request for one sid never blocks requests for another.
    pub async fn process(&self, request: Request) {
        match request.kind {
            StanzaKind::Error => self.process_error(request).await,
            StanzaKind::Result => self.process_result(request),
            StanzaKind::Set => self.process_set(request),
        }
    }

    /// An inbound error rejects something we sent. Losing a
    /// session-initiate tie-break ends the pending session silently - the
    /// peer's colliding attempt is the one that survives. Everything else
    /// just clears the pending action. The raw error is always surfaced to
    /// the application.
    async fn process_error(&self, request: Request) {
        let sid = request
            .jingle
            .as_ref()
            .map(|jingle| jingle.sid.as_str())
            .unwrap_or_default();

        if let Some(session) = self.registry.get(sid) {
            let lost_tie_break = request
                .error
                .as_ref()
                .is_some_and(|error| error.is_tie_break());
            if lost_tie_break && session.session_state() == SessionState::Pending {
                debug!(%sid, "lost session-initiate tie-break; ending silently");
                session
                    .end(ReasonCondition::AlternativeSession.into(), true)
                    .await;
            } else {
                session.clear_pending_action();
            }
        }

        self.emit_lifecycle(SignalingEvent::Error { request });
    }

    /// A result acknowledges our pending action, if any.
    fn process_result(&self, request: Request) {
        if let Some(jingle) = &request.jingle {
            if let Some(session) = self.registry.get(&jingle.sid) {
                session.clear_pending_action();
            }
        }
    }

    fn process_set(&self, request: Request) {
        let sender = request.from;
        let transaction_id = request.id;

        let Some(jingle) = request.jingle else {
            warn!(from = %sender, "set stanza without a jingle payload");
            self.send_error(&sender, &transaction_id, StanzaError::bad_request());
            return;
        };

        let sid = jingle.sid.clone();
        let action = jingle.parsed_action();

        if action != Some(Action::SessionInitiate) {
            self.process_session_action(sender, transaction_id, sid, action, jingle);
        } else {
            self.process_initiate(sender, transaction_id, sid, jingle);
        }
    }

    /// Validation for every action except session-initiate.
    fn process_session_action(
        &self,
        sender: String,
        transaction_id: String,
        sid: String,
        action: Option<Action>,
        jingle: JinglePayload,
    ) {
        // Can't modify a session we don't have.
        let Some(session) = self.registry.get(&sid) else {
            warn!(%sid, from = %sender, "action for unknown session");
            self.send_error(&sender, &transaction_id, StanzaError::unknown_session());
            return;
        };

        // A wrong sender and a stale sid are answered identically; the far
        // side cannot tell the two apart.
        if !self.trust.is_same_party(&session.peer(), &sender) || session.is_ended() {
            warn!(%sid, from = %sender, "session has ended, or action has wrong sender");
            self.send_error(&sender, &transaction_id, StanzaError::unknown_session());
            return;
        }

        // Can't accept a session twice.
        if action == Some(Action::SessionAccept)
            && session.session_state() != SessionState::Pending
        {
            warn!(%sid, "session-accept outside pending state");
            self.send_error(&sender, &transaction_id, StanzaError::out_of_order());
            return;
        }

        // Two competing acknowledgment-tracked attempts at the same action:
        // the initiator rejects the peer's, the responder lets exactly one
        // side (the peer's) proceed.
        if let Some(action) = action {
            if action.requires_ack()
                && action != Action::SessionTerminate
                && session.pending_action() == Some(action)
            {
                if session.is_initiator() {
                    debug!(%sid, %action, "tie-break during pending action");
                    self.send_error(&sender, &transaction_id, StanzaError::tie_break());
                    return;
                }
                debug!(%sid, %action, "responder yields pending action race");
            }
        }

        // An action name outside the defined set never reaches a handler.
        let Some(action) = action else {
            warn!(%sid, action = %jingle.action, "invalid action");
            self.send_error(&sender, &transaction_id, StanzaError::bad_request());
            return;
        };

        // The responder may answer from a more specific address; adopt it
        // before the action is enqueued so handlers see the final identity.
        if action == Action::SessionAccept {
            self.adopt_responder_identity(&session, &sender);
        }

        self.forward(session, action, jingle, sender, transaction_id, false);
    }

    /// Validation for session-initiate.
    fn process_initiate(
        &self,
        sender: String,
        transaction_id: String,
        sid: String,
        jingle: JinglePayload,
    ) {
        if let Some(existing) = self.registry.get(&sid) {
            // Same sid from an unrelated party: a collision, not a session.
            if !self.trust.is_same_party(&existing.peer(), &sender) {
                warn!(%sid, from = %sender, "duplicate sid from new sender");
                self.send_error(&sender, &transaction_id, StanzaError::service_unavailable());
                return;
            }

            // Both parties picked the same sid for fresh negotiations. The
            // lexicographically greater identity's attempt is authoritative;
            // if that is us, the peer's parallel attempt is rejected here.
            if existing.session_state() == SessionState::Pending
                && tiebreak::local_wins(&self.self_identity, &existing.peer())
            {
                debug!(%sid, "tie-break: duplicate sid for pending session");
                self.send_error(&sender, &transaction_id, StanzaError::tie_break());
                return;
            }

            // Re-initiating an already negotiated sid is just wrong.
            warn!(%sid, "session-initiate for existing session");
            self.send_error(&sender, &transaction_id, StanzaError::out_of_order());
            return;
        }

        // Colliding negotiations under different sids: if this peer already
        // has a pending session offering an overlapping content type, the
        // greater sid survives.
        let description_types = jingle.description_types();
        for existing in self.registry.peer_sessions(&sender) {
            if existing.session_state() == SessionState::Pending
                && intersects(&description_types, existing.pending_description_types())
                && tiebreak::local_wins(existing.sid(), &sid)
            {
                debug!(
                    %sid,
                    existing = existing.sid(),
                    "tie-break: overlapping content with pending session"
                );
                self.send_error(&sender, &transaction_id, StanzaError::tie_break());
                return;
            }
        }

        if jingle.contents.is_empty() {
            warn!(%sid, "session-initiate without contents");
            self.send_error(&sender, &transaction_id, StanzaError::bad_request());
            return;
        }

        let params = IncomingSessionParams {
            sid: sid.clone(),
            peer: sender.clone(),
            description_types,
            transport_types: jingle.transport_types(),
        };
        let kind = self
            .factory
            .as_ref()
            .and_then(|factory| factory.create(&params))
            .unwrap_or_else(|| Box::new(GenericSession));

        let session = Session::spawn(
            SessionParams {
                sid: Some(sid.clone()),
                peer: sender.clone(),
                initiator: false,
                description_types: params.description_types,
                transport_types: params.transport_types,
            },
            kind,
            self.internal_tx.clone(),
            self.session_event_capacity,
        );

        // Registration precedes forwarding so the action handler already
        // runs against a reachable session.
        if self.registry.insert(session.clone()).is_err() {
            warn!(%sid, "sid registered concurrently; treating as replay");
            self.send_error(&sender, &transaction_id, StanzaError::out_of_order());
            return;
        }
        debug!(%sid, peer = %sender, "incoming session registered");
        self.emit_lifecycle(SignalingEvent::Created {
            session: session.clone(),
        });

        self.forward(session, Action::SessionInitiate, jingle, sender, transaction_id, true);
    }

    /// Queue the validated action; the installed completion turns the
    /// handler outcome into the acknowledgment or error reply, and emits
    /// the Incoming notification after a session-initiate ack so the
    /// application never observes an unvalidated session.
    fn forward(
        &self,
        session: Arc<Session>,
        action: Action,
        payload: JinglePayload,
        sender: String,
        transaction_id: String,
        is_initiate: bool,
    ) {
        let internal_tx = self.internal_tx.clone();
        let incoming = session.clone();
        let completion = Completion::new(move |result| match result {
            Ok(()) => {
                let _ = internal_tx.send(ManagerMessage::Outbound(OutboundMessage::result(
                    sender,
                    transaction_id,
                )));
                if is_initiate {
                    let _ = internal_tx.send(ManagerMessage::Lifecycle(SignalingEvent::Incoming {
                        session: incoming,
                    }));
                }
            }
            Err(error) => {
                let _ = internal_tx.send(ManagerMessage::Outbound(OutboundMessage::error(
                    sender,
                    transaction_id,
                    error,
                )));
            }
        });

        session.enqueue(action, payload, completion);
    }

    fn adopt_responder_identity(&self, session: &Arc<Session>, sender: &str) {
        let old_peer = session.peer();
        if session.try_update_peer(sender) {
            self.registry.reindex_peer(session.sid(), &old_peer, sender);
        }
    }

    fn send_error(&self, to: &str, transaction_id: &str, error: StanzaError) {
        self.emit_outbound(OutboundMessage::error(to, transaction_id, error));
    }
}

fn intersects(left: &[String], right: &[String]) -> bool {
    left.iter().any(|tag| right.contains(tag))
}

//! Session kinds
//!
//! The behavior of a session is a capability object selected once by the
//! factory at construction and owned by the session for its lifetime. The
//! base defaults implement exactly what a session with no negotiation
//! capability must do: answer mandatory-reply actions correctly and refuse
//! to negotiate anything.

use async_trait::async_trait;
use tracing::{debug, warn};

use rjingle_stanza_core::{Action, JinglePayload, Reason, ReasonCondition, StanzaError};

use crate::errors::SessionResult;
use crate::session::core::Session;
use crate::session::queue::Completion;
use crate::session::state::SessionState;

/// Behavior of one session kind (generic, media, file-transfer, ...).
///
/// Handlers run on the session's queue worker, one at a time per session.
/// A handler reports its outcome through its return value; the worker
/// resolves the action's [`Completion`] from it. Handlers that must send
/// follow-up messages after the acknowledgment resolve `ack` early instead.
#[async_trait]
pub trait SessionKind: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str {
        "generic"
    }

    /// Begin an outgoing negotiation. The base kind cannot negotiate and
    /// terminates immediately.
    async fn start(&self, session: &Session) -> SessionResult<()> {
        warn!(sid = %session.sid(), "cannot start a generic session");
        session
            .end(Reason::new(ReasonCondition::UnsupportedApplications), true)
            .await;
        Ok(())
    }

    /// Accept an incoming negotiation. The base kind cannot negotiate and
    /// terminates, telling the peer why.
    async fn accept(&self, session: &Session) -> SessionResult<()> {
        warn!(sid = %session.sid(), "cannot accept a generic session");
        session
            .end(Reason::new(ReasonCondition::UnsupportedApplications), false)
            .await;
        Ok(())
    }

    /// Release any external resources. Called once, during the terminal
    /// transition, before the terminate message goes out.
    async fn teardown(&self, _session: &Session) {}

    /// Dispatch one queued action to its handler.
    async fn handle(
        &self,
        session: &Session,
        action: Action,
        payload: JinglePayload,
        ack: &Completion,
    ) -> SessionResult<()> {
        match action {
            Action::ContentAccept => self.on_content_accept(session, payload, ack).await,
            Action::ContentAdd => self.on_content_add(session, payload, ack).await,
            Action::ContentModify => self.on_content_modify(session, payload, ack).await,
            Action::ContentReject => self.on_content_reject(session, payload, ack).await,
            Action::ContentRemove => self.on_content_remove(session, payload, ack).await,
            Action::DescriptionInfo => self.on_description_info(session, payload, ack).await,
            Action::SessionAccept => self.on_session_accept(session, payload, ack).await,
            Action::SessionInfo => self.on_session_info(session, payload, ack).await,
            Action::SessionInitiate => self.on_session_initiate(session, payload, ack).await,
            Action::SessionTerminate => self.on_session_terminate(session, payload, ack).await,
            Action::TransportAccept => self.on_transport_accept(session, payload, ack).await,
            Action::TransportInfo => self.on_transport_info(session, payload, ack).await,
            Action::TransportReject => self.on_transport_reject(session, payload, ack).await,
            Action::TransportReplace => self.on_transport_replace(session, payload, ack).await,
            Action::SourceAdd => self.on_source_add(session, payload, ack).await,
            Action::SourceRemove => self.on_source_remove(session, payload, ack).await,
        }
    }

    async fn on_session_initiate(
        &self,
        session: &Session,
        _payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        session.set_session_state(SessionState::Pending);
        Ok(())
    }

    async fn on_session_accept(
        &self,
        session: &Session,
        _payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        session.set_session_state(SessionState::Active);
        Ok(())
    }

    async fn on_session_terminate(
        &self,
        session: &Session,
        payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        let reason = payload.reason.unwrap_or_default();
        session.end(reason, true).await;
        Ok(())
    }

    /// A session-info with no payload is a keepalive ping and is
    /// acknowledged; anything unrecognized must be answered with
    /// `unsupported-info` per XEP-0166 §7.2.
    async fn on_session_info(
        &self,
        _session: &Session,
        payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        if payload.is_empty() {
            return Ok(());
        }
        Err(StanzaError::unsupported_info().into())
    }

    async fn on_description_info(
        &self,
        session: &Session,
        _payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        debug!(sid = %session.sid(), "unrecognized description-info payload");
        Err(StanzaError::unsupported_info().into())
    }

    async fn on_transport_info(
        &self,
        session: &Session,
        _payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        debug!(sid = %session.sid(), "unrecognized transport-info payload");
        Err(StanzaError::unsupported_info().into())
    }

    /// A content-add must be answered with content-accept or content-reject.
    /// The request itself is well-formed, so it is acknowledged first and
    /// the reject follows as an independent message.
    async fn on_content_add(
        &self,
        session: &Session,
        _payload: JinglePayload,
        ack: &Completion,
    ) -> SessionResult<()> {
        ack.succeed();
        session.send(
            Action::ContentReject,
            JinglePayload::new().with_reason(
                Reason::new(ReasonCondition::FailedApplication)
                    .with_text("content-add is not supported"),
            ),
        );
        Ok(())
    }

    /// Same two-message pattern as content-add: ack, then transport-reject.
    async fn on_transport_replace(
        &self,
        session: &Session,
        _payload: JinglePayload,
        ack: &Completion,
    ) -> SessionResult<()> {
        ack.succeed();
        session.send(
            Action::TransportReject,
            JinglePayload::new().with_reason(
                Reason::new(ReasonCondition::FailedApplication)
                    .with_text("transport-replace is not supported"),
            ),
        );
        Ok(())
    }

    async fn on_content_accept(
        &self,
        _session: &Session,
        _payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        Ok(())
    }

    async fn on_content_modify(
        &self,
        _session: &Session,
        _payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        Ok(())
    }

    async fn on_content_reject(
        &self,
        _session: &Session,
        _payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        Ok(())
    }

    async fn on_content_remove(
        &self,
        _session: &Session,
        _payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        Ok(())
    }

    async fn on_transport_accept(
        &self,
        _session: &Session,
        _payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        Ok(())
    }

    async fn on_transport_reject(
        &self,
        _session: &Session,
        _payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        Ok(())
    }

    async fn on_source_add(
        &self,
        _session: &Session,
        _payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        Ok(())
    }

    async fn on_source_remove(
        &self,
        _session: &Session,
        _payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        Ok(())
    }
}

/// The base session kind: no negotiation capability, default replies only.
///
/// Used as the fallback whenever the factory declines an incoming
/// negotiation.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericSession;

#[async_trait]
impl SessionKind for GenericSession {}

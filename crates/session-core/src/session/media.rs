//! Media session kind
//!
//! Signaling behavior for audio/video sessions: offer/answer and transport
//! candidates are delegated to the [`NegotiationEngine`]; recognized
//! session-info payloads (ringing, mute, hold, ...) are surfaced to
//! observers as typed [`MediaInfo`] notifications instead of the
//! `unsupported-info` rejection the base kind gives them.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use rjingle_stanza_core::{Action, Content, Creator, JinglePayload, StanzaError};

use crate::errors::{SessionError, SessionResult};
use crate::session::core::Session;
use crate::session::engine::NegotiationEngine;
use crate::session::kind::SessionKind;
use crate::session::queue::Completion;
use crate::session::state::SessionState;

/// A recognized session-info payload on a media session.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaInfo {
    /// The peer's device is ringing
    Ringing,
    /// The peer muted a stream
    Mute {
        creator: Option<Creator>,
        name: Option<String>,
    },
    /// The peer unmuted a stream
    Unmute {
        creator: Option<Creator>,
        name: Option<String>,
    },
    /// The peer placed the session on hold
    Hold,
    /// The peer resumed an on-hold session
    Active,
}

impl MediaInfo {
    /// Parse a session-info payload carrying exactly one recognized key.
    fn from_payload(payload: &JinglePayload) -> Option<MediaInfo> {
        if payload.info.len() != 1 {
            return None;
        }
        let (key, value) = payload.info.iter().next()?;
        match key.as_str() {
            "ringing" => Some(MediaInfo::Ringing),
            "hold" => Some(MediaInfo::Hold),
            "active" => Some(MediaInfo::Active),
            "mute" => Some(MediaInfo::Mute {
                creator: pick(value, "creator"),
                name: pick(value, "name"),
            }),
            "unmute" => Some(MediaInfo::Unmute {
                creator: pick(value, "creator"),
                name: pick(value, "name"),
            }),
            _ => None,
        }
    }
}

fn pick<T: serde::de::DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    value
        .get(key)
        .and_then(|entry| serde_json::from_value(entry.clone()).ok())
}

/// Audio/video session behavior over an external negotiation engine.
pub struct MediaSession {
    engine: Arc<dyn NegotiationEngine>,
    pending_answer: Mutex<Option<Vec<Content>>>,
}

impl MediaSession {
    pub fn new(engine: Arc<dyn NegotiationEngine>) -> Self {
        MediaSession {
            engine,
            pending_answer: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SessionKind for MediaSession {
    fn name(&self) -> &'static str {
        "media"
    }

    async fn start(&self, session: &Session) -> SessionResult<()> {
        session.set_session_state(SessionState::Pending);
        let offer = self.engine.create_offer().await?;
        session.send(
            Action::SessionInitiate,
            JinglePayload::new().with_contents(offer),
        );
        Ok(())
    }

    async fn accept(&self, session: &Session) -> SessionResult<()> {
        let Some(answer) = self.pending_answer.lock().take() else {
            return Err(SessionError::InvalidOperation {
                message: "accept called before an offer was processed".into(),
            });
        };
        debug!(sid = %session.sid(), "accepting incoming media session");
        session.set_session_state(SessionState::Active);
        session.send(
            Action::SessionAccept,
            JinglePayload::new().with_contents(answer),
        );
        Ok(())
    }

    async fn teardown(&self, _session: &Session) {
        self.engine.close().await;
    }

    async fn on_session_initiate(
        &self,
        session: &Session,
        payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        debug!(sid = %session.sid(), "processing incoming media offer");
        session.set_session_state(SessionState::Pending);
        let answer = self.engine.answer_offer(payload.contents).await?;
        *self.pending_answer.lock() = Some(answer);
        Ok(())
    }

    async fn on_session_accept(
        &self,
        session: &Session,
        payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        debug!(sid = %session.sid(), "activating accepted outbound media session");
        self.engine.apply_answer(payload.contents).await?;
        session.set_session_state(SessionState::Active);
        Ok(())
    }

    async fn on_transport_info(
        &self,
        session: &Session,
        payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        // Candidate failures are not protocol errors; the exchange keeps
        // going with whatever candidates do work.
        if let Err(error) = self.engine.apply_remote_candidates(payload.contents).await {
            warn!(sid = %session.sid(), %error, "could not apply remote candidates");
        }
        Ok(())
    }

    async fn on_session_info(
        &self,
        session: &Session,
        payload: JinglePayload,
        _ack: &Completion,
    ) -> SessionResult<()> {
        if payload.is_empty() {
            return Ok(());
        }
        match MediaInfo::from_payload(&payload) {
            Some(info) => {
                session.notify_media_info(info);
                Ok(())
            }
            None => Err(StanzaError::unsupported_info().into()),
        }
    }
}

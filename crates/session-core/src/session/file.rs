//! File-transfer session kind
//!
//! Signaling behavior for one-file transfers: the offer metadata rides the
//! first content description of the `session-initiate`, the responder
//! records it before handing the offer to the engine, and the actual bytes
//! move over whatever data channel the engine negotiates. Integrity
//! checking of the received file is the application's business.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use rjingle_stanza_core::{Action, Content, Description, JinglePayload};

use crate::errors::{SessionError, SessionResult};
use crate::session::core::Session;
use crate::session::engine::NegotiationEngine;
use crate::session::kind::SessionKind;
use crate::session::queue::Completion;
use crate::session::state::SessionState;

/// Description type tag used by file-transfer contents.
pub const FILE_TRANSFER_DESC_TYPE: &str = "filetransfer";

/// Metadata describing an offered file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Last-modified timestamp, carried opaquely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Integrity hash, when the sender provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl FileMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        FileMetadata {
            name: name.into(),
            size: None,
            date: None,
            hash: None,
            desc: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// File-transfer session behavior over an external negotiation engine.
pub struct FileTransferSession {
    engine: Arc<dyn NegotiationEngine>,
    offer: Mutex<Option<FileMetadata>>,
    remote_offer: Mutex<Option<FileMetadata>>,
    pending_answer: Mutex<Option<Vec<Content>>>,
}

impl FileTransferSession {
    /// A receiving-side session; the peer's offer arrives with
    /// `session-initiate`.
    pub fn new(engine: Arc<dyn NegotiationEngine>) -> Self {
        FileTransferSession {
            engine,
            offer: Mutex::new(None),
            remote_offer: Mutex::new(None),
            pending_answer: Mutex::new(None),
        }
    }

    /// A sending-side session offering the given file.
    pub fn offering(engine: Arc<dyn NegotiationEngine>, metadata: FileMetadata) -> Self {
        let session = FileTransferSession::new(engine);
        *session.offer.lock() = Some(metadata);
        session
    }

    /// The metadata the peer offered, once a `session-initiate` has been
    /// processed.
    pub fn remote_file(&self) -> Option<FileMetadata> {
        self.remote_offer.lock().clone()
    }
}

#[async_trait]
impl SessionKind for FileTransferSession {
    fn name(&self) -> &'static str {
        "file-transfer"
    }

    async fn start(&self, session: &Session) -> SessionResult<()> {
        let Some(metadata) = self.offer.lock().clone() else {
            return Err(SessionError::InvalidOperation {
                message: "no file offer to send; construct with offering()".into(),
            });
        };

        session.set_session_state(SessionState::Pending);
        let mut contents = self.engine.create_offer().await?;

        // The file offer rides the first content's description.
        if let Some(first) = contents.first_mut() {
            let description = first
                .description
                .get_or_insert_with(|| Description::new(FILE_TRANSFER_DESC_TYPE));
            description.desc_type = FILE_TRANSFER_DESC_TYPE.to_string();
            let offer = serde_json::to_value(&metadata)
                .map_err(|error| SessionError::engine(error.to_string()))?;
            description.data.insert("offer".into(), offer);
        }

        session.send(
            Action::SessionInitiate,
            JinglePayload::new().with_contents(contents),
        );
        Ok(())
    }

    async fn accept(&self, session: &Session) -> SessionResult<()> {
        let Some(answer) = self.pending_answer.lock().take() else {
            return Err(SessionError::InvalidOperation {
                message: "accept called before an offer was processed".into(),
            });
        };
        debug!(sid = %session.sid(), "accepting incoming file transfer");
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
        session.set_session_state(SessionState::Pending);

        // Record the offered metadata before the engine strips it.
        let metadata = payload
            .contents
            .first()
            .and_then(|content| content.description.as_ref())
            .and_then(|description| description.data.get("offer"))
            .and_then(|offer| serde_json::from_value(offer.clone()).ok());
        if let Some(metadata) = &metadata {
            debug!(sid = %session.sid(), file = ?metadata, "incoming file offer");
        }
        *self.remote_offer.lock() = metadata;

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
        debug!(sid = %session.sid(), "activating accepted file transfer");
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
        if let Err(error) = self.engine.apply_remote_candidates(payload.contents).await {
            tracing::warn!(sid = %session.sid(), %error, "could not apply remote candidates");
        }
        Ok(())
    }
}

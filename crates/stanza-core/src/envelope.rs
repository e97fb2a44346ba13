//! Message envelopes exchanged with the delivery channel
//!
//! The engine consumes [`Request`] values handed in by the embedding
//! application and produces [`OutboundMessage`] values for it to deliver.
//! How either is framed on an actual connection is the carrier's business.

use serde::{Deserialize, Serialize};

use crate::error::StanzaError;
use crate::payload::JinglePayload;

/// The three stanza kinds the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StanzaKind {
    /// An action to process
    Set,
    /// Acknowledgment of a previously sent action
    Result,
    /// Rejection of a previously sent action
    Error,
}

/// An inbound request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Addressee, when the carrier provides it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Actual sender identity, as verified by the carrier
    pub from: String,

    /// Carrier transaction id, echoed on the reply
    pub id: String,

    /// Stanza kind
    #[serde(rename = "type")]
    pub kind: StanzaKind,

    /// Jingle payload, present on `set` and on errors that reference a sid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jingle: Option<JinglePayload>,

    /// Error payload, present on `error` stanzas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StanzaError>,
}

/// An outbound message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Recipient identity
    pub to: String,

    /// Echoed transaction id on `result`/`error`; absent on locally
    /// originated `set` messages, where the carrier assigns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Stanza kind
    #[serde(rename = "type")]
    pub kind: StanzaKind,

    /// Jingle payload on `set` messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jingle: Option<JinglePayload>,

    /// Error payload on `error` messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StanzaError>,
}

impl OutboundMessage {
    /// A generic acknowledgment for the given transaction.
    pub fn result(to: impl Into<String>, id: impl Into<String>) -> Self {
        OutboundMessage {
            to: to.into(),
            id: Some(id.into()),
            kind: StanzaKind::Result,
            jingle: None,
            error: None,
        }
    }

    /// An error reply for the given transaction.
    pub fn error(to: impl Into<String>, id: impl Into<String>, error: StanzaError) -> Self {
        OutboundMessage {
            to: to.into(),
            id: Some(id.into()),
            kind: StanzaKind::Error,
            jingle: None,
            error: Some(error),
        }
    }

    /// A locally originated action.
    pub fn set(to: impl Into<String>, jingle: JinglePayload) -> Self {
        OutboundMessage {
            to: to.into(),
            id: None,
            kind: StanzaKind::Set,
            jingle: Some(jingle),
            error: None,
        }
    }
}

//! Protocol error payloads
//!
//! Validation failures and handler rejections are answered with a stanza
//! error carrying a condition from the closed taxonomy, optionally qualified
//! by a Jingle condition. These are values passed through completion
//! callbacks and outbound envelopes; they are never raised as panics across
//! the queue boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::{ErrorCondition, ErrorType, JingleCondition};

/// A protocol-level error reply payload.
///
/// The named constructors cover every error the dispatcher and the default
/// session handlers can produce. All of them use error type `cancel` except
/// [`StanzaError::unsupported_info`], which asks the peer to modify and
/// resend per XEP-0166 §10.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StanzaError {
    /// Stanza error type
    #[serde(rename = "type", default)]
    pub error_type: ErrorType,

    /// Stanza error condition
    pub condition: ErrorCondition,

    /// Jingle-specific qualification, when one applies
    #[serde(rename = "jingleCondition", skip_serializing_if = "Option::is_none")]
    pub jingle_condition: Option<JingleCondition>,

    /// Optional human-readable text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl StanzaError {
    /// Stale or spoofed sid, or an action addressed to an ended session.
    pub fn unknown_session() -> Self {
        StanzaError {
            error_type: ErrorType::Cancel,
            condition: ErrorCondition::ItemNotFound,
            jingle_condition: Some(JingleCondition::UnknownSession),
            text: None,
        }
    }

    /// Sequencing violation, e.g. accepting a session twice.
    pub fn out_of_order() -> Self {
        StanzaError {
            error_type: ErrorType::Cancel,
            condition: ErrorCondition::UnexpectedRequest,
            jingle_condition: Some(JingleCondition::OutOfOrder),
            text: None,
        }
    }

    /// Simultaneous negotiation collision; the losing attempt is rejected.
    pub fn tie_break() -> Self {
        StanzaError {
            error_type: ErrorType::Cancel,
            condition: ErrorCondition::Conflict,
            jingle_condition: Some(JingleCondition::TieBreak),
            text: None,
        }
    }

    /// Malformed action or missing contents.
    pub fn bad_request() -> Self {
        StanzaError {
            error_type: ErrorType::Cancel,
            condition: ErrorCondition::BadRequest,
            jingle_condition: None,
            text: None,
        }
    }

    /// Sid collision with an unrelated peer.
    pub fn service_unavailable() -> Self {
        StanzaError {
            error_type: ErrorType::Cancel,
            condition: ErrorCondition::ServiceUnavailable,
            jingle_condition: None,
            text: None,
        }
    }

    /// Recognized `*-info` action with an unrecognized payload.
    pub fn unsupported_info() -> Self {
        StanzaError {
            error_type: ErrorType::Modify,
            condition: ErrorCondition::FeatureNotImplemented,
            jingle_condition: Some(JingleCondition::UnsupportedInfo),
            text: None,
        }
    }

    /// Opaque failure surfaced by an external collaborator.
    pub fn general_error() -> Self {
        StanzaError {
            error_type: ErrorType::Cancel,
            condition: ErrorCondition::GeneralError,
            jingle_condition: None,
            text: None,
        }
    }

    /// Attach human-readable text to the error.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Whether this error reports a tie-break collision.
    pub fn is_tie_break(&self) -> bool {
        self.jingle_condition == Some(JingleCondition::TieBreak)
    }
}

impl fmt::Display for StanzaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.condition)?;
        if let Some(jingle) = self.jingle_condition {
            write!(f, " ({jingle})")?;
        }
        if let Some(text) = &self.text {
            write!(f, ": {text}")?;
        }
        Ok(())
    }
}

impl std::error::Error for StanzaError {}

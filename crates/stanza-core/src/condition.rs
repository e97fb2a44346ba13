//! Error and reason condition vocabularies
//!
//! Three distinct closed sets share the "condition" spelling on the wire:
//! stanza error conditions (RFC 6120 §8.3), Jingle-specific error conditions
//! (XEP-0166 §10), and session termination reason conditions (XEP-0166 §7.4).
//! They are kept as separate enums so a reason can never be smuggled into an
//! error reply or vice versa.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stanza error type, carried as `type` on an error payload.
///
/// Only `cancel` and `modify` are produced by the negotiation engine itself;
/// the remaining values exist so errors surfaced by the delivery channel can
/// be represented without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    /// Do not retry; the error is final
    Cancel,
    /// Retry after changing the payload
    Modify,
    /// Retry after providing credentials
    Auth,
    /// Retry after waiting
    Wait,
    /// Informational continuation
    Continue,
}

impl Default for ErrorType {
    fn default() -> Self {
        ErrorType::Cancel
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Cancel => "cancel",
            ErrorType::Modify => "modify",
            ErrorType::Auth => "auth",
            ErrorType::Wait => "wait",
            ErrorType::Continue => "continue",
        }
    }
}

/// Stanza-level error condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCondition {
    /// Malformed or incomplete request
    BadRequest,
    /// Conflicts with existing negotiation state
    Conflict,
    /// Recognized action, unsupported payload
    FeatureNotImplemented,
    /// No addressable session for the request
    ItemNotFound,
    /// The service cannot fulfil the request at all
    ServiceUnavailable,
    /// Request out of sequence
    UnexpectedRequest,
    /// Opaque failure reported by an external collaborator
    GeneralError,
}

impl ErrorCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCondition::BadRequest => "bad-request",
            ErrorCondition::Conflict => "conflict",
            ErrorCondition::FeatureNotImplemented => "feature-not-implemented",
            ErrorCondition::ItemNotFound => "item-not-found",
            ErrorCondition::ServiceUnavailable => "service-unavailable",
            ErrorCondition::UnexpectedRequest => "unexpected-request",
            ErrorCondition::GeneralError => "general-error",
        }
    }
}

/// Jingle-specific error condition, qualifying a stanza error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JingleCondition {
    /// Sequencing violation, e.g. a double session-accept
    OutOfOrder,
    /// Simultaneous negotiation collision, resolved deterministically
    TieBreak,
    /// Stale or spoofed session id
    UnknownSession,
    /// Recognized `*-info` action with an unrecognized payload
    UnsupportedInfo,
}

impl JingleCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            JingleCondition::OutOfOrder => "out-of-order",
            JingleCondition::TieBreak => "tie-break",
            JingleCondition::UnknownSession => "unknown-session",
            JingleCondition::UnsupportedInfo => "unsupported-info",
        }
    }
}

/// Session termination reason condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonCondition {
    /// Superseded by another session, typically after losing a tie-break
    AlternativeSession,
    /// The party is busy
    Busy,
    /// The initiator withdrew the offer
    Cancel,
    /// Connectivity was lost and could not be re-established
    ConnectivityError,
    /// The responder refused the offer
    Decline,
    /// The session ran past its allowed lifetime
    Expired,
    /// The application type could not be set up or kept running
    FailedApplication,
    /// The transport method could not be set up or kept running
    FailedTransport,
    /// An unspecified error occurred
    GeneralError,
    /// The party is going offline
    Gone,
    /// Offered and negotiated parameters cannot be reconciled
    IncompatibleParameters,
    /// A media-specific error occurred
    MediaError,
    /// A security requirement could not be met
    SecurityError,
    /// Normal, successful completion
    Success,
    /// A timeout elapsed
    Timeout,
    /// None of the offered application types are supported
    UnsupportedApplications,
    /// None of the offered transport methods are supported
    UnsupportedTransports,
}

impl ReasonCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCondition::AlternativeSession => "alternative-session",
            ReasonCondition::Busy => "busy",
            ReasonCondition::Cancel => "cancel",
            ReasonCondition::ConnectivityError => "connectivity-error",
            ReasonCondition::Decline => "decline",
            ReasonCondition::Expired => "expired",
            ReasonCondition::FailedApplication => "failed-application",
            ReasonCondition::FailedTransport => "failed-transport",
            ReasonCondition::GeneralError => "general-error",
            ReasonCondition::Gone => "gone",
            ReasonCondition::IncompatibleParameters => "incompatible-parameters",
            ReasonCondition::MediaError => "media-error",
            ReasonCondition::SecurityError => "security-error",
            ReasonCondition::Success => "success",
            ReasonCondition::Timeout => "timeout",
            ReasonCondition::UnsupportedApplications => "unsupported-applications",
            ReasonCondition::UnsupportedTransports => "unsupported-transports",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ErrorCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for JingleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ReasonCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

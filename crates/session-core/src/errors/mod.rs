//! Error types for session-core
//!
//! Two layers of error exist here. [`SessionError`] covers library faults:
//! misuse of the local API, a failing negotiation engine, a closed channel.
//! Protocol-visible rejections are `StanzaError` values from the wire
//! vocabulary; they travel through completion callbacks and outbound
//! envelopes, never as panics. A `SessionError` escaping a handler collapses
//! to a `general-error` reply so the peer always gets a protocol-correct
//! answer.

use rjingle_stanza_core::StanzaError;

/// Result type used throughout session-core.
pub type SessionResult<T> = Result<T, SessionError>;

/// Library-level errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A session with this sid is already registered
    #[error("session {sid} already exists")]
    DuplicateSession { sid: String },

    /// No registered session carries this sid
    #[error("session {sid} not found")]
    SessionNotFound { sid: String },

    /// The session has already reached its terminal state
    #[error("session {sid} has ended")]
    SessionEnded { sid: String },

    /// The operation does not apply in the session's current state
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },

    /// The negotiation engine reported a failure
    #[error("negotiation engine error: {message}")]
    Engine { message: String },

    /// A protocol-level rejection to relay to the peer
    #[error("protocol error: {0}")]
    Protocol(#[from] StanzaError),

    /// The event pipe to the manager has shut down
    #[error("signaling channel closed")]
    ChannelClosed,
}

impl SessionError {
    pub fn engine(message: impl Into<String>) -> Self {
        SessionError::Engine {
            message: message.into(),
        }
    }
}

impl From<SessionError> for StanzaError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Protocol(stanza_error) => stanza_error,
            SessionError::Engine { message } => StanzaError::general_error().with_text(message),
            other => StanzaError::general_error().with_text(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rjingle_stanza_core::condition::ErrorCondition;

    #[test]
    fn protocol_errors_pass_through() {
        let error = SessionError::Protocol(StanzaError::unsupported_info());
        let stanza: StanzaError = error.into();
        assert_eq!(stanza, StanzaError::unsupported_info());
    }

    #[test]
    fn engine_errors_collapse_to_general_error() {
        let error = SessionError::engine("ice gathering failed");
        let stanza: StanzaError = error.into();
        assert_eq!(stanza.condition, ErrorCondition::GeneralError);
        assert_eq!(stanza.text.as_deref(), Some("ice gathering failed"));
    }
}

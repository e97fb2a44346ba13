//! Jingle action names
//!
//! The closed set of session actions defined in XEP-0166 §7.2, plus the two
//! unstandardized source actions used by RTP signaling in the wild. Anything
//! outside this set fails to parse and must be answered with `bad-request`
//! by the dispatcher; it can never reach a session handler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A Jingle session action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Accept a content-add offer
    ContentAccept,
    /// Offer a new content to the session
    ContentAdd,
    /// Change the directionality of media sending
    ContentModify,
    /// Reject a content-add offer
    ContentReject,
    /// Remove a content from the session
    ContentRemove,
    /// Exchange information about an application type
    DescriptionInfo,
    /// Definitively accept a session negotiation
    SessionAccept,
    /// Exchange session-level information (ringing, hold, mute, ...)
    SessionInfo,
    /// Request negotiation of a new session
    SessionInitiate,
    /// End an existing session
    SessionTerminate,
    /// Accept a transport-replace offer
    TransportAccept,
    /// Exchange transport candidates
    TransportInfo,
    /// Reject a transport-replace offer
    TransportReject,
    /// Redefine a transport method
    TransportReplace,
    /// Add a source to active media (unstandardized)
    SourceAdd,
    /// Remove a source from active media (unstandardized)
    SourceRemove,
}

/// All defined actions, in wire-name order.
pub const ALL_ACTIONS: [Action; 16] = [
    Action::ContentAccept,
    Action::ContentAdd,
    Action::ContentModify,
    Action::ContentReject,
    Action::ContentRemove,
    Action::DescriptionInfo,
    Action::SessionAccept,
    Action::SessionInfo,
    Action::SessionInitiate,
    Action::SessionTerminate,
    Action::SourceAdd,
    Action::SourceRemove,
    Action::TransportAccept,
    Action::TransportInfo,
    Action::TransportReject,
    Action::TransportReplace,
];

impl Action {
    /// The kebab-case wire name of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ContentAccept => "content-accept",
            Action::ContentAdd => "content-add",
            Action::ContentModify => "content-modify",
            Action::ContentReject => "content-reject",
            Action::ContentRemove => "content-remove",
            Action::DescriptionInfo => "description-info",
            Action::SessionAccept => "session-accept",
            Action::SessionInfo => "session-info",
            Action::SessionInitiate => "session-initiate",
            Action::SessionTerminate => "session-terminate",
            Action::TransportAccept => "transport-accept",
            Action::TransportInfo => "transport-info",
            Action::TransportReject => "transport-reject",
            Action::TransportReplace => "transport-replace",
            Action::SourceAdd => "source-add",
            Action::SourceRemove => "source-remove",
        }
    }

    /// Whether sending this action requires tracking a peer acknowledgment.
    ///
    /// While such an action is outstanding the session records it as its
    /// pending action; a competing acknowledgment-tracked action arriving
    /// from the peer in the meantime triggers tie-break resolution.
    pub fn requires_ack(&self) -> bool {
        matches!(
            self,
            Action::SessionAccept
                | Action::ContentAccept
                | Action::ContentAdd
                | Action::ContentModify
                | Action::ContentReject
                | Action::ContentRemove
                | Action::TransportAccept
                | Action::TransportReject
                | Action::TransportReplace
                | Action::SourceAdd
                | Action::SourceRemove
        )
    }

    /// Whether this is one of the `*-info` exchange actions.
    pub fn is_info(&self) -> bool {
        matches!(
            self,
            Action::SessionInfo | Action::DescriptionInfo | Action::TransportInfo
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an action name outside the defined set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown jingle action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_ACTIONS
            .iter()
            .find(|action| action.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

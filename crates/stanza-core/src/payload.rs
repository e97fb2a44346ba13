//! The Jingle payload carried by `set` stanzas
//!
//! The action name is kept as the raw wire string here: an unrecognized name
//! must still be representable so the dispatcher can answer it with
//! `bad-request` instead of dropping the request on the floor. Parsing into
//! [`Action`](crate::Action) happens at dispatch, after the session-level
//! validation has run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::Action;
use crate::content::Content;
use crate::reason::Reason;

/// The `jingle` element of a request or outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JinglePayload {
    /// Session id this payload addresses
    #[serde(default)]
    pub sid: String,

    /// Raw action name; empty on `result`/`error` payloads
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,

    /// Contents being negotiated
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<Content>,

    /// Termination reason, on `session-terminate` and the reject actions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,

    /// Open `*-info` payload (ringing, mute, hold, ...), flattened on the wire
    #[serde(flatten)]
    pub info: Map<String, Value>,
}

impl JinglePayload {
    pub fn new() -> Self {
        JinglePayload::default()
    }

    pub fn with_contents(mut self, contents: Vec<Content>) -> Self {
        self.contents = contents;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<Reason>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Set a bare boolean info flag, e.g. `ringing` or `hold`.
    pub fn with_info_flag(mut self, key: impl Into<String>) -> Self {
        self.info.insert(key.into(), Value::Bool(true));
        self
    }

    /// Set a structured info entry.
    pub fn with_info(mut self, key: impl Into<String>, value: Value) -> Self {
        self.info.insert(key.into(), value);
        self
    }

    /// Parse the raw action name against the closed action set.
    pub fn parsed_action(&self) -> Option<Action> {
        self.action.parse().ok()
    }

    /// The description type tags of all contents, for tie-break bookkeeping.
    pub fn description_types(&self) -> Vec<String> {
        self.contents
            .iter()
            .filter_map(|content| content.description.as_ref())
            .map(|description| description.desc_type.clone())
            .collect()
    }

    /// The transport type tags of all contents.
    pub fn transport_types(&self) -> Vec<String> {
        self.contents
            .iter()
            .filter_map(|content| content.transport.as_ref())
            .map(|transport| transport.trans_type.clone())
            .collect()
    }

    /// Whether the payload carries anything beyond sid and action.
    ///
    /// An empty `session-info` is a keepalive ping and is acknowledged as a
    /// no-op rather than answered with `unsupported-info`.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty() && self.reason.is_none() && self.info.is_empty()
    }
}

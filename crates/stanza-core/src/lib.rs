//! # rjingle-stanza-core
//!
//! Wire-level vocabulary for the rjingle signaling stack: the Jingle action
//! names defined in [XEP-0166](https://xmpp.org/extensions/xep-0166.html),
//! the error and reason condition taxonomies, content description/transport
//! tags, and the inbound/outbound message envelopes exchanged with the
//! delivery channel.
//!
//! This crate is pure data. It performs no I/O, spawns no tasks, and knows
//! nothing about session state; the session engine lives in
//! `rjingle-session-core`. Everything here (de)serializes with the same JSON
//! field spellings used by the protocol's JSON mapping (`descType`,
//! `transType`, `jingleCondition`, ...), so envelopes can be bridged to an
//! XMPP connection or any other carrier without translation glue.

pub mod action;
pub mod condition;
pub mod content;
pub mod envelope;
pub mod error;
pub mod payload;
pub mod reason;

// Re-export main types
pub use action::Action;
pub use condition::{ErrorCondition, ErrorType, JingleCondition, ReasonCondition};
pub use content::{Content, Creator, Description, Senders, Transport};
pub use envelope::{OutboundMessage, Request, StanzaKind};
pub use error::StanzaError;
pub use payload::JinglePayload;
pub use reason::Reason;

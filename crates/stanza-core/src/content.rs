//! Session contents
//!
//! A content is one negotiable unit inside a session: an application
//! description (what is carried, tagged by `descType`) paired with a
//! transport (how candidates are exchanged, tagged by `transType`). The
//! engine only ever inspects the two type tags; the rest of each block is
//! carried opaquely for the application/transport layers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which party created a content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Creator {
    Initiator,
    Responder,
}

/// Which parties send media over a content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Senders {
    Both,
    Initiator,
    None,
    Responder,
}

/// An application description block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Application type tag, e.g. `rtp` or `filetransfer`
    #[serde(rename = "descType")]
    pub desc_type: String,

    /// Application-defined remainder, carried opaquely
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Description {
    pub fn new(desc_type: impl Into<String>) -> Self {
        Description {
            desc_type: desc_type.into(),
            data: Map::new(),
        }
    }
}

/// A transport block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    /// Transport method tag, e.g. `ice-udp`
    #[serde(rename = "transType")]
    pub trans_type: String,

    /// Transport-defined remainder, carried opaquely
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Transport {
    pub fn new(trans_type: impl Into<String>) -> Self {
        Transport {
            trans_type: trans_type.into(),
            data: Map::new(),
        }
    }
}

/// One negotiable unit within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<Creator>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub senders: Option<Senders>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
}

impl Content {
    /// A content carrying just the two type tags, the minimum a
    /// `session-initiate` needs for tie-break bookkeeping.
    pub fn tagged(desc_type: impl Into<String>, trans_type: impl Into<String>) -> Self {
        Content {
            description: Some(Description::new(desc_type)),
            transport: Some(Transport::new(trans_type)),
            ..Content::default()
        }
    }
}

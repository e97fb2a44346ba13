//! Session termination reasons

use serde::{Deserialize, Serialize};

use crate::condition::ReasonCondition;

/// The reason attached to a `session-terminate` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    /// Why the session ended
    pub condition: ReasonCondition,

    /// Optional human-readable elaboration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Reason {
    pub fn new(condition: ReasonCondition) -> Self {
        Reason {
            condition,
            text: None,
        }
    }

    /// Normal, successful completion.
    pub fn success() -> Self {
        Reason::new(ReasonCondition::Success)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl From<ReasonCondition> for Reason {
    fn from(condition: ReasonCondition) -> Self {
        Reason::new(condition)
    }
}

impl Default for Reason {
    fn default() -> Self {
        Reason::success()
    }
}

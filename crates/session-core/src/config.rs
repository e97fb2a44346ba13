//! Session manager configuration

use std::fmt;
use std::sync::Arc;

use crate::manager::{SessionFactory, TrustPolicy};

/// Configuration for a [`SessionManager`](crate::SessionManager).
#[derive(Clone)]
pub struct SessionManagerConfig {
    /// This party's own identity, compared against peer identities during
    /// tie-break resolution. Must be the same value the peer sees as our
    /// sender address.
    pub self_identity: String,

    /// Factory consulted for every validated incoming `session-initiate`.
    /// When absent, or when the factory declines, the generic session kind
    /// is used.
    pub factory: Option<Arc<dyn SessionFactory>>,

    /// Identity equivalence policy used to validate that a request's sender
    /// owns the session it addresses. Defaults to strict string equality.
    pub trust: Option<Arc<dyn TrustPolicy>>,

    /// Capacity of each session's broadcast notification channel.
    pub session_event_capacity: usize,
}

impl SessionManagerConfig {
    pub fn new(self_identity: impl Into<String>) -> Self {
        SessionManagerConfig {
            self_identity: self_identity.into(),
            factory: None,
            trust: None,
            session_event_capacity: 64,
        }
    }

    pub fn with_session_factory(mut self, factory: Arc<dyn SessionFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn with_trust_policy(mut self, trust: Arc<dyn TrustPolicy>) -> Self {
        self.trust = Some(trust);
        self
    }

    pub fn with_session_event_capacity(mut self, capacity: usize) -> Self {
        self.session_event_capacity = capacity;
        self
    }
}

impl fmt::Debug for SessionManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManagerConfig")
            .field("self_identity", &self.self_identity)
            .field("factory", &self.factory.as_ref().map(|_| "Arc<dyn SessionFactory>"))
            .field("trust", &self.trust.as_ref().map(|_| "Arc<dyn TrustPolicy>"))
            .field("session_event_capacity", &self.session_event_capacity)
            .finish()
    }
}

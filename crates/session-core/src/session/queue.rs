//! Per-session action queue
//!
//! Every session owns a single-consumer task queue: the dispatcher pushes
//! one task per validated inbound action, and a dedicated worker drains them
//! strictly in arrival order, finishing each task before pulling the next.
//! A handler may suspend on arbitrarily long external work; nothing else for
//! that session runs until it completes. This is what keeps network-level
//! reordering from being amplified into out-of-order handler execution.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use rjingle_stanza_core::{Action, JinglePayload, StanzaError};

use crate::session::core::Session;
use crate::session::state::SessionState;

type CompletionFn = Box<dyn FnOnce(Result<(), StanzaError>) + Send>;

/// Fire-exactly-once completion callback for one queued action.
///
/// The dispatcher installs a callback that turns the outcome into the
/// acknowledgment or error reply for the peer. A handler that needs to send
/// follow-up messages after the acknowledgment (the content-add and
/// transport-replace reject patterns) resolves the completion early with
/// [`Completion::succeed`] and keeps going; otherwise the queue worker
/// resolves it from the handler's return value. Whichever happens first
/// wins - later resolutions are no-ops.
pub struct Completion {
    inner: Mutex<Option<CompletionFn>>,
}

impl Completion {
    pub fn new(callback: impl FnOnce(Result<(), StanzaError>) + Send + 'static) -> Self {
        Completion {
            inner: Mutex::new(Some(Box::new(callback))),
        }
    }

    /// A completion that discards its outcome, for locally driven tasks.
    pub fn discard() -> Self {
        Completion::new(|_| {})
    }

    /// Resolve successfully; the installed callback acknowledges the action.
    pub fn succeed(&self) {
        self.resolve(Ok(()));
    }

    /// Resolve with a protocol error reply for the peer.
    pub fn fail(&self, error: StanzaError) {
        self.resolve(Err(error));
    }

    /// Whether the completion has already fired.
    pub fn is_resolved(&self) -> bool {
        self.inner.lock().is_none()
    }

    fn resolve(&self, result: Result<(), StanzaError>) {
        if let Some(callback) = self.inner.lock().take() {
            callback(result);
        }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// One queued action awaiting processing.
pub(crate) struct SessionTask {
    pub action: Action,
    pub payload: JinglePayload,
    pub completion: Completion,
}

/// Spawns the single worker that drains one session's queue.
///
/// The worker holds only a weak reference: once every strong reference to
/// the session is gone the queue sender drops with it, `recv` returns
/// `None`, and the worker exits.
pub(crate) fn spawn_worker(session: &Arc<Session>, mut rx: mpsc::UnboundedReceiver<SessionTask>) {
    let weak = Arc::downgrade(session);
    tokio::spawn(async move {
        while let Some(task) = rx.recv().await {
            let Some(session) = weak.upgrade() else {
                break;
            };
            let SessionTask {
                action,
                payload,
                completion,
            } = task;

            // A task queued behind the one that terminated the session still
            // completes, but against a terminated session it is a no-op.
            if session.session_state() == SessionState::Ended
                && action != Action::SessionTerminate
            {
                debug!(sid = %session.sid(), %action, "session already ended; acknowledging as no-op");
                completion.succeed();
                continue;
            }

            debug!(sid = %session.sid(), %action, "processing action");
            match session.kind().handle(&session, action, payload, &completion).await {
                Ok(()) => completion.succeed(),
                Err(error) => {
                    let reply: StanzaError = error.into();
                    if completion.is_resolved() {
                        warn!(
                            sid = %session.sid(),
                            %action,
                            error = %reply,
                            "handler failed after acknowledging"
                        );
                    } else {
                        completion.fail(reply);
                    }
                }
            }
        }
    });
}

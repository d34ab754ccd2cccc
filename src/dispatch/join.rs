use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::core::session::{Operation, Session};
use crate::reply::ReplyEmitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinState {
    Awaiting,
    Complete,
}

/// Fires the reply once every operation of the session has completed.
///
/// The emitter is taken out of its slot on the transition into
/// [`JoinState::Complete`]; later reports find the slot empty and do nothing.
pub struct JoinCoordinator {
    session: Arc<Session>,
    emitter: Mutex<Option<ReplyEmitter>>,
}

impl JoinCoordinator {
    #[must_use]
    pub fn new(session: Arc<Session>, emitter: ReplyEmitter) -> Self {
        Self {
            session,
            emitter: Mutex::new(Some(emitter)),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Records `operation`'s outcome on the session, then reports it.
    pub fn complete(&self, operation: Operation, fragment: Option<String>) -> JoinState {
        if !self.session.complete(operation, fragment) {
            debug!(%operation, "Ignoring repeated completion");
        }
        self.report(operation)
    }

    /// Re-evaluates the completion flags and emits the reply if this report
    /// is the one that completes the session.
    pub fn report(&self, operation: Operation) -> JoinState {
        if !self.session.is_complete() {
            debug!(session_id = %self.session.id(), %operation, "Awaiting remaining operations");
            return JoinState::Awaiting;
        }

        let emitter = self
            .emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(emitter) = emitter {
            info!(session_id = %self.session.id(), %operation, "All operations complete");
            emitter.emit(&self.session);
        }
        JoinState::Complete
    }

    #[must_use]
    pub fn state(&self) -> JoinState {
        let emitted = self
            .emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none();
        if emitted {
            JoinState::Complete
        } else {
            JoinState::Awaiting
        }
    }
}

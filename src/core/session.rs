use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

/// An analysis dispatched against a session's media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    Caption,
    TextExtraction,
}

impl Operation {
    pub const ALL: [Operation; 2] = [Operation::Caption, Operation::TextExtraction];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Caption => write!(f, "caption"),
            Operation::TextExtraction => write!(f, "text_extraction"),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    fragments: Vec<String>,
    completion: BTreeMap<Operation, bool>,
}

/// Processing state for one inbound message.
///
/// Fragments are kept in the order operations report them, not the order
/// they were launched.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    media_url: String,
    state: Mutex<SessionState>,
}

impl Session {
    #[must_use]
    pub fn new(media_url: impl Into<String>, operations: &[Operation]) -> Self {
        let completion = operations.iter().map(|op| (*op, false)).collect();
        Self {
            id: Uuid::new_v4(),
            media_url: media_url.into(),
            state: Mutex::new(SessionState {
                fragments: Vec::new(),
                completion,
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the terminal outcome of `operation`: appends its fragment, if
    /// any, and sets its completion flag in the same critical section.
    ///
    /// Returns `false` if the operation was not dispatched for this session or
    /// had already completed; nothing is recorded in that case.
    pub fn complete(&self, operation: Operation, fragment: Option<String>) -> bool {
        let mut guard = self.lock();
        let state = &mut *guard;
        match state.completion.get_mut(&operation) {
            Some(done) if !*done => {
                *done = true;
                if let Some(fragment) = fragment {
                    state.fragments.push(fragment);
                }
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.lock().completion.values().all(|done| *done)
    }

    #[must_use]
    pub fn is_operation_complete(&self, operation: Operation) -> bool {
        self.lock()
            .completion
            .get(&operation)
            .copied()
            .unwrap_or(false)
    }

    #[must_use]
    pub fn fragments(&self) -> Vec<String> {
        self.lock().fragments.clone()
    }
}

use tokio::sync::oneshot;
use tracing::{info, warn};

use super::{MessagingResponse, NO_MEDIA_MESSAGE, WebhookReply};
use crate::core::session::Session;

type ReplyCallback = Box<dyn FnOnce(WebhookReply) + Send>;

/// Delivers the reply for one request.
///
/// Emitting consumes the emitter, so a request can be answered at most once.
pub struct ReplyEmitter {
    callback: ReplyCallback,
}

impl ReplyEmitter {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(WebhookReply) + Send + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// An emitter whose reply arrives on the returned receiver.
    #[must_use]
    pub fn channel() -> (Self, oneshot::Receiver<WebhookReply>) {
        let (tx, rx) = oneshot::channel();
        let emitter = Self::new(move |reply| {
            if tx.send(reply).is_err() {
                warn!("Reply receiver dropped before the reply was emitted");
            }
        });
        (emitter, rx)
    }

    /// Emits every fragment of `session` as its own message.
    pub fn emit(self, session: &Session) {
        let fragments = session.fragments();
        let mut twiml = MessagingResponse::new();
        for fragment in &fragments {
            twiml.message(fragment.as_str());
        }
        info!(
            session_id = %session.id(),
            messages = fragments.len(),
            "Emitting reply"
        );
        (self.callback)(WebhookReply::twiml(&twiml));
    }

    pub fn emit_no_media(self) {
        let mut twiml = MessagingResponse::new();
        twiml.message(NO_MEDIA_MESSAGE);
        info!("Emitting no-media reply");
        (self.callback)(WebhookReply::twiml(&twiml));
    }
}

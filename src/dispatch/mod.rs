//! Fan-out of the image analyses and the join that answers the request

pub mod caption;
pub mod join;
pub mod text;

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, info, info_span};

use crate::clients::ImageAnalyzer;
use crate::core::session::{Operation, Session};
use crate::errors::ResponderError;
use crate::reply::{ReplyEmitter, WebhookReply};

pub use join::{JoinCoordinator, JoinState};

/// Launches every operation of `Operation::ALL` against the session's media
/// on its own task. Each task records its outcome and reports to the
/// coordinator; nothing is awaited here.
pub fn launch(
    coordinator: &Arc<JoinCoordinator>,
    analyzer: &Arc<dyn ImageAnalyzer>,
    deadline: Duration,
) {
    let session_id = coordinator.session().id();
    for operation in Operation::ALL {
        let coordinator = Arc::clone(coordinator);
        let analyzer = Arc::clone(analyzer);
        let span = info_span!("operation", %session_id, %operation);

        tokio::spawn(
            async move {
                let media_url = coordinator.session().media_url().to_string();
                let fragment = match operation {
                    Operation::Caption => {
                        Some(caption::run(analyzer.as_ref(), &media_url, deadline).await)
                    }
                    Operation::TextExtraction => {
                        text::run(analyzer.as_ref(), &media_url, deadline).await
                    }
                };
                coordinator.complete(operation, fragment);
            }
            .instrument(span),
        );
    }
}

/// Runs both analyses for `session` and resolves with the single reply.
pub async fn dispatch(
    session: Session,
    analyzer: Arc<dyn ImageAnalyzer>,
    deadline: Duration,
) -> Result<WebhookReply, ResponderError> {
    info!(session_id = %session.id(), "Dispatching image analyses");
    let (emitter, reply) = ReplyEmitter::channel();
    let coordinator = Arc::new(JoinCoordinator::new(Arc::new(session), emitter));

    launch(&coordinator, &analyzer, deadline);
    // Only the operation tasks may hold the coordinator from here on, so a
    // task that dies without reporting drops the emitter and closes `reply`.
    drop(coordinator);

    reply.await.map_err(|_| ResponderError::ReplyDropped)
}

// This is the Lambda bootstrap entry point for the webhook function

use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;
use snapsight::api::{Responder, handler};
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    snapsight::setup_logging();

    // Configuration and the credential cache live for the whole process;
    // every invocation shares them.
    let responder = Arc::new(Responder::from_env().await.map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e.to_string())
    })?);

    run(service_fn(move |event: LambdaEvent<Value>| {
        let responder = Arc::clone(&responder);
        async move { handler(&responder, event).await }
    }))
    .await
}

//! Snapsight - an MMS responder that describes the pictures people text it.
//!
//! The messaging provider calls a single Lambda for each inbound message. The
//! function:
//! 1. Decrypts its credentials with KMS once per process and caches them
//! 2. Verifies the provider's webhook signature
//! 3. Sends the attached image to a captioning and an OCR endpoint concurrently
//! 4. Answers with one TwiML document once both analyses have finished
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda for serverless execution
//! - KMS for encrypted credentials
//! - reqwest for the Computer Vision API
//! - Tokio tasks for the fan-out and a one-shot channel for the joined reply
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use snapsight::api::Responder;
//! use snapsight::core::config::AppConfig;
//! use snapsight::core::credentials::{CredentialCache, KmsDecryptor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     snapsight::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let decryptor = Arc::new(KmsDecryptor::from_env().await);
//!     let credentials = CredentialCache::from_config(decryptor, &config);
//!     let responder = Responder::new(config, credentials, reqwest::Client::new());
//!
//!     let event = serde_json::json!({
//!         "headers": { "X-Signature": "..." },
//!         "body": "NumMedia=0",
//!     });
//!     let reply = responder.process(&event).await?;
//!     println!("{}", reply.body);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod clients;
pub mod core;
pub mod dispatch;
pub mod errors;
pub mod reply;

pub use errors::ResponderError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. Calling it more than once is harmless; only
/// the first call installs the subscriber.
///
/// # Example
///
/// ```
/// snapsight::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

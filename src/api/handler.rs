//! Lambda handler for inbound messaging webhooks.
//!
//! Flow per invocation:
//! - Ensure both credentials are decrypted (cached for the process lifetime)
//! - Verify the webhook signature; reject with a bare 500 otherwise
//! - Reply immediately when the message carries no media
//! - Otherwise dispatch caption and text analyses and await the joined reply

use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use super::{parsing, signature};
use crate::clients::{ImageAnalyzer, VisionClient};
use crate::core::config::AppConfig;
use crate::core::credentials::{CredentialCache, CredentialName, KmsDecryptor};
use crate::core::session::{Operation, Session};
use crate::dispatch;
use crate::errors::ResponderError;
use crate::reply::{ReplyEmitter, WebhookReply};

pub const SIGNATURE_HEADER: &str = "X-Signature";
pub const PROVIDER_SIGNATURE_HEADER: &str = "X-Twilio-Signature";

/// Long-lived state shared by every invocation of the function.
pub struct Responder {
    config: AppConfig,
    credentials: CredentialCache,
    http: reqwest::Client,
}

impl Responder {
    #[must_use]
    pub fn new(config: AppConfig, credentials: CredentialCache, http: reqwest::Client) -> Self {
        Self {
            config,
            credentials,
            http,
        }
    }

    /// Reads configuration from the environment and wires the KMS decryptor.
    pub async fn from_env() -> Result<Self, ResponderError> {
        let config = AppConfig::from_env()?;
        let decryptor = Arc::new(KmsDecryptor::from_env().await);
        let credentials = CredentialCache::from_config(decryptor, &config);
        Ok(Self::new(config, credentials, reqwest::Client::new()))
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    /// Processes one API Gateway proxy event into its reply.
    ///
    /// # Errors
    ///
    /// `AuthenticationFailure` when the signature is missing or wrong,
    /// `CredentialUnavailable` when a secret cannot be decrypted.
    pub async fn process(&self, payload: &Value) -> Result<WebhookReply, ResponderError> {
        let (webhook_token, vision_key) = tokio::try_join!(
            self.credentials.get(CredentialName::WebhookToken),
            self.credentials.get(CredentialName::VisionKey),
        )?;

        let body = parsing::extract_body(payload)?;
        let headers = payload.get("headers").cloned().unwrap_or(Value::Null);
        let signature_header = parsing::get_header_value(&headers, SIGNATURE_HEADER)
            .or_else(|| parsing::get_header_value(&headers, PROVIDER_SIGNATURE_HEADER));

        if !signature::authenticate(
            &body,
            signature_header,
            &self.config.service_url,
            webhook_token.expose(),
        ) {
            return Err(ResponderError::AuthenticationFailure);
        }
        info!("Webhook signature verified successfully");

        let message = parsing::InboundMessage::from_form(&body)?;
        let Some(media_url) = message.media_url() else {
            info!(message_sid = ?message.message_sid(), "Message has no media");
            let (emitter, reply) = ReplyEmitter::channel();
            emitter.emit_no_media();
            return reply.await.map_err(|_| ResponderError::ReplyDropped);
        };

        let session = Session::new(media_url, &Operation::ALL);
        info!(
            session_id = %session.id(),
            message_sid = ?message.message_sid(),
            "Created session for inbound media"
        );

        let analyzer: Arc<dyn ImageAnalyzer> = Arc::new(VisionClient::new(
            self.http.clone(),
            &self.config.vision_endpoint,
            vision_key.expose(),
        ));
        dispatch::dispatch(session, analyzer, self.config.analysis_timeout).await
    }
}

/// Lambda entrypoint.
///
/// # Errors
///
/// Authentication failures become a 500 response with an empty body. Any
/// other failure (credentials, unreadable event) fails the invocation.
#[tracing::instrument(level = "info", skip(responder, event), fields(request_id = %event.context.request_id))]
pub async fn function_handler(
    responder: &Responder,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    #[cfg(feature = "debug-logs")]
    info!("Webhook Lambda received request: {:?}", event.payload);

    match responder.process(&event.payload).await {
        Ok(reply) => {
            info!(status = reply.status_code, "Webhook handled");
            Ok(reply.to_payload())
        }
        Err(ResponderError::AuthenticationFailure) => {
            error!("Rejecting webhook: {}", ResponderError::AuthenticationFailure);
            Ok(WebhookReply::authentication_failure().to_payload())
        }
        Err(e) => {
            error!("Webhook processing failed: {}", e);
            Err(Error::from(e.to_string()))
        }
    }
}

pub use self::function_handler as handler;

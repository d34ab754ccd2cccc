//! Reply formatting and one-shot delivery

pub mod emitter;
pub mod twiml;

use serde_json::{Value, json};

pub use emitter::ReplyEmitter;
pub use twiml::{MessagingResponse, TWIML_CONTENT_TYPE};

pub const NO_MEDIA_MESSAGE: &str = "The message sent did not contain any media.";

/// The HTTP-shaped response handed back to the Lambda runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookReply {
    pub status_code: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
}

impl WebhookReply {
    #[must_use]
    pub fn twiml(response: &MessagingResponse) -> Self {
        Self {
            status_code: 200,
            content_type: Some(TWIML_CONTENT_TYPE),
            body: response.to_string(),
        }
    }

    #[must_use]
    pub fn authentication_failure() -> Self {
        Self {
            status_code: 500,
            content_type: None,
            body: String::new(),
        }
    }

    /// API Gateway proxy response shape.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let headers = match self.content_type {
            Some(content_type) => json!({ "Content-Type": content_type }),
            None => json!({}),
        };
        json!({
            "statusCode": self.status_code,
            "headers": headers,
            "body": self.body,
        })
    }
}

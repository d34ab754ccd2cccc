use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::errors::ResponderError;

/// Decodes an `application/x-www-form-urlencoded` body into ordered pairs.
pub fn parse_form(body: &str) -> Result<Vec<(String, String)>, ResponderError> {
    serde_urlencoded::from_str(body)
        .map_err(|e| ResponderError::ParseError(format!("Failed to parse form data: {e}")))
}

/// Inbound message notification fields.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    params: Vec<(String, String)>,
}

impl InboundMessage {
    #[must_use]
    pub fn new(params: Vec<(String, String)>) -> Self {
        Self { params }
    }

    pub fn from_form(body: &str) -> Result<Self, ResponderError> {
        parse_form(body).map(Self::new)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// `NumMedia` as a count; `None` when absent or not a non-negative integer.
    #[must_use]
    pub fn media_count(&self) -> Option<u32> {
        self.get("NumMedia")?.trim().parse().ok()
    }

    /// The first attachment, if the message declares any media. Further
    /// attachments are ignored.
    #[must_use]
    pub fn media_url(&self) -> Option<&str> {
        match self.media_count() {
            Some(count) if count > 0 => self
                .get("MediaUrl0")
                .map(str::trim)
                .filter(|url| !url.is_empty()),
            _ => None,
        }
    }

    #[must_use]
    pub fn message_sid(&self) -> Option<&str> {
        self.get("MessageSid")
    }
}

pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Returns the request body, base64-decoding it when the gateway flagged it.
/// A missing body is treated as empty.
pub fn extract_body(payload: &Value) -> Result<String, ResponderError> {
    let body = match payload.get("body") {
        None | Some(Value::Null) => return Ok(String::new()),
        Some(Value::String(body)) => body,
        Some(_) => {
            return Err(ResponderError::ParseError(
                "Request body is not a string".to_string(),
            ));
        }
    };

    let encoded = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !encoded {
        return Ok(body.clone());
    }

    let bytes = STANDARD
        .decode(body)
        .map_err(|e| ResponderError::ParseError(format!("Invalid base64 body: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| ResponderError::ParseError(format!("Body is not UTF-8: {e}")))
}

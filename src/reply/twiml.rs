//! TwiML builder for messaging replies.
//!
//! Every call to [`MessagingResponse::message`] adds one `<Message>` element,
//! which the provider delivers as a separate text.

use std::fmt;

pub const TWIML_CONTENT_TYPE: &str = "text/xml";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagingResponse {
    messages: Vec<String>,
}

impl MessagingResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&mut self, body: impl Into<String>) -> &mut Self {
        self.messages.push(body.into());
        self
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl fmt::Display for MessagingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#)?;
        for message in &self.messages {
            write!(f, "<Message>{}</Message>", escape_xml(message))?;
        }
        write!(f, "</Response>")
    }
}

#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

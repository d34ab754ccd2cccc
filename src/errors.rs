use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("Request did not originate from the messaging provider")]
    AuthenticationFailure,

    #[error("Credential unavailable: {0}")]
    CredentialUnavailable(String),

    #[error("Failed to parse webhook event: {0}")]
    ParseError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Image analysis failed: {0}")]
    AnalysisError(String),

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Reply channel closed before a reply was emitted")]
    ReplyDropped,
}

impl From<reqwest::Error> for ResponderError {
    fn from(error: reqwest::Error) -> Self {
        ResponderError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for ResponderError {
    fn from(error: serde_json::Error) -> Self {
        ResponderError::ParseError(error.to_string())
    }
}

use std::env;
use std::time::Duration;

use crate::errors::ResponderError;

pub const DEFAULT_VISION_ENDPOINT: &str = "https://api.projectoxford.ai/vision/v1.0";
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// The public URL the messaging provider was configured to call. Signatures are computed over it.
    pub service_url: String,
    pub vision_key_ciphertext: String,
    pub webhook_token_ciphertext: String,
    pub vision_endpoint: String,
    pub analysis_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ResponderError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ResponderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ResponderError::ConfigError(format!("{name}: not set")))
        };

        let analysis_timeout = match lookup("ANALYSIS_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    ResponderError::ConfigError(format!("ANALYSIS_TIMEOUT_SECS: {e}"))
                })?;
                if secs == 0 {
                    return Err(ResponderError::ConfigError(
                        "ANALYSIS_TIMEOUT_SECS: must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_ANALYSIS_TIMEOUT_SECS),
        };

        let vision_endpoint = lookup("VISION_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VISION_ENDPOINT.to_string());
        url::Url::parse(&vision_endpoint)
            .map_err(|e| ResponderError::ConfigError(format!("VISION_ENDPOINT: {e}")))?;

        Ok(Self {
            service_url: required("SERVICE_URL")?,
            vision_key_ciphertext: required("VISION_KEY_ENCRYPTED")?,
            webhook_token_ciphertext: required("WEBHOOK_TOKEN_ENCRYPTED")?,
            vision_endpoint: vision_endpoint.trim_end_matches('/').to_string(),
            analysis_timeout,
        })
    }
}

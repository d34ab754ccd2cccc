//! Computer Vision API client
//!
//! Covers the two calls the responder makes per image: a description
//! (`analyze` with the `Description` feature) and printed-text recognition
//! (`ocr`).

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{error, info};

use crate::core::models::{AnalyzeResponse, OcrResponse};
use crate::errors::ResponderError;

const SUBSCRIPTION_KEY_HEADER: &str = "ocp-apim-subscription-key";

/// The remote image analyses a session can dispatch.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn describe(&self, media_url: &str) -> Result<AnalyzeResponse, ResponderError>;

    async fn recognize_text(&self, media_url: &str) -> Result<OcrResponse, ResponderError>;
}

#[derive(Debug)]
pub struct VisionClient {
    http: Client,
    endpoint: String,
    subscription_key: SecretString,
}

impl VisionClient {
    pub fn new(http: Client, endpoint: &str, subscription_key: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            subscription_key: SecretString::new(subscription_key.to_string()),
        }
    }

    fn headers(&self) -> Result<HeaderMap, ResponderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(self.subscription_key.expose_secret()).map_err(|e| {
            ResponderError::AnalysisError(format!("invalid subscription key header: {e}"))
        })?;
        key.set_sensitive(true);
        headers.insert(SUBSCRIPTION_KEY_HEADER, key);
        Ok(headers)
    }

    async fn post_image<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        media_url: &str,
    ) -> Result<T, ResponderError> {
        let resp = self
            .http
            .post(url)
            .query(query)
            .headers(self.headers()?)
            .json(&json!({ "url": media_url }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            error!("Vision POST {} failed: status={} body={}", url, status, body_text);
            return Err(ResponderError::AnalysisError(format!(
                "vision service returned {status}"
            )));
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            ResponderError::AnalysisError(format!("malformed vision response: {e}"))
        })
    }
}

#[async_trait]
impl ImageAnalyzer for VisionClient {
    async fn describe(&self, media_url: &str) -> Result<AnalyzeResponse, ResponderError> {
        let url = format!("{}/analyze", self.endpoint);
        info!("Requesting image description");
        self.post_image(
            &url,
            &[("visualFeatures", "Description"), ("language", "en")],
            media_url,
        )
        .await
    }

    async fn recognize_text(&self, media_url: &str) -> Result<OcrResponse, ResponderError> {
        let url = format!("{}/ocr", self.endpoint);
        info!("Requesting text recognition");
        self.post_image(&url, &[], media_url).await
    }
}

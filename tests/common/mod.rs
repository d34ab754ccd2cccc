#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use snapsight::ResponderError;
use snapsight::api::Responder;
use snapsight::api::signature::compute_signature;
use snapsight::clients::ImageAnalyzer;
use snapsight::core::config::AppConfig;
use snapsight::core::credentials::{CredentialCache, SecretDecryptor};
use snapsight::core::models::{AnalyzeResponse, OcrResponse};

pub const SERVICE_URL: &str = "https://abc123.execute-api.us-east-1.amazonaws.com/prod/sms";
pub const WEBHOOK_TOKEN: &str = "webhook-secret";
pub const VISION_KEY: &str = "vision-secret";
pub const MEDIA_URL: &str = "https://media.example.com/Accounts/AC1/Messages/MM1/Media/ME1";

/// Maps ciphertext to plaintext and counts every call.
pub struct StaticDecryptor {
    plaintexts: HashMap<String, String>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl StaticDecryptor {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            plaintexts: pairs
                .iter()
                .map(|(c, p)| ((*c).to_string(), (*p).to_string()))
                .collect(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretDecryptor for StaticDecryptor {
    async fn decrypt(&self, ciphertext_b64: &str) -> Result<String, ResponderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.plaintexts
            .get(ciphertext_b64)
            .cloned()
            .ok_or_else(|| ResponderError::AwsError("AccessDeniedException".to_string()))
    }
}

/// Canned analysis results with optional per-call latency.
pub struct FakeAnalyzer {
    pub describe_result: Result<Value, String>,
    pub describe_delay: Duration,
    pub ocr_result: Result<Value, String>,
    pub ocr_delay: Duration,
    pub describe_calls: AtomicUsize,
    pub ocr_calls: AtomicUsize,
}

impl FakeAnalyzer {
    pub fn new(describe_result: Result<Value, String>, ocr_result: Result<Value, String>) -> Self {
        Self {
            describe_result,
            describe_delay: Duration::ZERO,
            ocr_result,
            ocr_delay: Duration::ZERO,
            describe_calls: AtomicUsize::new(0),
            ocr_calls: AtomicUsize::new(0),
        }
    }

    pub fn delays(mut self, describe: Duration, ocr: Duration) -> Self {
        self.describe_delay = describe;
        self.ocr_delay = ocr;
        self
    }
}

#[async_trait]
impl ImageAnalyzer for FakeAnalyzer {
    async fn describe(&self, _media_url: &str) -> Result<AnalyzeResponse, ResponderError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.describe_delay).await;
        match &self.describe_result {
            Ok(v) => Ok(serde_json::from_value(v.clone())?),
            Err(e) => Err(ResponderError::HttpError(e.clone())),
        }
    }

    async fn recognize_text(&self, _media_url: &str) -> Result<OcrResponse, ResponderError> {
        self.ocr_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.ocr_delay).await;
        match &self.ocr_result {
            Ok(v) => Ok(serde_json::from_value(v.clone())?),
            Err(e) => Err(ResponderError::HttpError(e.clone())),
        }
    }
}

pub fn caption_body(text: &str, confidence: f64) -> Value {
    json!({
        "description": {
            "tags": ["animal"],
            "captions": [{ "text": text, "confidence": confidence }]
        },
        "requestId": "req-1"
    })
}

pub fn ocr_body(regions: &[&[&[&str]]]) -> Value {
    let regions: Vec<Value> = regions
        .iter()
        .map(|lines| {
            let lines: Vec<Value> = lines
                .iter()
                .map(|words| {
                    let words: Vec<Value> = words.iter().map(|w| json!({ "text": w })).collect();
                    json!({ "boundingBox": "0,0,10,10", "words": words })
                })
                .collect();
            json!({ "boundingBox": "0,0,10,10", "lines": lines })
        })
        .collect();
    json!({ "language": "en", "orientation": "Up", "regions": regions })
}

pub fn test_config(vision_endpoint: &str) -> AppConfig {
    AppConfig {
        service_url: SERVICE_URL.to_string(),
        vision_key_ciphertext: "enc-vision".to_string(),
        webhook_token_ciphertext: "enc-token".to_string(),
        vision_endpoint: vision_endpoint.to_string(),
        analysis_timeout: Duration::from_secs(5),
    }
}

pub fn test_responder(vision_endpoint: &str) -> (Responder, Arc<StaticDecryptor>) {
    let decryptor = Arc::new(StaticDecryptor::new(&[
        ("enc-vision", VISION_KEY),
        ("enc-token", WEBHOOK_TOKEN),
    ]));
    let config = test_config(vision_endpoint);
    let credentials = CredentialCache::from_config(decryptor.clone(), &config);
    (
        Responder::new(config, credentials, reqwest::Client::new()),
        decryptor,
    )
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// An API Gateway proxy event carrying a correctly signed form body.
pub fn signed_event(pairs: &[(&str, &str)]) -> Value {
    let params = params(pairs);
    let signature = compute_signature(SERVICE_URL, &params, WEBHOOK_TOKEN);
    event_with_signature(pairs, Some(&signature), "X-Signature")
}

pub fn event_with_signature(pairs: &[(&str, &str)], signature: Option<&str>, header: &str) -> Value {
    let body = serde_urlencoded::to_string(params(pairs)).unwrap();
    let mut headers = json!({ "Content-Type": "application/x-www-form-urlencoded" });
    if let Some(signature) = signature {
        headers[header] = json!(signature);
    }
    json!({
        "httpMethod": "POST",
        "path": "/prod/sms",
        "headers": headers,
        "body": body,
        "isBase64Encoded": false
    })
}

pub fn media_message() -> Vec<(&'static str, &'static str)> {
    vec![
        ("MessageSid", "MM1"),
        ("From", "+15551234567"),
        ("To", "+15557654321"),
        ("Body", ""),
        ("NumMedia", "1"),
        ("MediaContentType0", "image/jpeg"),
        ("MediaUrl0", MEDIA_URL),
    ]
}

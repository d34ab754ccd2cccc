//! Process-wide cache of decrypted secrets.
//!
//! Each credential name owns its own cell, so a cold lookup of one name never
//! waits on another. Concurrent cold lookups of the same name share a single
//! decryption call.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_kms::Client as KmsClient;
use aws_sdk_kms::primitives::Blob;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::OnceCell;
use tracing::{error, info};

use super::config::AppConfig;
use crate::errors::ResponderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialName {
    VisionKey,
    WebhookToken,
}

impl fmt::Display for CredentialName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialName::VisionKey => write!(f, "vision-key"),
            CredentialName::WebhookToken => write!(f, "webhook-token"),
        }
    }
}

/// A decrypted secret. Redacted in `Debug` output.
#[derive(Debug)]
pub struct Credential(SecretString);

impl Credential {
    #[must_use]
    pub fn new(plaintext: String) -> Self {
        Self(SecretString::new(plaintext))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Turns a base64 ciphertext blob into a plaintext secret.
#[async_trait]
pub trait SecretDecryptor: Send + Sync {
    async fn decrypt(&self, ciphertext_b64: &str) -> Result<String, ResponderError>;
}

/// KMS-backed decryptor.
pub struct KmsDecryptor {
    client: KmsClient,
}

impl KmsDecryptor {
    #[must_use]
    pub fn new(client: KmsClient) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let shared = aws_config::from_env().load().await;
        Self::new(KmsClient::new(&shared))
    }
}

#[async_trait]
impl SecretDecryptor for KmsDecryptor {
    async fn decrypt(&self, ciphertext_b64: &str) -> Result<String, ResponderError> {
        let blob = STANDARD
            .decode(ciphertext_b64.trim())
            .map_err(|e| ResponderError::ParseError(format!("ciphertext is not base64: {e}")))?;

        let resp = self
            .client
            .decrypt()
            .ciphertext_blob(Blob::new(blob))
            .send()
            .await
            .map_err(|e| ResponderError::AwsError(format!("kms decrypt: {e}")))?;

        let plaintext = resp
            .plaintext()
            .ok_or_else(|| ResponderError::AwsError("kms decrypt: empty plaintext".to_string()))?;

        String::from_utf8(plaintext.as_ref().to_vec())
            .map_err(|e| ResponderError::ParseError(format!("plaintext is not UTF-8: {e}")))
    }
}

pub struct CredentialCache {
    decryptor: Arc<dyn SecretDecryptor>,
    ciphertexts: HashMap<CredentialName, String>,
    slots: HashMap<CredentialName, OnceCell<Credential>>,
}

impl CredentialCache {
    #[must_use]
    pub fn new(
        decryptor: Arc<dyn SecretDecryptor>,
        ciphertexts: HashMap<CredentialName, String>,
    ) -> Self {
        let slots = ciphertexts
            .keys()
            .map(|name| (*name, OnceCell::new()))
            .collect();
        Self {
            decryptor,
            ciphertexts,
            slots,
        }
    }

    #[must_use]
    pub fn from_config(decryptor: Arc<dyn SecretDecryptor>, config: &AppConfig) -> Self {
        let ciphertexts = HashMap::from([
            (
                CredentialName::VisionKey,
                config.vision_key_ciphertext.clone(),
            ),
            (
                CredentialName::WebhookToken,
                config.webhook_token_ciphertext.clone(),
            ),
        ]);
        Self::new(decryptor, ciphertexts)
    }

    /// Returns the plaintext credential, decrypting it on first use.
    ///
    /// A failed decryption leaves the slot empty so a later call can retry.
    pub async fn get(&self, name: CredentialName) -> Result<&Credential, ResponderError> {
        let (Some(slot), Some(ciphertext)) = (self.slots.get(&name), self.ciphertexts.get(&name))
        else {
            return Err(ResponderError::CredentialUnavailable(format!(
                "{name}: no ciphertext configured"
            )));
        };

        slot.get_or_try_init(|| async {
            info!(credential = %name, "Decrypting credential");
            match self.decryptor.decrypt(ciphertext).await {
                Ok(plaintext) => Ok(Credential::new(plaintext)),
                Err(e) => {
                    error!(credential = %name, "Decrypt error: {}", e);
                    Err(ResponderError::CredentialUnavailable(format!("{name}: {e}")))
                }
            }
        })
        .await
    }

    #[must_use]
    pub fn is_cached(&self, name: CredentialName) -> bool {
        self.slots.get(&name).is_some_and(OnceCell::initialized)
    }
}

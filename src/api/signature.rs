use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;
use tracing::error;

use super::parsing::parse_form;

/// Validates a provider webhook signature.
///
/// The expected signature is `base64(HMAC-SHA1(shared_secret, public_url +
/// k1 + v1 + k2 + v2 ...))` with the form parameters sorted by key. Returns
/// `false` when the header is missing, the body is not form-encoded, or the
/// signatures differ.
pub fn authenticate(
    raw_body: &str,
    signature_header: Option<&str>,
    public_url: &str,
    shared_secret: &str,
) -> bool {
    let Some(signature) = signature_header.map(str::trim).filter(|s| !s.is_empty()) else {
        error!("Missing webhook signature header");
        return false;
    };

    let params = match parse_form(raw_body) {
        Ok(params) => params,
        Err(e) => {
            error!("Cannot authenticate unparseable body: {}", e);
            return false;
        }
    };

    let computed = compute_signature(public_url, &params, shared_secret);
    if computed.is_empty() {
        return false;
    }

    if bool::from(computed.as_bytes().ct_eq(signature.as_bytes())) {
        true
    } else {
        error!("Webhook signature verification failed");
        false
    }
}

pub fn compute_signature(
    public_url: &str,
    params: &[(String, String)],
    shared_secret: &str,
) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();

    let mut mac = match Hmac::<Sha1>::new_from_slice(shared_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return String::new();
        }
    };
    mac.update(public_url.as_bytes());
    for (key, value) in sorted {
        mac.update(key.as_bytes());
        mac.update(value.as_bytes());
    }
    STANDARD.encode(mac.finalize().into_bytes())
}

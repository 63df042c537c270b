//! Webhook Signature Verification
//!
//! Mercado Pago signs notifications with the `x-signature` header
//! (`ts=<unix ts>,v1=<hex hmac>`). The signed manifest is
//! `id:<data.id>;request-id:<x-request-id>;ts:<ts>;`, with a segment left out
//! when its value is absent, and the MAC is HMAC-SHA256 keyed by the webhook
//! secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{PaymentError, Result};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-signature";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// What to do with webhook signatures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureMode {
    /// No verification
    Off,
    /// Verify and log the outcome, accept regardless
    Log,
    /// Reject deliveries that fail verification
    Enforce,
}

impl SignatureMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" => Some(SignatureMode::Off),
            "log" => Some(SignatureMode::Log),
            "enforce" => Some(SignatureMode::Enforce),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SignatureMode::Off => "off",
            SignatureMode::Log => "log",
            SignatureMode::Enforce => "enforce",
        }
    }
}

/// Parsed `x-signature` header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureHeader {
    pub ts: String,
    pub v1: String,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self> {
        let mut ts = None;
        let mut v1 = None;

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("ts", value)) => ts = Some(value.trim().to_string()),
                Some(("v1", value)) => v1 = Some(value.trim().to_string()),
                _ => {}
            }
        }

        match (ts, v1) {
            (Some(ts), Some(v1)) if !ts.is_empty() && !v1.is_empty() => Ok(Self { ts, v1 }),
            _ => Err(PaymentError::WebhookSignature("malformed x-signature header".into())),
        }
    }
}

/// Build the signed manifest; alphanumeric ids are lower-cased by the provider.
pub fn manifest(data_id: Option<&str>, request_id: Option<&str>, ts: &str) -> String {
    let mut out = String::new();
    if let Some(id) = data_id.filter(|id| !id.is_empty()) {
        out.push_str("id:");
        out.push_str(&id.to_lowercase());
        out.push(';');
    }
    if let Some(request_id) = request_id.filter(|r| !r.is_empty()) {
        out.push_str("request-id:");
        out.push_str(request_id);
        out.push(';');
    }
    out.push_str("ts:");
    out.push_str(ts);
    out.push(';');
    out
}

/// Webhook signature verifier
pub struct WebhookVerifier {
    secret: String,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verify a delivery; `Err(WebhookSignature)` when absent, malformed or wrong.
    pub fn verify(
        &self,
        signature_header: Option<&str>,
        request_id: Option<&str>,
        data_id: Option<&str>,
    ) -> Result<()> {
        let header = signature_header
            .ok_or_else(|| PaymentError::WebhookSignature("x-signature header missing".into()))?;
        let parsed = SignatureHeader::parse(header)?;

        let expected = hex::decode(&parsed.v1)
            .map_err(|_| PaymentError::WebhookSignature("v1 is not hex".into()))?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| PaymentError::Config(e.to_string()))?;
        mac.update(manifest(data_id, request_id, &parsed.ts).as_bytes());

        mac.verify_slice(&expected)
            .map_err(|_| PaymentError::WebhookSignature("signature mismatch".into()))
    }

    /// Signature for a manifest; used by tests and local tooling.
    pub fn sign(&self, data_id: Option<&str>, request_id: Option<&str>, ts: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| PaymentError::Config(e.to_string()))?;
        mac.update(manifest(data_id, request_id, ts).as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

//! # curriculo-payments
//!
//! Mercado Pago integration for curriculo-backend.
//!
//! ## Payment flows
//!
//! ### 1. Checkout Pro (hosted preference)
//!
//! **Flow:** Front end → redirect to Mercado Pago's hosted checkout → back URLs
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────────┐     ┌─────────────┐
//! │  Front end  │────▶│  Mercado Pago hosted │────▶│  Front end  │
//! │  (preview)  │     │  checkout (init_point)│    │  (success)  │
//! └─────────────┘     └──────────────────────┘     └─────────────┘
//! ```
//!
//! ### 2. Direct Pix payment
//!
//! **Flow:** the payment is created server-side and the front end shows the
//! returned QR code; the payer never leaves the page.
//!
//! In both flows the provider reports status changes to `/webhook`, and the
//! front end can poll `fetch_payment_status`. The two paths are independent:
//! Mercado Pago is the only source of truth.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use curriculo_payments::{MercadoPagoClient, MercadoPagoConfig, PaymentGateway, PaymentId};
//!
//! let client = MercadoPagoClient::new(MercadoPagoConfig::new(token, "https://api.example.com"))?;
//! let snapshot = client.fetch_payment_status(&PaymentId::parse("123")?).await?;
//! println!("paid: {}", snapshot.paid());
//! ```

mod error;
mod gateway;
mod mercadopago;
mod model;
mod signature;
mod webhook;

pub use error::{PaymentError, Result};
pub use gateway::PaymentGateway;
pub use mercadopago::{
    DEFAULT_API_BASE_URL, IDEMPOTENCY_HEADER, MercadoPagoClient, MercadoPagoConfig, idempotency_key,
};
pub use model::{
    BackUrls, DirectPayment, LineItem, PayerEmail, PaymentId, PaymentMethodRules, PaymentSnapshot,
    PaymentStatus, PixPaymentIntent, Preference, PreferenceRequest, TaxId, TaxIdKind,
};
pub use signature::{
    REQUEST_ID_HEADER, SIGNATURE_HEADER, SignatureHeader, SignatureMode, WebhookVerifier, manifest,
};
pub use webhook::{FileWebhookLog, WebhookDelivery, WebhookSink, WebhookSummary, data_id_from_body};

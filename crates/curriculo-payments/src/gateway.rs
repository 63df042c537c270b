//! Payment Gateway Strategy
//!
//! The HTTP layer talks to the payment provider only through this trait, so
//! handlers can be exercised against stubs and the provider can be swapped
//! without touching routing code.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    DirectPayment, PaymentId, PaymentSnapshot, PixPaymentIntent, Preference, PreferenceRequest,
};

/// Outbound operations against the payment provider
///
/// Every call is a single attempt; failures surface to the caller unchanged.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted-checkout preference
    async fn create_checkout_preference(&self, request: PreferenceRequest) -> Result<Preference>;

    /// Create a Pix payment and return its QR payload
    async fn create_direct_payment(&self, intent: PixPaymentIntent) -> Result<DirectPayment>;

    /// Fetch the current status of a payment (never cached)
    async fn fetch_payment_status(&self, id: &PaymentId) -> Result<PaymentSnapshot>;
}

//! Mercado Pago REST client
//!
//! Implements `PaymentGateway` over the public Mercado Pago API:
//!
//! - `POST /checkout/preferences` for the hosted checkout
//! - `POST /v1/payments` for Pix, with an `X-Idempotency-Key` per call
//! - `GET /v1/payments/{id}` for status polling
//!
//! The notification URL is always derived from configuration; callers never
//! supply it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, Result};
use crate::gateway::PaymentGateway;
use crate::model::{
    BackUrls, DirectPayment, LineItem, PaymentId, PaymentSnapshot, PaymentStatus,
    PixPaymentIntent, Preference, PreferenceRequest, TaxIdKind, deserialize_opt_id,
    validate_amount,
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.mercadopago.com";
pub const IDEMPOTENCY_HEADER: &str = "X-Idempotency-Key";

/// Mercado Pago client configuration
#[derive(Clone)]
pub struct MercadoPagoConfig {
    /// Bearer access token
    pub access_token: String,

    /// API base URL (overridable for sandboxes and tests)
    pub api_base_url: String,

    /// Public base URL the provider posts notifications to
    pub notification_base_url: String,

    /// Upper bound for each outbound call
    pub timeout: Duration,
}

impl std::fmt::Debug for MercadoPagoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MercadoPagoConfig")
            .field("access_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("notification_base_url", &self.notification_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MercadoPagoConfig {
    pub fn new(access_token: impl Into<String>, notification_base_url: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            notification_base_url: notification_base_url.into(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Webhook URL handed to the provider: the configured base plus `/webhook`.
    pub fn notification_url(&self) -> String {
        let base = self.notification_base_url.trim_end_matches('/');
        if base.ends_with("/webhook") {
            base.to_string()
        } else {
            format!("{base}/webhook")
        }
    }
}

/// Mercado Pago client
pub struct MercadoPagoClient {
    http: reqwest::Client,
    config: MercadoPagoConfig,
}

impl MercadoPagoClient {
    pub fn new(config: MercadoPagoConfig) -> Result<Self> {
        if config.access_token.trim().is_empty() {
            return Err(PaymentError::Config("access token is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Config(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &MercadoPagoConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    /// Send with bearer auth; non-2xx and transport failures become `UpstreamRequest`.
    async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<String> {
        let response = request
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(operation, error = %e, "Mercado Pago request failed");
                PaymentError::upstream(operation, e.status().map(|s| s.as_u16()), e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::upstream(operation, Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            tracing::error!(operation, status = status.as_u16(), body = %body, "Mercado Pago rejected request");
            return Err(PaymentError::upstream(operation, Some(status.as_u16()), body));
        }

        Ok(body)
    }
}

/// Fresh idempotency key; unique per call even for identical intents.
pub fn idempotency_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    async fn create_checkout_preference(&self, request: PreferenceRequest) -> Result<Preference> {
        const OPERATION: &str = "create_checkout_preference";

        if request.items.is_empty() {
            return Err(PaymentError::Validation("preferência sem itens".into()));
        }
        for item in &request.items {
            if item.quantity == 0 {
                return Err(PaymentError::Validation("quantidade deve ser maior que zero".into()));
            }
            validate_amount(item.unit_price, "preço unitário")?;
        }

        let notification_url = self.config.notification_url();
        let body = PreferenceBody::from_request(&request, &notification_url);

        let raw = self
            .send(OPERATION, self.http.post(self.endpoint("/checkout/preferences")).json(&body))
            .await?;

        let parsed: PreferenceResponse = serde_json::from_str(&raw)
            .map_err(|e| PaymentError::MalformedUpstreamResponse(format!("{OPERATION}: {e}")))?;

        let preference_id = parsed.id.ok_or_else(|| {
            PaymentError::MalformedUpstreamResponse(format!("{OPERATION}: preference id missing"))
        })?;

        tracing::info!(preference_id = %preference_id, "Created checkout preference");

        Ok(Preference {
            preference_id,
            init_point: parsed.init_point,
            sandbox_init_point: parsed.sandbox_init_point,
        })
    }

    async fn create_direct_payment(&self, intent: PixPaymentIntent) -> Result<DirectPayment> {
        const OPERATION: &str = "create_direct_payment";

        validate_amount(intent.amount, "valor do pagamento")?;

        let notification_url = self.config.notification_url();
        let body = PaymentBody::from_intent(&intent, &notification_url);
        let key = idempotency_key();
        tracing::debug!(idempotency_key = %key, "Creating Pix payment");

        let raw = self
            .send(
                OPERATION,
                self.http
                    .post(self.endpoint("/v1/payments"))
                    .header(IDEMPOTENCY_HEADER, &key)
                    .json(&body),
            )
            .await?;

        let parsed: PaymentResponse = serde_json::from_str(&raw)
            .map_err(|e| PaymentError::MalformedUpstreamResponse(format!("{OPERATION}: {e}")))?;

        let id = parsed.id.ok_or_else(|| {
            PaymentError::MalformedUpstreamResponse(format!("{OPERATION}: payment id missing"))
        })?;

        let data = parsed
            .point_of_interaction
            .and_then(|poi| poi.transaction_data)
            .ok_or_else(|| {
                tracing::error!(payment_id = %id, "Pix payment returned without transaction data");
                PaymentError::MissingTransactionData(format!("payment {id}: point_of_interaction missing"))
            })?;

        let (Some(qr_code), Some(qr_code_base64)) = (data.qr_code, data.qr_code_base64) else {
            tracing::error!(payment_id = %id, "Pix payment returned without QR code");
            return Err(PaymentError::MissingTransactionData(format!(
                "payment {id}: qr_code or qr_code_base64 missing"
            )));
        };

        let status = parsed
            .status
            .as_deref()
            .map_or_else(|| PaymentStatus::Unknown(String::new()), PaymentStatus::from_provider);

        tracing::info!(payment_id = %id, status = ?status, "Created Pix payment");

        Ok(DirectPayment {
            id,
            status,
            qr_code,
            qr_code_base64,
            ticket_url: data.ticket_url,
        })
    }

    async fn fetch_payment_status(&self, id: &PaymentId) -> Result<PaymentSnapshot> {
        const OPERATION: &str = "fetch_payment_status";

        let raw = self
            .send(OPERATION, self.http.get(self.endpoint(&format!("/v1/payments/{id}"))))
            .await?;

        // An unreadable body is reported as an unknown (unpaid) status, not an error.
        let status = serde_json::from_str::<PaymentResponse>(&raw)
            .ok()
            .and_then(|p| p.status)
            .map_or_else(
                || {
                    tracing::warn!(payment_id = %id, "Payment status missing from response");
                    PaymentStatus::Unknown(String::new())
                },
                |s| PaymentStatus::from_provider(&s),
            );

        tracing::info!(payment_id = %id, status = ?status, "Fetched payment status");

        Ok(PaymentSnapshot {
            id: id.clone(),
            status,
        })
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct PreferenceBody<'a> {
    items: &'a [LineItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    payer: Option<EmailOnly<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_methods: Option<PaymentMethodsBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    back_urls: Option<&'a BackUrls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_return: Option<&'static str>,
    notification_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_reference: Option<&'a str>,
}

impl<'a> PreferenceBody<'a> {
    fn from_request(request: &'a PreferenceRequest, notification_url: &'a str) -> Self {
        let rules = &request.payment_methods;
        let payment_methods = (!rules.is_empty()).then(|| PaymentMethodsBody {
            excluded_payment_types: rules.excluded_payment_types.iter().map(|id| IdRef { id }).collect(),
            excluded_payment_methods: rules.excluded_payment_methods.iter().map(|id| IdRef { id }).collect(),
            installments: rules.installments,
        });

        Self {
            items: &request.items,
            payer: request.payer_email.as_ref().map(|e| EmailOnly { email: e.as_str() }),
            payment_methods,
            back_urls: (!request.back_urls.is_empty()).then_some(&request.back_urls),
            // The provider rejects auto_return without a success URL
            auto_return: request.back_urls.success.is_some().then_some("approved"),
            notification_url,
            external_reference: request.external_reference.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct EmailOnly<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct PaymentMethodsBody<'a> {
    excluded_payment_types: Vec<IdRef<'a>>,
    excluded_payment_methods: Vec<IdRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    installments: Option<u32>,
}

#[derive(Serialize)]
struct IdRef<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct PaymentBody<'a> {
    #[serde(with = "rust_decimal::serde::float")]
    transaction_amount: Decimal,
    description: &'a str,
    payment_method_id: &'static str,
    payer: PaymentPayer<'a>,
    notification_url: &'a str,
}

impl<'a> PaymentBody<'a> {
    fn from_intent(intent: &'a PixPaymentIntent, notification_url: &'a str) -> Self {
        Self {
            transaction_amount: intent.amount,
            description: &intent.description,
            payment_method_id: "pix",
            payer: PaymentPayer {
                email: intent.payer_email.as_str(),
                first_name: intent.payer_name.as_deref(),
                identification: intent.payer_tax_id.as_ref().map(|t| Identification {
                    kind: t.kind(),
                    number: t.number(),
                }),
            },
            notification_url,
        }
    }
}

#[derive(Serialize)]
struct PaymentPayer<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    identification: Option<Identification<'a>>,
}

#[derive(Serialize)]
struct Identification<'a> {
    #[serde(rename = "type")]
    kind: TaxIdKind,
    number: &'a str,
}

#[derive(Deserialize)]
struct PreferenceResponse {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    id: Option<String>,
    init_point: Option<String>,
    sandbox_init_point: Option<String>,
}

#[derive(Deserialize)]
struct PaymentResponse {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    id: Option<String>,
    status: Option<String>,
    point_of_interaction: Option<PointOfInteraction>,
}

#[derive(Deserialize)]
struct PointOfInteraction {
    transaction_data: Option<TransactionData>,
}

#[derive(Deserialize)]
struct TransactionData {
    qr_code: Option<String>,
    qr_code_base64: Option<String>,
    ticket_url: Option<String>,
}

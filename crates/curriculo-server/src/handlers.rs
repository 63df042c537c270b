//! HTTP Handlers

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use curriculo_payments::{
    LineItem, PayerEmail, PaymentError, PaymentId, PaymentMethodRules, PixPaymentIntent,
    PreferenceRequest, REQUEST_ID_HEADER, SIGNATURE_HEADER, SignatureMode, TaxId, WebhookDelivery,
};
use curriculo_render::RenderError;

use crate::state::AppState;

pub const PDF_FILENAME: &str = "curriculo.pdf";

// ============================================================================
// Errors
// ============================================================================

/// Handler failure, rendered as `{ "erro": "..." }`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Corpo da requisição inválido: {0}")]
    InvalidBody(String),

    #[error("Rota não encontrada")]
    NotFound,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub erro: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Payment(PaymentError::Validation(_)) | ApiError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Payment(PaymentError::WebhookSignature(_)) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Payment(_) | ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Payment(e) => e.user_message(),
            ApiError::Render(e) => e.user_message().into(),
            other => other.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else if status != StatusCode::NOT_FOUND {
            tracing::warn!(error = %self, "Request rejected");
        }

        (status, Json(ErrorResponse { erro: self.message() })).into_response()
    }
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct PayerInput {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePreferenceRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub payer: Option<PayerInput>,
}

#[derive(Debug, Serialize)]
pub struct CreatePreferenceResponse {
    #[serde(rename = "preferenceId")]
    pub preference_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_point: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: rust_decimal::Decimal,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePaymentRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentResponse {
    pub id: String,
    pub qr_code: String,
    pub qr_code_base64: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckPaymentRequest {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CheckPaymentResponse {
    pub paid: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create a Checkout Pro preference for the server-fixed product
pub async fn create_preference(
    State(state): State<AppState>,
    payload: Result<Json<CreatePreferenceRequest>, JsonRejection>,
) -> Result<Json<CreatePreferenceResponse>, ApiError> {
    let Json(payload) = payload?;

    let raw_email = payload
        .email
        .or_else(|| payload.payer.and_then(|p| p.email))
        .unwrap_or_default();
    let email = PayerEmail::parse(&raw_email)?;

    let config = &state.config;
    let request = PreferenceRequest {
        items: vec![LineItem::brl(&config.product.title, 1, config.product.price)],
        payer_email: Some(email.clone()),
        payment_methods: PaymentMethodRules {
            excluded_payment_types: config.excluded_payment_types.clone(),
            ..Default::default()
        },
        back_urls: config.back_urls.clone(),
        external_reference: None,
    };

    let preference = state.gateway.create_checkout_preference(request).await?;

    Ok(Json(CreatePreferenceResponse {
        preference_id: preference.preference_id,
        init_point: preference.init_point,
        amount: config.product.price,
        email: email.as_str().to_string(),
    }))
}

/// Create a Pix payment and return its QR code
pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<Json<CreatePaymentResponse>, ApiError> {
    let Json(payload) = payload?;

    let payer_email = PayerEmail::parse(payload.email.as_deref().unwrap_or_default())?;
    let payer_name = payload
        .nome
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let payer_tax_id = payload
        .cpf
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(TaxId::parse)
        .transpose()?;

    let intent = PixPaymentIntent {
        amount: state.config.product.price,
        description: state.config.product.title.clone(),
        payer_email,
        payer_name,
        payer_tax_id,
    };

    let payment = state.gateway.create_direct_payment(intent).await?;

    Ok(Json(CreatePaymentResponse {
        id: payment.id,
        qr_code: payment.qr_code,
        qr_code_base64: payment.qr_code_base64,
    }))
}

/// Poll the provider for a payment's status
pub async fn check_payment(
    State(state): State<AppState>,
    payload: Result<Json<CheckPaymentRequest>, JsonRejection>,
) -> Result<Json<CheckPaymentResponse>, ApiError> {
    let Json(payload) = payload?;

    let id = match payload.id {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
        Some(value) => Some(PaymentId::from_json(&value)?),
    }
    .ok_or_else(|| PaymentError::Validation("id do pagamento não informado".into()))?;

    let snapshot = state.gateway.fetch_payment_status(&id).await?;

    Ok(Json(CheckPaymentResponse {
        paid: snapshot.paid(),
    }))
}

/// Mercado Pago notification endpoint
///
/// Accepts any body and answers 200 once the delivery is logged; the provider
/// redelivers on non-2xx. Only `enforce` signature mode can reject.
pub async fn webhook(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let delivery = WebhookDelivery::new(String::from_utf8_lossy(&body).into_owned());
    let summary = delivery.summary();

    let data_id = params.get("data.id").cloned().or_else(|| summary.data_id.clone());
    verify_signature(&state, &headers, data_id.as_deref())?;

    state.webhook_log.record(&delivery).await?;

    tracing::info!(
        kind = ?summary.kind,
        action = ?summary.action,
        data_id = ?data_id,
        "Webhook recebido"
    );

    Ok(StatusCode::OK)
}

fn verify_signature(state: &AppState, headers: &HeaderMap, data_id: Option<&str>) -> Result<(), ApiError> {
    let Some(verifier) = &state.verifier else {
        return Ok(());
    };

    let header_value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    match verifier.verify(header_value(SIGNATURE_HEADER), header_value(REQUEST_ID_HEADER), data_id) {
        Ok(()) => {
            tracing::debug!(data_id = ?data_id, "Webhook signature verified");
            Ok(())
        }
        Err(e) if state.config.signature_mode == SignatureMode::Enforce => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, data_id = ?data_id, "Webhook signature check failed; accepted in log mode");
            Ok(())
        }
    }
}

/// Render the résumé preview page to a PDF download
pub async fn generate_pdf(State(state): State<AppState>) -> Result<Response, ApiError> {
    let pdf = state.renderer.render_pdf(&state.config.preview_url).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{PDF_FILENAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}

/// Fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Caller input rejected before any upstream call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport failure or non-2xx answer from Mercado Pago
    #[error("{operation} failed (status: {status:?}): {body}")]
    UpstreamRequest {
        operation: &'static str,
        status: Option<u16>,
        body: String,
    },

    /// 2xx answer missing the fields the operation needs
    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    /// Pix payment created without QR payload
    #[error("Missing transaction data: {0}")]
    MissingTransactionData(String),

    /// Webhook signature absent or not matching
    #[error("Webhook signature invalid: {0}")]
    WebhookSignature(String),

    /// Webhook log could not be written
    #[error("Webhook log error: {0}")]
    WebhookLog(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    pub(crate) fn upstream(operation: &'static str, status: Option<u16>, body: impl Into<String>) -> Self {
        PaymentError::UpstreamRequest {
            operation,
            status,
            body: body.into(),
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::Validation(msg) => msg.clone(),
            PaymentError::UpstreamRequest { .. } => "Erro ao comunicar com o Mercado Pago".into(),
            PaymentError::MalformedUpstreamResponse(_) => "Resposta inesperada do Mercado Pago".into(),
            PaymentError::MissingTransactionData(_) => "Pagamento criado sem dados do Pix".into(),
            PaymentError::WebhookSignature(_) => "Assinatura do webhook inválida".into(),
            PaymentError::WebhookLog(_) => "Erro ao registrar webhook".into(),
            PaymentError::Config(_) => "Erro de configuração do serviço".into(),
        }
    }
}

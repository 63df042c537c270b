//! Payment Domain Types
//!
//! Transient values built per request. Nothing here is persisted; Mercado Pago
//! stays the only source of truth for payment outcomes.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PaymentError, Result};

/// Payer email, checked to look like `local@domain`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PayerEmail(String);

impl PayerEmail {
    pub fn parse(raw: &str) -> Result<Self> {
        let email = raw.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(email.to_string()))
            }
            _ => Err(PaymentError::Validation(
                "E-mail inválido para geração do pagamento".into(),
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PayerEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Brazilian tax id (CPF or CNPJ), digits only
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaxId {
    kind: TaxIdKind,
    number: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TaxIdKind {
    #[serde(rename = "CPF")]
    Cpf,
    #[serde(rename = "CNPJ")]
    Cnpj,
}

impl TaxId {
    /// Accepts formatted input ("123.456.789-09"); punctuation and spaces are dropped.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut number = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '0'..='9' => number.push(c),
                '.' | '-' | '/' | ' ' => {}
                _ => return Err(PaymentError::Validation("CPF/CNPJ inválido".into())),
            }
        }

        let kind = match number.len() {
            11 => TaxIdKind::Cpf,
            14 => TaxIdKind::Cnpj,
            _ => return Err(PaymentError::Validation("CPF/CNPJ inválido".into())),
        };

        Ok(Self { kind, number })
    }

    pub fn kind(&self) -> TaxIdKind {
        self.kind
    }

    pub fn number(&self) -> &str {
        &self.number
    }
}

/// Provider payment id; ends up as a URL path segment
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn parse(raw: &str) -> Result<Self> {
        let id = raw.trim();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(Self(id.to_string()))
        } else {
            Err(PaymentError::Validation("id do pagamento inválido".into()))
        }
    }

    /// Accepts the JSON shapes clients send: a string or a number.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Self::parse(s),
            serde_json::Value::Number(n) => Self::parse(&n.to_string()),
            _ => Err(PaymentError::Validation("id do pagamento inválido".into())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mercado Pago payment status
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Approved,
    Pending,
    InProcess,
    Authorized,
    InMediation,
    Rejected,
    Cancelled,
    Refunded,
    ChargedBack,
    Unknown(String),
}

impl PaymentStatus {
    pub fn from_provider(s: &str) -> Self {
        match s {
            "approved" => PaymentStatus::Approved,
            "pending" => PaymentStatus::Pending,
            "in_process" => PaymentStatus::InProcess,
            "authorized" => PaymentStatus::Authorized,
            "in_mediation" => PaymentStatus::InMediation,
            "rejected" => PaymentStatus::Rejected,
            "cancelled" => PaymentStatus::Cancelled,
            "refunded" => PaymentStatus::Refunded,
            "charged_back" => PaymentStatus::ChargedBack,
            other => PaymentStatus::Unknown(other.to_string()),
        }
    }

    /// Only an approved payment counts as paid.
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Approved)
    }
}

/// Checkout line item
#[derive(Clone, Debug, Serialize)]
pub struct LineItem {
    pub title: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub currency_id: String,
}

impl LineItem {
    pub fn brl(title: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            title: title.into(),
            quantity,
            unit_price,
            currency_id: "BRL".into(),
        }
    }
}

/// Redirect targets after the hosted checkout
#[derive(Clone, Debug, Default, Serialize)]
pub struct BackUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl BackUrls {
    pub fn is_empty(&self) -> bool {
        self.success.is_none() && self.pending.is_none() && self.failure.is_none()
    }
}

/// Payment method restrictions for a preference
#[derive(Clone, Debug, Default)]
pub struct PaymentMethodRules {
    pub excluded_payment_types: Vec<String>,
    pub excluded_payment_methods: Vec<String>,
    pub installments: Option<u32>,
}

impl PaymentMethodRules {
    pub fn is_empty(&self) -> bool {
        self.excluded_payment_types.is_empty()
            && self.excluded_payment_methods.is_empty()
            && self.installments.is_none()
    }
}

/// Request to create a checkout preference
#[derive(Clone, Debug, Default)]
pub struct PreferenceRequest {
    pub items: Vec<LineItem>,
    pub payer_email: Option<PayerEmail>,
    pub payment_methods: PaymentMethodRules,
    pub back_urls: BackUrls,
    pub external_reference: Option<String>,
}

/// Created checkout preference
#[derive(Clone, Debug, Serialize)]
pub struct Preference {
    pub preference_id: String,
    pub init_point: Option<String>,
    pub sandbox_init_point: Option<String>,
}

/// Direct (Pix) payment intent
#[derive(Clone, Debug)]
pub struct PixPaymentIntent {
    pub amount: Decimal,
    pub description: String,
    pub payer_email: PayerEmail,
    pub payer_name: Option<String>,
    pub payer_tax_id: Option<TaxId>,
}

/// Created Pix payment with its QR payload
#[derive(Clone, Debug, Serialize)]
pub struct DirectPayment {
    pub id: String,
    pub status: PaymentStatus,
    pub qr_code: String,
    pub qr_code_base64: String,
    pub ticket_url: Option<String>,
}

/// Fresh view of a payment fetched from the provider
#[derive(Clone, Debug, Serialize)]
pub struct PaymentSnapshot {
    pub id: PaymentId,
    pub status: PaymentStatus,
}

impl PaymentSnapshot {
    pub fn paid(&self) -> bool {
        self.status.is_paid()
    }
}

/// Amounts must be positive with at most centavo precision.
pub(crate) fn validate_amount(amount: Decimal, what: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(PaymentError::Validation(format!("{what} deve ser maior que zero")));
    }
    if amount.normalize().scale() > 2 {
        return Err(PaymentError::Validation(format!(
            "{what} deve ter no máximo duas casas decimais"
        )));
    }
    Ok(())
}

/// Mercado Pago sends ids as numbers on some endpoints and strings on others.
pub(crate) fn deserialize_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

//! Server Configuration
//!
//! Read once at startup (after `.env` is loaded) into an immutable `Config`
//! that is injected everywhere through `AppState`. Parsing goes through a
//! lookup function so tests never touch the process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use curriculo_payments::{BackUrls, DEFAULT_API_BASE_URL, MercadoPagoConfig, SignatureMode};
use curriculo_render::RenderConfig;
use rust_decimal::Decimal;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://curriculospara.vercel.app";
pub const DEFAULT_PREVIEW_URL: &str = "https://curriculospara.vercel.app/preview";
pub const DEFAULT_PRODUCT_TITLE: &str = "Currículo em PDF";
pub const DEFAULT_PRODUCT_PRICE: &str = "3.00";
pub const DEFAULT_WEBHOOK_LOG: &str = "webhook.log";

/// Startup configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// CORS origin policy
#[derive(Clone, Debug)]
pub enum AllowedOrigin {
    Any,
    Exact(HeaderValue),
}

/// The single product this service sells
#[derive(Clone, Debug)]
pub struct Product {
    pub title: String,
    pub price: Decimal,
}

/// Immutable server configuration
///
/// `Debug` leaves the webhook secret out; the access token is redacted by
/// `MercadoPagoConfig`.
#[derive(Clone)]
pub struct Config {
    pub mercado_pago: MercadoPagoConfig,
    pub webhook_secret: Option<String>,
    pub signature_mode: SignatureMode,
    pub port: u16,
    pub allowed_origin: AllowedOrigin,
    pub preview_url: String,
    pub render: RenderConfig,
    pub product: Product,
    pub back_urls: BackUrls,
    pub excluded_payment_types: Vec<String>,
    pub webhook_log_path: PathBuf,
    pub webhook_log_max_bytes: Option<u64>,
}

impl Config {
    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let mut mercado_pago = MercadoPagoConfig::new(
            vars.required("MP_ACCESS_TOKEN")?,
            vars.required("MP_NOTIFICATION_URL")?,
        );
        mercado_pago.api_base_url = vars
            .optional("MP_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        mercado_pago.timeout = Duration::from_secs(vars.parsed("MP_TIMEOUT_SECS", 15)?);

        let webhook_secret = vars.optional("MP_WEBHOOK_SECRET");
        let signature_mode = match vars.optional("MP_WEBHOOK_SIGNATURE_MODE") {
            Some(raw) => SignatureMode::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "MP_WEBHOOK_SIGNATURE_MODE",
                reason: format!("expected off, log or enforce, got {raw:?}"),
            })?,
            None if webhook_secret.is_some() => SignatureMode::Log,
            None => SignatureMode::Off,
        };
        if signature_mode != SignatureMode::Off && webhook_secret.is_none() {
            return Err(ConfigError::Invalid {
                key: "MP_WEBHOOK_SIGNATURE_MODE",
                reason: format!("{} requires MP_WEBHOOK_SECRET", signature_mode.as_str()),
            });
        }

        let allowed_origin = match vars.optional("ALLOWED_ORIGIN").as_deref() {
            Some("*") => AllowedOrigin::Any,
            Some(origin) => AllowedOrigin::Exact(HeaderValue::from_str(origin).map_err(|e| {
                ConfigError::Invalid {
                    key: "ALLOWED_ORIGIN",
                    reason: e.to_string(),
                }
            })?),
            None => AllowedOrigin::Exact(HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN)),
        };

        let render = RenderConfig {
            executable: vars.optional("CHROME_EXECUTABLE").map(PathBuf::from),
            timeout: Duration::from_secs(vars.parsed("RENDER_TIMEOUT_SECS", 60)?),
            ..Default::default()
        };
        if render.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "RENDER_TIMEOUT_SECS",
                reason: "must be greater than zero".into(),
            });
        }

        let price_raw = vars
            .optional("PRODUCT_PRICE")
            .unwrap_or_else(|| DEFAULT_PRODUCT_PRICE.into());
        let price = Decimal::from_str(&price_raw)
            .ok()
            .filter(|p| *p > Decimal::ZERO && p.normalize().scale() <= 2)
            .ok_or_else(|| ConfigError::Invalid {
                key: "PRODUCT_PRICE",
                reason: format!("{price_raw:?} is not a positive amount with at most 2 decimals"),
            })?;

        Ok(Self {
            mercado_pago,
            webhook_secret,
            signature_mode,
            port: vars.parsed("PORT", DEFAULT_PORT)?,
            allowed_origin,
            preview_url: vars
                .optional("PREVIEW_URL")
                .unwrap_or_else(|| DEFAULT_PREVIEW_URL.into()),
            render,
            product: Product {
                title: vars
                    .optional("PRODUCT_TITLE")
                    .unwrap_or_else(|| DEFAULT_PRODUCT_TITLE.into()),
                price,
            },
            back_urls: BackUrls {
                success: vars.optional("CHECKOUT_SUCCESS_URL"),
                pending: vars.optional("CHECKOUT_PENDING_URL"),
                failure: vars.optional("CHECKOUT_FAILURE_URL"),
            },
            excluded_payment_types: vars
                .optional("CHECKOUT_EXCLUDED_PAYMENT_TYPES")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            webhook_log_path: vars
                .optional("WEBHOOK_LOG_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_WEBHOOK_LOG), PathBuf::from),
            webhook_log_max_bytes: vars.parsed_opt("WEBHOOK_LOG_MAX_BYTES")?,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("mercado_pago", &self.mercado_pago)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("signature_mode", &self.signature_mode)
            .field("port", &self.port)
            .field("allowed_origin", &self.allowed_origin)
            .field("preview_url", &self.preview_url)
            .field("render", &self.render)
            .field("product", &self.product)
            .field("back_urls", &self.back_urls)
            .field("excluded_payment_types", &self.excluded_payment_types)
            .field("webhook_log_path", &self.webhook_log_path)
            .field("webhook_log_max_bytes", &self.webhook_log_max_bytes)
            .finish()
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional(key).ok_or(ConfigError::Missing(key))
    }

    fn parsed_opt<T: FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        self.optional(key)
            .map(|raw| {
                raw.parse().map_err(|_| ConfigError::Invalid {
                    key,
                    reason: format!("cannot parse {raw:?}"),
                })
            })
            .transpose()
    }

    fn parsed<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        Ok(self.parsed_opt(key)?.unwrap_or(default))
    }
}

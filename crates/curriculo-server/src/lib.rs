//! curriculo-backend HTTP Server
//!
//! Axum router for the résumé builder backend: Mercado Pago checkout and Pix
//! payments, the provider webhook, payment polling and PDF export.

pub mod config;
pub mod handlers;
pub mod state;

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AllowedOrigin;
use crate::handlers::{
    check_payment, create_payment, create_preference, generate_pdf, health_check, not_found,
    webhook,
};
use crate::state::AppState;

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origin);

    Router::new()
        .route("/health", get(health_check))
        // Payments
        .route("/criar-preferencia", post(create_preference))
        .route("/criar-pagamento", post(create_payment))
        .route("/process_payment", post(create_payment))
        .route("/check-payment", post(check_payment))
        .route("/webhook", post(webhook))
        // Export
        .route("/gerar-pdf", get(generate_pdf))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &AllowedOrigin) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    match origin {
        AllowedOrigin::Any => cors.allow_origin(Any),
        AllowedOrigin::Exact(value) => cors.allow_origin(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        Json,
        body::{Body, Bytes, to_bytes},
        http::{HeaderMap, Request, StatusCode, header},
    };
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use curriculo_payments::{
        DirectPayment, FileWebhookLog, PaymentError, PaymentGateway, PaymentId, PaymentSnapshot,
        PaymentStatus, PixPaymentIntent, Preference, PreferenceRequest, TaxIdKind,
        WebhookVerifier,
    };
    use curriculo_render::{PageRenderer, RenderError};

    use crate::config::Config;

    // ------------------------------------------------------------------
    // Stubs
    // ------------------------------------------------------------------

    #[derive(Default)]
    struct StubGateway {
        calls: AtomicUsize,
        fail: bool,
        status: Option<&'static str>,
        last_preference: Mutex<Option<PreferenceRequest>>,
        last_intent: Mutex<Option<PixPaymentIntent>>,
    }

    impl StubGateway {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn with_status(status: &'static str) -> Self {
            Self {
                status: Some(status),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn check_failure(&self, operation: &'static str) -> curriculo_payments::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PaymentError::UpstreamRequest {
                    operation,
                    status: Some(500),
                    body: "internal".into(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PaymentGateway for StubGateway {
        async fn create_checkout_preference(
            &self,
            request: PreferenceRequest,
        ) -> curriculo_payments::Result<Preference> {
            self.check_failure("create_preference")?;
            *self.last_preference.lock().unwrap() = Some(request);
            Ok(Preference {
                preference_id: "pref-1".into(),
                init_point: Some("https://www.mercadopago.com.br/checkout/pref-1".into()),
                sandbox_init_point: None,
            })
        }

        async fn create_direct_payment(
            &self,
            intent: PixPaymentIntent,
        ) -> curriculo_payments::Result<DirectPayment> {
            self.check_failure("create_payment")?;
            *self.last_intent.lock().unwrap() = Some(intent);
            Ok(DirectPayment {
                id: "123".into(),
                status: PaymentStatus::Pending,
                qr_code: "xyz".into(),
                qr_code_base64: "Zm9v".into(),
                ticket_url: Some("https://example.com/ticket".into()),
            })
        }

        async fn fetch_payment_status(
            &self,
            id: &PaymentId,
        ) -> curriculo_payments::Result<PaymentSnapshot> {
            self.check_failure("fetch_payment")?;
            Ok(PaymentSnapshot {
                id: id.clone(),
                status: PaymentStatus::from_provider(self.status.unwrap_or("pending")),
            })
        }
    }

    struct StubRenderer {
        fail: bool,
    }

    #[async_trait]
    impl PageRenderer for StubRenderer {
        async fn render_pdf(&self, _url: &str) -> curriculo_render::Result<Vec<u8>> {
            if self.fail {
                return Err(RenderError::Timeout(Duration::from_secs(60)));
            }
            Ok(b"%PDF-1.4 stub".to_vec())
        }
    }

    // ------------------------------------------------------------------
    // Harness
    // ------------------------------------------------------------------

    struct Harness {
        app: Router,
        gateway: Arc<StubGateway>,
        log_path: PathBuf,
        _dir: tempfile::TempDir,
    }

    fn config_with(extra: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = [
            ("MP_ACCESS_TOKEN", "TEST-TOKEN"),
            ("MP_NOTIFICATION_URL", "https://api.example.com"),
        ]
        .iter()
        .chain(extra)
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    fn harness_with(config: Config, gateway: StubGateway, render_fails: bool) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("webhook.log");
        let gateway = Arc::new(gateway);

        let state = AppState::new(
            config,
            gateway.clone(),
            Arc::new(StubRenderer { fail: render_fails }),
            Arc::new(FileWebhookLog::new(&log_path)),
        );

        Harness {
            app: router(state),
            gateway,
            log_path,
            _dir: dir,
        }
    }

    fn harness() -> Harness {
        harness_with(config_with(&[]), StubGateway::default(), false)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }

    async fn send_json(app: &Router, uri: &str, payload: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let (status, _, body) = send(app, request).await;
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn read_log(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Health and fallback
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_health() {
        let h = harness();
        let (status, _, body) = send(&h.app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_json() {
        let h = harness();
        let (status, _, body) = send(&h.app, get("/nao-existe")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "erro": "Rota não encontrada" }));
    }

    #[tokio::test]
    async fn test_cors_preflight_uses_configured_origin() {
        let h = harness();
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/criar-pagamento")
            .header(header::ORIGIN, config::DEFAULT_ALLOWED_ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(&h.app, request).await;
        assert!(status.is_success());
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            config::DEFAULT_ALLOWED_ORIGIN
        );
    }

    // ------------------------------------------------------------------
    // Pix payments
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_payment_requires_email() {
        let h = harness();
        for payload in [json!({}), json!({ "email": "" }), json!({ "email": "sem-arroba" })] {
            let (status, body) = send_json(&h.app, "/criar-pagamento", &payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
            assert!(body["erro"].is_string());
        }
        assert_eq!(h.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_payment_rejects_bad_tax_id() {
        let h = harness();
        let payload = json!({ "email": "a@b.com", "cpf": "123" });
        let (status, body) = send_json(&h.app, "/criar-pagamento", &payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["erro"].is_string());
        assert_eq!(h.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_payment_returns_qr_code() {
        let h = harness();
        let payload = json!({ "email": "a@b.com", "nome": " Ana ", "cpf": "123.456.789-09" });
        let (status, body) = send_json(&h.app, "/criar-pagamento", &payload).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": "123", "qr_code": "xyz", "qr_code_base64": "Zm9v" }));

        let intent = h.gateway.last_intent.lock().unwrap().clone().unwrap();
        assert_eq!(intent.amount, dec!(3.00));
        assert_eq!(intent.payer_email.as_str(), "a@b.com");
        assert_eq!(intent.payer_name.as_deref(), Some("Ana"));
        let tax_id = intent.payer_tax_id.unwrap();
        assert_eq!(tax_id.kind(), TaxIdKind::Cpf);
        assert_eq!(tax_id.number(), "12345678909");
    }

    #[tokio::test]
    async fn test_process_payment_alias() {
        let h = harness();
        let (status, body) =
            send_json(&h.app, "/process_payment", &json!({ "email": "a@b.com" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "123");

        let intent = h.gateway.last_intent.lock().unwrap().clone().unwrap();
        assert!(intent.payer_name.is_none());
        assert!(intent.payer_tax_id.is_none());
    }

    #[tokio::test]
    async fn test_create_payment_upstream_failure_is_500() {
        let h = harness_with(config_with(&[]), StubGateway::failing(), false);
        let (status, body) =
            send_json(&h.app, "/criar-pagamento", &json!({ "email": "a@b.com" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["erro"].is_string());
        assert!(body.get("qr_code").is_none());
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let h = harness();
        let request = Request::builder()
            .method("POST")
            .uri("/criar-pagamento")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["erro"].is_string());
        assert_eq!(h.gateway.calls(), 0);
    }

    // ------------------------------------------------------------------
    // Checkout preferences
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_preference_uses_server_product() {
        let config = config_with(&[
            ("CHECKOUT_EXCLUDED_PAYMENT_TYPES", "ticket, atm"),
            ("CHECKOUT_SUCCESS_URL", "https://front.example.com/ok"),
        ]);
        let h = harness_with(config, StubGateway::default(), false);

        let payload = json!({ "payer": { "email": "a@b.com" }, "amount": 0.01 });
        let (status, body) = send_json(&h.app, "/criar-preferencia", &payload).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["preferenceId"], "pref-1");
        assert_eq!(body["amount"], json!(3.0));
        assert_eq!(body["email"], "a@b.com");

        let request = h.gateway.last_preference.lock().unwrap().clone().unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].unit_price, dec!(3.00));
        assert_eq!(request.items[0].title, config::DEFAULT_PRODUCT_TITLE);
        assert_eq!(
            request.payment_methods.excluded_payment_types,
            vec!["ticket".to_string(), "atm".to_string()]
        );
        assert_eq!(
            request.back_urls.success.as_deref(),
            Some("https://front.example.com/ok")
        );
    }

    #[tokio::test]
    async fn test_create_preference_requires_email() {
        let h = harness();
        let (status, _) = send_json(&h.app, "/criar-preferencia", &json!({ "payer": {} })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_preference_upstream_failure_is_500() {
        let h = harness_with(config_with(&[]), StubGateway::failing(), false);
        let (status, body) =
            send_json(&h.app, "/criar-preferencia", &json!({ "email": "a@b.com" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["erro"].is_string());
    }

    // ------------------------------------------------------------------
    // Payment polling
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_check_payment_requires_id() {
        let h = harness();
        for payload in [json!({}), json!({ "id": null }), json!({ "id": "" })] {
            let (status, body) = send_json(&h.app, "/check-payment", &payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
            assert_eq!(body["erro"], "id do pagamento não informado");
        }
        assert_eq!(h.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_check_payment_rejects_path_characters() {
        let h = harness();
        let (status, _) = send_json(&h.app, "/check-payment", &json!({ "id": "../1" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_check_payment_maps_status() {
        let cases = [
            ("approved", true),
            ("pending", false),
            ("in_process", false),
            ("rejected", false),
            ("something_new", false),
        ];
        for (provider_status, paid) in cases {
            let h = harness_with(config_with(&[]), StubGateway::with_status(provider_status), false);
            let (status, body) = send_json(&h.app, "/check-payment", &json!({ "id": 123 })).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({ "paid": paid }), "status {provider_status}");
        }
    }

    #[tokio::test]
    async fn test_check_payment_upstream_failure_is_500() {
        let h = harness_with(config_with(&[]), StubGateway::failing(), false);
        let (status, body) = send_json(&h.app, "/check-payment", &json!({ "id": "123" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["erro"].is_string());
    }

    // ------------------------------------------------------------------
    // Webhook
    // ------------------------------------------------------------------

    fn webhook_request(body: &str, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhook?data.id=999&type=payment")
            .header(header::CONTENT_TYPE, "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_webhook_appends_one_line() {
        let h = harness();
        let body = r#"{"type":"payment","data":{"id":"999"}}"#;

        let (status, _, response) = send(&h.app, webhook_request(body, &[])).await;
        assert_eq!(status, StatusCode::OK);
        assert!(response.is_empty());

        let lines = read_log(&h.log_path);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with(&format!("] {body}")));
        assert!(lines[0].contains("Z] "));
        assert_eq!(h.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_webhook_accepts_any_body() {
        let h = harness();
        for body in ["not json", "", r#"{"unexpected":[1,2,3]}"#] {
            let (status, _, _) = send(&h.app, webhook_request(body, &[])).await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(read_log(&h.log_path).len(), 3);
    }

    #[tokio::test]
    async fn test_webhook_log_mode_accepts_bad_signature() {
        let config = config_with(&[("MP_WEBHOOK_SECRET", "s3cret")]);
        let h = harness_with(config, StubGateway::default(), false);

        let (status, _, _) = send(
            &h.app,
            webhook_request("{}", &[("x-signature", "ts=1,v1=deadbeef")]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read_log(&h.log_path).len(), 1);
    }

    #[tokio::test]
    async fn test_webhook_enforce_mode_rejects_unsigned() {
        let config = config_with(&[
            ("MP_WEBHOOK_SECRET", "s3cret"),
            ("MP_WEBHOOK_SIGNATURE_MODE", "enforce"),
        ]);
        let h = harness_with(config, StubGateway::default(), false);

        let (status, _, body) = send(&h.app, webhook_request("{}", &[])).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["erro"].is_string());
        assert!(read_log(&h.log_path).is_empty());
    }

    #[tokio::test]
    async fn test_webhook_enforce_mode_accepts_valid_signature() {
        let config = config_with(&[
            ("MP_WEBHOOK_SECRET", "s3cret"),
            ("MP_WEBHOOK_SIGNATURE_MODE", "enforce"),
        ]);
        let h = harness_with(config, StubGateway::default(), false);

        let v1 = WebhookVerifier::new("s3cret")
            .sign(Some("999"), Some("req-1"), "1700000000")
            .unwrap();
        let signature = format!("ts=1700000000,v1={v1}");

        let (status, _, _) = send(
            &h.app,
            webhook_request(
                r#"{"data":{"id":"999"}}"#,
                &[("x-signature", signature.as_str()), ("x-request-id", "req-1")],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read_log(&h.log_path).len(), 1);
    }

    // ------------------------------------------------------------------
    // PDF export
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_generate_pdf_headers() {
        let h = harness();
        let (status, headers, body) = send(&h.app, get("/gerar-pdf")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"curriculo.pdf\""
        );
        assert!(body.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_generate_pdf_failure_is_500() {
        let h = harness_with(config_with(&[]), StubGateway::default(), true);
        let (status, headers, body) = send(&h.app, get("/gerar-pdf")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(headers[header::CONTENT_TYPE], "application/pdf");
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "erro": "Erro ao gerar PDF" }));
    }

    // ------------------------------------------------------------------
    // End to end against a stub provider
    // ------------------------------------------------------------------

    async fn spawn_provider(provider: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, provider).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn live_app(provider: Router) -> (Router, tempfile::TempDir) {
        let base = spawn_provider(provider).await;
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("webhook.log");
        let log_path = log_path.to_string_lossy().into_owned();

        let config = config_with(&[
            ("MP_API_BASE_URL", base.as_str()),
            ("WEBHOOK_LOG_PATH", log_path.as_str()),
        ]);
        let mut state = AppState::from_config(config).unwrap();
        state.renderer = Arc::new(StubRenderer { fail: false });
        (router(state), dir)
    }

    #[tokio::test]
    async fn test_end_to_end_pix_payment() {
        let seen: Arc<Mutex<Option<(HeaderMap, Value)>>> = Arc::default();
        let captured = seen.clone();
        let provider = Router::new().route(
            "/v1/payments",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some((headers, body));
                    (
                        StatusCode::CREATED,
                        Json(json!({
                            "id": 123,
                            "status": "pending",
                            "point_of_interaction": {
                                "transaction_data": { "qr_code": "xyz", "qr_code_base64": "Zm9v" }
                            }
                        })),
                    )
                }
            }),
        );
        let (app, _dir) = live_app(provider).await;

        let payload = json!({ "email": "a@b.com", "nome": "Ana", "cpf": "12345678909" });
        let (status, body) = send_json(&app, "/criar-pagamento", &payload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": "123", "qr_code": "xyz", "qr_code_base64": "Zm9v" }));

        let (headers, sent) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer TEST-TOKEN");
        assert!(headers.contains_key("x-idempotency-key"));
        assert_eq!(sent["payment_method_id"], "pix");
        assert_eq!(sent["transaction_amount"], json!(3.0));
        assert_eq!(sent["notification_url"], "https://api.example.com/webhook");
        assert_eq!(sent["payer"]["email"], "a@b.com");
        assert_eq!(sent["payer"]["identification"]["type"], "CPF");
        assert_eq!(sent["payer"]["identification"]["number"], "12345678909");
    }

    #[tokio::test]
    async fn test_end_to_end_missing_transaction_data() {
        let provider = Router::new().route(
            "/v1/payments",
            post(|| async { (StatusCode::CREATED, Json(json!({ "id": 123, "status": "pending" }))) }),
        );
        let (app, _dir) = live_app(provider).await;

        let (status, body) =
            send_json(&app, "/criar-pagamento", &json!({ "email": "a@b.com" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["erro"].is_string());
        assert!(body.get("id").is_none());
        assert!(body.get("qr_code").is_none());
    }

    #[tokio::test]
    async fn test_end_to_end_check_payment() {
        let provider = Router::new().route(
            "/v1/payments/{id}",
            axum::routing::get(|axum::extract::Path(id): axum::extract::Path<String>| async move {
                let status = if id == "42" { "approved" } else { "pending" };
                Json(json!({ "id": id, "status": status }))
            }),
        );
        let (app, _dir) = live_app(provider).await;

        let (status, body) = send_json(&app, "/check-payment", &json!({ "id": 42 })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "paid": true }));

        let (status, body) = send_json(&app, "/check-payment", &json!({ "id": "7" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "paid": false }));
    }
}

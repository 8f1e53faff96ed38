#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use luminous_storefront::{
    create_app,
    handlers::RequestLimits,
    models::InboxMessage,
    repositories::{
        FileKeyValueStore, InMemorySessionRepository, KeyValueStore, StaticCatalogRepository,
    },
    services::{FixedDistance, ViaCepClient},
    AppServices, Metrics,
};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const INBOX_KEY: &str = "LUMINOUS_ADMIN_INBOX";
pub const ORIGIN_ADDRESS: &str = "Rua Rui Costa, 520, CEP 58046-085, João Pessoa - PB";

/// The full application wired against a wiremock postal-code server and a
/// file-backed store in a temporary directory
pub struct TestEnvironment {
    pub router: Router,
    pub postal_server: MockServer,
    pub store: Arc<FileKeyValueStore>,
    pub metrics: Arc<Metrics>,
    _data_dir: TempDir,
}

impl TestEnvironment {
    /// Build an environment whose simulated delivery distance is fixed
    pub async fn with_distance(distance_km: f64) -> Self {
        Self::with_options(distance_km, RequestLimits::default()).await
    }

    pub async fn with_limits(limits: RequestLimits) -> Self {
        Self::with_options(6.4, limits).await
    }

    pub async fn with_options(distance_km: f64, limits: RequestLimits) -> Self {
        let postal_server = MockServer::start().await;
        let data_dir = TempDir::new().expect("temp dir");
        let store = Arc::new(FileKeyValueStore::new(data_dir.path()));
        let metrics = Arc::new(Metrics::new().expect("metrics"));

        let lookup = ViaCepClient::new(&format!("{}/ws", postal_server.uri()), 5)
            .expect("lookup client");

        let services = AppServices::new(
            Arc::new(StaticCatalogRepository::new()),
            Arc::new(InMemorySessionRepository::new()),
            store.clone(),
            INBOX_KEY.to_string(),
            Arc::new(lookup),
            Arc::new(FixedDistance(distance_km)),
            ORIGIN_ADDRESS.to_string(),
            metrics.clone(),
        );

        Self {
            router: create_app(services, metrics.clone(), limits),
            postal_server,
            store,
            metrics,
            _data_dir: data_dir,
        }
    }

    pub async fn new() -> Self {
        Self::with_distance(6.4).await
    }

    /// Send one request through the router and decode the JSON reply.
    /// Bodiless replies decode as `Value::Null`.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        self.dispatch(request).await
    }

    /// Send a JSON-typed request whose body is taken verbatim. No
    /// Content-Length is declared, as with a streamed upload.
    pub async fn send_raw(&self, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn create_session(&self) -> String {
        let (status, body) = self.send(Method::POST, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().expect("session id").to_string()
    }

    /// Serve the application on a local port for clients that need a real socket
    pub async fn serve(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        format!("http://{}", addr)
    }

    pub fn client(&self) -> Client {
        Client::new()
    }

    /// Answer a postal-code lookup with a found address
    pub async fn mock_postal_code(&self, digits: &str, street: &str, neighborhood: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/ws/{}/json/", digits)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cep": format!("{}-{}", &digits[..5], &digits[5..]),
                "logradouro": street,
                "bairro": neighborhood,
                "localidade": "João Pessoa",
                "uf": "PB"
            })))
            .mount(&self.postal_server)
            .await;
    }

    pub async fn mock_postal_code_not_found(&self, digits: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/ws/{}/json/", digits)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "erro": true })))
            .mount(&self.postal_server)
            .await;
    }

    /// Answer a lookup only after `delay`
    pub async fn mock_slow_postal_code(&self, digits: &str, delay: std::time::Duration) {
        Mock::given(method("GET"))
            .and(path(format!("/ws/{}/json/", digits)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(delay)
                    .set_body_json(json!({ "cep": digits, "logradouro": "Rua Lenta" })),
            )
            .mount(&self.postal_server)
            .await;
    }

    pub async fn mock_postal_code_failure(&self, digits: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/ws/{}/json/", digits)))
            .respond_with(ResponseTemplate::new(503))
            .mount(&self.postal_server)
            .await;
    }

    pub async fn seed_inbox(&self, messages: &[InboxMessage]) {
        let raw = serde_json::to_string(messages).expect("serialize inbox");
        self.store.set(INBOX_KEY, raw).await.expect("seed inbox");
    }
}

pub fn inbox_message(id: &str, text: &str) -> InboxMessage {
    InboxMessage {
        id: id.to_string(),
        date: "19/10/2026, 10:00:00".to_string(),
        text: text.to_string(),
    }
}

pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("not a decimal: {:?}", other),
    }
}

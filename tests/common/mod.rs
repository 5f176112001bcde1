//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use review_proxy::{HttpServer, ProxyConfig};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

/// One call the proxy made to the mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub request_id: Option<String>,
}

#[derive(Default)]
struct MockState {
    stubs: HashMap<(Method, String), (StatusCode, Option<Value>)>,
    calls: Vec<RecordedCall>,
}

/// A programmable upstream. Unstubbed routes answer 404 with no body.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new()
            .fallback(record_and_respond)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer `method path` with `status` and a JSON body.
    pub fn stub(&self, method: Method, path: &str, status: u16, body: Value) {
        self.stub_raw(method, path, status, Some(body));
    }

    /// Answer `method path` with `status` and, optionally, a JSON body.
    pub fn stub_raw(&self, method: Method, path: &str, status: u16, body: Option<Value>) {
        self.state.lock().unwrap().stubs.insert(
            (method, path.to_string()),
            (StatusCode::from_u16(status).unwrap(), body),
        );
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }
}

async fn record_and_respond(
    State(state): State<Arc<Mutex<MockState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let call = RecordedCall {
        method: method.clone(),
        path: path.clone(),
        body: serde_json::from_slice(&body).ok(),
        request_id: headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let mut state = state.lock().unwrap();
    state.calls.push(call);
    match state.stubs.get(&(method, path)).cloned() {
        Some((status, Some(body))) => (status, Json(body)).into_response(),
        Some((status, None)) => status.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A proxy config pointing at `base_url`.
pub fn config_for(base_url: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.base_url = base_url.to_string();
    config.auth.jwt_secret = SECRET.to_string();
    config
}

/// The layered proxy router pointing at `base_url`.
pub fn proxy_for(base_url: &str) -> Router {
    HttpServer::new(config_for(base_url)).unwrap().router()
}

/// A signed token whose `id` claim is `id` (number or string).
pub fn token_for(id: Value) -> String {
    let exp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() + 3600;
    encode(
        &Header::default(),
        &json!({ "id": id, "email": "test@example.com", "exp": exp }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// Build a request with an optional bearer token and optional JSON body.
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request through the router and decode the JSON response.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

/// An address nothing is listening on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

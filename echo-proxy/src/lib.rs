//! Local HTTP endpoint that plays the proxy and echoes what it receives.
//!
//! # Overview
//! Accepts any method on any path, in origin form (direct) or absolute form
//! (proxied). Each request is filtered, recorded and answered with a JSON
//! `CapturedRequest`. Nothing is forwarded upstream.
//!
//! Reserved paths:
//! - `/status/{code}` echoes with the given status;
//! - `/delay/{ms}` waits before echoing;
//! - `/bytes/{n}` answers with `n` raw body bytes instead of the echo;
//! - `GET /__captured` lists the most recent captures, oldest first. Other
//!   methods on that path are echoed like any other request.

pub mod config;
pub mod inspect;

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, Path, Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use config::{Config, ConfigError};
use inspect::{Destination, Rejection};

/// Bodies larger than this are refused.
const BODY_LIMIT: usize = 1 << 20;
const MAX_DELAY: Duration = Duration::from_secs(60);
const MAX_BYTES: usize = 64 << 20;
/// Recorded as the forwarding client when the peer address is unknown.
const FALLBACK_CLIENT: &str = "127.0.0.1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRequest {
    pub id: Uuid,
    pub method: String,
    /// Request target exactly as received.
    pub target: String,
    pub destination: Destination,
    /// Original destination host when a redirect rule applied.
    pub redirected_from: Option<String>,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// Decoded fields for form-urlencoded bodies.
    pub form: Option<Vec<(String, String)>>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Most recent captures, bounded by `Config::capture_limit`.
#[derive(Debug)]
pub struct CaptureLog {
    entries: VecDeque<CapturedRequest>,
    limit: usize,
}

impl CaptureLog {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(64)),
            limit,
        }
    }

    /// Append `captured`, evicting the oldest entries past the limit.
    pub fn push(&mut self, captured: CapturedRequest) {
        if self.limit == 0 {
            return;
        }
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(captured);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> Vec<CapturedRequest> {
        self.entries.iter().cloned().collect()
    }
}

pub type Captured = Arc<RwLock<CaptureLog>>;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    captured: Captured,
}

pub fn app(config: Config) -> Router {
    let state = AppState {
        captured: Arc::new(RwLock::new(CaptureLog::new(config.capture_limit))),
        config: Arc::new(config),
    };
    Router::new()
        .route("/__captured", any(list_captured))
        .route("/status/{code}", any(echo_with_status))
        .route("/delay/{ms}", any(echo_after_delay))
        .route("/bytes/{n}", any(raw_bytes))
        .fallback(echo)
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: Config) -> Result<(), std::io::Error> {
    axum::serve(
        listener,
        app(config).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

async fn list_captured(State(state): State<AppState>, request: Request) -> Response {
    if request.method() != Method::GET {
        return respond(&state, StatusCode::OK, request).await;
    }
    Json(state.captured.read().await.entries()).into_response()
}

async fn echo(State(state): State<AppState>, request: Request) -> Response {
    respond(&state, StatusCode::OK, request).await
}

async fn echo_with_status(
    State(state): State<AppState>,
    Path(code): Path<u16>,
    request: Request,
) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => respond(&state, status, request).await,
        Err(_) => Rejection::InvalidStatus(code).into_response(),
    }
}

async fn echo_after_delay(
    State(state): State<AppState>,
    Path(ms): Path<u64>,
    request: Request,
) -> Response {
    tokio::time::sleep(Duration::from_millis(ms).min(MAX_DELAY)).await;
    respond(&state, StatusCode::OK, request).await
}

async fn raw_bytes(
    State(state): State<AppState>,
    Path(n): Path<usize>,
    request: Request,
) -> Response {
    match record(&state, StatusCode::OK, request).await {
        Ok(_) => {
            let body: Vec<u8> = (0..n.min(MAX_BYTES)).map(|i| b'a' + (i % 26) as u8).collect();
            (StatusCode::OK, body).into_response()
        }
        Err(rejection) => rejection.into_response(),
    }
}

async fn respond(state: &AppState, status: StatusCode, request: Request) -> Response {
    match record(state, status, request).await {
        Ok(captured) => (status, Json(captured)).into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

async fn record(
    state: &AppState,
    status: StatusCode,
    request: Request,
) -> Result<CapturedRequest, Rejection> {
    match capture(&state.config, request).await {
        Ok(captured) => {
            info!(
                "{} {} -> {} ({})",
                captured.method, captured.target, captured.destination, status
            );
            state.captured.write().await.push(captured.clone());
            Ok(captured)
        }
        Err(rejection) => {
            warn!("rejected request: {rejection:?}");
            Err(rejection)
        }
    }
}

/// Run the filters over `request` and describe what was received.
pub async fn capture(config: &Config, request: Request) -> Result<CapturedRequest, Rejection> {
    let (parts, body) = request.into_parts();

    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    if let Some(addr) = peer {
        if config.is_client_blocked(&addr.to_string()) {
            return Err(Rejection::ClientBlocked);
        }
    }

    let mut destination = inspect::destination(&parts.uri, &parts.headers)?;
    if config.is_site_blocked(&destination.host) {
        return Err(Rejection::SiteBlocked);
    }
    let redirected_from = match config.redirect_for(&destination.host) {
        Some(to) => Some(std::mem::replace(&mut destination.host, to.to_string())),
        None => None,
    };

    let mut headers: Vec<(String, String)> = parts
        .headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect();
    let client = peer.map_or_else(|| FALLBACK_CLIENT.to_string(), |addr| addr.ip().to_string());
    headers.push(("x-forwarded-for".to_string(), client));

    let bytes = read_body(body).await?;
    let is_form = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    let form = is_form.then(|| form_urlencoded::parse(&bytes).into_owned().collect());

    Ok(CapturedRequest {
        id: Uuid::new_v4(),
        method: parts.method.to_string(),
        target: parts.uri.to_string(),
        destination,
        redirected_from,
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
        form,
    })
}

async fn read_body(body: Body) -> Result<Vec<u8>, Rejection> {
    to_bytes(body, BODY_LIMIT)
        .await
        .map(|b| b.to_vec())
        .map_err(|e| Rejection::UnreadableBody(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CapturedRequest {
        CapturedRequest {
            id: Uuid::new_v4(),
            method: "POST".to_string(),
            target: "/path1/path2.txt?a=1&b=2".to_string(),
            destination: Destination {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            redirected_from: None,
            path: "/path1/path2.txt".to_string(),
            query: Some("a=1&b=2".to_string()),
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: "a=b&c=d".to_string(),
            form: None,
        }
    }

    #[test]
    fn captured_request_serializes_to_json() {
        let captured = CapturedRequest {
            id: Uuid::nil(),
            ..sample()
        };
        let json = serde_json::to_value(captured).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["destination"]["host"], "127.0.0.1");
        assert_eq!(json["destination"]["port"], 8080);
        assert_eq!(json["headers"][0][0], "Content-Type");
        assert!(json["form"].is_null());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let captured = sample();
        assert_eq!(captured.header("content-type"), Some("text/plain"));
        assert_eq!(captured.header("authorization"), None);
    }

    #[test]
    fn capture_log_evicts_oldest_past_limit() {
        let mut log = CaptureLog::new(2);
        let (a, b, c) = (sample(), sample(), sample());
        log.push(a);
        log.push(b.clone());
        log.push(c.clone());
        assert_eq!(log.len(), 2);
        let ids: Vec<Uuid> = log.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, [b.id, c.id]);
    }

    #[test]
    fn zero_limit_records_nothing() {
        let mut log = CaptureLog::new(0);
        log.push(sample());
        assert!(log.is_empty());
    }
}

//! Request inspection: where a request is headed and whether to serve it.
//!
//! # Design
//! A proxied request arrives in absolute form (`GET http://host:port/path`),
//! so its destination comes from the request target. A direct request arrives
//! in origin form and its destination comes from the `Host` header. Only
//! plain `http` is proxied.

use std::str::FromStr;

use axum::http::uri::Authority;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Port assumed when neither the target nor the `Host` header names one.
pub const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub host: String,
    pub port: u16,
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Why a request is answered with an error instead of an echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    InvalidScheme,
    InvalidHost,
    ClientBlocked,
    SiteBlocked,
    InvalidStatus(u16),
    UnreadableBody(String),
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::InvalidScheme => (StatusCode::BAD_REQUEST, "Invalid scheme").into_response(),
            Rejection::InvalidHost => (StatusCode::BAD_REQUEST, "Invalid host").into_response(),
            Rejection::ClientBlocked => (StatusCode::FORBIDDEN, "Not allowed").into_response(),
            Rejection::SiteBlocked => (StatusCode::FORBIDDEN, "Blocked site").into_response(),
            Rejection::InvalidStatus(code) => {
                (StatusCode::BAD_REQUEST, format!("Invalid status {code}")).into_response()
            }
            Rejection::UnreadableBody(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid body: {msg}")).into_response()
            }
        }
    }
}

/// Resolve the destination of a request.
pub fn destination(uri: &Uri, headers: &HeaderMap) -> Result<Destination, Rejection> {
    if let Some(scheme) = uri.scheme_str() {
        if scheme != "http" {
            return Err(Rejection::InvalidScheme);
        }
        let authority = uri.authority().ok_or(Rejection::InvalidHost)?;
        return from_authority(authority);
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .ok_or(Rejection::InvalidHost)?;
    let authority = Authority::from_str(host.trim()).map_err(|_| Rejection::InvalidHost)?;
    from_authority(&authority)
}

fn from_authority(authority: &Authority) -> Result<Destination, Rejection> {
    let host = authority.host();
    if host.is_empty() {
        return Err(Rejection::InvalidHost);
    }
    Ok(Destination {
        host: host.to_string(),
        port: authority.port_u16().unwrap_or(DEFAULT_PORT),
    })
}

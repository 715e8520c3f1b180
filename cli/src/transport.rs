//! Executes a `PreparedRequest` over the network with a blocking reqwest client.
//!
//! # Design
//! Status codes are data, not errors: `send` only fails when no response
//! arrived, so a 404 or 500 is printed like a 200. Through a proxy, `http`
//! targets go out in absolute form (`GET http://host/path`) to the proxy
//! itself; only `https` targets are tunnelled with `CONNECT`. The body is
//! read in full with no size limit.

use log::debug;
use probe_core::{HttpMethod, HttpResponse, PreparedRequest, ProbeError};
use reqwest::blocking::Client;
use reqwest::Method;
use thiserror::Error;

/// Any reason a request produced no response.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Request(#[from] ProbeError),

    /// DNS, connect, proxy, timeout and I/O failures.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

fn client(prepared: &PreparedRequest) -> Result<Client, FetchError> {
    let builder = Client::builder().timeout(prepared.timeout);
    // The proxy was already chosen for this target's scheme.
    let builder = match &prepared.proxy {
        Some(url) => builder.proxy(reqwest::Proxy::all(url.as_str())?),
        None => builder.no_proxy(),
    };
    Ok(builder.build()?)
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
    }
}

/// Send the request and read the whole response body.
pub fn execute(prepared: &PreparedRequest) -> Result<HttpResponse, FetchError> {
    let client = client(prepared)?;
    let req = &prepared.request;
    debug!(
        "{} {} via {} ({:?} timeout)",
        req.method,
        req.url,
        prepared.proxy.as_ref().map_or("direct", |u| u.as_str()),
        prepared.timeout
    );

    let mut builder = client.request(method(req.method), req.url.as_str());
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &req.body {
        builder = builder.body(body.clone());
    }
    let response = builder.send()?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = response.bytes()?.to_vec();
    debug!("{status} with {} body bytes", body.len());

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

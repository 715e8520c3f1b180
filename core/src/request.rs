//! The request descriptor and its preparation into wire-ready data.
//!
//! # Design
//! `RequestSpec` is built once, prepared once and discarded. Builder methods
//! record input as given; every validation that depends on more than one
//! field happens in `prepare`, so a spec can be assembled in any order.

use std::time::Duration;

use log::debug;
use url::Url;

use crate::error::ProbeError;
use crate::form::{FormBody, FORM_CONTENT_TYPE};
use crate::http::{HttpMethod, HttpRequest};
use crate::proxy::ProxyMap;
use crate::target::Target;

/// Client-side timeout applied when none is given.
pub const DEFAULT_TIMEOUT: Timeout = Timeout(Duration::from_secs(3));

/// A strictly positive, finite request timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout(Duration);

impl Timeout {
    pub fn from_secs_f64(secs: f64) -> Result<Self, ProbeError> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ProbeError::InvalidTimeout(secs));
        }
        Duration::try_from_secs_f64(secs)
            .map(Timeout)
            .map_err(|_| ProbeError::InvalidTimeout(secs))
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl Default for Timeout {
    fn default() -> Self {
        DEFAULT_TIMEOUT
    }
}

/// One outbound request: method, target, optional query, proxies and form.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: HttpMethod,
    target: Target,
    query: Vec<(String, String)>,
    proxies: ProxyMap,
    form: FormBody,
    timeout: Timeout,
}

/// Output of `RequestSpec::prepare`: the request plus how to send it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub request: HttpRequest,
    pub proxy: Option<Url>,
    pub timeout: Duration,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, url: &str) -> Result<Self, ProbeError> {
        Ok(Self {
            method,
            target: Target::parse(url)?,
            query: Vec::new(),
            proxies: ProxyMap::new(),
            form: FormBody::new(),
            timeout: Timeout::default(),
        })
    }

    pub fn get(url: &str) -> Result<Self, ProbeError> {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: &str) -> Result<Self, ProbeError> {
        Self::new(HttpMethod::Post, url)
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Route the request through the entry matching the target's scheme.
    pub fn proxy(mut self, proxies: ProxyMap) -> Self {
        self.proxies = proxies;
        self
    }

    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push(name, value);
        self
    }

    pub fn form(mut self, form: FormBody) -> Self {
        self.form = form;
        self
    }

    pub fn timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn prepare(self) -> Result<PreparedRequest, ProbeError> {
        let mut headers = Vec::new();

        if let Some(credentials) = self.target.credentials() {
            headers.push((
                "authorization".to_string(),
                credentials.basic_authorization(),
            ));
        }

        let body = if self.form.is_empty() {
            None
        } else if self.method.allows_body() {
            headers.push(("content-type".to_string(), FORM_CONTENT_TYPE.to_string()));
            Some(self.form.encode())
        } else {
            return Err(ProbeError::BodyNotAllowed(self.method.as_str()));
        };

        let proxy = self.proxies.select(&self.target).cloned();
        let target = self
            .target
            .with_query(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        debug!(
            "prepared {} {} via {}",
            self.method,
            target.request_url(),
            proxy.as_ref().map_or("direct", Url::as_str)
        );

        Ok(PreparedRequest {
            request: HttpRequest {
                method: self.method,
                url: target.request_url().to_string(),
                headers,
                body,
            },
            proxy,
            timeout: self.timeout.as_duration(),
        })
    }
}

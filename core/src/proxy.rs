//! Scheme-to-proxy mapping.
//!
//! # Design
//! Mirrors the usual `{"http": "http://127.0.0.1:8080"}` shape: the proxy is
//! chosen by the *target's* scheme, and a target whose scheme has no entry
//! goes direct. Proxies themselves are always spoken to in plain `http`.

use std::collections::BTreeMap;

use url::Url;

use crate::error::ProbeError;
use crate::target::Target;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyMap {
    by_scheme: BTreeMap<String, Url>,
}

impl ProxyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `scheme` targets through `proxy`. A later entry for the same
    /// scheme replaces the earlier one.
    pub fn insert(&mut self, scheme: &str, proxy: &str) -> Result<(), ProbeError> {
        let url = parse_proxy_url(proxy)?;
        self.by_scheme.insert(scheme.to_ascii_lowercase(), url);
        Ok(())
    }

    /// Accept `scheme=url`, or a bare `url` which applies to `http` targets.
    pub fn insert_entry(&mut self, entry: &str) -> Result<(), ProbeError> {
        match entry.split_once('=') {
            Some((scheme, proxy)) if !scheme.is_empty() && !scheme.contains(':') => {
                self.insert(scheme, proxy)
            }
            _ => self.insert("http", entry),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_scheme.is_empty()
    }

    /// Proxy for the target's scheme, if any.
    pub fn select(&self, target: &Target) -> Option<&Url> {
        self.by_scheme.get(target.scheme())
    }
}

fn parse_proxy_url(raw: &str) -> Result<Url, ProbeError> {
    let invalid = |reason: String| ProbeError::InvalidProxy {
        entry: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" {
        return Err(invalid(format!("scheme {:?} is not supported", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

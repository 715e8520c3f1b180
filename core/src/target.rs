//! Request target parsing.
//!
//! # Design
//! A target URL may embed `user:pass@` credentials and a `#fragment`. Neither
//! is sent on the request line: credentials become an `Authorization` header
//! and the fragment stays client-side. `Target` strips both at parse time so
//! `request_url` is always safe to hand to the transport.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::auth::Credentials;
use crate::error::ProbeError;

/// A parsed, validated request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
    credentials: Option<Credentials>,
    fragment: Option<String>,
}

impl Target {
    pub fn parse(input: &str) -> Result<Self, ProbeError> {
        let mut url = Url::parse(input.trim()).map_err(|e| ProbeError::InvalidUrl {
            url: input.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ProbeError::UnsupportedScheme(other.to_string())),
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ProbeError::MissingHost(input.to_string()));
        }

        let credentials = if url.username().is_empty() && url.password().is_none() {
            None
        } else {
            Some(Credentials::new(
                decode(url.username()),
                url.password().map(decode).unwrap_or_default(),
            ))
        };
        // Both setters only fail for cannot-be-a-base URLs, ruled out by the host check.
        let _ = url.set_username("");
        let _ = url.set_password(None);

        let fragment = url.fragment().map(str::to_string);
        url.set_fragment(None);

        Ok(Self {
            url,
            credentials,
            fragment,
        })
    }

    /// Append `pairs` to the query string, after any parameters already present.
    pub fn with_query<'a, I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut pairs = pairs.into_iter().peekable();
        if pairs.peek().is_some() {
            self.url.query_pairs_mut().extend_pairs(pairs);
        }
        self
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Explicit port, or the scheme's default.
    pub fn port(&self) -> Option<u16> {
        self.url.port_or_known_default()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// The fragment from the input, which is never transmitted.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The URL as it goes on the wire: no userinfo, no fragment.
    pub fn request_url(&self) -> &str {
        self.url.as_str()
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

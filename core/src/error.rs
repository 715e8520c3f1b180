//! Error types for building a request.
//!
//! # Design
//! Every variant means "the request could not be issued". The host folds
//! these together with transport failures into one printed message, so the
//! variants exist for tests and logs rather than for recovery.

use thiserror::Error;

/// Errors returned while turning a `RequestSpec` into an `HttpRequest`.
#[derive(Debug, Error, PartialEq)]
pub enum ProbeError {
    /// The URL could not be parsed at all.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Only `http` and `https` targets can be requested.
    #[error("unsupported URL scheme {0:?}")]
    UnsupportedScheme(String),

    /// The URL parsed but names no host.
    #[error("URL {0:?} has no host")]
    MissingHost(String),

    /// A proxy entry was malformed or not an `http://` URL.
    #[error("invalid proxy {entry:?}: {reason}")]
    InvalidProxy { entry: String, reason: String },

    /// A `name=value` field (form or query) was malformed.
    #[error("invalid field {0:?}: expected name=value")]
    InvalidField(String),

    /// Timeouts must be finite and greater than zero.
    #[error("invalid timeout {0}: must be a positive number of seconds")]
    InvalidTimeout(f64),

    /// Form fields were supplied for a method that carries no body.
    #[error("{0} requests cannot carry a form body")]
    BodyNotAllowed(&'static str),
}

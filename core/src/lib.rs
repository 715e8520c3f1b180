//! Sans-IO core for a single proxied HTTP request.
//!
//! # Overview
//! Turns a request descriptor (`RequestSpec`) into a plain-data `HttpRequest`
//! plus the transport settings (proxy, timeout) needed to send it, and turns
//! the resulting `HttpResponse` or failure into the printed `Outcome`. The
//! caller executes the actual HTTP round-trip (host-does-IO pattern).
//!
//! # Design
//! - URL handling lives in `target`: credentials and fragment are split off
//!   there so nothing downstream can transmit them by accident.
//! - `request::RequestSpec::prepare` is the only place headers are derived.
//! - Types use owned `String` / `Vec` fields so the host side can hand them
//!   to any HTTP client.

pub mod auth;
pub mod error;
pub mod form;
pub mod http;
pub mod outcome;
pub mod proxy;
pub mod request;
pub mod target;

pub use auth::Credentials;
pub use error::ProbeError;
pub use form::FormBody;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use outcome::Outcome;
pub use proxy::ProxyMap;
pub use request::{PreparedRequest, RequestSpec, Timeout, DEFAULT_TIMEOUT};
pub use target::Target;

//! Host side of the probe: argument handling, network I/O and printing.
//!
//! # Design
//! `run` is the single catch-all: every way the request can fail is turned
//! into a printed `Outcome::Failed`, so only a broken stdout is an error.

pub mod args;
pub mod transport;

use std::io::{self, Write};

use log::warn;
use probe_core::form::parse_pair;
use probe_core::{FormBody, Outcome, PreparedRequest, ProbeError, ProxyMap, RequestSpec, Timeout};

pub use args::Args;
pub use transport::{execute, FetchError};

/// Turn parsed arguments into a prepared request.
pub fn prepare(args: &Args) -> Result<PreparedRequest, ProbeError> {
    let mut proxies = ProxyMap::new();
    for entry in &args.proxies {
        proxies.insert_entry(entry)?;
    }
    let form = args
        .data
        .iter()
        .map(|raw| parse_pair(raw.as_str()))
        .collect::<Result<FormBody, _>>()?;

    let mut spec = RequestSpec::new(args.method.into(), &args.url)?
        .proxy(proxies)
        .form(form)
        .timeout(Timeout::from_secs_f64(args.timeout)?);
    for raw in &args.query {
        let (name, value) = parse_pair(raw)?;
        spec = spec.query(name, value);
    }
    spec.prepare()
}

/// Issue the request described by `args` and report it.
pub fn fetch(args: &Args) -> Outcome {
    let result = prepare(args)
        .map_err(FetchError::from)
        .and_then(|prepared| execute(&prepared));
    match result {
        Ok(response) => Outcome::Response(response),
        Err(e) => {
            warn!("request failed: {e}");
            Outcome::failed(e)
        }
    }
}

/// Fetch and print to `out`.
pub fn run<W: Write>(args: &Args, out: &mut W) -> io::Result<()> {
    fetch(args).write_to(out)
}

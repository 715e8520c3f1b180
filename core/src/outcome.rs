//! What gets printed after the single request completes.

use std::io::{self, Write};

use crate::http::HttpResponse;

/// Result of one request as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server answered; any status counts as an answer.
    Response(HttpResponse),
    /// The request never produced a response. Holds the error message.
    Failed(String),
}

impl Outcome {
    pub fn failed(err: impl std::fmt::Display) -> Self {
        Outcome::Failed(err.to_string())
    }

    /// Status line then the raw body bytes, or the failure message.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Outcome::Response(response) => {
                writeln!(out, "{}", response.status)?;
                out.write_all(&response.body)?;
                out.write_all(b"\n")?;
            }
            Outcome::Failed(message) => writeln!(out, "{message}")?,
        }
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(outcome: &Outcome) -> Vec<u8> {
        let mut out = Vec::new();
        outcome.write_to(&mut out).unwrap();
        out
    }

    #[test]
    fn response_prints_status_then_body() {
        let outcome = Outcome::Response(HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: b"not here".to_vec(),
        });
        assert_eq!(render(&outcome), b"404\nnot here\n");
    }

    #[test]
    fn body_bytes_are_not_reencoded() {
        let outcome = Outcome::Response(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: vec![0xff, 0x00, 0xfe],
        });
        assert_eq!(render(&outcome), b"200\n\xff\x00\xfe\n");
    }

    #[test]
    fn failure_prints_message() {
        let outcome = Outcome::failed("connection refused");
        assert_eq!(render(&outcome), b"connection refused\n");
    }
}

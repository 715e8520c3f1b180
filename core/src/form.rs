//! `application/x-www-form-urlencoded` request bodies.

use crate::error::ProbeError;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Ordered form fields. Duplicate names are kept and sent in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Serialize as `name=value` pairs joined by `&`, values percent-encoded.
    pub fn encode(&self) -> Vec<u8> {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.fields)
            .finish()
            .into_bytes()
    }
}

impl<K, V> FromIterator<(K, V)> for FormBody
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut body = FormBody::new();
        for (k, v) in iter {
            body.push(k, v);
        }
        body
    }
}

/// Split a `name=value` argument. Only the first `=` separates; the value
/// may be empty, the name may not.
pub fn parse_pair(raw: &str) -> Result<(String, String), ProbeError> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(ProbeError::InvalidField(raw.to_string())),
    }
}

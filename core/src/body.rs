//! Request payloads.
//!
//! Only `Text` and `Form` can be carried by the GET fallback; the other
//! kinds exist so callers can express them and get a clear rejection.

use std::fmt;

use url::form_urlencoded;

/// Implicit content type for a text body, as Fetch assigns it.
pub const TEXT_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

/// Implicit content type for a form body, as Fetch assigns it.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Ordered URL-encoded form fields, the `URLSearchParams` equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams(Vec<(String, String)>);

impl FormParams {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Serializes with `application/x-www-form-urlencoded` rules, so spaces
/// become `+` and reserved characters are percent-encoded.
impl fmt::Display for FormParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.0 {
            serializer.append_pair(name, value);
        }
        f.write_str(&serializer.finish())
    }
}

/// Request body as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    Form(FormParams),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

impl Body {
    /// The query-string form of this body, if it has one.
    ///
    /// Text passes through untouched; forms use their own string form.
    pub fn as_query_payload(&self) -> Option<String> {
        match self {
            Body::Text(text) => Some(text.clone()),
            Body::Form(form) => Some(form.to_string()),
            Body::Json(_) | Body::Bytes(_) => None,
        }
    }

    /// Only an empty string reads as "no body"; an empty form or byte
    /// buffer is still a body.
    pub fn counts_as_absent(&self) -> bool {
        matches!(self, Body::Text(text) if text.is_empty())
    }

    /// Content type Fetch would attach when the caller sets none.
    pub fn implicit_content_type(&self) -> Option<&'static str> {
        match self {
            Body::Text(_) => Some(TEXT_CONTENT_TYPE),
            Body::Form(_) => Some(FORM_CONTENT_TYPE),
            Body::Json(_) | Body::Bytes(_) => None,
        }
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Text(s.to_string())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(s)
    }
}

impl From<FormParams> for Body {
    fn from(form: FormParams) -> Self {
        Body::Form(form)
    }
}

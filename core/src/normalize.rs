//! Request normalizer: turns caller input into the request actually sent.
//!
//! # Design
//! The host container only proxies GET reliably, so a POST is re-expressed
//! as a GET whose query string carries the form payload plus the
//! `_rexxar_method=POST` marker. Only URL-encoded form data can travel that
//! way; every other POST shape is rejected here, before any I/O.
//!
//! Query parameters are appended by joining `"<url>&<payload>"` and then
//! turning the first `&` or `?` in that string into `?`. This is not a real
//! query-string merge (a URL with `&` in its path gets its first `&`
//! replaced), but hosts depend on exactly this shape.

use log::debug;

use crate::body::Body;
use crate::error::FetchError;
use crate::http::{Headers, HttpMethod, HttpRequest};

/// Query field telling the host that a GET was originally a POST.
pub const METHOD_MARKER: &str = "_rexxar_method=POST";

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// What the caller passed as the first fetch argument.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchInput {
    Url(String),
    Request(HttpRequest),
}

impl From<&str> for FetchInput {
    fn from(url: &str) -> Self {
        FetchInput::Url(url.to_string())
    }
}

impl From<String> for FetchInput {
    fn from(url: String) -> Self {
        FetchInput::Url(url)
    }
}

impl From<HttpRequest> for FetchInput {
    fn from(request: HttpRequest) -> Self {
        FetchInput::Request(request)
    }
}

/// Options bag overriding the input's method, headers and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestInit {
    pub method: Option<HttpMethod>,
    pub headers: Option<Headers>,
    pub body: Option<Body>,
}

impl RequestInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<HttpMethod>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.get_or_insert_with(Headers::new).set(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Build the request to hand to the transport.
///
/// A prebuilt request without `init` is reused as-is unless it is a POST,
/// which fails immediately: the fallback needs the body from `init`.
/// Non-POST requests pass through unchanged.
pub fn normalize(
    input: impl Into<FetchInput>,
    init: Option<RequestInit>,
) -> Result<HttpRequest, FetchError> {
    let (request, body) = match (input.into(), init) {
        (FetchInput::Request(request), None) => {
            if request.method == HttpMethod::Post {
                return Err(FetchError::PostRequestWithoutInit);
            }
            return Ok(request);
        }
        (input, init) => {
            let init = init.unwrap_or_default();
            let body = init.body.clone();
            (construct(input, init), body)
        }
    };

    if request.method != HttpMethod::Post {
        return Ok(request);
    }

    let content_type = request
        .headers
        .get("content-type")
        .filter(|ct| !ct.is_empty());
    let rewritten = rewrite_post(&request.url, content_type, body.as_ref())?;
    debug!("rewrote POST {} as GET {}", request.url, rewritten.url);
    Ok(rewritten)
}

/// Merge `init` over the input, filling in the content type Fetch would
/// derive from the body.
fn construct(input: FetchInput, init: RequestInit) -> HttpRequest {
    let base = match input {
        FetchInput::Url(url) => HttpRequest::get(url),
        FetchInput::Request(request) => request,
    };

    let mut headers = init.headers.unwrap_or(base.headers);
    let body = init.body.or(base.body);
    if let Some(body) = body.as_ref().filter(|b| !b.counts_as_absent()) {
        if !headers.contains("content-type") {
            if let Some(content_type) = body.implicit_content_type() {
                headers.set("Content-Type", content_type);
            }
        }
    }

    HttpRequest {
        method: init.method.unwrap_or(base.method),
        url: base.url,
        headers,
        body,
    }
}

fn rewrite_post(
    url: &str,
    content_type: Option<&str>,
    body: Option<&Body>,
) -> Result<HttpRequest, FetchError> {
    let has_body = body.is_some_and(|b| !b.counts_as_absent());

    match content_type {
        None if !has_body => Ok(HttpRequest::get(append_query(url, METHOD_MARKER))),
        Some(ct) if ct.to_ascii_lowercase().contains(FORM_URLENCODED) => {
            let payload = body
                .and_then(Body::as_query_payload)
                .ok_or(FetchError::UnsupportedBody)?;
            let query = format!("{payload}&{METHOD_MARKER}");
            Ok(HttpRequest::get(append_query(url, &query)))
        }
        other => Err(FetchError::UnsupportedContentType {
            content_type: other.unwrap_or_default().to_string(),
        }),
    }
}

/// Join `payload` onto `url`, then turn the first `&` or `?` into `?`.
pub fn append_query(url: &str, payload: &str) -> String {
    let mut joined = format!("{url}&{payload}");
    if let Some(pos) = joined.find(['&', '?']) {
        joined.replace_range(pos..pos + 1, "?");
    }
    joined
}

//! Response resolver: undoes the host's error rewriting.
//!
//! # Design
//! Android hosts never let a failure through as-is. A network failure or
//! an upstream error status arrives as a 200 whose body is
//! `_error_=<json>`; the resolver decodes that envelope and hands back
//! either an error or a rebuilt response with the real status and payload.
//! Other hosts pass statuses through untouched and use the out-of-band
//! status 999 for network failure.
//!
//! The response body is already owned text, so inspecting it never
//! consumes anything: a body without the prefix is returned as received.

use log::{debug, warn};
use serde_json::Value;

use crate::error::FetchError;
use crate::http::HttpResponse;
use crate::introspect::{is_truthy, payload_text};
use crate::kv;
use crate::platform::{HostKind, ResolverConfig};

/// Prefix marking a host-rewritten failure body.
pub const ERROR_PREFIX: &str = "_error_=";

const ERROR_FIELD: &str = "_error_";
const NETWORK_ERROR_MARKER: &str = "_network_error";
const RESPONSE_ERROR_MARKER: &str = "_response_error";
const RESPONSE_CODE_FIELD: &str = "_response_code";

/// Decoded content of an `_error_` field.
#[derive(Debug, Clone, PartialEq)]
pub enum HostErrorEnvelope {
    NetworkFailure,
    ResponseFailure { status: u16, payload: Value },
    Unrecognized,
}

impl HostErrorEnvelope {
    /// Decode the JSON carried in the `_error_` field.
    ///
    /// Markers are checked for truthiness, network first. A missing
    /// `_response_code` means 200, like constructing a `Response` with no
    /// status.
    pub fn decode(raw: &str) -> Result<Self, FetchError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| FetchError::MalformedEnvelope(e.to_string()))?;

        if value.get(NETWORK_ERROR_MARKER).is_some_and(is_truthy) {
            return Ok(HostErrorEnvelope::NetworkFailure);
        }

        match value.get(RESPONSE_ERROR_MARKER) {
            Some(payload) if is_truthy(payload) => {
                let status = parse_status(value.get(RESPONSE_CODE_FIELD))?;
                Ok(HostErrorEnvelope::ResponseFailure {
                    status,
                    payload: payload.clone(),
                })
            }
            _ => Ok(HostErrorEnvelope::Unrecognized),
        }
    }
}

fn parse_status(code: Option<&Value>) -> Result<u16, FetchError> {
    let status = match code {
        None | Some(Value::Null) => return Ok(200),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };

    match status {
        Some(s @ 200..=599) => Ok(s as u16),
        _ => Err(FetchError::InvalidStatus(
            code.map(Value::to_string).unwrap_or_default(),
        )),
    }
}

/// Pull the `_error_` value out of a rewritten body. An empty value counts
/// as no error.
fn extract_error(body: &str) -> Option<String> {
    if !body.starts_with(ERROR_PREFIX) {
        return None;
    }
    kv::decode(body)
        .remove(ERROR_FIELD)
        .filter(|raw| !raw.is_empty())
}

/// Maps host-specific failure signals back onto ordinary responses and
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseResolver {
    config: ResolverConfig,
}

impl ResponseResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn for_host(host: HostKind) -> Self {
        Self::new(ResolverConfig::new(host))
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn resolve(&self, response: HttpResponse) -> Result<HttpResponse, FetchError> {
        if self.config.host.rewrites_errors() {
            self.resolve_rewritten(response)
        } else {
            self.resolve_direct(response)
        }
    }

    fn resolve_rewritten(&self, response: HttpResponse) -> Result<HttpResponse, FetchError> {
        let Some(raw) = extract_error(&response.body) else {
            return Ok(response);
        };

        let envelope = HostErrorEnvelope::decode(&raw).inspect_err(|e| {
            warn!("discarding undecodable host error envelope: {e}");
        })?;
        debug!("decoded host error envelope: {envelope:?}");

        match envelope {
            HostErrorEnvelope::NetworkFailure => Err(FetchError::NetworkFailure),
            HostErrorEnvelope::ResponseFailure { status, payload } => Ok(HttpResponse {
                status,
                status_text: String::new(),
                headers: response.headers,
                body: payload_text(&payload),
            }),
            HostErrorEnvelope::Unrecognized => Err(FetchError::UnknownErrorType),
        }
    }

    fn resolve_direct(&self, response: HttpResponse) -> Result<HttpResponse, FetchError> {
        if response.status == self.config.network_failure_status {
            debug!("status {} signals network failure", response.status);
            return Err(FetchError::NetworkFailure);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Headers;
    use serde_json::json;

    fn android() -> ResponseResolver {
        ResponseResolver::for_host(HostKind::Android)
    }

    fn direct() -> ResponseResolver {
        ResponseResolver::for_host(HostKind::Other)
    }

    fn ok_with_body(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: [("Content-Type", "text/plain"), ("X-Request-Id", "abc")]
                .into_iter()
                .collect(),
            body: body.to_string(),
        }
    }

    #[test]
    fn network_marker_rejects() {
        let err = android()
            .resolve(ok_with_body(r#"_error_={"_network_error":true}"#))
            .unwrap_err();
        assert!(err.is_network_failure());
        assert_eq!(err.to_string(), "Network request failed");
    }

    #[test]
    fn response_marker_rebuilds_response() {
        let resp = android()
            .resolve(ok_with_body(
                r#"_error_={"_response_error":{"foo":"bar"},"_response_code":404}"#,
            ))
            .unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body, r#"{"foo":"bar"}"#);
        assert_eq!(resp.status_text, "");
        assert_eq!(resp.headers.get("x-request-id"), Some("abc"));
    }

    #[test]
    fn string_payload_is_used_verbatim() {
        let resp = android()
            .resolve(ok_with_body(
                r#"_error_={"_response_error":"service unavailable","_response_code":503}"#,
            ))
            .unwrap();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.body, "service unavailable");
    }

    #[test]
    fn missing_code_defaults_to_200() {
        let resp = android()
            .resolve(ok_with_body(r#"_error_={"_response_error":"x"}"#))
            .unwrap();
        assert_eq!(resp.status, 200);
    }

    #[test]
    fn out_of_range_code_is_rejected() {
        let err = android()
            .resolve(ok_with_body(r#"_error_={"_response_error":"x","_response_code":99}"#))
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidStatus(_)));
    }

    #[test]
    fn unrecognized_envelope_rejects() {
        let err = android()
            .resolve(ok_with_body(r#"_error_={"something":1}"#))
            .unwrap_err();
        assert_eq!(err, FetchError::UnknownErrorType);

        let err = android()
            .resolve(ok_with_body(r#"_error_={"_network_error":false}"#))
            .unwrap_err();
        assert_eq!(err, FetchError::UnknownErrorType);
    }

    #[test]
    fn malformed_envelope_rejects() {
        let err = android().resolve(ok_with_body("_error_={not json")).unwrap_err();
        assert!(matches!(err, FetchError::MalformedEnvelope(_)));
    }

    #[test]
    fn plain_body_is_returned_untouched() {
        let original = ok_with_body(r#"{"items":[]}"#);
        let resp = android().resolve(original.clone()).unwrap();
        assert_eq!(resp, original);
    }

    #[test]
    fn prefix_must_be_at_start() {
        let original = ok_with_body(r#"x_error_={"_network_error":true}"#);
        assert_eq!(android().resolve(original.clone()).unwrap(), original);
    }

    #[test]
    fn empty_error_value_is_not_an_error() {
        let original = ok_with_body("_error_=");
        assert_eq!(android().resolve(original.clone()).unwrap(), original);
    }

    #[test]
    fn android_ignores_sentinel_status() {
        let original = HttpResponse::new(999, "");
        assert_eq!(android().resolve(original.clone()).unwrap(), original);
    }

    #[test]
    fn direct_sentinel_status_rejects() {
        let err = direct().resolve(HttpResponse::new(999, "")).unwrap_err();
        assert_eq!(err.to_string(), "Network request failed");
    }

    #[test]
    fn direct_passes_other_statuses_through() {
        for status in [200, 201, 404, 500] {
            let original = HttpResponse {
                status,
                status_text: String::new(),
                headers: Headers::new(),
                body: r#"_error_={"_network_error":true}"#.to_string(),
            };
            assert_eq!(direct().resolve(original.clone()).unwrap(), original);
        }
    }

    #[test]
    fn custom_sentinel_status() {
        let config = ResolverConfig {
            host: HostKind::Other,
            network_failure_status: 598,
        };
        let resolver = ResponseResolver::new(config);
        assert!(resolver.resolve(HttpResponse::new(598, "")).is_err());
        assert!(resolver.resolve(HttpResponse::new(999, "")).is_ok());
    }

    #[test]
    fn envelope_decodes_truthy_markers() {
        assert_eq!(
            HostErrorEnvelope::decode(r#"{"_network_error":1}"#).unwrap(),
            HostErrorEnvelope::NetworkFailure
        );
        assert_eq!(
            HostErrorEnvelope::decode(r#"{"_response_error":[1,2],"_response_code":"500"}"#).unwrap(),
            HostErrorEnvelope::ResponseFailure {
                status: 500,
                payload: json!([1, 2])
            }
        );
        assert_eq!(
            HostErrorEnvelope::decode("42").unwrap(),
            HostErrorEnvelope::Unrecognized
        );
    }
}

//! Fetch-style client tying normalizer, transport and resolver together.
//!
//! # Design
//! `RexxarClient` holds only the injected resolver and a transport; it
//! carries no mutable state between calls. Hosts that run the round-trip
//! themselves (the FFI layer, for one) use the `build` / `parse` pair and
//! never need a `Transport`.

use std::future::Future;

use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse};
use crate::normalize::{normalize, FetchInput, RequestInit};
use crate::platform::ResolverConfig;
use crate::resolve::ResponseResolver;

/// Executes a request against the network.
///
/// Implementations must return non-2xx statuses as data; only failures to
/// obtain a response at all belong in `Err`.
pub trait Transport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send;
}

/// Fetch entry point for code running inside the host container.
#[derive(Debug, Clone)]
pub struct RexxarClient<T> {
    resolver: ResponseResolver,
    transport: T,
}

impl<T: Transport> RexxarClient<T> {
    pub fn new(config: ResolverConfig, transport: T) -> Self {
        Self {
            resolver: ResponseResolver::new(config),
            transport,
        }
    }

    /// Normalize, send and resolve one request.
    ///
    /// Caller-misuse errors return before the transport is touched.
    pub async fn fetch(
        &self,
        input: impl Into<FetchInput>,
        init: Option<RequestInit>,
    ) -> Result<HttpResponse, FetchError> {
        let request = self.build(input, init)?;
        let response = self.transport.execute(request).await?;
        self.parse(response)
    }

    pub fn build(
        &self,
        input: impl Into<FetchInput>,
        init: Option<RequestInit>,
    ) -> Result<HttpRequest, FetchError> {
        normalize(input, init)
    }

    pub fn parse(&self, response: HttpResponse) -> Result<HttpResponse, FetchError> {
        self.resolver.resolve(response)
    }

    pub fn resolver(&self) -> &ResponseResolver {
        &self.resolver
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::HttpMethod;
    use crate::platform::HostKind;

    /// Records every request and answers with a canned response.
    struct CannedTransport {
        response: Result<HttpResponse, FetchError>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(response: Result<HttpResponse, FetchError>) -> Self {
            Self {
                response,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Transport for CannedTransport {
        fn execute(
            &self,
            request: HttpRequest,
        ) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send {
            self.seen.lock().unwrap().push(request);
            let response = self.response.clone();
            async move { response }
        }
    }

    fn client(host: HostKind, response: HttpResponse) -> RexxarClient<CannedTransport> {
        RexxarClient::new(ResolverConfig::new(host), CannedTransport::new(Ok(response)))
    }

    #[tokio::test]
    async fn fetch_sends_rewritten_post() {
        let c = client(HostKind::Android, HttpResponse::new(200, "ok"));
        let init = RequestInit::new()
            .method(HttpMethod::Post)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("k=v");
        let resp = c.fetch("http://x/a", Some(init)).await.unwrap();
        assert_eq!(resp.body, "ok");

        let seen = c.transport().seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(seen[0].url, "http://x/a?k=v&_rexxar_method=POST");
    }

    #[tokio::test]
    async fn caller_misuse_never_reaches_transport() {
        let c = client(HostKind::Android, HttpResponse::new(200, "ok"));
        let init = RequestInit::new()
            .method(HttpMethod::Post)
            .header("Content-Type", "application/json")
            .body("{}");
        let err = c.fetch("http://x/a", Some(init)).await.unwrap_err();
        assert!(err.is_caller_misuse());
        assert!(c.transport().seen().is_empty());
    }

    #[tokio::test]
    async fn fetch_resolves_android_envelope() {
        let c = client(
            HostKind::Android,
            HttpResponse::new(200, r#"_error_={"_response_error":{"foo":"bar"},"_response_code":404}"#),
        );
        let resp = c.fetch("http://x/a", None).await.unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body, r#"{"foo":"bar"}"#);
    }

    #[tokio::test]
    async fn fetch_maps_direct_sentinel() {
        let c = client(HostKind::Other, HttpResponse::new(999, ""));
        assert!(!c.resolver().config().host.rewrites_errors());
        let err = c.fetch("http://x/a", None).await.unwrap_err();
        assert!(err.is_network_failure());
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let c = RexxarClient::new(
            ResolverConfig::new(HostKind::Other),
            CannedTransport::new(Err(FetchError::Transport("connection refused".to_string()))),
        );
        let err = c.fetch("http://x/a", None).await.unwrap_err();
        assert_eq!(err, FetchError::Transport("connection refused".to_string()));
    }
}

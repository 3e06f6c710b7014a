//! Fetch compatibility shim for hybrid web-view containers.
//!
//! # Overview
//! Code running inside a native host's web view cannot trust the network
//! path: the host proxies only GET reliably and, on Android, folds every
//! failure into a 200 response. This crate translates in both directions.
//! `normalize` re-expresses POSTs as marker-tagged GETs, and
//! `ResponseResolver` turns host failure signals back into ordinary
//! responses and errors.
//!
//! # Design
//! - Host-does-IO: requests and responses are plain data; the transport is
//!   supplied by the caller (`Transport`) or run by the host itself.
//! - Host behavior is injected (`ResolverConfig`), never sniffed globally.
//! - Caller misuse is reported before any network call.

pub mod body;
pub mod client;
pub mod error;
pub mod http;
pub mod introspect;
pub mod kv;
pub mod normalize;
pub mod platform;
pub mod resolve;

pub use body::{Body, FormParams};
pub use client::{RexxarClient, Transport};
pub use error::{FetchError, NETWORK_FAILURE_MESSAGE};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse};
pub use normalize::{normalize, FetchInput, RequestInit, METHOD_MARKER};
pub use platform::{HostKind, ResolverConfig};
pub use resolve::{HostErrorEnvelope, ResponseResolver, ERROR_PREFIX};

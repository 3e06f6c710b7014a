//! C-ABI wrapper around `rexxar-core`.
//!
//! # Overview
//! Lets a native host drive the fetch shim without linking to Rust's async
//! runtime: normalize a request, execute it with the host's own stack, then
//! resolve the raw response.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `FfiNormalizeResult` / `FfiResolveResult` envelopes carry an error code
//!   and message, or the payload.
//! - The C caller owns all returned pointers and must call the matching
//!   `rexxar_free_*` function to release them.

pub mod types;

use std::os::raw::c_char;
use std::panic::catch_unwind;

use rexxar_core::{normalize, HostKind, RequestInit, ResponseResolver};

use types::*;

// ---------------------------------------------------------------------------
// Resolver lifecycle
// ---------------------------------------------------------------------------

/// Create a resolver for the host identified by `user_agent`.
///
/// A null `user_agent` assumes the host rewrites error responses.
/// Returns null on invalid UTF-8 or if an internal panic occurs.
/// The caller must free the returned pointer with `rexxar_resolver_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rexxar_resolver_new(user_agent: *const c_char) -> *mut FfiResolver {
    catch_unwind(|| {
        let ua = match unsafe { read_c_str(user_agent) } {
            Ok(ua) => ua,
            Err(_) => return std::ptr::null_mut(),
        };
        let inner = ResponseResolver::for_host(HostKind::from_user_agent(ua));
        Box::into_raw(Box::new(FfiResolver { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a resolver with the host behavior given explicitly.
#[unsafe(no_mangle)]
pub extern "C" fn rexxar_resolver_new_with_mode(rewrites_errors: bool) -> *mut FfiResolver {
    catch_unwind(|| {
        let host = if rewrites_errors {
            HostKind::Android
        } else {
            HostKind::Other
        };
        let inner = ResponseResolver::for_host(host);
        Box::into_raw(Box::new(FfiResolver { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Whether the resolver decodes `_error_=` bodies. False for null.
#[unsafe(no_mangle)]
pub extern "C" fn rexxar_resolver_rewrites_errors(resolver: *const FfiResolver) -> bool {
    if resolver.is_null() {
        return false;
    }
    let resolver = unsafe { &*resolver };
    resolver.inner.config().host.rewrites_errors()
}

/// Free a resolver created by `rexxar_resolver_new*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rexxar_resolver_free(resolver: *mut FfiResolver) {
    if !resolver.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(resolver) });
        });
    }
}

// ---------------------------------------------------------------------------
// Normalize
// ---------------------------------------------------------------------------

/// Turn a fetch call into the request to send.
///
/// `method`, `content_type` and `body` may be null. A null method means GET.
/// A POST comes back as a GET carrying the body in its query string, or as
/// an error when its content type cannot be carried that way.
#[unsafe(no_mangle)]
pub extern "C" fn rexxar_normalize(
    url: *const c_char,
    method: *const c_char,
    content_type: *const c_char,
    body: *const c_char,
) -> *mut FfiNormalizeResult {
    catch_unwind(|| {
        let read = || -> Result<_, FfiErrorCode> {
            let url = unsafe { read_c_str(url) }?;
            let method = unsafe { read_c_str(method) }?;
            let content_type = unsafe { read_c_str(content_type) }?;
            let body = unsafe { read_c_str(body) }?;
            Ok((url, method, content_type, body))
        };
        let (url, method, content_type, body) = match read() {
            Ok(args) => args,
            Err(code) => return FfiNormalizeResult::from_code(code, "rexxar_normalize"),
        };
        let Some(url) = url else {
            return FfiNormalizeResult::from_code(FfiErrorCode::NullArg, "url");
        };

        let mut init = RequestInit::new();
        if let Some(method) = method {
            init = init.method(method);
        }
        if let Some(content_type) = content_type {
            init = init.header("Content-Type", content_type);
        }
        if let Some(body) = body {
            init = init.body(body);
        }

        match normalize(url, Some(init)) {
            Ok(req) => FfiNormalizeResult::ok(req),
            Err(e) => FfiNormalizeResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiNormalizeResult::error(FfiErrorCode::Panic, "panic in rexxar_normalize".to_string()))
}

// ---------------------------------------------------------------------------
// Resolve
// ---------------------------------------------------------------------------

/// Resolve a raw transport response.
///
/// Returns `NetworkFailure` when the host signalled one, otherwise the
/// response the caller should act on.
#[unsafe(no_mangle)]
pub extern "C" fn rexxar_resolve(
    resolver: *const FfiResolver,
    response: *const FfiHttpResponse,
) -> *mut FfiResolveResult {
    catch_unwind(|| {
        if resolver.is_null() {
            return FfiResolveResult::from_code(FfiErrorCode::NullArg, "resolver");
        }
        if response.is_null() {
            return FfiResolveResult::from_code(FfiErrorCode::NullArg, "response");
        }
        let resolver = unsafe { &*resolver };
        let resp = unsafe { &*response };
        let core_resp = match unsafe { resp.to_core() } {
            Ok(r) => r,
            Err(code) => return FfiResolveResult::from_code(code, "response"),
        };
        match resolver.inner.resolve(core_resp) {
            Ok(resolved) => FfiResolveResult::ok(resolved),
            Err(e) => FfiResolveResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResolveResult::error(FfiErrorCode::Panic, "panic in rexxar_resolve".to_string()))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a result returned by `rexxar_normalize`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rexxar_free_normalize_result(result: *mut FfiNormalizeResult) {
    let _ = catch_unwind(|| FfiNormalizeResult::free(result));
}

/// Free a result returned by `rexxar_resolve`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rexxar_free_resolve_result(result: *mut FfiResolveResult) {
    let _ = catch_unwind(|| FfiResolveResult::free(result));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rexxar_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

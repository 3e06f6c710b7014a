//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use rexxar_core::{FetchError, Headers, HttpMethod, HttpRequest, HttpResponse};

/// Opaque handle to a `ResponseResolver`. C callers receive a pointer to
/// this and pass it back into `rexxar_resolve`.
pub struct FfiResolver {
    pub(crate) inner: rexxar_core::ResponseResolver,
}

// ---------------------------------------------------------------------------
// String helpers
// ---------------------------------------------------------------------------

/// Move a Rust string onto the C heap. Interior NULs cannot cross the
/// boundary and are dropped.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let mut bytes = s.into_bytes();
    bytes.retain(|&b| b != 0);
    CString::new(bytes).unwrap_or_default().into_raw()
}

/// Borrow a caller-owned C string. Null maps to `None`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives the
/// returned borrow.
pub(crate) unsafe fn read_c_str<'a>(ptr: *const c_char) -> Result<Option<&'a str>, FfiErrorCode> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(Some)
        .map_err(|_| FfiErrorCode::InvalidUtf8)
}

/// Release a string produced by `into_c_string`. Null is ignored.
pub(crate) fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

/// A single HTTP header owned by this library.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A single HTTP header owned by the caller.
#[repr(C)]
pub struct FfiHeaderRef {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// Move headers onto the C heap as a boxed slice. Returns null for none.
pub(crate) fn headers_into_raw(headers: Headers) -> (*mut FfiHeader, u32) {
    if headers.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let ffi_headers: Box<[FfiHeader]> = headers
        .into_vec()
        .into_iter()
        .map(|(k, v)| FfiHeader {
            key: into_c_string(k),
            value: into_c_string(v),
        })
        .collect();
    let len = ffi_headers.len() as u32;
    (Box::into_raw(ffi_headers) as *mut FfiHeader, len)
}

/// Release a header slice produced by `headers_into_raw`.
pub(crate) fn free_headers(ptr: *mut FfiHeader, len: u32) {
    if ptr.is_null() || len == 0 {
        return;
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    let headers = unsafe { Box::from_raw(slice) };
    for h in headers.iter() {
        free_c_string(h.key);
        free_c_string(h.value);
    }
}

/// Copy caller-owned headers into core `Headers`.
///
/// # Safety
/// `ptr` must be null or point to `len` valid `FfiHeaderRef` values.
pub(crate) unsafe fn read_headers(ptr: *const FfiHeaderRef, len: u32) -> Result<Headers, FfiErrorCode> {
    let mut headers = Headers::new();
    if ptr.is_null() || len == 0 {
        return Ok(headers);
    }
    let refs = unsafe { std::slice::from_raw_parts(ptr, len as usize) };
    for h in refs {
        let key = unsafe { read_c_str(h.key) }?.ok_or(FfiErrorCode::NullArg)?;
        let value = unsafe { read_c_str(h.value) }?.unwrap_or_default();
        headers.append(key, value);
    }
    Ok(headers)
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum. `Other` carries its token in `method_name`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Head = 1,
    Post = 2,
    Put = 3,
    Delete = 4,
    Patch = 5,
    Options = 6,
    Other = 7,
}

impl From<&HttpMethod> for FfiHttpMethod {
    fn from(m: &HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Head => FfiHttpMethod::Head,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Options => FfiHttpMethod::Options,
            HttpMethod::Other(_) => FfiHttpMethod::Other,
        }
    }
}

/// The request to send, as C-compatible plain data.
///
/// `body` is null for every rewritten POST; it is only set when a non-POST
/// request passes through with a text or form body.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub method_name: *mut c_char,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let (headers, headers_len) = headers_into_raw(req.headers);
        let body = req
            .body
            .and_then(|b| b.as_query_payload())
            .map(into_c_string)
            .unwrap_or(std::ptr::null_mut());

        Box::into_raw(Box::new(FfiHttpRequest {
            method: FfiHttpMethod::from(&req.method),
            method_name: into_c_string(req.method.as_str().to_string()),
            url: into_c_string(req.url),
            headers,
            headers_len,
            body,
        }))
    }

    pub(crate) fn free(ptr: *mut Self) {
        if ptr.is_null() {
            return;
        }
        let req = unsafe { Box::from_raw(ptr) };
        free_c_string(req.method_name);
        free_c_string(req.url);
        free_c_string(req.body);
        free_headers(req.headers, req.headers_len);
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A raw transport response, owned by the caller.
///
/// The C caller fills this in after executing the request and passes a
/// pointer to `rexxar_resolve`. The FFI layer reads but does not free it.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *const FfiHeaderRef,
    pub headers_len: u32,
    pub body: *const c_char,
}

impl FfiHttpResponse {
    /// # Safety
    /// All pointers must be null or valid for the duration of the call.
    pub(crate) unsafe fn to_core(&self) -> Result<HttpResponse, FfiErrorCode> {
        let headers = unsafe { read_headers(self.headers, self.headers_len) }?;
        let body = unsafe { read_c_str(self.body) }?.unwrap_or_default();
        Ok(HttpResponse {
            status: self.status,
            status_text: String::new(),
            headers,
            body: body.to_string(),
        })
    }
}

/// The resolved response, owned by this library.
#[repr(C)]
pub struct FfiResolvedResponse {
    pub status: u16,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiResolvedResponse {
    pub(crate) fn from_core(resp: HttpResponse) -> *mut Self {
        let (headers, headers_len) = headers_into_raw(resp.headers);
        Box::into_raw(Box::new(FfiResolvedResponse {
            status: resp.status,
            headers,
            headers_len,
            body: into_c_string(resp.body),
        }))
    }

    pub(crate) fn free(ptr: *mut Self) {
        if ptr.is_null() {
            return;
        }
        let resp = unsafe { Box::from_raw(ptr) };
        free_c_string(resp.body);
        free_headers(resp.headers, resp.headers_len);
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in result envelopes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    PostRequestWithoutInit = 1,
    UnsupportedContentType = 2,
    UnsupportedBody = 3,
    NetworkFailure = 4,
    UnknownErrorType = 5,
    MalformedEnvelope = 6,
    InvalidStatus = 7,
    Transport = 8,
    Panic = 9,
    NullArg = 10,
    InvalidUtf8 = 11,
}

impl From<&FetchError> for FfiErrorCode {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::PostRequestWithoutInit => FfiErrorCode::PostRequestWithoutInit,
            FetchError::UnsupportedContentType { .. } => FfiErrorCode::UnsupportedContentType,
            FetchError::UnsupportedBody => FfiErrorCode::UnsupportedBody,
            FetchError::NetworkFailure => FfiErrorCode::NetworkFailure,
            FetchError::UnknownErrorType => FfiErrorCode::UnknownErrorType,
            FetchError::MalformedEnvelope(_) => FfiErrorCode::MalformedEnvelope,
            FetchError::InvalidStatus(_) => FfiErrorCode::InvalidStatus,
            FetchError::Transport(_) => FfiErrorCode::Transport,
        }
    }
}

fn code_message(code: FfiErrorCode) -> &'static str {
    match code {
        FfiErrorCode::NullArg => "null argument",
        FfiErrorCode::InvalidUtf8 => "argument is not valid UTF-8",
        _ => "error",
    }
}

/// Result envelope for `rexxar_normalize`.
///
/// On success `error_code` is `Ok`, `error_message` is null and `request`
/// points to the request to send. On failure `request` is null.
#[repr(C)]
pub struct FfiNormalizeResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub request: *mut FfiHttpRequest,
}

impl FfiNormalizeResult {
    pub(crate) fn ok(req: HttpRequest) -> *mut Self {
        Box::into_raw(Box::new(FfiNormalizeResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            request: FfiHttpRequest::from_core(req),
        }))
    }

    pub(crate) fn error(code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiNormalizeResult {
            error_code: code,
            error_message: into_c_string(msg),
            request: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn from_error(err: FetchError) -> *mut Self {
        Self::error(FfiErrorCode::from(&err), err.to_string())
    }

    pub(crate) fn from_code(code: FfiErrorCode, what: &str) -> *mut Self {
        Self::error(code, format!("{}: {what}", code_message(code)))
    }

    pub(crate) fn free(ptr: *mut Self) {
        if ptr.is_null() {
            return;
        }
        let result = unsafe { Box::from_raw(ptr) };
        free_c_string(result.error_message);
        FfiHttpRequest::free(result.request);
    }
}

/// Result envelope for `rexxar_resolve`.
///
/// On success `response` points to the resolved response; on failure it is
/// null and `error_code` tells network failure apart from envelope errors.
#[repr(C)]
pub struct FfiResolveResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub response: *mut FfiResolvedResponse,
}

impl FfiResolveResult {
    pub(crate) fn ok(resp: HttpResponse) -> *mut Self {
        Box::into_raw(Box::new(FfiResolveResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            response: FfiResolvedResponse::from_core(resp),
        }))
    }

    pub(crate) fn error(code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiResolveResult {
            error_code: code,
            error_message: into_c_string(msg),
            response: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn from_error(err: FetchError) -> *mut Self {
        Self::error(FfiErrorCode::from(&err), err.to_string())
    }

    pub(crate) fn from_code(code: FfiErrorCode, what: &str) -> *mut Self {
        Self::error(code, format!("{}: {what}", code_message(code)))
    }

    pub(crate) fn free(ptr: *mut Self) {
        if ptr.is_null() {
            return;
        }
        let result = unsafe { Box::from_raw(ptr) };
        free_c_string(result.error_message);
        FfiResolvedResponse::free(result.response);
    }
}

//! # REST Errors
//!
//! Map errors raised inside a web service to a standardized set of REST error
//! headers, and reconstruct errors from the headers of a received response.
//!
//! ## Design Philosophy
//!
//! 1. **Every error reaching an HTTP boundary resolves to one status**, with a
//!    fixed precedence: transport status, application status, caller default,
//!    `500`.
//! 2. **Error metadata travels in fixed headers** (`X-ERROR-ID`,
//!    `X-ERROR-CODE`, ...), independent of the response body format.
//! 3. **Public and internal context are separate.** Messages and codes go on
//!    the wire; internal details and metadata reach only the logs and are
//!    zeroized on drop.
//! 4. **Codes survive service hops.** A code taken from a downstream response
//!    is re-sent with `X-ERROR-CODE-INHERITED: true`.
//!
//! ## Quick Start
//!
//! ```rust
//! use http::StatusCode;
//! use rest_errors::{ErrorMapper, MapperConfig, RestApiException, RestError, definitions};
//!
//! fn find_order(id: u64) -> Result<(), RestError> {
//!     Err(RestApiException::not_found(definitions::NOT_FOUND, "order not found")
//!         .with_details(format!("order {} missing from primary", id))
//!         .into())
//! }
//!
//! let mapper = ErrorMapper::new(MapperConfig::new().with_application("orders"));
//! let err = find_order(42).unwrap_err();
//! let mapped = mapper.map(&err, Some("/orders/42"));
//!
//! assert_eq!(mapped.status, StatusCode::NOT_FOUND);
//! assert_eq!(mapped.headers["x-error-code"], "not_found");
//! assert_eq!(mapped.headers["x-error-application"], "orders");
//! ```
//!
//! ## Reconstructing Remote Errors
//!
//! ```rust
//! use http::{HeaderMap, StatusCode};
//! use rest_errors::{ResponseException, detect_http_status};
//!
//! # let headers = HeaderMap::new();
//! let err = ResponseException::from_parts(StatusCode::CONFLICT, headers);
//! assert_eq!(detect_http_status(&err, Some(StatusCode::BAD_GATEWAY)), StatusCode::CONFLICT);
//! ```
//!
//! ## Features
//!
//! - `trusted_debug`: Enable `ErrorLog::format_for_trusted_debug` (debug builds only)

#![warn(missing_docs)]
#![warn(clippy::all)]

use http::StatusCode;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::result;
use zeroize::Zeroize;

pub mod codes;
pub mod convenience;
pub mod definitions;
pub mod headers;
pub mod logging;
pub mod mapper;
pub mod models;
pub mod response;
pub mod status;

pub use codes::*;
pub use convenience::*;
pub use headers::{ErrorField, TIMESTAMP_FORMAT};
pub use logging::*;
pub use mapper::*;
pub use models::*;
pub use response::*;
pub use status::*;

/// Type alias for Results using our error type.
pub type Result<T> = result::Result<T, RestError>;

// ============================================================================
// Internal Context
// ============================================================================

/// Internal-only context of a [`RestApiException`].
///
/// Never written to response headers. Owned text is zeroized on drop.
#[derive(Default)]
struct InternalContext {
    details: Option<Cow<'static, str>>,
    metadata: SmallVec<[(&'static str, ContextField); 4]>,
}

impl Zeroize for InternalContext {
    fn zeroize(&mut self) {
        if let Some(Cow::Owned(ref mut s)) = self.details {
            s.zeroize();
        }
        for (_, value) in &mut self.metadata {
            value.zeroize();
        }
        self.metadata.clear();
    }
}

impl Drop for InternalContext {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// ============================================================================
// Application Exception
// ============================================================================

/// Error raised by application logic with an assigned HTTP status.
///
/// # Public vs Internal
///
/// - **Public** (sent in headers): status, code, inherited flag, message,
///   exception name.
/// - **Internal** (logs only): details, metadata, source error.
///
/// `Display` renders only public parts, so the error can be shown to any
/// caller.
///
/// # Example
///
/// ```rust
/// use http::StatusCode;
/// use rest_errors::{RestApiException, StatusAware, StatusSource, definitions};
///
/// let err = RestApiException::bad_request(definitions::BAD_REQUEST, "email is required")
///     .with_details("form field `email` was blank");
///
/// assert_eq!(err.status_source(), StatusSource::Application(StatusCode::BAD_REQUEST));
/// assert_eq!(err.to_string(), "email is required (bad_request)");
/// ```
#[must_use = "errors should be handled or mapped"]
pub struct RestApiException {
    status: StatusCode,
    code: ErrorCode,
    code_inherited: bool,
    message: Cow<'static, str>,
    exception: Cow<'static, str>,
    context: InternalContext,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl RestApiException {
    /// Exception name reported unless overridden.
    pub const DEFAULT_EXCEPTION_NAME: &'static str = "RestApiException";

    /// Create an exception with an application-assigned status.
    #[inline]
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status,
            code,
            code_inherited: false,
            message: message.into(),
            exception: Cow::Borrowed(Self::DEFAULT_EXCEPTION_NAME),
            context: InternalContext::default(),
            source: None,
        }
    }

    /// `400 Bad Request`
    #[inline]
    pub fn bad_request(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// `404 Not Found`
    #[inline]
    pub fn not_found(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    /// `409 Conflict`
    #[inline]
    pub fn conflict(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::CONFLICT, code, message)
    }

    /// `500 Internal Server Error`
    #[inline]
    pub fn internal(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }

    /// Mark the code as inherited from a downstream response.
    #[inline]
    pub fn inherited(mut self) -> Self {
        self.code_inherited = true;
        self
    }

    /// Override the exception name sent in `X-ERROR-EXCEPTION`.
    #[inline]
    pub fn with_exception_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.exception = name.into();
        self
    }

    /// Attach the underlying cause. Logged, never sent.
    #[inline]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Attach internal details. Logged, never sent.
    #[inline]
    pub fn with_details(mut self, details: impl Into<Cow<'static, str>>) -> Self {
        self.context.details = Some(details.into());
        self
    }

    /// Add tracking metadata (tenant, upstream ids, ...). Logged, never sent.
    #[inline]
    pub fn with_metadata(mut self, key: &'static str, value: impl Into<Cow<'static, str>>) -> Self {
        self.context.metadata.push((key, ContextField::from(value.into())));
        self
    }

    /// Application-assigned status.
    #[inline]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Error code.
    #[inline]
    pub const fn code(&self) -> &ErrorCode {
        &self.code
    }

    /// Whether the code was inherited from a downstream response.
    #[inline]
    pub const fn is_code_inherited(&self) -> bool {
        self.code_inherited
    }

    /// Public message.
    #[inline]
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    /// Exception name sent in `X-ERROR-EXCEPTION`.
    #[inline]
    pub fn exception_name(&self) -> &str {
        self.exception.as_ref()
    }

    /// Structured log entry borrowing from this error.
    ///
    /// The entry cannot outlive the error, so internal details cannot be
    /// retained past the logging call.
    pub fn error_log(&self) -> ErrorLog<'_> {
        ErrorLog {
            status: self.status,
            code: &self.code,
            code_inherited: self.code_inherited,
            message: self.message.as_ref(),
            id: None,
            exception: Some(self.exception.as_ref()),
            path: None,
            details: self.context.details.as_deref(),
            source: self
                .source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn Error + 'static)),
            metadata: &self.context.metadata,
        }
    }

    /// Callback-style access to [`RestApiException::error_log`].
    #[inline]
    pub fn with_error_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ErrorLog<'_>) -> R,
    {
        let log = self.error_log();
        f(&log)
    }
}

impl StatusAware for RestApiException {
    fn status_source(&self) -> StatusSource {
        StatusSource::Application(self.status)
    }
}

impl fmt::Debug for RestApiException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestApiException")
            .field("status", &self.status)
            .field("code", &self.code)
            .field("code_inherited", &self.code_inherited)
            .field("message", &self.message)
            .field("exception", &self.exception)
            .field("context", &"<REDACTED>")
            .field("source", &self.source.as_ref().map(|_| "<PRESENT>"))
            .finish()
    }
}

impl fmt::Display for RestApiException {
    /// Public rendering: `{message} ({code})`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl Error for RestApiException {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use std::io;

    #[test]
    fn display_reveals_no_internal_details() {
        let err = RestApiException::internal(definitions::INTERNAL_ERROR, "unexpected failure")
            .with_details("connection to db-primary-3 refused")
            .with_metadata("tenant", "acme")
            .with_source(io::Error::from(io::ErrorKind::ConnectionRefused));

        let displayed = err.to_string();
        assert_eq!(displayed, "unexpected failure (internal_error)");
        assert!(!displayed.contains("db-primary"));
        assert!(!displayed.contains("acme"));
    }

    #[test]
    fn debug_redacts_context() {
        let err = RestApiException::bad_request(definitions::BAD_REQUEST, "bad input")
            .with_details("secret-token-123");

        let debugged = format!("{:?}", err);
        assert!(debugged.contains("<REDACTED>"));
        assert!(!debugged.contains("secret-token-123"));
    }

    #[test]
    fn error_log_contains_internal_context() {
        let err = RestApiException::conflict(definitions::CONFLICT, "already shipped")
            .with_details("shipment 9 dispatched")
            .with_metadata("order", String::from("42"));

        let log = err.error_log();
        assert_eq!(log.status, StatusCode::CONFLICT);
        assert_eq!(log.details, Some("shipment 9 dispatched"));
        assert_eq!(log.exception, Some(RestApiException::DEFAULT_EXCEPTION_NAME));
        assert_eq!(log.metadata.len(), 1);
        assert_eq!(log.metadata[0].1.as_str(), "42");
    }

    #[test]
    fn source_is_exposed_through_error_trait() {
        let err = RestApiException::internal(definitions::INTERNAL_ERROR, "failed")
            .with_source(io::Error::other("disk full"));

        assert_eq!(err.source().map(|s| s.to_string()), Some("disk full".to_owned()));
    }

    #[test]
    fn inherited_and_exception_name() {
        let err = RestApiException::not_found(definitions::NOT_FOUND, "no such user")
            .inherited()
            .with_exception_name("UserLookupError");

        assert!(err.is_code_inherited());
        assert_eq!(err.exception_name(), "UserLookupError");
        assert_eq!(err.status_source(), StatusSource::Application(StatusCode::NOT_FOUND));
    }

    #[test]
    fn context_zeroize_clears_owned_data() {
        let mut context = InternalContext {
            details: Some(Cow::Owned(String::from("card 4111"))),
            metadata: SmallVec::new(),
        };
        context.metadata.push(("user", ContextField::from(String::from("alice"))));

        context.zeroize();
        assert_eq!(context.details.as_deref(), Some(""));
        assert!(context.metadata.is_empty());
    }
}

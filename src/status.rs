//! HTTP status detection for errors of any shape.
//!
//! An error reaching an HTTP boundary has one of three shapes:
//!
//! - **Transport**: it was built from a received HTTP response and carries
//!   that response's status ([`ResponseException`]).
//! - **Application**: application logic assigned it a status
//!   ([`RestApiException`]).
//! - **Unclassified**: anything else ([`UnclassifiedError`]).
//!
//! [`detect_http_status`] resolves the status with this precedence, first
//! match wins:
//!
//! 1. transport status
//! 2. application status
//! 3. the caller's default, if any
//! 4. [`FALLBACK_STATUS`] (`500 Internal Server Error`)
//!
//! Detection is pure and total: no shape is rejected.
//!
//! ```rust
//! use http::StatusCode;
//! use rest_errors::{RestError, detect_http_status};
//!
//! let err = RestError::other(std::io::Error::other("disk full"));
//! assert_eq!(detect_http_status(&err, None), StatusCode::INTERNAL_SERVER_ERROR);
//! assert_eq!(detect_http_status(&err, Some(StatusCode::NOT_FOUND)), StatusCode::NOT_FOUND);
//! ```

use crate::{HeaderDecodeError, ResponseException, RestApiException};
use http::StatusCode;
use std::error::Error;
use std::fmt;

/// Status reported when an error carries none and no default is given.
pub const FALLBACK_STATUS: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;

/// Where an error's HTTP status comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusSource {
    /// Status of a received HTTP response.
    Transport(StatusCode),
    /// Status assigned by application logic.
    Application(StatusCode),
    /// No status of its own.
    Unclassified,
}

/// Errors that can tell which [`StatusSource`] they carry.
pub trait StatusAware {
    /// The status carried by this error, if any.
    fn status_source(&self) -> StatusSource;
}

impl<T: StatusAware + ?Sized> StatusAware for &T {
    fn status_source(&self) -> StatusSource {
        (**self).status_source()
    }
}

impl<T: StatusAware + ?Sized> StatusAware for Box<T> {
    fn status_source(&self) -> StatusSource {
        (**self).status_source()
    }
}

/// Derive the HTTP status that represents `error`.
#[inline]
pub fn detect_http_status<E>(error: &E, default_status: Option<StatusCode>) -> StatusCode
where
    E: StatusAware + ?Sized,
{
    match error.status_source() {
        StatusSource::Transport(status) => status,
        StatusSource::Application(status) => status,
        StatusSource::Unclassified => default_status.unwrap_or(FALLBACK_STATUS),
    }
}

// ============================================================================
// Unclassified Errors
// ============================================================================

/// An error without a status of its own.
///
/// Keeps the concrete type name when it is known at construction, so the
/// mapper can report it as the exception name.
pub struct UnclassifiedError {
    type_name: Option<&'static str>,
    inner: Box<dyn Error + Send + Sync>,
}

impl UnclassifiedError {
    /// Wrap a concrete error, recording its type name.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            type_name: Some(std::any::type_name::<E>()),
            inner: Box::new(error),
        }
    }

    /// Wrap an already boxed error. Its type name is unknown.
    pub fn from_boxed(error: Box<dyn Error + Send + Sync>) -> Self {
        Self {
            type_name: None,
            inner: error,
        }
    }

    /// Type name of the wrapped error, if known.
    #[inline]
    pub const fn type_name(&self) -> Option<&'static str> {
        self.type_name
    }

    /// The wrapped error.
    #[inline]
    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.inner.as_ref()
    }
}

impl StatusAware for UnclassifiedError {
    fn status_source(&self) -> StatusSource {
        StatusSource::Unclassified
    }
}

impl fmt::Debug for UnclassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnclassifiedError")
            .field("type_name", &self.type_name)
            .field("inner", &self.inner)
            .finish()
    }
}

impl fmt::Display for UnclassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

// `Display` already renders the wrapped error, so the chain continues
// with its cause.
impl Error for UnclassifiedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source()
    }
}

// ============================================================================
// Error Sum Type
// ============================================================================

/// Any error that may reach an HTTP boundary.
#[must_use = "errors should be handled or mapped"]
#[derive(Debug)]
pub enum RestError {
    /// Reconstructed from a received HTTP error response.
    Response(ResponseException),
    /// Raised by application logic with an assigned status.
    Api(RestApiException),
    /// Anything else.
    Other(UnclassifiedError),
}

impl RestError {
    /// Wrap an arbitrary error as unclassified.
    pub fn other<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Other(UnclassifiedError::new(error))
    }

    /// Status to report, see [`detect_http_status`].
    #[inline]
    pub fn status(&self, default_status: Option<StatusCode>) -> StatusCode {
        detect_http_status(self, default_status)
    }
}

impl StatusAware for RestError {
    fn status_source(&self) -> StatusSource {
        match self {
            Self::Response(err) => err.status_source(),
            Self::Api(err) => err.status_source(),
            Self::Other(err) => err.status_source(),
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Response(err) => fmt::Display::fmt(err, f),
            Self::Api(err) => fmt::Display::fmt(err, f),
            Self::Other(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl Error for RestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Response(err) => err.source(),
            Self::Api(err) => err.source(),
            Self::Other(err) => err.source(),
        }
    }
}

impl From<ResponseException> for RestError {
    fn from(err: ResponseException) -> Self {
        Self::Response(err)
    }
}

impl From<RestApiException> for RestError {
    fn from(err: RestApiException) -> Self {
        Self::Api(err)
    }
}

impl From<UnclassifiedError> for RestError {
    fn from(err: UnclassifiedError) -> Self {
        Self::Other(err)
    }
}

impl From<HeaderDecodeError> for RestError {
    fn from(err: HeaderDecodeError) -> Self {
        Self::other(err)
    }
}

impl From<std::io::Error> for RestError {
    fn from(err: std::io::Error) -> Self {
        Self::other(err)
    }
}

impl From<Box<dyn Error + Send + Sync>> for RestError {
    fn from(err: Box<dyn Error + Send + Sync>) -> Self {
        Self::Other(UnclassifiedError::from_boxed(err))
    }
}

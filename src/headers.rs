//! Wire header registry for error metadata.
//!
//! Every attribute of a REST error travels in its own `X-ERROR-*` response
//! header. The mapping from attribute to header name is frozen at compile
//! time and never varies by configuration.
//!
//! | Field                | Header                   |
//! |----------------------|--------------------------|
//! | id                   | `X-ERROR-ID`             |
//! | timestamp            | `X-ERROR-TIMESTAMP`      |
//! | error code           | `X-ERROR-CODE`           |
//! | error code inherited | `X-ERROR-CODE-INHERITED` |
//! | message              | `X-ERROR-MESSAGE`        |
//! | exception type name  | `X-ERROR-EXCEPTION`      |
//! | application          | `X-ERROR-APPLICATION`    |
//! | request path         | `X-ERROR-PATH`           |
//!
//! Header names are case-insensitive on the wire. The upper-case `&str`
//! constants are the canonical spelling; the [`HeaderName`] constants are the
//! lower-case form the `http` crate normalizes to.
//!
//! # Example
//!
//! ```rust
//! use rest_errors::{ErrorField, headers};
//!
//! assert_eq!(ErrorField::Code.header_name(), "X-ERROR-CODE");
//! assert_eq!(ErrorField::Code.header(), headers::X_ERROR_CODE);
//! ```

use chrono::{DateTime, Utc};
use http::HeaderName;
use std::fmt;

// ============================================================================
// Canonical Names
// ============================================================================

/// Canonical name of the error id header.
pub const ERROR_ID: &str = "X-ERROR-ID";
/// Canonical name of the error timestamp header.
pub const ERROR_TIMESTAMP: &str = "X-ERROR-TIMESTAMP";
/// Canonical name of the error code header.
pub const ERROR_CODE: &str = "X-ERROR-CODE";
/// Canonical name of the inherited-code flag header.
pub const ERROR_CODE_INHERITED: &str = "X-ERROR-CODE-INHERITED";
/// Canonical name of the error message header.
pub const ERROR_MESSAGE: &str = "X-ERROR-MESSAGE";
/// Canonical name of the exception type header.
pub const ERROR_EXCEPTION: &str = "X-ERROR-EXCEPTION";
/// Canonical name of the application header.
pub const ERROR_APPLICATION: &str = "X-ERROR-APPLICATION";
/// Canonical name of the request path header.
pub const ERROR_PATH: &str = "X-ERROR-PATH";

/// Shared lower-case prefix of every error header name.
pub const ERROR_HEADER_PREFIX: &str = "x-error-";

/// RFC 1123 date-time format used for `X-ERROR-TIMESTAMP` values.
///
/// Example value: `Sun, 06 Nov 1994 08:49:37 GMT`.
pub const TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

// ============================================================================
// Transport Names
// ============================================================================

/// `x-error-id`
pub const X_ERROR_ID: HeaderName = HeaderName::from_static("x-error-id");
/// `x-error-timestamp`
pub const X_ERROR_TIMESTAMP: HeaderName = HeaderName::from_static("x-error-timestamp");
/// `x-error-code`
pub const X_ERROR_CODE: HeaderName = HeaderName::from_static("x-error-code");
/// `x-error-code-inherited`
pub const X_ERROR_CODE_INHERITED: HeaderName = HeaderName::from_static("x-error-code-inherited");
/// `x-error-message`
pub const X_ERROR_MESSAGE: HeaderName = HeaderName::from_static("x-error-message");
/// `x-error-exception`
pub const X_ERROR_EXCEPTION: HeaderName = HeaderName::from_static("x-error-exception");
/// `x-error-application`
pub const X_ERROR_APPLICATION: HeaderName = HeaderName::from_static("x-error-application");
/// `x-error-path`
pub const X_ERROR_PATH: HeaderName = HeaderName::from_static("x-error-path");

// ============================================================================
// Field Selector
// ============================================================================

/// Logical attribute of a REST error.
///
/// The set is closed: referencing an attribute outside it is a compile error,
/// so every lookup below is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorField {
    /// Unique id of this error occurrence.
    Id,
    /// When the error was produced.
    Timestamp,
    /// Machine-readable error code.
    Code,
    /// Whether the code was inherited from a downstream response.
    CodeInherited,
    /// Human-readable message.
    Message,
    /// Type name of the error that caused the response.
    Exception,
    /// Name of the application that produced the error.
    Application,
    /// Request path that failed.
    Path,
}

impl ErrorField {
    /// All fields, in wire table order.
    pub const ALL: [ErrorField; 8] = [
        Self::Id,
        Self::Timestamp,
        Self::Code,
        Self::CodeInherited,
        Self::Message,
        Self::Exception,
        Self::Application,
        Self::Path,
    ];

    /// Canonical upper-case header name for this field.
    #[inline]
    pub const fn header_name(self) -> &'static str {
        match self {
            Self::Id => ERROR_ID,
            Self::Timestamp => ERROR_TIMESTAMP,
            Self::Code => ERROR_CODE,
            Self::CodeInherited => ERROR_CODE_INHERITED,
            Self::Message => ERROR_MESSAGE,
            Self::Exception => ERROR_EXCEPTION,
            Self::Application => ERROR_APPLICATION,
            Self::Path => ERROR_PATH,
        }
    }

    /// Transport header name for this field.
    #[inline]
    pub const fn header(self) -> HeaderName {
        match self {
            Self::Id => X_ERROR_ID,
            Self::Timestamp => X_ERROR_TIMESTAMP,
            Self::Code => X_ERROR_CODE,
            Self::CodeInherited => X_ERROR_CODE_INHERITED,
            Self::Message => X_ERROR_MESSAGE,
            Self::Exception => X_ERROR_EXCEPTION,
            Self::Application => X_ERROR_APPLICATION,
            Self::Path => X_ERROR_PATH,
        }
    }

    /// Reverse lookup, ignoring ASCII case.
    pub fn from_header_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.header_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ErrorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_name())
    }
}

// ============================================================================
// Timestamps
// ============================================================================

/// Render a timestamp in [`TIMESTAMP_FORMAT`]. Sub-second precision is dropped.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse an RFC 1123 timestamp as written by [`format_timestamp`].
///
/// Any RFC 2822 compatible value with an explicit zone is accepted and
/// converted to UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc2822(value.trim()).map(|parsed| parsed.with_timezone(&Utc))
}

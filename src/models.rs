//! Error attribute set and its header encoding.
//!
//! [`ErrorAttributes`] is the wire-level view of a REST error: everything the
//! `X-ERROR-*` headers carry. It is produced by
//! [`ErrorMapper`](crate::ErrorMapper) on the server side and decoded from a
//! received response by [`ResponseException`](crate::ResponseException) on the
//! client side.
//!
//! # Encoding
//!
//! - `id`, `timestamp` and `code` are always written.
//! - `code_inherited` is written as `true` or `false`.
//! - `message` is always written, possibly empty.
//! - `exception`, `application` and `path` are written only when present.
//! - Free-text values go through
//!   [`sanitize_header_value`](crate::sanitize_header_value).
//!
//! # Decoding
//!
//! A header map without any error header decodes to `Ok(None)`: the response
//! simply did not come from a service speaking this protocol. Once at least
//! one error header is present, `id`, `timestamp` and `code` are required and
//! every present value must be well formed.

use crate::convenience::sanitize_header_value;
use crate::headers::{format_timestamp, parse_timestamp};
use crate::{ErrorCode, ErrorField};
use chrono::{DateTime, SubsecRound, Utc};
use http::{HeaderMap, HeaderValue};
use std::fmt;
use uuid::Uuid;

/// The attributes of a REST error as carried in response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorAttributes {
    /// Unique id of this error occurrence.
    pub id: String,
    /// When the error was produced, at second precision.
    pub timestamp: DateTime<Utc>,
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Whether `code` was taken from a downstream service's response.
    pub code_inherited: bool,
    /// Human-readable message.
    pub message: String,
    /// Type name of the error behind the response.
    pub exception: Option<String>,
    /// Application that produced the error.
    pub application: Option<String>,
    /// Request path that failed.
    pub path: Option<String>,
}

impl ErrorAttributes {
    /// New attributes with a fresh UUID v4 id and the current time.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().trunc_subsecs(0),
            code,
            code_inherited: false,
            message: message.into(),
            exception: None,
            application: None,
            path: None,
        }
    }

    /// Mark whether the code was inherited.
    #[inline]
    pub fn inherited(mut self, inherited: bool) -> Self {
        self.code_inherited = inherited;
        self
    }

    /// Set the exception type name.
    #[inline]
    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    /// Set the application name.
    #[inline]
    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = Some(application.into());
        self
    }

    /// Set the request path.
    #[inline]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Value of a single attribute as it is written to its header.
    ///
    /// Returns `None` for absent optional attributes.
    pub fn header_value(&self, field: ErrorField) -> Option<HeaderValue> {
        let text = match field {
            ErrorField::Id => self.id.clone(),
            ErrorField::Timestamp => format_timestamp(&self.timestamp),
            ErrorField::Code => self.code.as_str().to_owned(),
            ErrorField::CodeInherited => self.code_inherited.to_string(),
            ErrorField::Message => self.message.clone(),
            ErrorField::Exception => self.exception.clone()?,
            ErrorField::Application => self.application.clone()?,
            ErrorField::Path => self.path.clone()?,
        };
        Some(to_header_value(&text))
    }

    /// Write every present attribute into `headers`, replacing previous values.
    ///
    /// Error headers for absent optional attributes are removed so a reused
    /// map never mixes attributes of two errors.
    pub fn write_headers(&self, headers: &mut HeaderMap) {
        for field in ErrorField::ALL {
            match self.header_value(field) {
                Some(value) => {
                    headers.insert(field.header(), value);
                }
                None => {
                    headers.remove(field.header());
                }
            }
        }
    }

    /// Encode into a fresh header map.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(ErrorField::ALL.len());
        self.write_headers(&mut headers);
        headers
    }

    /// Decode attributes from response headers.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderDecodeError`] when error headers are present but a
    /// required one is missing or any value is malformed.
    pub fn from_header_map(headers: &HeaderMap) -> Result<Option<Self>, HeaderDecodeError> {
        if !carries_error_headers(headers) {
            return Ok(None);
        }

        let id = required_text(headers, ErrorField::Id)?;

        let timestamp_text = required_text(headers, ErrorField::Timestamp)?;
        let timestamp = parse_timestamp(&timestamp_text)
            .map_err(|e| HeaderDecodeError::invalid(ErrorField::Timestamp, e.to_string()))?;

        let code_text = required_text(headers, ErrorField::Code)?;
        let code = ErrorCode::parse(&code_text)
            .map_err(|e| HeaderDecodeError::invalid(ErrorField::Code, e.to_string()))?;

        let code_inherited = match header_text(headers, ErrorField::CodeInherited) {
            None => false,
            Some(flag) => parse_flag(&flag)?,
        };

        Ok(Some(Self {
            id,
            timestamp,
            code,
            code_inherited,
            message: header_text(headers, ErrorField::Message).unwrap_or_default(),
            exception: non_empty_text(headers, ErrorField::Exception),
            application: non_empty_text(headers, ErrorField::Application),
            path: non_empty_text(headers, ErrorField::Path),
        }))
    }
}

/// Whether any `X-ERROR-*` header is present.
pub fn carries_error_headers(headers: &HeaderMap) -> bool {
    ErrorField::ALL
        .into_iter()
        .any(|field| headers.contains_key(field.header()))
}

fn to_header_value(text: &str) -> HeaderValue {
    let sanitized = sanitize_header_value(text);
    HeaderValue::from_bytes(sanitized.as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("?"))
}

fn header_text(headers: &HeaderMap, field: ErrorField) -> Option<String> {
    headers
        .get(field.header())
        .map(|value| String::from_utf8_lossy(value.as_bytes()).trim().to_owned())
}

fn non_empty_text(headers: &HeaderMap, field: ErrorField) -> Option<String> {
    header_text(headers, field).filter(|text| !text.is_empty())
}

fn required_text(headers: &HeaderMap, field: ErrorField) -> Result<String, HeaderDecodeError> {
    non_empty_text(headers, field).ok_or(HeaderDecodeError::Missing(field))
}

fn parse_flag(flag: &str) -> Result<bool, HeaderDecodeError> {
    if flag.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if flag.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(HeaderDecodeError::invalid(
            ErrorField::CodeInherited,
            "expected `true` or `false`",
        ))
    }
}

// ============================================================================
// Decode Errors
// ============================================================================

/// Error type for header decoding failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderDecodeError {
    /// A required error header is absent or empty.
    Missing(ErrorField),
    /// An error header is present but its value is malformed.
    Invalid {
        /// The offending field.
        field: ErrorField,
        /// Why the value was rejected.
        reason: String,
    },
}

impl HeaderDecodeError {
    fn invalid(field: ErrorField, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// The field the failure refers to.
    pub const fn field(&self) -> ErrorField {
        match self {
            Self::Missing(field) | Self::Invalid { field, .. } => *field,
        }
    }
}

impl fmt::Display for HeaderDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "missing error header {}", field),
            Self::Invalid { field, reason } => {
                write!(f, "invalid error header {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for HeaderDecodeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions;
    use crate::headers::*;
    use chrono::TimeZone;

    fn sample() -> ErrorAttributes {
        let mut attributes = ErrorAttributes::new(definitions::CONFLICT, "order already shipped")
            .inherited(true)
            .with_exception("OrderStateError")
            .with_application("orders")
            .with_path("/orders/42");
        attributes.id = "4e1c7d0a-3f5e-4e43-9d0c-9d2b6f0f2c11".to_owned();
        attributes.timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        attributes
    }

    #[test]
    fn encodes_every_attribute() {
        let headers = sample().to_header_map();

        assert_eq!(headers[X_ERROR_ID], "4e1c7d0a-3f5e-4e43-9d0c-9d2b6f0f2c11");
        assert_eq!(headers[X_ERROR_TIMESTAMP], "Fri, 01 Mar 2024 12:30:05 GMT");
        assert_eq!(headers[X_ERROR_CODE], "conflict");
        assert_eq!(headers[X_ERROR_CODE_INHERITED], "true");
        assert_eq!(headers[X_ERROR_MESSAGE], "order already shipped");
        assert_eq!(headers[X_ERROR_EXCEPTION], "OrderStateError");
        assert_eq!(headers[X_ERROR_APPLICATION], "orders");
        assert_eq!(headers[X_ERROR_PATH], "/orders/42");
    }

    #[test]
    fn absent_optionals_are_not_written() {
        let headers = ErrorAttributes::new(definitions::NOT_FOUND, "gone").to_header_map();

        assert_eq!(headers[X_ERROR_CODE_INHERITED], "false");
        assert!(!headers.contains_key(X_ERROR_EXCEPTION));
        assert!(!headers.contains_key(X_ERROR_APPLICATION));
        assert!(!headers.contains_key(X_ERROR_PATH));
    }

    #[test]
    fn write_headers_clears_stale_optionals() {
        let mut headers = sample().to_header_map();
        ErrorAttributes::new(definitions::NOT_FOUND, "gone").write_headers(&mut headers);

        assert!(!headers.contains_key(X_ERROR_PATH));
        assert_eq!(headers[X_ERROR_CODE], "not_found");
    }

    #[test]
    fn decodes_what_it_encodes() {
        let original = sample();
        let decoded = ErrorAttributes::from_header_map(&original.to_header_map())
            .unwrap()
            .unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn unrelated_headers_decode_to_none() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert_eq!(ErrorAttributes::from_header_map(&headers), Ok(None));
    }

    #[test]
    fn missing_required_header_is_reported() {
        let mut headers = sample().to_header_map();
        headers.remove(X_ERROR_ID);

        let err = ErrorAttributes::from_header_map(&headers).unwrap_err();
        assert_eq!(err, HeaderDecodeError::Missing(ErrorField::Id));
        assert_eq!(err.to_string(), "missing error header X-ERROR-ID");
    }

    #[test]
    fn malformed_timestamp_is_reported() {
        let mut headers = sample().to_header_map();
        headers.insert(X_ERROR_TIMESTAMP, HeaderValue::from_static("yesterday"));

        let err = ErrorAttributes::from_header_map(&headers).unwrap_err();
        assert_eq!(err.field(), ErrorField::Timestamp);
    }

    #[test]
    fn malformed_code_is_reported() {
        let mut headers = sample().to_header_map();
        headers.insert(X_ERROR_CODE, HeaderValue::from_static("not a code"));

        let err = ErrorAttributes::from_header_map(&headers).unwrap_err();
        assert_eq!(err.field(), ErrorField::Code);
    }

    #[test]
    fn inherited_flag_is_case_insensitive() {
        let mut headers = sample().to_header_map();
        headers.insert(X_ERROR_CODE_INHERITED, HeaderValue::from_static("FALSE"));
        let decoded = ErrorAttributes::from_header_map(&headers).unwrap().unwrap();
        assert!(!decoded.code_inherited);

        headers.insert(X_ERROR_CODE_INHERITED, HeaderValue::from_static("yes"));
        let err = ErrorAttributes::from_header_map(&headers).unwrap_err();
        assert_eq!(err.field(), ErrorField::CodeInherited);
    }

    #[test]
    fn missing_inherited_flag_defaults_to_false() {
        let mut headers = sample().to_header_map();
        headers.remove(X_ERROR_CODE_INHERITED);
        let decoded = ErrorAttributes::from_header_map(&headers).unwrap().unwrap();
        assert!(!decoded.code_inherited);
    }

    #[test]
    fn message_is_sanitized_on_the_wire() {
        let attributes = ErrorAttributes::new(definitions::BAD_REQUEST, "bad\r\nSet-Cookie: x=1");
        let headers = attributes.to_header_map();
        assert_eq!(headers[X_ERROR_MESSAGE], "bad??Set-Cookie: x=1");
    }

    #[test]
    fn non_ascii_message_survives() {
        let attributes = ErrorAttributes::new(definitions::BAD_REQUEST, "Größe ungültig");
        let decoded = ErrorAttributes::from_header_map(&attributes.to_header_map())
            .unwrap()
            .unwrap();
        assert_eq!(decoded.message, "Größe ungültig");
    }
}

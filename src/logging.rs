//! Structured log entry for mapped REST errors.
//!
//! # Properties
//!
//! - Borrows from the error (or mapped attributes) with an explicit lifetime
//! - Cannot outlive the value that produced it
//! - No heap allocations in accessors
//! - Every field is bounded when rendered
//!
//! [`ErrorLog::write_to`] renders a single line for plain-text sinks;
//! [`ErrorLog::emit`] records a `tracing` event whose level follows the HTTP
//! status class (`error` for 5xx, `warn` for 4xx, `debug` otherwise).
//!
//! Internal details and metadata only ever reach this view. They are never
//! written to response headers.

use crate::convenience::TRUNCATION_INDICATOR;
use crate::{ErrorAttributes, ErrorCode};
use http::StatusCode;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use zeroize::Zeroize;

/// Maximum length for any individual field in formatted output
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Metadata value wrapper with zeroization for owned data.
///
/// Borrowed values are assumed static and are not zeroized.
#[derive(Debug)]
pub struct ContextField {
    value: Cow<'static, str>,
}

impl ContextField {
    /// The field text.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.value.as_ref()
    }
}

impl From<&'static str> for ContextField {
    fn from(value: &'static str) -> Self {
        Self {
            value: Cow::Borrowed(value),
        }
    }
}

impl From<String> for ContextField {
    fn from(value: String) -> Self {
        Self {
            value: Cow::Owned(value),
        }
    }
}

impl From<Cow<'static, str>> for ContextField {
    fn from(value: Cow<'static, str>) -> Self {
        Self { value }
    }
}

impl Zeroize for ContextField {
    fn zeroize(&mut self) {
        if let Cow::Owned(ref mut s) = self.value {
            s.zeroize();
        }
    }
}

impl Drop for ContextField {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Structured log entry borrowing from a REST error.
///
/// # Example
///
/// ```rust
/// use rest_errors::{RestApiException, definitions};
///
/// let err = RestApiException::not_found(definitions::NOT_FOUND, "order missing")
///     .with_details("order 42 not in shard 7");
///
/// err.with_error_log(|log| {
///     let mut line = String::new();
///     log.write_to(&mut line).unwrap();
///     assert!(line.contains("details='order 42 not in shard 7'"));
/// });
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ErrorLog<'a> {
    /// Status reported to the caller.
    pub status: StatusCode,
    /// Error code.
    pub code: &'a ErrorCode,
    /// Whether the code came from a downstream response.
    pub code_inherited: bool,
    /// Public message.
    pub message: &'a str,
    /// Error occurrence id, once one has been assigned.
    pub id: Option<&'a str>,
    /// Exception type name.
    pub exception: Option<&'a str>,
    /// Request path.
    pub path: Option<&'a str>,
    /// Internal-only details.
    pub details: Option<&'a str>,
    /// Underlying cause.
    pub source: Option<&'a (dyn Error + 'static)>,
    /// Internal-only tracking metadata.
    pub metadata: &'a [(&'static str, ContextField)],
}

impl<'a> ErrorLog<'a> {
    /// Log view over encoded attributes.
    pub fn from_attributes(status: StatusCode, attributes: &'a ErrorAttributes) -> Self {
        Self {
            status,
            code: &attributes.code,
            code_inherited: attributes.code_inherited,
            message: attributes.message.as_str(),
            id: Some(attributes.id.as_str()),
            exception: attributes.exception.as_deref(),
            path: attributes.path.as_deref(),
            details: None,
            source: None,
            metadata: &[],
        }
    }

    /// Attach internal details.
    #[inline]
    pub fn with_details(mut self, details: Option<&'a str>) -> Self {
        self.details = details;
        self
    }

    /// Attach the underlying cause.
    #[inline]
    pub fn with_source(mut self, source: Option<&'a (dyn Error + 'static)>) -> Self {
        self.source = source;
        self
    }

    /// Attach internal metadata.
    #[inline]
    pub fn with_metadata(mut self, metadata: &'a [(&'static str, ContextField)]) -> Self {
        self.metadata = metadata;
        self
    }

    /// Format for human-readable logs in trusted debug contexts.
    ///
    /// Only available with BOTH the `trusted_debug` feature flag AND debug
    /// assertions enabled, so internal details cannot be materialized into a
    /// `String` in release builds by accident.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut output);
        output
    }

    /// Write a bounded single-line rendering to a formatter.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{} {}]{} message='{}'",
            self.status.as_u16(),
            self.code,
            if self.code_inherited { " [INHERITED]" } else { "" },
            truncate_with_indicator(self.message)
        )?;

        if let Some(id) = self.id {
            write!(f, " id='{}'", truncate_with_indicator(id))?;
        }

        if let Some(exception) = self.exception {
            write!(f, " exception='{}'", truncate_with_indicator(exception))?;
        }

        if let Some(path) = self.path {
            write!(f, " path='{}'", truncate_with_indicator(path))?;
        }

        if let Some(details) = self.details {
            write!(f, " details='{}'", truncate_with_indicator(details))?;
        }

        if let Some(source) = self.source {
            let source = source.to_string();
            write!(f, " source='{}'", truncate_with_indicator(&source))?;
        }

        for (key, value) in self.metadata {
            write!(f, " {}='{}'", key, truncate_with_indicator(value.as_str()))?;
        }

        Ok(())
    }

    /// Record this entry as a `tracing` event.
    pub fn emit(&self) {
        let message = truncate_with_indicator(self.message);
        let details = self.details.map(truncate_with_indicator);
        let source = self.source.map(|source| source.to_string());

        macro_rules! event {
            ($level:ident) => {
                tracing::$level!(
                    status = self.status.as_u16(),
                    code = %self.code,
                    inherited = self.code_inherited,
                    id = ?self.id,
                    exception = ?self.exception,
                    path = ?self.path,
                    details = ?details,
                    source = ?source,
                    metadata = self.metadata.len(),
                    "{}",
                    message
                )
            };
        }

        if self.status.is_server_error() {
            event!(error);
        } else if self.status.is_client_error() {
            event!(warn);
        } else {
            event!(debug);
        }
    }
}

/// Truncate a string for display to prevent DoS via extremely long error messages.
///
/// Returns a `Cow<str>` to avoid allocation when no truncation is needed.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions;

    fn render(log: &ErrorLog<'_>) -> String {
        let mut out = String::new();
        log.write_to(&mut out).unwrap();
        out
    }

    #[test]
    fn truncate_ascii() {
        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN + 10);
        let truncated = truncate_with_indicator(&s);

        assert!(truncated.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn no_truncate_when_under_limit() {
        let s = "short string";
        let truncated = truncate_with_indicator(s);

        assert!(matches!(truncated, Cow::Borrowed(_)));
        assert_eq!(truncated, s);
    }

    #[test]
    fn truncate_utf8_boundary() {
        let s = "й".repeat(MAX_FIELD_OUTPUT_LEN);
        let truncated = truncate_with_indicator(&s);

        assert!(truncated.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn exactly_at_limit() {
        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN);
        let truncated = truncate_with_indicator(&s);

        assert!(matches!(truncated, Cow::Borrowed(_)));
        assert!(!truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn context_field_zeroizes_owned() {
        let mut field = ContextField::from(String::from("tenant-7"));
        assert!(matches!(field.value, Cow::Owned(_)));

        field.zeroize();
        assert_eq!(field.as_str(), "");
    }

    #[test]
    fn context_field_doesnt_zeroize_borrowed() {
        let mut field = ContextField::from("static");
        field.zeroize();
        assert_eq!(field.as_str(), "static");
    }

    #[test]
    fn attribute_view_renders_wire_fields() {
        let mut attributes = ErrorAttributes::new(definitions::CONFLICT, "order already shipped");
        attributes.code_inherited = true;
        attributes.path = Some("/orders/42".to_owned());

        let line = render(&ErrorLog::from_attributes(StatusCode::CONFLICT, &attributes));
        assert!(line.starts_with("[409 conflict] [INHERITED] message='order already shipped'"));
        assert!(line.contains(" path='/orders/42'"));
        assert!(line.contains(&format!(" id='{}'", attributes.id)));
        assert!(!line.contains("details="));
    }

    #[test]
    fn internal_fields_are_rendered_last() {
        let attributes = ErrorAttributes::new(definitions::INTERNAL_ERROR, "unexpected failure");
        let source = std::io::Error::other("disk full");
        let metadata = [("tenant", ContextField::from("acme"))];

        let log = ErrorLog::from_attributes(StatusCode::INTERNAL_SERVER_ERROR, &attributes)
            .with_details(Some("write to /var/spool failed"))
            .with_source(Some(&source))
            .with_metadata(&metadata);

        let line = render(&log);
        assert!(line.ends_with(
            " details='write to /var/spool failed' source='disk full' tenant='acme'"
        ));
    }

    #[test]
    fn emit_without_subscriber_is_a_no_op() {
        let attributes = ErrorAttributes::new(definitions::BAD_REQUEST, "bad input");
        ErrorLog::from_attributes(StatusCode::BAD_REQUEST, &attributes).emit();
    }

    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    #[test]
    fn trusted_debug_matches_write_to() {
        let attributes = ErrorAttributes::new(definitions::CONFLICT, "order already shipped");
        let metadata = [("tenant", ContextField::from("acme"))];
        let log = ErrorLog::from_attributes(StatusCode::CONFLICT, &attributes)
            .with_details(Some("shipment 81 left warehouse 3"))
            .with_metadata(&metadata);

        let formatted = log.format_for_trusted_debug();
        assert_eq!(formatted, render(&log));
        assert!(formatted.contains("details='shipment 81 left warehouse 3'"));
        assert!(formatted.ends_with(" tenant='acme'"));
    }
}

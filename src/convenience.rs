//! Header value sanitization and construction macros.
//!
//! Error messages and paths are free text, while HTTP header values are not:
//! control characters are forbidden and oversized values get rejected or cut
//! by proxies. Every free-text attribute passes through
//! [`sanitize_header_value`] before it is written to a header.
//!
//! # Rules
//!
//! - Surrounding whitespace is trimmed.
//! - Control characters (including `\r`, `\n`, `\t` and DEL) become `?`.
//! - The ESC of an ANSI escape sequence becomes `?`; the parameters and
//!   final byte of a `ESC [` sequence are dropped. A sequence ends at its
//!   final byte (`0x40..=0x7E`) or at the first character that cannot
//!   belong to it, so a stray ESC never swallows the rest of the text.
//! - Values longer than [`MAX_HEADER_VALUE_LEN`] bytes are cut on a UTF-8
//!   boundary and end with [`TRUNCATION_INDICATOR`].
//!
//! Clean input is returned borrowed.
//!
//! ```rust
//! use rest_errors::sanitize_header_value;
//!
//! assert_eq!(sanitize_header_value("order 42 locked"), "order 42 locked");
//! assert_eq!(sanitize_header_value("line1\r\nX-Injected: 1"), "line1??X-Injected: 1");
//! ```

use std::borrow::Cow;

/// Maximum length in bytes of a sanitized header value.
pub const MAX_HEADER_VALUE_LEN: usize = 1024;

/// Suffix appended to truncated values.
pub const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Sanitize free text for use as an HTTP header value.
///
/// The result is always accepted by [`http::HeaderValue::from_bytes`].
pub fn sanitize_header_value(value: &str) -> Cow<'_, str> {
    let trimmed = value.trim();
    let clean = trimmed.len() <= MAX_HEADER_VALUE_LEN
        && !trimmed.chars().any(char::is_control);
    if clean {
        return Cow::Borrowed(trimmed);
    }

    let budget = MAX_HEADER_VALUE_LEN - TRUNCATION_INDICATOR.len();
    let mut out = String::with_capacity(trimmed.len().min(MAX_HEADER_VALUE_LEN));
    let mut truncated = false;
    let mut escape = Escape::Plain;

    for c in trimmed.chars() {
        match escape {
            Escape::Started if c == '[' => {
                escape = Escape::Csi;
                continue;
            }
            Escape::Csi if ('\u{20}'..='\u{3f}').contains(&c) => continue,
            Escape::Csi if ('\u{40}'..='\u{7e}').contains(&c) => {
                escape = Escape::Plain;
                continue;
            }
            _ => escape = Escape::Plain,
        }
        if c == '\u{1b}' {
            escape = Escape::Started;
        }

        let replacement = if c.is_control() { '?' } else { c };
        if out.len() + replacement.len_utf8() > budget {
            truncated = true;
            break;
        }
        out.push(replacement);
    }

    if truncated {
        out.push_str(TRUNCATION_INDICATOR);
    }
    Cow::Owned(out)
}

/// Position inside an ANSI escape sequence.
#[derive(Clone, Copy)]
enum Escape {
    Plain,
    /// Just after ESC.
    Started,
    /// Inside `ESC [`, until a final byte in `0x40..=0x7E`.
    Csi,
}

/// Create a [`RestApiException`](crate::RestApiException) with a formatted
/// public message.
///
/// ```rust
/// use http::StatusCode;
/// use rest_errors::{definitions, rest_api_err};
///
/// let order_id = 42;
/// let err = rest_api_err!(StatusCode::CONFLICT, definitions::CONFLICT, "order {} already shipped", order_id);
/// assert_eq!(err.message(), "order 42 already shipped");
/// ```
#[macro_export]
macro_rules! rest_api_err {
    ($status:expr, $code:expr, $msg:literal $(,)?) => {
        $crate::RestApiException::new($status, $code, $msg)
    };
    ($status:expr, $code:expr, $fmt:literal, $($arg:expr),+ $(,)?) => {
        $crate::RestApiException::new($status, $code, format!($fmt, $($arg),+))
    };
}
